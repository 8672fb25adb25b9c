//! The persistence gateway contract the engine runs against.

use tallybook_shared::types::{
    AccountingPeriodId, AllocationId, AuditLogId, BankAccountId, BankTransactionId, CustomerId,
    ExpenseId, IncomeId, OrderId, SupplierId,
};

use super::error::StoreError;
use crate::audit::AuditLog;
use crate::fiscal::AccountingPeriod;
use crate::ledger::{Allocation, Customer, Expense, Income, Order, Supplier};
use crate::reconcile::{BankAccount, BankTransaction};

/// Key-addressed persistence contract.
///
/// Every method is a plain synchronous call: `get` returns the entity or
/// `None`, `list` returns everything in insertion order, `save` upserts and
/// returns the id. There are no transactions; multi-record operations are the
/// services' responsibility.
///
/// The only cross-call guarantee beyond id uniqueness is the
/// optimistic-concurrency check on [`save_order`](Gateway::save_order) and
/// [`save_bank_account`](Gateway::save_bank_account): a save whose `version`
/// does not match the stored row fails with
/// [`StoreError::VersionConflict`], and a successful save bumps the stored
/// version.
pub trait Gateway {
    /// Fetches a customer by id.
    fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
    /// Upserts a customer.
    fn save_customer(&self, customer: Customer) -> Result<CustomerId, StoreError>;

    /// Fetches a supplier by id.
    fn get_supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError>;
    /// Upserts a supplier.
    fn save_supplier(&self, supplier: Supplier) -> Result<SupplierId, StoreError>;

    /// Fetches an order by id.
    fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    /// Lists all orders.
    fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
    /// Upserts an order, enforcing the version compare-and-swap.
    fn save_order(&self, order: Order) -> Result<OrderId, StoreError>;

    /// Fetches an income record by id.
    fn get_income(&self, id: IncomeId) -> Result<Option<Income>, StoreError>;
    /// Lists all income records.
    fn list_incomes(&self) -> Result<Vec<Income>, StoreError>;
    /// Upserts an income record.
    fn save_income(&self, income: Income) -> Result<IncomeId, StoreError>;

    /// Fetches an expense record by id.
    fn get_expense(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError>;
    /// Lists all expense records.
    fn list_expenses(&self) -> Result<Vec<Expense>, StoreError>;
    /// Upserts an expense record.
    fn save_expense(&self, expense: Expense) -> Result<ExpenseId, StoreError>;

    /// Fetches a bank account by id.
    fn get_bank_account(&self, id: BankAccountId) -> Result<Option<BankAccount>, StoreError>;
    /// Lists all bank accounts.
    fn list_bank_accounts(&self) -> Result<Vec<BankAccount>, StoreError>;
    /// Upserts a bank account, enforcing the version compare-and-swap.
    fn save_bank_account(&self, account: BankAccount) -> Result<BankAccountId, StoreError>;

    /// Fetches a bank transaction by id.
    fn get_bank_transaction(
        &self,
        id: BankTransactionId,
    ) -> Result<Option<BankTransaction>, StoreError>;
    /// Lists all bank transactions.
    fn list_bank_transactions(&self) -> Result<Vec<BankTransaction>, StoreError>;
    /// Upserts a bank transaction.
    fn save_bank_transaction(
        &self,
        transaction: BankTransaction,
    ) -> Result<BankTransactionId, StoreError>;

    /// Lists all allocation rows.
    fn list_allocations(&self) -> Result<Vec<Allocation>, StoreError>;
    /// Appends an allocation row.
    fn save_allocation(&self, allocation: Allocation) -> Result<AllocationId, StoreError>;

    /// Fetches an accounting period by id.
    fn get_period(&self, id: AccountingPeriodId) -> Result<Option<AccountingPeriod>, StoreError>;
    /// Lists all accounting periods.
    fn list_periods(&self) -> Result<Vec<AccountingPeriod>, StoreError>;
    /// Upserts an accounting period.
    fn save_period(&self, period: AccountingPeriod) -> Result<AccountingPeriodId, StoreError>;

    /// Appends an audit log entry.
    fn save_audit_log(&self, log: AuditLog) -> Result<AuditLogId, StoreError>;
    /// Lists all audit log entries in insertion order.
    fn list_audit_logs(&self) -> Result<Vec<AuditLog>, StoreError>;
}
