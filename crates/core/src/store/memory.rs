//! In-memory gateway implementation.
//!
//! Backs the engine in tests and in embedded single-process deployments. The
//! engine is synchronous and single-threaded, so interior mutability via
//! `RefCell` is sufficient; a multi-writer deployment would swap this for a
//! real store behind the same trait.

use std::cell::RefCell;
use std::collections::BTreeMap;

use tallybook_shared::types::{
    AccountingPeriodId, AllocationId, AuditLogId, BankAccountId, BankTransactionId, CustomerId,
    ExpenseId, IncomeId, OrderId, SupplierId,
};

use super::error::StoreError;
use super::gateway::Gateway;
use crate::audit::AuditLog;
use crate::fiscal::AccountingPeriod;
use crate::ledger::{Allocation, Customer, Expense, Income, Order, Supplier};
use crate::reconcile::{BankAccount, BankTransaction};

#[derive(Default)]
struct Inner {
    customers: BTreeMap<CustomerId, Customer>,
    suppliers: BTreeMap<SupplierId, Supplier>,
    orders: BTreeMap<OrderId, Order>,
    incomes: BTreeMap<IncomeId, Income>,
    expenses: BTreeMap<ExpenseId, Expense>,
    bank_accounts: BTreeMap<BankAccountId, BankAccount>,
    bank_transactions: BTreeMap<BankTransactionId, BankTransaction>,
    allocations: Vec<Allocation>,
    periods: BTreeMap<AccountingPeriodId, AccountingPeriod>,
    audit_logs: Vec<AuditLog>,
}

/// An in-memory, insertion-ordered implementation of [`Gateway`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RefCell<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Gateway for MemoryStore {
    fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.inner.borrow().customers.get(&id).cloned())
    }

    fn save_customer(&self, customer: Customer) -> Result<CustomerId, StoreError> {
        let id = customer.id;
        self.inner.borrow_mut().customers.insert(id, customer);
        Ok(id)
    }

    fn get_supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError> {
        Ok(self.inner.borrow().suppliers.get(&id).cloned())
    }

    fn save_supplier(&self, supplier: Supplier) -> Result<SupplierId, StoreError> {
        let id = supplier.id;
        self.inner.borrow_mut().suppliers.insert(id, supplier);
        Ok(id)
    }

    fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.inner.borrow().orders.get(&id).cloned())
    }

    fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.inner.borrow().orders.values().cloned().collect())
    }

    fn save_order(&self, mut order: Order) -> Result<OrderId, StoreError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(stored) = inner.orders.get(&order.id)
            && stored.version != order.version
        {
            return Err(StoreError::VersionConflict {
                expected: stored.version,
                found: order.version,
            });
        }
        order.version += 1;
        let id = order.id;
        inner.orders.insert(id, order);
        Ok(id)
    }

    fn get_income(&self, id: IncomeId) -> Result<Option<Income>, StoreError> {
        Ok(self.inner.borrow().incomes.get(&id).cloned())
    }

    fn list_incomes(&self) -> Result<Vec<Income>, StoreError> {
        Ok(self.inner.borrow().incomes.values().cloned().collect())
    }

    fn save_income(&self, income: Income) -> Result<IncomeId, StoreError> {
        let id = income.id;
        self.inner.borrow_mut().incomes.insert(id, income);
        Ok(id)
    }

    fn get_expense(&self, id: ExpenseId) -> Result<Option<Expense>, StoreError> {
        Ok(self.inner.borrow().expenses.get(&id).cloned())
    }

    fn list_expenses(&self) -> Result<Vec<Expense>, StoreError> {
        Ok(self.inner.borrow().expenses.values().cloned().collect())
    }

    fn save_expense(&self, expense: Expense) -> Result<ExpenseId, StoreError> {
        let id = expense.id;
        self.inner.borrow_mut().expenses.insert(id, expense);
        Ok(id)
    }

    fn get_bank_account(&self, id: BankAccountId) -> Result<Option<BankAccount>, StoreError> {
        Ok(self.inner.borrow().bank_accounts.get(&id).cloned())
    }

    fn list_bank_accounts(&self) -> Result<Vec<BankAccount>, StoreError> {
        Ok(self.inner.borrow().bank_accounts.values().cloned().collect())
    }

    fn save_bank_account(&self, mut account: BankAccount) -> Result<BankAccountId, StoreError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(stored) = inner.bank_accounts.get(&account.id)
            && stored.version != account.version
        {
            return Err(StoreError::VersionConflict {
                expected: stored.version,
                found: account.version,
            });
        }
        account.version += 1;
        let id = account.id;
        inner.bank_accounts.insert(id, account);
        Ok(id)
    }

    fn get_bank_transaction(
        &self,
        id: BankTransactionId,
    ) -> Result<Option<BankTransaction>, StoreError> {
        Ok(self.inner.borrow().bank_transactions.get(&id).cloned())
    }

    fn list_bank_transactions(&self) -> Result<Vec<BankTransaction>, StoreError> {
        Ok(self
            .inner
            .borrow()
            .bank_transactions
            .values()
            .cloned()
            .collect())
    }

    fn save_bank_transaction(
        &self,
        transaction: BankTransaction,
    ) -> Result<BankTransactionId, StoreError> {
        let id = transaction.id;
        self.inner.borrow_mut().bank_transactions.insert(id, transaction);
        Ok(id)
    }

    fn list_allocations(&self) -> Result<Vec<Allocation>, StoreError> {
        Ok(self.inner.borrow().allocations.clone())
    }

    fn save_allocation(&self, allocation: Allocation) -> Result<AllocationId, StoreError> {
        let id = allocation.id;
        self.inner.borrow_mut().allocations.push(allocation);
        Ok(id)
    }

    fn get_period(&self, id: AccountingPeriodId) -> Result<Option<AccountingPeriod>, StoreError> {
        Ok(self.inner.borrow().periods.get(&id).cloned())
    }

    fn list_periods(&self) -> Result<Vec<AccountingPeriod>, StoreError> {
        Ok(self.inner.borrow().periods.values().cloned().collect())
    }

    fn save_period(&self, period: AccountingPeriod) -> Result<AccountingPeriodId, StoreError> {
        let id = period.id;
        self.inner.borrow_mut().periods.insert(id, period);
        Ok(id)
    }

    fn save_audit_log(&self, log: AuditLog) -> Result<AuditLogId, StoreError> {
        let id = log.id;
        self.inner.borrow_mut().audit_logs.push(log);
        Ok(id)
    }

    fn list_audit_logs(&self) -> Result<Vec<AuditLog>, StoreError> {
        Ok(self.inner.borrow().audit_logs.clone())
    }
}
