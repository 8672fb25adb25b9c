//! Ledger error types for allocation and recording operations.

use rust_decimal::Decimal;
use tallybook_shared::types::{CustomerId, ExpenseId, IncomeId, OrderId, SupplierId};
use thiserror::Error;

use crate::audit::AuditError;
use crate::ledger::BankChannel;
use crate::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Reference Errors ==========
    /// Income record not found.
    #[error("Income not found: {0}")]
    IncomeNotFound(IncomeId),

    /// Expense record not found.
    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    /// Sales order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Supplier not found.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(SupplierId),

    // ========== Validation Errors ==========
    /// An allocation call carried no targets.
    #[error("Allocation must name at least one target")]
    EmptyAllocation,

    /// Every allocated amount must be positive.
    #[error("Allocation amounts must be positive")]
    NonPositiveAllocation,

    /// The amount being recorded must be positive.
    #[error("Amount must be positive")]
    NonPositiveAmount,

    /// The allocations exceed what the funding record has left.
    #[error("Over-allocation: requested {requested}, available {available}")]
    OverAllocation {
        /// Sum the caller tried to allocate.
        requested: Decimal,
        /// Amount still available on the funding record.
        available: Decimal,
    },

    /// A single order was allocated more than it has outstanding.
    #[error("Order {order_id} over-allocated: requested {requested}, outstanding {outstanding}")]
    OrderOverAllocation {
        /// The over-allocated order.
        order_id: OrderId,
        /// Amount requested for that order.
        requested: Decimal,
        /// Amount the order still has outstanding.
        outstanding: Decimal,
    },

    /// A payment and its target expenses must share a bank channel.
    #[error("Bank channel mismatch: payment is {payment}, expense {expense_id} is {expense}")]
    ChannelMismatch {
        /// Channel of the payment being allocated.
        payment: BankChannel,
        /// The mismatched expense.
        expense_id: ExpenseId,
        /// That expense's channel.
        expense: BankChannel,
    },

    // ========== Infrastructure ==========
    /// Persistence gateway failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Audit trail failure.
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),
}

impl LedgerError {
    /// Returns the error code for logs and reports.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::IncomeNotFound(_) => "INCOME_NOT_FOUND",
            Self::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::SupplierNotFound(_) => "SUPPLIER_NOT_FOUND",
            Self::EmptyAllocation => "EMPTY_ALLOCATION",
            Self::NonPositiveAllocation => "NON_POSITIVE_ALLOCATION",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::OverAllocation { .. } => "OVER_ALLOCATION",
            Self::OrderOverAllocation { .. } => "ORDER_OVER_ALLOCATION",
            Self::ChannelMismatch { .. } => "CHANNEL_MISMATCH",
            Self::Store(_) => "STORE_ERROR",
            Self::Audit(_) => "AUDIT_ERROR",
        }
    }
}
