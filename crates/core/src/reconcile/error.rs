//! Bank reconciliation error types.

use rust_decimal::Decimal;
use tallybook_shared::types::{BankTransactionId, ExpenseId, IncomeId};
use thiserror::Error;

use crate::audit::AuditError;
use crate::ledger::BankChannel;
use crate::store::StoreError;

/// Errors that can occur during bank reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// No bank account registered for the channel.
    #[error("No bank account registered for channel {0}")]
    AccountNotFound(BankChannel),

    /// A bank account already exists for the channel.
    #[error("A bank account already exists for channel {0}")]
    DuplicateChannel(BankChannel),

    /// Bank transaction not found.
    #[error("Bank transaction not found: {0}")]
    TransactionNotFound(BankTransactionId),

    /// Income record not found.
    #[error("Income not found: {0}")]
    IncomeNotFound(IncomeId),

    /// Expense record not found.
    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    /// The transaction is already matched to a record.
    #[error("Transaction {0} is already matched")]
    AlreadyMatched(BankTransactionId),

    /// Matching requires exact amount equality.
    #[error("Amount mismatch: transaction is {transaction}, target is {target}")]
    AmountMismatch {
        /// Transaction amount magnitude.
        transaction: Decimal,
        /// Target record amount.
        target: Decimal,
    },

    /// Matching requires the same bank channel on both sides.
    #[error("Bank channel mismatch: transaction is {transaction}, target is {target}")]
    ChannelMismatch {
        /// Transaction channel.
        transaction: BankChannel,
        /// Target record channel.
        target: BankChannel,
    },

    /// A debit larger than the account balance was rejected.
    #[error("Insufficient balance: have {balance}, requested {requested}")]
    InsufficientBalance {
        /// Current account balance.
        balance: Decimal,
        /// Debit the caller attempted.
        requested: Decimal,
    },

    /// Transaction amounts are recorded as positive magnitudes.
    #[error("Transaction amount must be positive")]
    NonPositiveAmount,

    /// Opening balances cannot be negative.
    #[error("Opening balance cannot be negative")]
    NegativeOpeningBalance,

    /// Persistence gateway failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Audit trail failure.
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),
}

impl ReconcileError {
    /// Returns the error code for logs and reports.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DuplicateChannel(_) => "DUPLICATE_CHANNEL",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::IncomeNotFound(_) => "INCOME_NOT_FOUND",
            Self::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            Self::AlreadyMatched(_) => "ALREADY_MATCHED",
            Self::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            Self::ChannelMismatch { .. } => "CHANNEL_MISMATCH",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::NegativeOpeningBalance => "NEGATIVE_OPENING_BALANCE",
            Self::Store(_) => "STORE_ERROR",
            Self::Audit(_) => "AUDIT_ERROR",
        }
    }
}
