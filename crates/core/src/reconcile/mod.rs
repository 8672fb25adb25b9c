//! Bank reconciliation: accounts per channel, statement transactions, and
//! exact-amount matching against the ledger.

pub mod error;
pub mod service;
pub mod types;

pub use error::ReconcileError;
pub use service::ReconcileService;
pub use types::{
    AccountSummary, BankAccount, BankTransaction, Direction, NewBankTransaction,
    ReconciliationReport,
};
