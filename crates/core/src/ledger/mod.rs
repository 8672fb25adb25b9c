//! Income/expense recording and many-to-many allocation.
//!
//! This module implements the ledger allocator:
//! - Accrual income/expense records with typed settlement timing
//! - Income split across sales orders with sum-bound enforcement
//! - Disbursements split across expense obligations
//! - Accrual cross-matching of income to expense
//! - Typed, queryable allocation rows

pub mod error;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use service::{AllocationOutcome, LedgerService};
pub use types::{
    Allocation, AllocationKind, BankChannel, Customer, Expense, ExpenseCategory, Income,
    NewExpense, NewIncome, Order, OrderSettlement, Settlement, SettlementTiming, Supplier,
};
pub use validation::{merge_allocation_amounts, validate_sum_bound};
