//! Core engine for Tallybook.
//!
//! This crate contains the bookkeeping engine with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `store` - Persistence gateway trait and in-memory implementation
//! - `audit` - Append-only audit trail recording and queries
//! - `ledger` - Income/expense recording and many-to-many allocation
//! - `reconcile` - Bank transaction matching and account balances
//! - `fiscal` - Accounting period lifecycle and period summaries

pub mod audit;
pub mod fiscal;
pub mod ledger;
pub mod reconcile;
pub mod store;
