//! Accounting periods: lifecycle (open, adjust, close, reopen) and accrual
//! summaries over date ranges.

pub mod error;
pub mod period;
pub mod service;
pub mod summary;

#[cfg(test)]
mod period_props;

pub use error::PeriodError;
pub use period::{AccountingPeriod, FrozenTotals, PeriodStatus};
pub use service::{AdjustPeriod, PeriodService};
pub use summary::PeriodSummary;
