//! Accounting period error types.

use chrono::NaiveDate;
use tallybook_shared::types::AccountingPeriodId;
use thiserror::Error;

use crate::audit::AuditError;
use crate::store::StoreError;

/// Errors that can occur during period lifecycle operations.
#[derive(Debug, Error)]
pub enum PeriodError {
    /// Accounting period not found.
    #[error("Accounting period not found: {0}")]
    PeriodNotFound(AccountingPeriodId),

    /// Start date must not come after the end date.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },

    /// The date range overlaps an existing period (inclusive bounds).
    #[error("Date range overlaps existing period \"{0}\"")]
    Overlapping(String),

    /// A closed period cannot be adjusted.
    #[error("Cannot adjust a closed period")]
    PeriodClosed,

    /// The period is already closed.
    #[error("Period is already closed")]
    AlreadyClosed,

    /// The period is already open.
    #[error("Period is already open")]
    AlreadyOpen,

    /// Persistence gateway failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Audit trail failure.
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),
}

impl PeriodError {
    /// Returns the error code for logs and reports.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::Overlapping(_) => "OVERLAPPING_PERIOD",
            Self::PeriodClosed => "PERIOD_CLOSED",
            Self::AlreadyClosed => "ALREADY_CLOSED",
            Self::AlreadyOpen => "ALREADY_OPEN",
            Self::Store(_) => "STORE_ERROR",
            Self::Audit(_) => "AUDIT_ERROR",
        }
    }
}
