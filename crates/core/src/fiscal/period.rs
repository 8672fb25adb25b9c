//! Accounting period types and pure date validation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallybook_shared::types::AccountingPeriodId;

use super::error::PeriodError;

/// Status of an accounting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Period is open: records can be adjusted, the period can be closed.
    Open,
    /// Period is closed: totals are frozen, adjustment is forbidden.
    Closed,
}

/// Totals frozen when a period is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenTotals {
    /// Total income over the period.
    pub total_income: Decimal,
    /// Total expense over the period.
    pub total_expense: Decimal,
    /// Net profit (income minus expense).
    pub net_profit: Decimal,
}

/// A named, non-overlapping inclusive date range used for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Unique identifier.
    pub id: AccountingPeriodId,
    /// Period name (e.g., "2024-01").
    pub name: String,
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
    /// Current lifecycle status.
    pub status: PeriodStatus,
    /// Totals frozen at the most recent close. Stale after a reopen until the
    /// next close.
    pub totals: Option<FrozenTotals>,
    /// Operator that closed the period.
    pub closed_by: Option<String>,
    /// When the period was closed.
    pub closed_at: Option<DateTime<Utc>>,
}

impl AccountingPeriod {
    /// Returns true if the period is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status == PeriodStatus::Closed
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if this period's date range overlaps another's.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        date_ranges_overlap(self.start_date, self.end_date, other.start_date, other.end_date)
    }
}

/// Validates that a period's start does not come after its end.
///
/// A single-day period (start == end) is valid.
pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), PeriodError> {
    if start_date > end_date {
        return Err(PeriodError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }
    Ok(())
}

/// Checks if two inclusive date ranges overlap.
///
/// Two ranges [a_start, a_end] and [b_start, b_end] overlap if:
/// a_start <= b_end AND a_end >= b_start
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_date_range() {
        assert!(validate_date_range(date(2024, 1, 1), date(2024, 1, 31)).is_ok());
        assert!(validate_date_range(date(2024, 1, 1), date(2024, 1, 1)).is_ok());
        assert!(matches!(
            validate_date_range(date(2024, 2, 1), date(2024, 1, 1)),
            Err(PeriodError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_date_ranges_overlap_inclusive_boundary() {
        // Touching at a single shared day counts as overlap.
        assert!(date_ranges_overlap(
            date(2024, 1, 1),
            date(2024, 1, 31),
            date(2024, 1, 31),
            date(2024, 2, 29),
        ));
        assert!(!date_ranges_overlap(
            date(2024, 1, 1),
            date(2024, 1, 31),
            date(2024, 2, 1),
            date(2024, 2, 29),
        ));
    }

    #[test]
    fn test_contains_date_inclusive() {
        let period = AccountingPeriod {
            id: AccountingPeriodId::new(),
            name: "2024-01".into(),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
            status: PeriodStatus::Open,
            totals: None,
            closed_by: None,
            closed_at: None,
        };
        assert!(period.contains_date(date(2024, 1, 1)));
        assert!(period.contains_date(date(2024, 1, 31)));
        assert!(!period.contains_date(date(2024, 2, 1)));
    }
}
