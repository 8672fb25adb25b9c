//! Accounting period lifecycle service.
//!
//! Periods are created open, can be adjusted while open, closed with frozen
//! totals, and reopened for correction. Every transition lands in the audit
//! trail.

use chrono::{NaiveDate, Utc};
use tallybook_shared::types::AccountingPeriodId;
use tracing::info;

use super::error::PeriodError;
use super::period::{self, AccountingPeriod, FrozenTotals, PeriodStatus};
use super::summary::PeriodSummary;
use crate::audit::{self, AuditEntityType, AuditRecorder, NewAuditLog, OperationType};
use crate::store::Gateway;

/// Partial update applied to an open period. `None` fields are left as is.
#[derive(Debug, Default, Clone)]
pub struct AdjustPeriod {
    /// New period name.
    pub name: Option<String>,
    /// New start date (inclusive).
    pub start_date: Option<NaiveDate>,
    /// New end date (inclusive).
    pub end_date: Option<NaiveDate>,
}

/// The accounting period lifecycle service.
pub struct PeriodService<'a> {
    store: &'a dyn Gateway,
    audit: AuditRecorder<'a>,
}

impl<'a> PeriodService<'a> {
    /// Creates a period service over the given gateway and recorder.
    #[must_use]
    pub fn new(store: &'a dyn Gateway, audit: AuditRecorder<'a>) -> Self {
        Self { store, audit }
    }

    /// Creates a new open period.
    ///
    /// The date range must be valid and must not overlap any existing period,
    /// closed ones included.
    pub fn create_period(
        &self,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        operator: &str,
    ) -> Result<AccountingPeriodId, PeriodError> {
        self.audit.ensure_operator(operator)?;
        period::validate_date_range(start_date, end_date)?;
        self.ensure_no_overlap(start_date, end_date, None)?;

        let created = AccountingPeriod {
            id: AccountingPeriodId::new(),
            name: name.to_string(),
            start_date,
            end_date,
            status: PeriodStatus::Open,
            totals: None,
            closed_by: None,
            closed_at: None,
        };
        let id = self.store.save_period(created.clone())?;
        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Create,
            entity_type: AuditEntityType::AccountingPeriod,
            entity_id: id.to_string(),
            entity_name: created.name.clone(),
            operator: operator.to_string(),
            description: format!("Opened period {name} ({start_date} to {end_date})"),
            old_value: None,
            new_value: audit::snapshot(&created),
            notes: None,
        })?;
        info!(period_id = %id, name, "accounting period opened");
        Ok(id)
    }

    /// Adjusts an open period's name or date range.
    ///
    /// Closed periods reject adjustment; the adjusted range is re-validated
    /// against every other period.
    pub fn adjust_period(
        &self,
        id: AccountingPeriodId,
        changes: AdjustPeriod,
        operator: &str,
    ) -> Result<(), PeriodError> {
        self.audit.ensure_operator(operator)?;
        let mut target = self.require_period(id)?;
        if target.is_closed() {
            return Err(PeriodError::PeriodClosed);
        }
        let before = audit::snapshot(&target);

        if let Some(name) = changes.name {
            target.name = name;
        }
        if let Some(start) = changes.start_date {
            target.start_date = start;
        }
        if let Some(end) = changes.end_date {
            target.end_date = end;
        }
        period::validate_date_range(target.start_date, target.end_date)?;
        self.ensure_no_overlap(target.start_date, target.end_date, Some(id))?;

        self.store.save_period(target.clone())?;
        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Adjust,
            entity_type: AuditEntityType::AccountingPeriod,
            entity_id: id.to_string(),
            entity_name: target.name.clone(),
            operator: operator.to_string(),
            description: format!(
                "Adjusted period {} ({} to {})",
                target.name, target.start_date, target.end_date
            ),
            old_value: before,
            new_value: audit::snapshot(&target),
            notes: None,
        })?;
        Ok(())
    }

    /// Closes an open period, freezing its accrual totals.
    ///
    /// Returns the full summary the frozen totals were taken from.
    pub fn close_period(
        &self,
        id: AccountingPeriodId,
        operator: &str,
    ) -> Result<PeriodSummary, PeriodError> {
        self.audit.ensure_operator(operator)?;
        let mut target = self.require_period(id)?;
        if target.is_closed() {
            return Err(PeriodError::AlreadyClosed);
        }
        let before = audit::snapshot(&target);

        let summary = self.accrual_summary(target.start_date, target.end_date)?;
        let totals = FrozenTotals {
            total_income: summary.total_income,
            total_expense: summary.total_expense,
            net_profit: summary.net_profit,
        };
        target.status = PeriodStatus::Closed;
        target.totals = Some(totals);
        target.closed_by = Some(operator.to_string());
        target.closed_at = Some(Utc::now());
        self.store.save_period(target.clone())?;

        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Update,
            entity_type: AuditEntityType::AccountingPeriod,
            entity_id: id.to_string(),
            entity_name: target.name.clone(),
            operator: operator.to_string(),
            description: format!(
                "Closed period {} with net profit {}",
                target.name, totals.net_profit
            ),
            old_value: before,
            new_value: audit::snapshot(&target),
            notes: None,
        })?;
        info!(period_id = %id, net_profit = %totals.net_profit, "accounting period closed");
        Ok(summary)
    }

    /// Reopens a closed period for correction.
    ///
    /// Frozen totals are kept as the last-close record; they go stale until
    /// the period is closed again.
    pub fn reopen_period(
        &self,
        id: AccountingPeriodId,
        operator: &str,
    ) -> Result<(), PeriodError> {
        self.audit.ensure_operator(operator)?;
        let mut target = self.require_period(id)?;
        if !target.is_closed() {
            return Err(PeriodError::AlreadyOpen);
        }
        let before = audit::snapshot(&target);

        target.status = PeriodStatus::Open;
        target.closed_by = None;
        target.closed_at = None;
        self.store.save_period(target.clone())?;

        self.audit.log_operation(NewAuditLog {
            operation: OperationType::Update,
            entity_type: AuditEntityType::AccountingPeriod,
            entity_id: id.to_string(),
            entity_name: target.name.clone(),
            operator: operator.to_string(),
            description: format!("Reopened period {}", target.name),
            old_value: before,
            new_value: audit::snapshot(&target),
            notes: None,
        })?;
        info!(period_id = %id, "accounting period reopened");
        Ok(())
    }

    /// Computes the live accrual summary for an arbitrary date range.
    pub fn accrual_summary(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PeriodSummary, PeriodError> {
        period::validate_date_range(start_date, end_date)?;
        let incomes = self.store.list_incomes()?;
        let expenses = self.store.list_expenses()?;
        Ok(PeriodSummary::compute(start_date, end_date, &incomes, &expenses))
    }

    /// Returns a period by id.
    pub fn get_period(&self, id: AccountingPeriodId) -> Result<AccountingPeriod, PeriodError> {
        self.require_period(id)
    }

    /// Lists all periods ordered by start date.
    pub fn list_periods(&self) -> Result<Vec<AccountingPeriod>, PeriodError> {
        let mut periods = self.store.list_periods()?;
        periods.sort_by_key(|p| p.start_date);
        Ok(periods)
    }

    fn require_period(&self, id: AccountingPeriodId) -> Result<AccountingPeriod, PeriodError> {
        self.store
            .get_period(id)?
            .ok_or(PeriodError::PeriodNotFound(id))
    }

    fn ensure_no_overlap(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<AccountingPeriodId>,
    ) -> Result<(), PeriodError> {
        for existing in self.store.list_periods()? {
            if Some(existing.id) == exclude {
                continue;
            }
            if period::date_ranges_overlap(
                start_date,
                end_date,
                existing.start_date,
                existing.end_date,
            ) {
                return Err(PeriodError::Overlapping(existing.name));
            }
        }
        Ok(())
    }
}
