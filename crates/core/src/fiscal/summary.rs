//! Accrual period summaries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{BankChannel, Expense, ExpenseCategory, Income};

/// Financial summary of a date range, computed by full scan at small-business
/// scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// First day of the summarized range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the summarized range (inclusive).
    pub end_date: NaiveDate,
    /// Sum of income amounts in range.
    pub total_income: Decimal,
    /// Sum of expense amounts in range.
    pub total_expense: Decimal,
    /// `total_income - total_expense`, exact.
    pub net_profit: Decimal,
    /// `net_profit / total_income * 100` rounded to 2dp; zero when there is no
    /// income.
    pub profit_margin: Decimal,
    /// Income bucketed by bank channel.
    pub income_by_channel: BTreeMap<BankChannel, Decimal>,
    /// Expense bucketed by bank channel.
    pub expense_by_channel: BTreeMap<BankChannel, Decimal>,
    /// Expense bucketed by category.
    pub expense_by_category: BTreeMap<ExpenseCategory, Decimal>,
    /// Number of income records in range.
    pub income_count: usize,
    /// Number of expense records in range.
    pub expense_count: usize,
}

impl PeriodSummary {
    /// Computes a summary over all records whose occurrence date falls within
    /// the inclusive [start, end] range.
    #[must_use]
    pub fn compute(
        start_date: NaiveDate,
        end_date: NaiveDate,
        incomes: &[Income],
        expenses: &[Expense],
    ) -> Self {
        let mut total_income = Decimal::ZERO;
        let mut income_by_channel: BTreeMap<BankChannel, Decimal> = BTreeMap::new();
        let mut income_count = 0;
        for income in incomes
            .iter()
            .filter(|i| i.occurred_on >= start_date && i.occurred_on <= end_date)
        {
            total_income += income.amount;
            *income_by_channel.entry(income.channel).or_default() += income.amount;
            income_count += 1;
        }

        let mut total_expense = Decimal::ZERO;
        let mut expense_by_channel: BTreeMap<BankChannel, Decimal> = BTreeMap::new();
        let mut expense_by_category: BTreeMap<ExpenseCategory, Decimal> = BTreeMap::new();
        let mut expense_count = 0;
        for expense in expenses
            .iter()
            .filter(|e| e.occurred_on >= start_date && e.occurred_on <= end_date)
        {
            total_expense += expense.amount;
            *expense_by_channel.entry(expense.channel).or_default() += expense.amount;
            *expense_by_category.entry(expense.category).or_default() += expense.amount;
            expense_count += 1;
        }

        let net_profit = total_income - total_expense;
        let profit_margin = if total_income.is_zero() {
            Decimal::ZERO
        } else {
            (net_profit / total_income * Decimal::ONE_HUNDRED).round_dp(2)
        };

        Self {
            start_date,
            end_date,
            total_income,
            total_expense,
            net_profit,
            profit_margin,
            income_by_channel,
            expense_by_channel,
            expense_by_category,
            income_count,
            expense_count,
        }
    }
}
