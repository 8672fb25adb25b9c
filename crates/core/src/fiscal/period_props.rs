//! Property tests for period date arithmetic and accrual summaries.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tallybook_shared::types::{CustomerId, IncomeId};

use super::period::date_ranges_overlap;
use super::summary::PeriodSummary;
use crate::ledger::{BankChannel, Income};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Strategy for an inclusive date range as day offsets from a fixed base.
fn day_range() -> impl Strategy<Value = (i64, i64)> {
    (0i64..=730, 0i64..=730).prop_map(|(a, b)| (a.min(b), a.max(b)))
}

fn income_on(offset: i64, cents: i64, channel: BankChannel) -> Income {
    Income {
        id: IncomeId::new(),
        customer_id: CustomerId::new(),
        amount: Decimal::new(cents, 2),
        channel,
        has_invoice: false,
        occurred_on: base_date() + Duration::days(offset),
        order_allocations: BTreeMap::new(),
        settlement: None,
        notes: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Overlap is symmetric in its two ranges.
    #[test]
    fn prop_overlap_is_symmetric(a in day_range(), b in day_range()) {
        let to = |(s, e): (i64, i64)| {
            (base_date() + Duration::days(s), base_date() + Duration::days(e))
        };
        let (a_start, a_end) = to(a);
        let (b_start, b_end) = to(b);
        prop_assert_eq!(
            date_ranges_overlap(a_start, a_end, b_start, b_end),
            date_ranges_overlap(b_start, b_end, a_start, a_end)
        );
    }

    /// A range always overlaps itself, and its strict successor range never
    /// overlaps it.
    #[test]
    fn prop_adjacent_ranges_never_overlap(r in day_range(), gap in 1i64..=30) {
        let start = base_date() + Duration::days(r.0);
        let end = base_date() + Duration::days(r.1);
        prop_assert!(date_ranges_overlap(start, end, start, end));

        let next_start = end + Duration::days(gap);
        let next_end = next_start + Duration::days(5);
        prop_assert!(!date_ranges_overlap(start, end, next_start, next_end));
    }

    /// Net profit is exactly income minus expense, and splitting income
    /// across channels never changes the total: the channel buckets sum back
    /// to total_income.
    #[test]
    fn prop_summary_totals_are_exact(
        amounts in prop::collection::vec((0i64..=60, 1i64..=1_000_000, prop::bool::ANY), 0..20),
    ) {
        let incomes: Vec<Income> = amounts
            .iter()
            .map(|&(offset, cents, g)| {
                income_on(offset, cents, if g { BankChannel::G } else { BankChannel::N })
            })
            .collect();
        let summary = PeriodSummary::compute(
            base_date(),
            base_date() + Duration::days(60),
            &incomes,
            &[],
        );

        let expected: Decimal = incomes.iter().map(|i| i.amount).sum();
        prop_assert_eq!(summary.total_income, expected);
        prop_assert_eq!(summary.net_profit, summary.total_income - summary.total_expense);

        let bucketed: Decimal = summary.income_by_channel.values().copied().sum();
        prop_assert_eq!(bucketed, summary.total_income);
    }

    /// Records outside the range never contribute to totals.
    #[test]
    fn prop_summary_respects_range(offset in -120i64..=120) {
        let income = income_on(offset, 12_345, BankChannel::G);
        let summary = PeriodSummary::compute(
            base_date(),
            base_date() + Duration::days(30),
            std::slice::from_ref(&income),
            &[],
        );
        let in_range = (0..=30).contains(&offset);
        prop_assert_eq!(summary.income_count, usize::from(in_range));
        prop_assert_eq!(
            summary.total_income,
            if in_range { income.amount } else { Decimal::ZERO }
        );
    }
}
