//! Property tests for allocation validation and settlement classification.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::types::{Settlement, SettlementTiming};
use super::validation::{merge_allocation_amounts, validate_sum_bound};
use crate::ledger::error::LedgerError;

/// Strategy for small positive amounts with two decimal places.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for non-empty allocation lists over a small key space, so
/// duplicate targets occur regularly.
fn allocation_list() -> impl Strategy<Value = Vec<(u8, Decimal)>> {
    prop::collection::vec((0u8..8, positive_amount()), 1..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Merging preserves the total: the merged map sums to exactly the sum of
    /// the input list, no cents lost to duplicate-key handling.
    #[test]
    fn prop_merge_preserves_total(allocations in allocation_list()) {
        let input_total: Decimal = allocations.iter().map(|(_, a)| *a).sum();
        let merged = merge_allocation_amounts(&allocations).unwrap();
        let merged_total: Decimal = merged.values().copied().sum();
        prop_assert_eq!(merged_total, input_total);
    }

    /// Any non-positive amount anywhere in the list rejects the whole call.
    #[test]
    fn prop_merge_rejects_any_non_positive(
        allocations in allocation_list(),
        position in any::<prop::sample::Index>(),
        bad_cents in -1_000_000i64..=0,
    ) {
        let mut allocations = allocations;
        let at = position.index(allocations.len());
        allocations[at].1 = Decimal::new(bad_cents, 2);
        prop_assert!(matches!(
            merge_allocation_amounts(&allocations),
            Err(LedgerError::NonPositiveAllocation)
        ));
    }

    /// The sum bound is inclusive: requested == available passes, one cent
    /// more fails.
    #[test]
    fn prop_sum_bound_is_inclusive(available in positive_amount()) {
        prop_assert!(validate_sum_bound(available, available).is_ok());
        let over = available + Decimal::new(1, 2);
        let over_allocated = matches!(
            validate_sum_bound(over, available),
            Err(LedgerError::OverAllocation { .. })
        );
        prop_assert!(over_allocated);
    }

    /// Settlement classification matches the sign of the day offset, and the
    /// reported day count is always non-negative.
    #[test]
    fn prop_settlement_classification_total(offset in -1000i64..=1000) {
        let occurred = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let settled = occurred + chrono::Duration::days(offset);
        let settlement = Settlement::classify(occurred, settled);
        match settlement.timing {
            SettlementTiming::Advance { days } => {
                prop_assert!(offset < 0);
                prop_assert_eq!(days, -offset);
            }
            SettlementTiming::Delayed { days } => {
                prop_assert!(offset > 0);
                prop_assert_eq!(days, offset);
            }
            SettlementTiming::SameDay => prop_assert_eq!(offset, 0),
        }
    }
}
