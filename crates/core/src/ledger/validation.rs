//! Pure validation helpers for allocation calls.
//!
//! Everything here runs before the first write, so a failed call leaves the
//! store untouched.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::error::LedgerError;

/// Normalizes a caller-supplied allocation list.
///
/// Rejects empty lists and non-positive amounts; merges duplicate targets by
/// summing their amounts.
pub fn merge_allocation_amounts<K: Ord + Copy>(
    allocations: &[(K, Decimal)],
) -> Result<BTreeMap<K, Decimal>, LedgerError> {
    if allocations.is_empty() {
        return Err(LedgerError::EmptyAllocation);
    }
    let mut merged = BTreeMap::new();
    for &(target, amount) in allocations {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAllocation);
        }
        *merged.entry(target).or_insert(Decimal::ZERO) += amount;
    }
    Ok(merged)
}

/// Checks the allocation sum against what the funding record has left.
pub fn validate_sum_bound(requested: Decimal, available: Decimal) -> Result<(), LedgerError> {
    if requested > available {
        return Err(LedgerError::OverAllocation {
            requested,
            available,
        });
    }
    Ok(())
}
