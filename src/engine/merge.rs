// ABOUTME: Merges stored condition overrides onto the fallback condition set.
// ABOUTME: Stale condition names are pruned; the caller's entry is never mutated.

use tracing::trace;

use crate::model::{Conditions, PermissionEntry};

/// Compute the merged conditions for one evaluation.
///
/// Starts from the fallback weights and overlays every override whose name
/// the fallback declares. Overrides for undeclared names were written against
/// an older schema and are dropped.
pub fn merge_conditions(fallback: &Conditions, entry: &PermissionEntry) -> Conditions {
    let mut merged = fallback.clone();

    for (name, weight) in entry.overrides() {
        if fallback.contains(name) {
            merged.insert(name, weight);
        } else {
            trace!(condition = name, "pruning stale condition");
        }
    }

    merged
}
