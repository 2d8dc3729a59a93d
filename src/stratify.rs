//! Label-aware reordering so contiguous folds mirror the label distribution.

use indexmap::IndexMap;

use crate::errors::SplitError;
use crate::types::{CategoryIndex, RowIndex};

/// Reorder `order` so that cutting it with `fold_bounds(len, fold_count, _)`
/// gives every fold a share of each label close to the full-data share.
///
/// Two stable passes, no randomness:
/// 1. group positions by label (`label_of`), groups ordered by first
///    appearance in `order`, each group keeping its internal order; missing
///    labels (`None`) form their own group;
/// 2. deal the grouped sequence round-robin across the folds (entry `i` goes
///    to fold `i % fold_count`) and lay the folds out one after another.
///
/// Fold `j` receives exactly the entries dealt to it, so fold sizes match
/// `fold_bounds`, and any label with at least `fold_count` rows lands in
/// every fold.
pub fn stratify<F>(
    order: &[RowIndex],
    fold_count: usize,
    label_of: F,
) -> Result<Vec<RowIndex>, SplitError>
where
    F: Fn(RowIndex) -> Option<CategoryIndex>,
{
    if fold_count == 0 || fold_count > order.len() {
        return Err(SplitError::InvalidPolicy(format!(
            "cannot stratify {} row(s) into {fold_count} fold(s)",
            order.len()
        )));
    }

    let mut groups: IndexMap<Option<CategoryIndex>, Vec<RowIndex>> = IndexMap::new();
    for &idx in order {
        groups.entry(label_of(idx)).or_default().push(idx);
    }
    let grouped: Vec<RowIndex> = groups.into_values().flatten().collect();

    let mut stratified = Vec::with_capacity(grouped.len());
    for fold in 0..fold_count {
        stratified.extend(grouped.iter().skip(fold).step_by(fold_count).copied());
    }
    Ok(stratified)
}
