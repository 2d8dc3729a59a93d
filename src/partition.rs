//! Contiguous fold boundaries over an ordered index sequence.

use crate::errors::SplitError;

/// Contiguous slice of an ordering that forms one fold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoldBounds {
    /// Offset of the fold's first position.
    pub first: usize,
    /// Number of positions in the fold.
    pub len: usize,
}

impl FoldBounds {
    /// One past the fold's last position.
    pub fn end(&self) -> usize {
        self.first + self.len
    }

    /// Position range covered by the fold.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.first..self.end()
    }
}

/// Bounds of fold `fold_index` (0-based) when `row_count` positions are cut into `fold_count` folds.
///
/// Every fold gets `row_count / fold_count` positions and the first
/// `row_count % fold_count` folds get one extra, so fold sizes differ by at
/// most one and the folds tile `0..row_count` in order.
pub fn fold_bounds(
    row_count: usize,
    fold_count: usize,
    fold_index: usize,
) -> Result<FoldBounds, SplitError> {
    if fold_count == 0 {
        return Err(SplitError::InvalidPolicy(
            "fold count must be at least 1".to_string(),
        ));
    }
    if fold_count > row_count {
        return Err(SplitError::InvalidPolicy(format!(
            "fold count {fold_count} exceeds row count {row_count}"
        )));
    }
    if fold_index >= fold_count {
        return Err(SplitError::InvalidPolicy(format!(
            "fold index {fold_index} out of range for {fold_count} fold(s)"
        )));
    }
    let base = row_count / fold_count;
    let remainder = row_count % fold_count;
    let len = if fold_index < remainder { base + 1 } else { base };
    let first = fold_index * base + fold_index.min(remainder);
    Ok(FoldBounds { first, len })
}

/// Sizes of all folds, in fold order.
pub fn fold_sizes(row_count: usize, fold_count: usize) -> Result<Vec<usize>, SplitError> {
    (0..fold_count)
        .map(|fold| fold_bounds(row_count, fold_count, fold).map(|bounds| bounds.len))
        .collect()
}
