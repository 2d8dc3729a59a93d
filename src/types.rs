/// Seed supplied by the caller for a generator instance.
/// Example: `42`
pub type Seed = i64;
/// Zero-based row position in the caller-supplied source dataset.
/// Example: `17`
pub type RowIndex = usize;
/// One-based fold number as reported on produced splits.
/// Example: `3` (third of ten folds)
pub type FoldNumber = usize;
/// Category index into a nominal attribute's value list.
/// Example: `2` for `Iris-virginica` in `[setosa, versicolor, virginica]`
pub type CategoryIndex = u32;
/// Human-readable dataset tag used for reporting.
/// Examples: `iris`, `iris-train-3`
pub type RelationName = String;
