use thiserror::Error;

/// Error type for split policy validation, generator state, and dataset access failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SplitError {
    #[error("invalid split policy: {0}")]
    InvalidPolicy(String),
    #[error("split generator exhausted after {fold_count} split(s)")]
    Exhausted { fold_count: usize },
    #[error("read-only dataset view: {0}")]
    ReadOnlyViolation(String),
    #[error("categorical label required: {0}")]
    LabelRequired(String),
    #[error("row index {index} out of bounds for {row_count} row(s)")]
    RowOutOfBounds { index: usize, row_count: usize },
    #[error("column index {index} out of bounds for {column_count} column(s)")]
    ColumnOutOfBounds { index: usize, column_count: usize },
    #[error("invalid row: {0}")]
    InvalidRow(String),
    #[error("checkpoint does not match generator: {0}")]
    CheckpointMismatch(String),
}
