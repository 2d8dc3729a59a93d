use std::sync::Arc;

use super::{Attribute, Dataset, DatasetView, RowRef, Table, Value};
use crate::errors::SplitError;
use crate::types::RowIndex;

/// One side of a produced split, either a view or an owned copy.
///
/// Both variants expose the same rows in the same order; they differ only in
/// ownership and in whether cell mutation is allowed.
#[derive(Debug)]
pub enum SplitDataset<D> {
    /// Read-only projection sharing the source rows.
    View(DatasetView<D>),
    /// Independent copy of the selected rows.
    Copy(Table),
}

impl<D> Clone for SplitDataset<D> {
    fn clone(&self) -> Self {
        match self {
            SplitDataset::View(view) => SplitDataset::View(view.clone()),
            SplitDataset::Copy(table) => SplitDataset::Copy(table.clone()),
        }
    }
}

impl<D: Dataset> SplitDataset<D> {
    /// Whether this side is a read-only view.
    pub fn is_view(&self) -> bool {
        matches!(self, SplitDataset::View(_))
    }

    /// Overwrite one cell. Views reject this with `ReadOnlyViolation`.
    pub fn set_value(&mut self, row: RowIndex, col: usize, value: Value) -> Result<(), SplitError> {
        match self {
            SplitDataset::View(view) => view.set_value(row, col, value),
            SplitDataset::Copy(table) => table.set_value(row, col, value),
        }
    }

    /// Owned table with the same rows, copying only when this is a view.
    pub fn into_table(self) -> Result<Table, SplitError> {
        match self {
            SplitDataset::View(view) => view.to_table(),
            SplitDataset::Copy(table) => Ok(table),
        }
    }
}

impl<D: Dataset> Dataset for SplitDataset<D> {
    fn row_count(&self) -> usize {
        match self {
            SplitDataset::View(view) => view.row_count(),
            SplitDataset::Copy(table) => table.row_count(),
        }
    }

    fn attributes(&self) -> &[Attribute] {
        match self {
            SplitDataset::View(view) => view.attributes(),
            SplitDataset::Copy(table) => table.attributes(),
        }
    }

    fn label_column_index(&self) -> Option<usize> {
        match self {
            SplitDataset::View(view) => view.label_column_index(),
            SplitDataset::Copy(table) => table.label_column_index(),
        }
    }

    fn row_at(&self, idx: RowIndex) -> Option<RowRef<'_>> {
        match self {
            SplitDataset::View(view) => view.row_at(idx),
            SplitDataset::Copy(table) => table.row_at(idx),
        }
    }

    fn relation_name(&self) -> &str {
        match self {
            SplitDataset::View(view) => view.relation_name(),
            SplitDataset::Copy(table) => table.relation_name(),
        }
    }

    fn set_relation_name(&mut self, name: &str) {
        match self {
            SplitDataset::View(view) => view.set_relation_name(name),
            SplitDataset::Copy(table) => table.set_relation_name(name),
        }
    }
}

/// Turn an index list into a concrete dataset: a view when `use_view`, else a copy.
///
/// View cost is O(1) in row data (the index list is moved in); copy cost is
/// O(indices.len()) rows.
pub fn materialize<D: Dataset>(
    source: &Arc<D>,
    indices: Vec<RowIndex>,
    use_view: bool,
) -> Result<SplitDataset<D>, SplitError> {
    if use_view {
        DatasetView::new(Arc::clone(source), indices).map(SplitDataset::View)
    } else {
        Table::from_indices(source.as_ref(), &indices).map(SplitDataset::Copy)
    }
}
