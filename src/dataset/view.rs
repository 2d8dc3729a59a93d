use std::sync::Arc;

use super::{Attribute, Dataset, RowRef, Table, Value, row_out_of_bounds};
use crate::errors::SplitError;
use crate::types::{RelationName, RowIndex};

/// Read-only, index-based projection over a shared dataset.
///
/// Row `i` of the view is row `indices[i]` of the source. No row data is
/// copied; the only state a view owns is its index list and its own relation
/// name, so renaming a view never renames the source.
#[derive(Debug)]
pub struct DatasetView<D> {
    source: Arc<D>,
    indices: Arc<[RowIndex]>,
    relation_name: RelationName,
}

impl<D> Clone for DatasetView<D> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            indices: Arc::clone(&self.indices),
            relation_name: self.relation_name.clone(),
        }
    }
}

impl<D: Dataset> DatasetView<D> {
    /// Project `source` onto `indices`. Every index must address a source row.
    pub fn new(source: Arc<D>, indices: impl Into<Arc<[RowIndex]>>) -> Result<Self, SplitError> {
        let indices = indices.into();
        let row_count = source.row_count();
        if let Some(&bad) = indices.iter().find(|&&idx| idx >= row_count) {
            return Err(row_out_of_bounds(bad, row_count));
        }
        let relation_name = source.relation_name().to_string();
        Ok(Self {
            source,
            indices,
            relation_name,
        })
    }

    /// The shared source dataset.
    pub fn source(&self) -> &Arc<D> {
        &self.source
    }

    /// Source row numbers in view order.
    pub fn indices(&self) -> &[RowIndex] {
        &self.indices
    }

    /// Source row number behind view row `row`.
    pub fn original_index(&self, row: RowIndex) -> Option<RowIndex> {
        self.indices.get(row).copied()
    }

    /// Always fails: views never write through to the shared source.
    pub fn set_value(&mut self, row: RowIndex, col: usize, _value: Value) -> Result<(), SplitError> {
        Err(SplitError::ReadOnlyViolation(format!(
            "cannot set row {row} column {col} of view '{}'; materialize a copy first",
            self.relation_name
        )))
    }

    /// Copy the projected rows into an owned table.
    pub fn to_table(&self) -> Result<Table, SplitError> {
        let mut table = Table::from_indices(self.source.as_ref(), &self.indices)?;
        table.set_relation_name(&self.relation_name);
        Ok(table)
    }
}

impl<D: Dataset> Dataset for DatasetView<D> {
    fn row_count(&self) -> usize {
        self.indices.len()
    }

    fn attributes(&self) -> &[Attribute] {
        self.source.attributes()
    }

    fn label_column_index(&self) -> Option<usize> {
        self.source.label_column_index()
    }

    fn row_at(&self, idx: RowIndex) -> Option<RowRef<'_>> {
        let original = *self.indices.get(idx)?;
        self.source.row_at(original)
    }

    fn relation_name(&self) -> &str {
        &self.relation_name
    }

    fn set_relation_name(&mut self, name: &str) {
        self.relation_name = name.to_string();
    }
}
