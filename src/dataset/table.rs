use serde::{Deserialize, Serialize};

use super::{Attribute, Dataset, RowRef, Value, row_out_of_bounds};
use crate::errors::SplitError;
use crate::types::{RelationName, RowIndex};

/// Owned, mutable in-memory dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Table {
    relation_name: RelationName,
    attributes: Vec<Attribute>,
    label: Option<usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table. `label` must index into `attributes` when set.
    pub fn new(
        relation_name: impl Into<String>,
        attributes: Vec<Attribute>,
        label: Option<usize>,
    ) -> Result<Self, SplitError> {
        if let Some(col) = label
            && col >= attributes.len()
        {
            return Err(SplitError::ColumnOutOfBounds {
                index: col,
                column_count: attributes.len(),
            });
        }
        Ok(Self {
            relation_name: relation_name.into(),
            attributes,
            label,
            rows: Vec::new(),
        })
    }

    /// Empty table sharing the schema and label of `source`.
    pub fn with_schema_of<D: Dataset + ?Sized>(source: &D) -> Self {
        Self {
            relation_name: source.relation_name().to_string(),
            attributes: source.attributes().to_vec(),
            label: source.label_column_index(),
            rows: Vec::new(),
        }
    }

    /// Copy the rows of `source` at `indices`, in `indices` order.
    pub fn from_indices<D: Dataset + ?Sized>(
        source: &D,
        indices: &[RowIndex],
    ) -> Result<Self, SplitError> {
        let mut table = Self::with_schema_of(source);
        table.rows.reserve(indices.len());
        for &idx in indices {
            let row = source
                .row_at(idx)
                .ok_or_else(|| row_out_of_bounds(idx, source.row_count()))?;
            table.rows.push(row.values().to_vec());
        }
        Ok(table)
    }

    /// Append a row after checking its arity and value kinds.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<(), SplitError> {
        if values.len() != self.attributes.len() {
            return Err(SplitError::InvalidRow(format!(
                "expected {} value(s), got {}",
                self.attributes.len(),
                values.len()
            )));
        }
        for (col, (attribute, value)) in self.attributes.iter().zip(&values).enumerate() {
            if !attribute.accepts(value) {
                return Err(SplitError::InvalidRow(format!(
                    "value {value:?} not valid for column {col} '{}'",
                    attribute.name
                )));
            }
        }
        self.rows.push(values);
        Ok(())
    }

    /// Builder-style `push_row`.
    pub fn with_row(mut self, values: Vec<Value>) -> Result<Self, SplitError> {
        self.push_row(values)?;
        Ok(self)
    }

    /// Overwrite one cell.
    pub fn set_value(&mut self, row: RowIndex, col: usize, value: Value) -> Result<(), SplitError> {
        let row_count = self.rows.len();
        let attribute = self
            .attributes
            .get(col)
            .ok_or(SplitError::ColumnOutOfBounds {
                index: col,
                column_count: self.attributes.len(),
            })?;
        if !attribute.accepts(&value) {
            return Err(SplitError::InvalidRow(format!(
                "value {value:?} not valid for column {col} '{}'",
                attribute.name
            )));
        }
        let cells = self
            .rows
            .get_mut(row)
            .ok_or_else(|| row_out_of_bounds(row, row_count))?;
        cells[col] = value;
        Ok(())
    }

    /// Move the label designation to `label` (or clear it).
    pub fn set_label_column(&mut self, label: Option<usize>) -> Result<(), SplitError> {
        if let Some(col) = label
            && col >= self.attributes.len()
        {
            return Err(SplitError::ColumnOutOfBounds {
                index: col,
                column_count: self.attributes.len(),
            });
        }
        self.label = label;
        Ok(())
    }

    /// Iterate rows in order.
    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(|row| RowRef::new(row))
    }
}

impl Dataset for Table {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn label_column_index(&self) -> Option<usize> {
        self.label
    }

    fn row_at(&self, idx: RowIndex) -> Option<RowRef<'_>> {
        self.rows.get(idx).map(|row| RowRef::new(row))
    }

    fn relation_name(&self) -> &str {
        &self.relation_name
    }

    fn set_relation_name(&mut self, name: &str) {
        self.relation_name = name.to_string();
    }
}
