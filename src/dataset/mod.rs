use serde::{Deserialize, Serialize};

use crate::errors::SplitError;
use crate::types::{CategoryIndex, RowIndex};

mod materialization;
mod table;
mod view;

pub use materialization::{SplitDataset, materialize};
pub use table::Table;
pub use view::DatasetView;

/// A single cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Real-valued cell.
    Numeric(f64),
    /// Category index into the column's nominal value list.
    Nominal(CategoryIndex),
    /// Free text cell.
    Text(String),
    /// Missing cell (valid for every column kind).
    Missing,
}

impl Value {
    /// Category index when this is a nominal value.
    pub fn as_category(&self) -> Option<CategoryIndex> {
        match self {
            Value::Nominal(idx) => Some(*idx),
            _ => None,
        }
    }

    /// Whether this is the missing marker.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

/// Column type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Real-valued column.
    Numeric,
    /// Nominal column with its ordered category labels.
    Nominal(Vec<String>),
    /// Free text column.
    Text,
}

/// Named, typed column descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Column name.
    pub name: String,
    /// Column type.
    pub kind: AttributeKind,
}

impl Attribute {
    /// Numeric column.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    /// Nominal column over `categories`.
    pub fn nominal<I, S>(name: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: AttributeKind::Nominal(categories.into_iter().map(Into::into).collect()),
        }
    }

    /// Free text column.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Text,
        }
    }

    /// Whether values of this column are categories.
    pub fn is_nominal(&self) -> bool {
        matches!(self.kind, AttributeKind::Nominal(_))
    }

    /// Whether `value` is acceptable for this column.
    pub fn accepts(&self, value: &Value) -> bool {
        match (&self.kind, value) {
            (_, Value::Missing) => true,
            (AttributeKind::Numeric, Value::Numeric(_)) => true,
            (AttributeKind::Nominal(categories), Value::Nominal(idx)) => {
                (*idx as usize) < categories.len()
            }
            (AttributeKind::Text, Value::Text(_)) => true,
            _ => false,
        }
    }
}

/// Borrowed row of a dataset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowRef<'a> {
    values: &'a [Value],
}

impl<'a> RowRef<'a> {
    /// Wrap a row slice.
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    /// All values in column order.
    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    /// Value at column `col`, if present.
    pub fn value(&self, col: usize) -> Option<&'a Value> {
        self.values.get(col)
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Row-addressable table contract consumed by split generators.
///
/// Row order must be stable for as long as a generator holds the dataset;
/// generators only ever read through this trait.
pub trait Dataset: Send + Sync {
    /// Number of rows.
    fn row_count(&self) -> usize;
    /// Column descriptors in column order.
    fn attributes(&self) -> &[Attribute];
    /// Designated label column, if any.
    fn label_column_index(&self) -> Option<usize>;
    /// Row at `idx`, or `None` when out of range.
    fn row_at(&self, idx: RowIndex) -> Option<RowRef<'_>>;
    /// Human-readable relation tag.
    fn relation_name(&self) -> &str;
    /// Replace the relation tag.
    fn set_relation_name(&mut self, name: &str);

    /// Whether the label column exists and is nominal.
    fn label_is_categorical(&self) -> bool {
        self.label_column_index()
            .and_then(|col| self.attributes().get(col))
            .is_some_and(Attribute::is_nominal)
    }

    /// Label value of row `row`, or `None` without a label column or row.
    fn label_value_of(&self, row: RowIndex) -> Option<&Value> {
        let col = self.label_column_index()?;
        self.row_at(row)?.value(col)
    }

    /// Number of columns.
    fn column_count(&self) -> usize {
        self.attributes().len()
    }
}

/// Error for a row index at or past `row_count`.
pub(crate) fn row_out_of_bounds(index: RowIndex, row_count: usize) -> SplitError {
    SplitError::RowOutOfBounds { index, row_count }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_accepts_matching_kinds_and_missing() {
        let numeric = Attribute::numeric("x");
        let nominal = Attribute::nominal("class", ["a", "b"]);
        let text = Attribute::text("note");

        assert!(numeric.accepts(&Value::Numeric(1.5)));
        assert!(!numeric.accepts(&Value::Nominal(0)));
        assert!(nominal.accepts(&Value::Nominal(1)));
        assert!(!nominal.accepts(&Value::Nominal(2)));
        assert!(text.accepts(&Value::Text("hi".into())));
        assert!(!text.accepts(&Value::Numeric(0.0)));
        for attribute in [&numeric, &nominal, &text] {
            assert!(attribute.accepts(&Value::Missing));
        }
        assert!(nominal.is_nominal());
        assert!(!numeric.is_nominal());
    }

    #[test]
    fn value_helpers() {
        assert_eq!(Value::Nominal(3).as_category(), Some(3));
        assert_eq!(Value::Numeric(3.0).as_category(), None);
        assert!(Value::Missing.is_missing());
        assert!(!Value::Text(String::new()).is_missing());
    }

    #[test]
    fn row_ref_accessors() {
        let values = vec![Value::Numeric(1.0), Value::Nominal(0)];
        let row = RowRef::new(&values);
        assert_eq!(row.len(), 2);
        assert!(!row.is_empty());
        assert_eq!(row.value(1), Some(&Value::Nominal(0)));
        assert_eq!(row.value(2), None);
        assert_eq!(row.values(), values.as_slice());
    }
}
