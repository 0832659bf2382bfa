//! Columns, records and record identity.

use std::fmt;
use std::ops::Index;

use uuid::Uuid;

// =============================================================================
// RecordId
// =============================================================================

/// Stable identity of a record, independent of its position.
///
/// Assigned when the record enters a store and never reused. Positions shift
/// on removal; ids do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(Uuid);

impl RecordId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Column
// =============================================================================

/// Value kind of a column, used to pick the sort comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnKind {
    /// Compared as text.
    #[default]
    Text,
    /// Compared arithmetically.
    Numeric,
}

impl ColumnKind {
    /// Infer the kind from a single sample value.
    ///
    /// Only the first record is sampled, so a column whose first value is
    /// numeric is numeric even if later values are not.
    pub fn infer(sample: &str) -> Self {
        if parse_number(sample).is_some() {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        }
    }
}

/// Parse a cell as a finite number.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// A grid column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Header name, unique within the grid.
    pub name: String,
    /// Position of this column within every record.
    pub ordinal: usize,
    /// Inferred value kind.
    pub kind: ColumnKind,
}

impl Column {
    /// Create a text column at the given position.
    pub fn new(name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            ordinal,
            kind: ColumnKind::Text,
        }
    }
}

/// Ordered column list with name lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns {
    columns: Vec<Column>,
}

impl Columns {
    /// Build columns from header names, in order.
    pub fn new<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(ordinal, name)| Column::new(name, ordinal))
            .collect();
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, ordinal: usize) -> Option<&Column> {
        self.columns.get(ordinal)
    }

    /// Resolve a column name to its ordinal.
    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Re-infer every column's kind from `sample`, or reset to text when
    /// there is no sample.
    pub fn infer_kinds(&mut self, sample: Option<&Record>) {
        for column in &mut self.columns {
            column.kind = sample
                .and_then(|r| r.get(column.ordinal))
                .map(ColumnKind::infer)
                .unwrap_or_default();
        }
    }
}

// =============================================================================
// Record
// =============================================================================

/// One row of cell values, positionally matched to the column list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Record {
    cells: Vec<String>,
}

impl Record {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell text at `column`, if present.
    pub fn get(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Replace a cell, returning the previous value.
    pub(crate) fn replace(&mut self, column: usize, value: String) -> Option<String> {
        self.cells
            .get_mut(column)
            .map(|cell| std::mem::replace(cell, value))
    }
}

impl Index<usize> for Record {
    type Output = str;

    fn index(&self, column: usize) -> &str {
        &self.cells[column]
    }
}

impl<S: Into<String>> From<Vec<S>> for Record {
    fn from(cells: Vec<S>) -> Self {
        Self::new(cells.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Record {
    fn from(cells: [S; N]) -> Self {
        Self::new(cells.into_iter().map(Into::into).collect())
    }
}
