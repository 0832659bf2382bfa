//! Sorting, filtering and the derived view.
//!
//! The engine holds the current sort key and filter. [`SortFilterEngine::derive`]
//! applies the filter, then a stable sort, and returns a fresh
//! [`DerivedView`]. Views are never patched in place.

use std::cmp::Ordering;

use log::{debug, warn};

use crate::error::{GridError, Result};
use crate::record::{Column, ColumnKind, Columns, Record, RecordId, parse_number};
use crate::store::RecordStore;

// =============================================================================
// Sort state
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The active sort: column ordinal plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: usize,
    pub direction: SortDirection,
}

/// The active filter.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Filter {
    /// Lowercased needle.
    needle: String,
    /// Restrict matching to one column.
    column: Option<usize>,
}

impl Filter {
    fn matches(&self, record: &Record) -> bool {
        match self.column {
            Some(column) => record
                .get(column)
                .is_some_and(|cell| cell_contains(cell, &self.needle)),
            None => record
                .cells()
                .iter()
                .any(|cell| cell_contains(cell, &self.needle)),
        }
    }
}

fn cell_contains(cell: &str, needle: &str) -> bool {
    cell.to_lowercase().contains(needle)
}

/// Whether any cell of `record` contains `text`, ignoring case.
pub fn record_matches(record: &Record, text: &str) -> bool {
    Filter {
        needle: text.to_lowercase(),
        column: None,
    }
    .matches(record)
}

// =============================================================================
// DerivedView
// =============================================================================

/// One row of the derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRow {
    /// Position of the record in the store.
    pub index: usize,
    pub id: RecordId,
}

/// Filtered, sorted, read-only ordering over a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedView {
    rows: Vec<ViewRow>,
}

impl DerivedView {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, derived: usize) -> Option<ViewRow> {
        self.rows.get(derived).copied()
    }

    /// Derived position of the record with `id`, if it passes the filter.
    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = ViewRow> + '_ {
        self.rows.iter().copied()
    }

    /// Store indices in view order.
    pub fn indices(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.index).collect()
    }

    /// Records in view order, paired with their store index.
    pub fn records<'a>(
        &'a self,
        store: &'a RecordStore,
    ) -> impl Iterator<Item = (usize, &'a Record)> + 'a {
        self.rows
            .iter()
            .filter_map(move |row| store.get(row.index).map(|record| (row.index, record)))
    }
}

// =============================================================================
// Comparison
// =============================================================================

/// Precomputed sort key for one cell.
#[derive(Debug)]
enum CellKey<'a> {
    Number(f64),
    Text { folded: String, raw: &'a str },
}

impl<'a> CellKey<'a> {
    fn new(kind: ColumnKind, raw: &'a str) -> Self {
        match (kind, parse_number(raw)) {
            (ColumnKind::Numeric, Some(n)) => CellKey::Number(n),
            _ => CellKey::Text {
                folded: raw.to_lowercase(),
                raw,
            },
        }
    }

    /// Numbers first, then text. Text compares case-folded, raw on ties.
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellKey::Number(a), CellKey::Number(b)) => a.total_cmp(b),
            (CellKey::Number(_), CellKey::Text { .. }) => Ordering::Less,
            (CellKey::Text { .. }, CellKey::Number(_)) => Ordering::Greater,
            (
                CellKey::Text { folded: fa, raw: ra },
                CellKey::Text { folded: fb, raw: rb },
            ) => fa.cmp(fb).then_with(|| ra.cmp(rb)),
        }
    }
}

/// Compare two cell values as a column of `kind` would.
pub fn compare_cells(kind: ColumnKind, a: &str, b: &str) -> Ordering {
    CellKey::new(kind, a).compare(&CellKey::new(kind, b))
}

// =============================================================================
// SortFilterEngine
// =============================================================================

/// Holds sort and filter state and derives views from a store.
#[derive(Debug, Clone, Default)]
pub struct SortFilterEngine {
    sort: Option<SortKey>,
    filter: Option<Filter>,
}

impl SortFilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active sort key, if any.
    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort
    }

    /// The active filter text (lowercased), if any.
    pub fn filter_text(&self) -> Option<&str> {
        self.filter.as_ref().map(|f| f.needle.as_str())
    }

    /// Sort ascending by `column`. Repeated calls give the same order.
    pub fn sort(&mut self, columns: &Columns, column: &str) -> Result<SortKey> {
        self.sort_by(columns, column, SortDirection::Ascending)
    }

    /// Sort by `column` in `direction`.
    pub fn sort_by(
        &mut self,
        columns: &Columns,
        column: &str,
        direction: SortDirection,
    ) -> Result<SortKey> {
        let key = SortKey {
            column: resolve(columns, column)?.ordinal,
            direction,
        };
        debug!("Sort by '{}' {:?}", column, direction);
        self.sort = Some(key);
        Ok(key)
    }

    /// Sort by `column`, flipping the direction if it is already the key.
    pub fn toggle_sort(&mut self, columns: &Columns, column: &str) -> Result<SortKey> {
        let ordinal = resolve(columns, column)?.ordinal;
        let direction = match self.sort {
            Some(current) if current.column == ordinal => current.direction.reversed(),
            _ => SortDirection::Ascending,
        };
        self.sort_by(columns, column, direction)
    }

    /// Return to insertion order.
    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// Keep records with a cell containing `text`, ignoring case.
    /// Empty text clears the filter.
    pub fn filter(&mut self, text: &str) {
        debug!("Filter '{}'", text);
        self.filter = (!text.is_empty()).then(|| Filter {
            needle: text.to_lowercase(),
            column: None,
        });
    }

    /// Like [`filter`](Self::filter) but only matches cells of `column`.
    pub fn filter_column(&mut self, columns: &Columns, column: &str, text: &str) -> Result<()> {
        let ordinal = resolve(columns, column)?.ordinal;
        debug!("Filter '{}' on '{}'", text, column);
        self.filter = (!text.is_empty()).then(|| Filter {
            needle: text.to_lowercase(),
            column: Some(ordinal),
        });
        Ok(())
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    /// Build a fresh view: filter first, then stable sort.
    pub fn derive(&self, store: &RecordStore, columns: &Columns) -> DerivedView {
        let rows: Vec<(ViewRow, &Record)> = store
            .iter()
            .enumerate()
            .filter(|(_, (_, record))| self.filter.as_ref().is_none_or(|f| f.matches(record)))
            .map(|(index, (id, record))| (ViewRow { index, id }, record))
            .collect();

        let Some(key) = self.sort else {
            return DerivedView {
                rows: rows.into_iter().map(|(row, _)| row).collect(),
            };
        };

        let kind = columns
            .get(key.column)
            .map(|c| c.kind)
            .unwrap_or_default();
        let mut keyed: Vec<(CellKey<'_>, ViewRow)> = rows
            .into_iter()
            .map(|(row, record)| (CellKey::new(kind, record.get(key.column).unwrap_or("")), row))
            .collect();
        // `sort_by` is stable: equal keys keep insertion order in both directions.
        keyed.sort_by(|(a, _), (b, _)| match key.direction {
            SortDirection::Ascending => a.compare(b),
            SortDirection::Descending => b.compare(a),
        });

        DerivedView {
            rows: keyed.into_iter().map(|(_, row)| row).collect(),
        }
    }
}

fn resolve<'a>(columns: &'a Columns, name: &str) -> Result<&'a Column> {
    columns
        .ordinal_of(name)
        .and_then(|ordinal| columns.get(ordinal))
        .ok_or_else(|| {
            warn!("Unknown column '{}'", name);
            GridError::UnknownColumn(name.to_string())
        })
}
