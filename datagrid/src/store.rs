//! Ordered record storage.

use log::{debug, warn};

use crate::error::{GridError, Result};
use crate::record::{Record, RecordId};

/// Owns the ordered record collection.
///
/// Insertion order is the canonical order. Records are addressed by position
/// and also carry a [`RecordId`] that survives position shifts.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    entries: Vec<(RecordId, Record)>,
    /// Fixed record width. When `None` the first stored record sets it.
    width: Option<usize>,
}

impl RecordStore {
    /// Create an empty store whose width is set by the first record added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that only accepts records of `width` cells.
    pub fn with_width(width: usize) -> Self {
        Self {
            entries: Vec::new(),
            width: Some(width),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The established record width, if any.
    pub fn width(&self) -> Option<usize> {
        self.width
            .or_else(|| self.entries.first().map(|(_, record)| record.len()))
    }

    /// Append a record, returning its index.
    pub fn add(&mut self, record: Record) -> Result<usize> {
        self.push(record).map(|(index, _)| index)
    }

    /// Append a record, returning its index and assigned id.
    pub(crate) fn push(&mut self, record: Record) -> Result<(usize, RecordId)> {
        let expected = self.width().unwrap_or(record.len());
        if record.len() != expected {
            warn!(
                "Rejected record with {} cells (expected {})",
                record.len(),
                expected
            );
            return Err(GridError::ShapeMismatch {
                expected,
                found: record.len(),
            });
        }

        let id = RecordId::new();
        self.entries.push((id, record));
        let index = self.entries.len() - 1;
        debug!("Added record {} at index {}", id, index);
        Ok((index, id))
    }

    /// Remove the record at `index`. Later records shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<Record> {
        self.take(index).map(|(_, record)| record)
    }

    pub(crate) fn take(&mut self, index: usize) -> Result<(RecordId, Record)> {
        if index >= self.entries.len() {
            warn!(
                "Rejected remove at {} (len {})",
                index,
                self.entries.len()
            );
            return Err(GridError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let (id, record) = self.entries.remove(index);
        debug!("Removed record {} from index {}", id, index);
        Ok((id, record))
    }

    /// The record at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.entries.get(index).map(|(_, record)| record)
    }

    /// Independent copy of all records in store order.
    pub fn items(&self) -> Vec<Record> {
        self.entries.iter().map(|(_, record)| record.clone()).collect()
    }

    /// Id of the record at `index`.
    pub fn id_at(&self, index: usize) -> Option<RecordId> {
        self.entries.get(index).map(|(id, _)| *id)
    }

    /// Current position of the record with `id`.
    pub fn index_of(&self, id: RecordId) -> Option<usize> {
        self.entries.iter().position(|(entry, _)| *entry == id)
    }

    pub fn get_by_id(&self, id: RecordId) -> Option<&Record> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, record)| record)
    }

    /// Overwrite one cell, returning the previous value.
    pub fn set_cell(&mut self, index: usize, column: usize, value: String) -> Result<String> {
        let len = self.entries.len();
        let (_, record) = self
            .entries
            .get_mut(index)
            .ok_or(GridError::IndexOutOfRange { index, len })?;
        let width = record.len();
        record
            .replace(column, value)
            .ok_or_else(|| GridError::UnknownColumn(format!("#{} of {}", column, width)))
    }

    /// Iterate over `(id, record)` pairs in store order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Record)> {
        self.entries.iter().map(|(id, record)| (*id, record))
    }

    /// Remove every record. A fixed width is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
