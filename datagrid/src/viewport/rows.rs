//! Materialized row bookkeeping.

use std::collections::{BTreeMap, HashSet};

use log::trace;

use crate::record::RecordId;
use crate::store::RecordStore;
use crate::surface::RenderSurface;
use crate::view::DerivedView;

use super::RowRange;

/// A row that currently exists on the surface.
#[derive(Debug)]
struct Slot<H> {
    /// Record the handle was built from.
    id: RecordId,
    handle: H,
}

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reconcile {
    /// Rows newly shown, whether built fresh or rebound.
    pub materialized: usize,
    /// Rows that stopped being shown at their index.
    pub disposed: usize,
    /// Rows left untouched.
    pub reused: usize,
    /// Released handles handed back through [`RenderSurface::rebind`].
    pub recycled: usize,
}

/// Tracks which derived rows are materialized and reconciles them against a
/// new range.
///
/// A row is reused when it stays in range and its derived index still maps
/// to the same record. Rows leaving the range, rows whose index now holds a
/// different record, and invalidated records are released into a pool.
/// Missing rows in range take a pooled handle through
/// [`RenderSurface::rebind`] before any fresh one is materialized, and
/// whatever is left in the pool is disposed at the end of the pass.
#[derive(Debug)]
pub struct MaterializedRows<H> {
    slots: BTreeMap<usize, Slot<H>>,
    /// Records whose content changed since they were materialized.
    stale: HashSet<RecordId>,
}

impl<H> Default for MaterializedRows<H> {
    fn default() -> Self {
        Self {
            slots: BTreeMap::new(),
            stale: HashSet::new(),
        }
    }
}

impl<H> MaterializedRows<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of materialized rows.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Materialized derived indices, ascending.
    pub fn indices(&self) -> Vec<usize> {
        self.slots.keys().copied().collect()
    }

    /// Handle for the row at `derived_index`.
    pub fn handle(&self, derived_index: usize) -> Option<&H> {
        self.slots.get(&derived_index).map(|slot| &slot.handle)
    }

    pub fn is_materialized(&self, derived_index: usize) -> bool {
        self.slots.contains_key(&derived_index)
    }

    /// Force the record's row to be rebuilt on the next pass.
    pub fn invalidate(&mut self, id: RecordId) {
        self.stale.insert(id);
    }

    /// Bring the surface in line with `range` over `view`.
    pub fn reconcile<S>(
        &mut self,
        range: Option<RowRange>,
        view: &DerivedView,
        store: &RecordStore,
        surface: &mut S,
    ) -> Reconcile
    where
        S: RenderSurface<Handle = H>,
    {
        let mut stats = Reconcile::default();
        let previous = std::mem::take(&mut self.slots);
        let mut pool = Vec::new();

        for (index, slot) in previous {
            let keep = range.is_some_and(|r| r.contains(index))
                && view.get(index).is_some_and(|row| row.id == slot.id)
                && !self.stale.contains(&slot.id);
            if keep {
                self.slots.insert(index, slot);
                stats.reused += 1;
            } else {
                pool.push(slot.handle);
                stats.disposed += 1;
            }
        }
        self.stale.clear();
        // Hand out the lowest released rows first.
        pool.reverse();

        if let Some(range) = range {
            for index in range.iter() {
                if self.slots.contains_key(&index) {
                    continue;
                }
                let Some(row) = view.get(index) else {
                    break;
                };
                let Some(record) = store.get(row.index) else {
                    continue;
                };
                let handle = match pool.pop() {
                    Some(released) => {
                        stats.recycled += 1;
                        surface.rebind(released, record, index)
                    }
                    None => surface.materialize(record, index),
                };
                self.slots.insert(index, Slot { id: row.id, handle });
                stats.materialized += 1;
            }
        }

        for handle in pool {
            surface.dispose(handle);
        }

        trace!(
            "Reconciled rows {:?}: +{} -{} ={} ({} recycled)",
            range, stats.materialized, stats.disposed, stats.reused, stats.recycled
        );
        stats
    }

    /// Dispose every materialized row.
    pub fn clear<S>(&mut self, surface: &mut S) -> usize
    where
        S: RenderSurface<Handle = H>,
    {
        let count = self.slots.len();
        for (_, slot) in std::mem::take(&mut self.slots) {
            surface.dispose(slot.handle);
        }
        self.stale.clear();
        count
    }
}
