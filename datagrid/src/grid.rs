//! The grid controller.
//!
//! [`Grid`] routes host calls to the store, recomputes the derived view,
//! reconciles the materialized rows, then notifies subscribers. Every
//! operation follows that order, so a handler always sees consistent state.

use std::time::Instant;

use log::{debug, trace};

use crate::config::GridConfig;
use crate::edit::{CellEditController, EditSession, EditState, EditTarget};
use crate::error::{GridError, Result};
use crate::events::{ChangeEvent, EventBus, EventKind, GridEvent, SubscriptionId};
use crate::record::{Columns, Record, RecordId};
use crate::store::RecordStore;
use crate::surface::{RenderSurface, SurfaceSignal};
use crate::view::{DerivedView, SortDirection, SortFilterEngine, SortKey};
use crate::viewport::{
    MaterializedRows, Reconcile, RowRange, ScrollRequest, ScrollThrottle, ViewportState,
};

/// A virtualized, sortable, filterable, editable grid over in-memory records.
pub struct Grid<S: RenderSurface> {
    config: GridConfig,
    columns: Columns,
    store: RecordStore,
    engine: SortFilterEngine,
    view: DerivedView,
    viewport: ViewportState,
    rows: MaterializedRows<S::Handle>,
    throttle: ScrollThrottle,
    editor: CellEditController,
    events: EventBus<RecordStore>,
    surface: S,
}

impl<S: RenderSurface> Grid<S> {
    /// Create an empty grid with the given column names.
    pub fn new<I, N>(columns: I, surface: S, config: GridConfig) -> Result<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let mut grid = Self::assemble(columns, surface, config)?;
        grid.rebuild();
        debug!(
            "[{}] Created grid with {} columns",
            grid.config.name,
            grid.columns.len()
        );
        Ok(grid)
    }

    /// Create a grid pre-loaded with `records`. No events are emitted.
    ///
    /// The surface's scroll offset is kept if the loaded rows can fill it.
    pub fn with_records<I, N, R>(columns: I, records: R, surface: S, config: GridConfig) -> Result<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
        R: IntoIterator,
        R::Item: Into<Record>,
    {
        let mut grid = Self::assemble(columns, surface, config)?;
        for record in records {
            grid.store.push(record.into())?;
        }
        grid.columns.infer_kinds(grid.store.get(0));
        grid.rebuild();
        debug!(
            "[{}] Loaded {} records",
            grid.config.name,
            grid.store.len()
        );
        Ok(grid)
    }

    /// Wire up the components without deriving or materializing anything.
    fn assemble<I, N>(columns: I, surface: S, config: GridConfig) -> Result<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        config.validate()?;
        let columns = Columns::new(columns);
        let mut viewport = ViewportState::new(config.row_extent, config.overscan);
        viewport.set_bounds(surface.viewport_bounds());

        Ok(Self {
            store: RecordStore::with_width(columns.len()),
            columns,
            engine: SortFilterEngine::new(),
            view: DerivedView::default(),
            viewport,
            rows: MaterializedRows::new(),
            throttle: ScrollThrottle::new(config.scroll_throttle),
            editor: CellEditController::new(),
            events: EventBus::new(),
            surface,
            config,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// The current derived view.
    pub fn view(&self) -> &DerivedView {
        &self.view
    }

    /// Records in derived-view order.
    pub fn view_records(&self) -> Vec<Record> {
        self.view
            .records(&self.store)
            .map(|(_, record)| record.clone())
            .collect()
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Derived rows that should currently be materialized.
    pub fn materialized_range(&self) -> Option<RowRange> {
        self.viewport.range(self.view.len())
    }

    pub fn materialized(&self) -> &MaterializedRows<S::Handle> {
        &self.rows
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.engine.sort_key()
    }

    pub fn edit_state(&self) -> EditState {
        self.editor.state()
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.editor.session()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Dispose every row and hand back the surface.
    pub fn into_surface(mut self) -> S {
        self.rows.clear(&mut self.surface);
        self.surface
    }

    // -------------------------------------------------------------------------
    // Records
    // -------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Append a record. Emits `add` then `change`.
    pub fn add(&mut self, record: impl Into<Record>) -> Result<usize> {
        let (index, id) = self.store.push(record.into())?;
        self.columns.infer_kinds(self.store.get(0));
        self.rebuild();

        let data = self.store.get(index).cloned().unwrap_or_default();
        let row = self.view.position_of(id);
        self.emit(GridEvent::Add { index, data });
        self.emit(GridEvent::Change(ChangeEvent::structural(row)));
        Ok(index)
    }

    /// Remove the record at store position `index`. Emits `remove` then
    /// `change`. An edit open on the record is cancelled.
    pub fn remove(&mut self, index: usize) -> Result<Record> {
        let row = self
            .store
            .id_at(index)
            .and_then(|id| self.view.position_of(id));
        let (id, record) = self.store.take(index)?;

        if self.editing_record() == Some(id) {
            self.editor.cancel();
        }
        self.columns.infer_kinds(self.store.get(0));
        self.rebuild();

        self.emit(GridEvent::Remove {
            index,
            data: record.clone(),
        });
        self.emit(GridEvent::Change(ChangeEvent::structural(row)));
        Ok(record)
    }

    /// The record at store position `index`.
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.store.get(index)
    }

    /// Independent copy of all records in store order.
    pub fn items(&self) -> Vec<Record> {
        self.store.items()
    }

    // -------------------------------------------------------------------------
    // Sort / filter
    // -------------------------------------------------------------------------

    /// Sort ascending by `column`. Idempotent.
    pub fn sort(&mut self, column: &str) -> Result<()> {
        self.engine.sort(&self.columns, column)?;
        self.rebuild();
        Ok(())
    }

    pub fn sort_by(&mut self, column: &str, direction: SortDirection) -> Result<()> {
        self.engine.sort_by(&self.columns, column, direction)?;
        self.rebuild();
        Ok(())
    }

    /// Sort by `column`, reversing the direction when it is already the sort
    /// column. Returns the direction now in effect.
    pub fn toggle_sort(&mut self, column: &str) -> Result<SortDirection> {
        let key = self.engine.toggle_sort(&self.columns, column)?;
        self.rebuild();
        Ok(key.direction)
    }

    pub fn clear_sort(&mut self) {
        self.engine.clear_sort();
        self.rebuild();
    }

    /// Narrow the view to records with a cell containing `text`, ignoring
    /// case. Empty text shows every record.
    pub fn filter(&mut self, text: &str) {
        self.engine.filter(text);
        self.rebuild();
    }

    pub fn filter_column(&mut self, column: &str, text: &str) -> Result<()> {
        self.engine.filter_column(&self.columns, column, text)?;
        self.rebuild();
        Ok(())
    }

    pub fn clear_filter(&mut self) {
        self.engine.clear_filter();
        self.rebuild();
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&GridEvent, &RecordStore) + 'static,
    {
        self.events.on(kind, handler)
    }

    /// Subscribe by kind name (`"add"`, `"remove"`, `"change"`).
    pub fn on_named<F>(&mut self, kind: &str, handler: F) -> Result<SubscriptionId>
    where
        F: FnMut(&GridEvent, &RecordStore) + 'static,
    {
        self.events.on_named(kind, handler)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.events.off(id)
    }

    fn emit(&mut self, event: GridEvent) {
        self.events.emit(&event, &self.store);
    }

    // -------------------------------------------------------------------------
    // Viewport
    // -------------------------------------------------------------------------

    /// Handle a scroll signal from the surface, subject to throttling.
    /// Returns true if the rows were recomputed.
    pub fn on_scroll(&mut self) -> bool {
        self.on_scroll_at(Instant::now())
    }

    /// [`on_scroll`](Self::on_scroll) with an explicit timestamp.
    pub fn on_scroll_at(&mut self, now: Instant) -> bool {
        if !self.throttle.admit(now) {
            trace!("[{}] Scroll throttled", self.config.name);
            return false;
        }
        self.sync_bounds();
        true
    }

    /// Run a scroll recomputation suppressed by throttling, if any.
    pub fn flush_scroll(&mut self) -> bool {
        if !self.throttle.take_pending() {
            return false;
        }
        self.sync_bounds();
        true
    }

    /// Handle a resize signal from the surface.
    pub fn on_resize(&mut self) {
        self.sync_bounds();
    }

    /// Scroll programmatically and tell the surface.
    ///
    /// The request applies to the surface's current bounds, including any
    /// scroll still held back by throttling.
    pub fn scroll(&mut self, request: ScrollRequest) -> bool {
        let bounds = self.surface.viewport_bounds();
        let stale = self.throttle.take_pending() || bounds != self.viewport.bounds();
        self.viewport.set_bounds(bounds);

        let moved = self.viewport.apply(request, self.view.len());
        if moved {
            self.surface.scroll_to(self.viewport.scroll_offset);
        }
        if moved || stale {
            self.refresh_viewport();
        }
        moved
    }

    fn sync_bounds(&mut self) {
        self.viewport.set_bounds(self.surface.viewport_bounds());
        self.refresh_viewport();
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    /// Open an edit session on derived row `row`, column `col`. The row must
    /// be materialized. Any open session is cancelled without writing and
    /// returned.
    pub fn double_activate(&mut self, row: usize, col: &str) -> Result<Option<EditSession>> {
        let column = self
            .columns
            .ordinal_of(col)
            .ok_or_else(|| GridError::UnknownColumn(col.to_string()))?;
        let entry = self.view.get(row).ok_or(GridError::IndexOutOfRange {
            index: row,
            len: self.view.len(),
        })?;
        if !self.rows.is_materialized(row) {
            return Err(GridError::NotMaterialized { row });
        }
        let original = self
            .store
            .get(entry.index)
            .and_then(|record| record.get(column))
            .map(str::to_string)
            .ok_or(GridError::IndexOutOfRange {
                index: entry.index,
                len: self.store.len(),
            })?;

        let target = EditTarget {
            row,
            record: entry.id,
            column,
            column_name: col.to_string(),
        };
        Ok(self.editor.begin(target, original))
    }

    /// Update the open editor's draft text.
    pub fn set_draft(&mut self, text: impl Into<String>) -> bool {
        self.editor.set_draft(text)
    }

    /// Commit the open session with its final `draft`.
    ///
    /// Writes to the record's store position and emits `change` when the
    /// draft differs from the original. Returns the emitted change.
    pub fn blur(&mut self, draft: impl Into<String>) -> Result<Option<ChangeEvent>> {
        if !self.editor.begin_commit(draft) {
            return Ok(None);
        }

        let Some(record) = self.editing_record() else {
            return Ok(None);
        };
        let Some(index) = self.store.index_of(record) else {
            let row = self.editor.cancel().map(|s| s.target.row).unwrap_or(0);
            return Err(GridError::IndexOutOfRange {
                index: row,
                len: self.view.len(),
            });
        };
        let Some(outcome) = self.editor.finish_commit() else {
            return Ok(None);
        };

        self.store
            .set_cell(index, outcome.target.column, outcome.new_value.clone())?;
        debug!(
            "[{}] Committed row {} '{}': '{}' -> '{}'",
            self.config.name,
            outcome.target.row,
            outcome.target.column_name,
            outcome.old_value,
            outcome.new_value
        );
        self.rows.invalidate(record);
        if index == 0 {
            self.columns.infer_kinds(self.store.get(0));
        }
        self.rebuild();

        let change = ChangeEvent::cell(
            outcome.target.row,
            outcome.target.column_name,
            outcome.old_value,
            outcome.new_value,
        );
        self.emit(GridEvent::Change(change.clone()));
        Ok(Some(change))
    }

    /// Discard the open session.
    pub fn cancel_edit(&mut self) -> Option<EditSession> {
        self.editor.cancel()
    }

    fn editing_record(&self) -> Option<RecordId> {
        self.editor.session().map(|s| s.target.record)
    }

    // -------------------------------------------------------------------------
    // Signals
    // -------------------------------------------------------------------------

    /// Route a surface signal to the matching operation.
    pub fn dispatch(&mut self, signal: SurfaceSignal) -> Result<()> {
        match signal {
            SurfaceSignal::Scroll => {
                self.on_scroll();
            }
            SurfaceSignal::Resize => self.on_resize(),
            SurfaceSignal::DoubleActivate { row, col } => {
                self.double_activate(row, &col)?;
            }
            SurfaceSignal::DraftInput(text) => {
                self.set_draft(text);
            }
            SurfaceSignal::Blur { draft } => {
                self.blur(draft)?;
            }
            SurfaceSignal::Cancel => {
                self.cancel_edit();
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Recomputation
    // -------------------------------------------------------------------------

    /// Recompute the derived view, follow the open edit, refresh rows.
    fn rebuild(&mut self) {
        self.view = self.engine.derive(&self.store, &self.columns);
        self.follow_edit();
        self.refresh_viewport();
    }

    /// Re-target the open edit to its record's new row, or cancel it when
    /// the record left the view.
    fn follow_edit(&mut self) {
        let Some(session) = self.editor.session() else {
            return;
        };
        match self.view.position_of(session.target.record) {
            Some(row) if row == session.target.row => {}
            Some(row) => {
                debug!(
                    "[{}] Edit moved from row {} to {}",
                    self.config.name, session.target.row, row
                );
                self.editor.retarget(row);
            }
            None => {
                self.editor.cancel();
            }
        }
    }

    fn refresh_viewport(&mut self) -> Reconcile {
        if self.viewport.clamp(self.view.len()) {
            self.surface.scroll_to(self.viewport.scroll_offset);
        }
        let range = self.viewport.range(self.view.len());
        self.rows
            .reconcile(range, &self.view, &self.store, &mut self.surface)
    }
}
