mod common;

use std::time::{Duration, Instant};

use datagrid::{
    Columns, MaterializedRows, Record, RecordStore, RenderSurface, RowRange, ScrollRequest,
    ScrollThrottle, SortDirection, SortFilterEngine, ViewportBounds, ViewportState,
    materialize_range,
};

use common::{RecordingSurface, numbered};

// ============================================================================
// Range math
// ============================================================================

#[test]
fn test_range_at_top() {
    // Rows 0..=2 visible, one overscan row below, none above.
    assert_eq!(
        materialize_range(100, 10, 0, 30, 1),
        Some(RowRange { start: 0, end: 3 })
    );
}

#[test]
fn test_range_mid_scroll() {
    // Window 45..75 touches rows 4..=7.
    assert_eq!(
        materialize_range(100, 10, 45, 30, 2),
        Some(RowRange { start: 2, end: 9 })
    );
}

#[test]
fn test_range_clamped_to_view() {
    assert_eq!(
        materialize_range(5, 10, 20, 100, 3),
        Some(RowRange { start: 0, end: 4 })
    );
}

#[test]
fn test_range_empty_cases() {
    assert_eq!(materialize_range(0, 10, 0, 100, 3), None);
    assert_eq!(materialize_range(10, 0, 0, 100, 3), None);
    // Scrolled far past the last row.
    assert_eq!(materialize_range(10, 10, 1_000, 30, 2), None);
}

#[test]
fn test_range_zero_extent_window() {
    assert_eq!(
        materialize_range(10, 10, 25, 0, 0),
        Some(RowRange { start: 2, end: 2 })
    );
}

#[test]
fn test_range_bound_independent_of_record_count() {
    let row_extent = 7u32;
    let viewport = 50u32;
    let overscan = 3usize;
    let bound = viewport.div_ceil(row_extent) as usize + 2 * overscan + 1;

    for len in [10usize, 10_000] {
        let content = len as u32 * row_extent;
        let mut widest = 0;
        for offset in (0..content).step_by(3) {
            if let Some(range) = materialize_range(len, row_extent, offset, viewport, overscan) {
                assert!(
                    range.len() <= bound,
                    "len {len} offset {offset}: {} rows > {bound}",
                    range.len()
                );
                assert!(range.end < len);
                widest = widest.max(range.len());
            }
        }
        if len == 10_000 {
            assert!(widest <= bound);
            assert!(widest > 0);
        }
    }
}

#[test]
fn test_row_range_helpers() {
    let range = RowRange { start: 3, end: 5 };
    assert_eq!(range.len(), 3);
    assert!(!range.is_empty());
    assert!(range.contains(3) && range.contains(5));
    assert!(!range.contains(6));
    assert_eq!(range.iter().collect::<Vec<_>>(), vec![3, 4, 5]);
}

#[test]
fn test_row_range_inverted_is_empty() {
    let range = RowRange { start: 5, end: 3 };
    assert!(range.is_empty());
    assert_eq!(range.len(), 0);
    assert!(!range.contains(4));
    assert_eq!(range.iter().count(), 0);
}

// ============================================================================
// ViewportState
// ============================================================================

#[test]
fn test_scroll_requests() {
    let mut vp = ViewportState::new(2, 0);
    vp.viewport_extent = 10;
    let len = 20; // content 40, max offset 30

    assert!(vp.apply(ScrollRequest::Rows(3), len));
    assert_eq!(vp.scroll_offset, 6);
    assert!(vp.apply(ScrollRequest::PageDown, len));
    assert_eq!(vp.scroll_offset, 16);
    assert!(vp.apply(ScrollRequest::End, len));
    assert_eq!(vp.scroll_offset, 30);
    assert!(!vp.apply(ScrollRequest::Rows(5), len));
    assert!(vp.apply(ScrollRequest::PageUp, len));
    assert_eq!(vp.scroll_offset, 20);
    assert!(vp.apply(ScrollRequest::Home, len));
    assert_eq!(vp.scroll_offset, 0);
    assert!(!vp.apply(ScrollRequest::Rows(-1), len));
    assert!(vp.apply(ScrollRequest::ToOffset(99), len));
    assert_eq!(vp.scroll_offset, 30);
}

#[test]
fn test_scroll_into_view() {
    let mut vp = ViewportState::new(2, 0);
    vp.viewport_extent = 10;

    // Row 9 spans 18..20; bottom-align it.
    assert!(vp.apply(ScrollRequest::IntoView(9), 20));
    assert_eq!(vp.scroll_offset, 10);
    // Already visible: no move.
    assert!(!vp.apply(ScrollRequest::IntoView(7), 20));
    // Above the window: top-align.
    assert!(vp.apply(ScrollRequest::IntoView(2), 20));
    assert_eq!(vp.scroll_offset, 4);
}

#[test]
fn test_clamp_after_shrink() {
    let mut vp = ViewportState::new(1, 0);
    vp.viewport_extent = 5;
    vp.scroll_offset = 50;

    assert!(vp.clamp(20));
    assert_eq!(vp.scroll_offset, 15);
    assert!(vp.clamp(3));
    assert_eq!(vp.scroll_offset, 0);
    assert!(!vp.clamp(3));
}

// ============================================================================
// ScrollThrottle
// ============================================================================

#[test]
fn test_throttle_suppresses_then_admits() {
    let start = Instant::now();
    let mut throttle = ScrollThrottle::new(Duration::from_millis(16));

    assert!(throttle.admit(start));
    assert!(!throttle.admit(start + Duration::from_millis(5)));
    assert!(throttle.is_pending());
    assert!(throttle.admit(start + Duration::from_millis(20)));
    assert!(!throttle.is_pending());

    assert!(!throttle.admit(start + Duration::from_millis(21)));
    assert!(throttle.take_pending());
    assert!(!throttle.take_pending());
}

#[test]
fn test_zero_interval_never_throttles() {
    let now = Instant::now();
    let mut throttle = ScrollThrottle::new(Duration::ZERO);
    for _ in 0..5 {
        assert!(throttle.admit(now));
    }
    assert!(!throttle.is_pending());
}

// ============================================================================
// MaterializedRows
// ============================================================================

fn numbered_store(count: usize) -> (RecordStore, Columns) {
    let mut store = RecordStore::with_width(3);
    for record in numbered(count) {
        store.add(record).unwrap();
    }
    let mut columns = Columns::new(["Name", "Id", "Tag"]);
    columns.infer_kinds(store.get(0));
    (store, columns)
}

#[test]
fn test_reconcile_reuses_rows_on_scroll() {
    let (store, columns) = numbered_store(100);
    let view = SortFilterEngine::new().derive(&store, &columns);
    let mut surface = RecordingSurface::new(0, 10);
    let mut rows = MaterializedRows::new();

    let stats = rows.reconcile(materialize_range(100, 1, 0, 10, 2), &view, &store, &mut surface);
    assert_eq!(stats.materialized, 12);
    assert_eq!(rows.indices(), (0..12).collect::<Vec<_>>());

    surface.reset_log();
    let stats = rows.reconcile(materialize_range(100, 1, 3, 10, 2), &view, &store, &mut surface);

    // 1..=14 now: row 0 leaves, 12..=14 arrive, 1..=11 stay put.
    assert_eq!(stats.disposed, 1);
    assert_eq!(stats.materialized, 3);
    assert_eq!(stats.reused, 11);
    assert_eq!(surface.disposed, vec![0]);
    assert_eq!(surface.materialized, vec![12, 13, 14]);
    assert_eq!(surface.live_rows(), (1..15).collect::<Vec<_>>());
}

#[test]
fn test_reconcile_rebuilds_rows_whose_record_changed() {
    let (store, columns) = numbered_store(20);
    let mut engine = SortFilterEngine::new();
    let mut surface = RecordingSurface::new(0, 5);
    let mut rows = MaterializedRows::new();
    let range = materialize_range(20, 1, 0, 5, 0);

    let view = engine.derive(&store, &columns);
    rows.reconcile(range, &view, &store, &mut surface);
    surface.reset_log();

    // Reverse order: every visible index now shows a different record.
    engine
        .sort_by(&columns, "Id", SortDirection::Descending)
        .unwrap();
    let view = engine.derive(&store, &columns);
    let stats = rows.reconcile(range, &view, &store, &mut surface);

    assert_eq!(stats.reused, 0);
    assert_eq!(stats.disposed, 5);
    assert_eq!(stats.materialized, 5);
    assert_eq!(surface.live.len(), 5);
}

#[test]
fn test_reconcile_invalidate_and_clear() {
    let (store, columns) = numbered_store(10);
    let view = SortFilterEngine::new().derive(&store, &columns);
    let mut surface = RecordingSurface::new(0, 4);
    let mut rows = MaterializedRows::new();
    let range = materialize_range(10, 1, 0, 4, 0);

    rows.reconcile(range, &view, &store, &mut surface);
    surface.reset_log();

    rows.invalidate(store.id_at(2).unwrap());
    let stats = rows.reconcile(range, &view, &store, &mut surface);
    assert_eq!(stats.materialized, 1);
    assert_eq!(surface.materialized, vec![2]);

    assert_eq!(rows.clear(&mut surface), 4);
    assert!(surface.live.is_empty());
    assert!(rows.is_empty());
}

/// Surface that updates rows in place when handed a released handle.
#[derive(Debug, Default)]
struct InPlaceSurface {
    next_id: u64,
    created: usize,
    rebound: usize,
    disposed: usize,
}

impl RenderSurface for InPlaceSurface {
    /// (handle id, derived index)
    type Handle = (u64, usize);

    fn materialize(&mut self, _record: &Record, derived_index: usize) -> (u64, usize) {
        self.next_id += 1;
        self.created += 1;
        (self.next_id, derived_index)
    }

    fn dispose(&mut self, _handle: (u64, usize)) {
        self.disposed += 1;
    }

    fn rebind(&mut self, handle: (u64, usize), _record: &Record, derived_index: usize) -> (u64, usize) {
        self.rebound += 1;
        (handle.0, derived_index)
    }

    fn viewport_bounds(&self) -> ViewportBounds {
        ViewportBounds::new(0, 5)
    }
}

fn handle_ids(rows: &MaterializedRows<(u64, usize)>) -> Vec<u64> {
    let mut ids: Vec<u64> = rows
        .indices()
        .into_iter()
        .filter_map(|i| rows.handle(i).map(|h| h.0))
        .collect();
    ids.sort_unstable();
    ids
}

#[test]
fn test_reconcile_recycles_released_handles() {
    let (store, columns) = numbered_store(20);
    let mut engine = SortFilterEngine::new();
    let mut surface = InPlaceSurface::default();
    let mut rows = MaterializedRows::new();

    let view = engine.derive(&store, &columns);
    rows.reconcile(materialize_range(20, 1, 0, 5, 0), &view, &store, &mut surface);
    assert_eq!(surface.created, 5);

    // Re-sorting swaps the record behind every visible row.
    engine
        .sort_by(&columns, "Id", SortDirection::Descending)
        .unwrap();
    let view = engine.derive(&store, &columns);
    let stats = rows.reconcile(materialize_range(20, 1, 0, 5, 0), &view, &store, &mut surface);

    assert_eq!(stats.disposed, 5);
    assert_eq!(stats.materialized, 5);
    assert_eq!(stats.recycled, 5);
    assert_eq!(surface.created, 5);
    assert_eq!(surface.disposed, 0);
    assert_eq!(handle_ids(&rows), vec![1, 2, 3, 4, 5]);

    // Scrolling three rows hands the three rows that left to the ones that arrived.
    let stats = rows.reconcile(materialize_range(20, 1, 3, 5, 0), &view, &store, &mut surface);
    assert_eq!(stats.recycled, 3);
    assert_eq!(stats.reused, 2);
    assert_eq!(surface.created, 5);
    assert_eq!(rows.indices(), vec![3, 4, 5, 6, 7]);
    assert_eq!(rows.handle(7).map(|h| h.1), Some(7));
}

#[test]
fn test_reconcile_disposes_unclaimed_handles() {
    let (store, columns) = numbered_store(20);
    let view = SortFilterEngine::new().derive(&store, &columns);
    let mut surface = InPlaceSurface::default();
    let mut rows = MaterializedRows::new();

    rows.reconcile(materialize_range(20, 1, 0, 5, 0), &view, &store, &mut surface);
    let stats = rows.reconcile(materialize_range(20, 1, 0, 2, 0), &view, &store, &mut surface);

    assert_eq!(stats.disposed, 3);
    assert_eq!(stats.recycled, 0);
    assert_eq!(surface.disposed, 3);
    assert_eq!(rows.len(), 2);
}
