#![allow(dead_code)]

use std::collections::BTreeMap;

use datagrid::{Grid, GridConfig, Record, RenderSurface, ViewportBounds};

pub const COLUMNS: [&str; 3] = ["Name", "Age", "City"];

/// Six people, deliberately out of order by name and age.
pub fn people() -> Vec<Record> {
    vec![
        Record::from(["Dave", "34", "Berlin"]),
        Record::from(["alice", "27", "Paris"]),
        Record::from(["Carol", "58", "London"]),
        Record::from(["bob", "41", "Berlin"]),
        Record::from(["Eve", "27", "Madrid"]),
        Record::from(["frank", "9", "Oslo"]),
    ]
}

/// `count` synthetic records: name, numeric id, city.
pub fn numbered(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| Record::from(vec![format!("row-{i}"), i.to_string(), "X".to_string()]))
        .collect()
}

/// Handle given out by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowHandle {
    pub id: u64,
    pub derived_index: usize,
    pub text: String,
}

/// Surface that records every materialize/dispose call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub bounds: ViewportBounds,
    /// Live handles by handle id, valued by derived index.
    pub live: BTreeMap<u64, usize>,
    /// Derived index of every materialize call, in order.
    pub materialized: Vec<usize>,
    /// Derived index of every dispose call, in order.
    pub disposed: Vec<usize>,
    next_id: u64,
}

impl RecordingSurface {
    pub fn new(scroll_offset: u32, extent: u32) -> Self {
        Self {
            bounds: ViewportBounds::new(scroll_offset, extent),
            ..Default::default()
        }
    }

    /// Live derived indices, ascending.
    pub fn live_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self.live.values().copied().collect();
        rows.sort_unstable();
        rows
    }

    pub fn reset_log(&mut self) {
        self.materialized.clear();
        self.disposed.clear();
    }
}

impl RenderSurface for RecordingSurface {
    type Handle = RowHandle;

    fn materialize(&mut self, record: &Record, derived_index: usize) -> RowHandle {
        self.next_id += 1;
        self.live.insert(self.next_id, derived_index);
        self.materialized.push(derived_index);
        RowHandle {
            id: self.next_id,
            derived_index,
            text: record.cells().join(" | "),
        }
    }

    fn dispose(&mut self, handle: RowHandle) {
        let removed = self.live.remove(&handle.id);
        assert!(removed.is_some(), "disposed a handle twice: {:?}", handle);
        self.disposed.push(handle.derived_index);
    }

    fn viewport_bounds(&self) -> ViewportBounds {
        self.bounds
    }

    fn scroll_to(&mut self, offset: u32) {
        self.bounds.scroll_offset = offset;
    }
}

/// Grid over [`people`] with a three-row window and one row of overscan.
pub fn people_grid() -> Grid<RecordingSurface> {
    Grid::with_records(
        COLUMNS,
        people(),
        RecordingSurface::new(0, 3),
        GridConfig::new("people").overscan(1),
    )
    .unwrap()
}

/// Names of the records in derived-view order.
pub fn view_names(grid: &Grid<RecordingSurface>) -> Vec<String> {
    grid.view_records()
        .iter()
        .map(|r| r[0].to_string())
        .collect()
}
