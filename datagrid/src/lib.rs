//! Headless engine for a virtualized data grid.
//!
//! The grid keeps an ordered record set, derives a filtered and sorted view
//! over it, and materializes only the rows near the visible window on a
//! host-supplied [`RenderSurface`]. Cell edits go through a single-session
//! state machine and every mutation is reported on an event bus.
//!
//! # Example
//!
//! ```ignore
//! let mut grid = Grid::with_records(
//!     ["Name", "Age"],
//!     vec![["Ada", "36"], ["Grace", "85"]],
//!     surface,
//!     GridConfig::new("people").overscan(2),
//! )?;
//!
//! grid.on(EventKind::Change, |event, _store| println!("{:?}", event));
//! grid.sort("Age")?;
//! grid.filter("ada");
//! ```

pub mod config;
pub mod edit;
pub mod error;
pub mod events;
pub mod grid;
pub mod record;
pub mod store;
pub mod surface;
pub mod view;
pub mod viewport;

pub use config::GridConfig;
pub use edit::{CellEditController, CommitOutcome, EditSession, EditState, EditStatus, EditTarget};
pub use error::{GridError, Result};
pub use events::{ChangeEvent, EventBus, EventKind, GridEvent, SubscriptionId};
pub use grid::Grid;
pub use record::{Column, ColumnKind, Columns, Record, RecordId};
pub use store::RecordStore;
pub use surface::{RenderSurface, SurfaceSignal, ViewportBounds};
pub use view::{DerivedView, SortDirection, SortFilterEngine, SortKey, ViewRow};
pub use viewport::{
    MaterializedRows, Reconcile, RowRange, ScrollRequest, ScrollThrottle, ViewportState,
    materialize_range,
};
