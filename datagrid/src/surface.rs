//! Rendering surface contract.
//!
//! The engine never draws. It tells a host-supplied [`RenderSurface`] which
//! rows to materialize and which to dispose, and the host reports viewport
//! changes and edit gestures back as [`SurfaceSignal`]s.

use crate::record::Record;

/// Visible window of the scrollable surface, in the same unit as the row
/// extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportBounds {
    /// Distance from the top of the content to the top of the window.
    pub scroll_offset: u32,
    /// Height of the window.
    pub extent: u32,
}

impl ViewportBounds {
    pub fn new(scroll_offset: u32, extent: u32) -> Self {
        Self {
            scroll_offset,
            extent,
        }
    }
}

/// Host-side row renderer.
pub trait RenderSurface {
    /// Visual representation of one materialized row.
    type Handle;

    /// Build the representation of `record`, shown at `derived_index`.
    ///
    /// Only called for rows inside the materialized range.
    fn materialize(&mut self, record: &Record, derived_index: usize) -> Self::Handle;

    /// Release a row produced by [`materialize`](Self::materialize).
    fn dispose(&mut self, handle: Self::Handle);

    /// Reuse a handle that left the range to show `record` at
    /// `derived_index`.
    ///
    /// The default disposes and materializes afresh. Surfaces that can
    /// update a row in place should override this.
    fn rebind(&mut self, handle: Self::Handle, record: &Record, derived_index: usize) -> Self::Handle {
        self.dispose(handle);
        self.materialize(record, derived_index)
    }

    /// Current scroll offset and window extent.
    fn viewport_bounds(&self) -> ViewportBounds;

    /// Move the window to `offset`. Called when the engine clamps or
    /// programmatically scrolls. Surfaces that own their scroll position
    /// may ignore it.
    fn scroll_to(&mut self, _offset: u32) {}
}

/// Signals a surface forwards to the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceSignal {
    /// The window scrolled.
    Scroll,
    /// The window was resized.
    Resize,
    /// A materialized cell was double-activated.
    DoubleActivate {
        /// Derived-view row.
        row: usize,
        /// Column name.
        col: String,
    },
    /// The draft text of the open editor changed.
    DraftInput(String),
    /// The open editor lost focus, carrying its final draft text.
    Blur { draft: String },
    /// The open editor was dismissed (for example with escape).
    Cancel,
}
