//! Viewport virtualization.
//!
//! - [`materialize_range`]: which derived rows must exist for a window
//! - [`ViewportState`]: scroll offset, extents, overscan and scroll requests
//! - [`MaterializedRows`]: incremental materialize/dispose against a surface
//! - [`ScrollThrottle`]: rate limit for scroll-driven recomputation

mod rows;
mod throttle;

pub use rows::{MaterializedRows, Reconcile};
pub use throttle::ScrollThrottle;

use crate::surface::ViewportBounds;

// =============================================================================
// RowRange
// =============================================================================

/// Inclusive range of derived-view indices. Empty when `end < start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    /// Number of rows in the range.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> {
        self.start..=self.end
    }
}

/// Compute the inclusive range of rows to materialize.
///
/// The visible rows are those intersecting `[scroll_offset, scroll_offset +
/// viewport_extent)`. `overscan` rows are added on each side, clamped to the
/// view. Returns `None` for an empty view, a zero row extent, or a window
/// scrolled past the last row.
///
/// The result never holds more than
/// `ceil(viewport_extent / row_extent) + 2 * overscan + 1` rows, whatever
/// `len` is.
pub fn materialize_range(
    len: usize,
    row_extent: u32,
    scroll_offset: u32,
    viewport_extent: u32,
    overscan: usize,
) -> Option<RowRange> {
    if len == 0 || row_extent == 0 {
        return None;
    }

    let row_extent = u64::from(row_extent);
    let top = u64::from(scroll_offset);
    let bottom = top + u64::from(viewport_extent);

    let first_visible = to_index(top / row_extent);
    let last_visible = to_index(bottom.div_ceil(row_extent))
        .saturating_sub(1)
        .max(first_visible);

    let start = first_visible.saturating_sub(overscan);
    let end = last_visible.saturating_add(overscan).min(len - 1);

    (start <= end).then_some(RowRange { start, end })
}

fn to_index(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

// =============================================================================
// ScrollRequest
// =============================================================================

/// Programmatic scroll actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    /// Scroll by a number of rows (positive = down).
    Rows(i32),
    /// Scroll to an absolute offset.
    ToOffset(u32),
    /// Scroll the least amount that makes the row at this derived index fully
    /// visible.
    IntoView(usize),
    PageUp,
    PageDown,
    Home,
    End,
}

// =============================================================================
// ViewportState
// =============================================================================

/// Geometry of the scrollable window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    /// Top of the window.
    pub scroll_offset: u32,
    /// Height of the window.
    pub viewport_extent: u32,
    /// Fixed height of every row.
    pub row_extent: u32,
    /// Rows kept beyond each edge of the window.
    pub overscan: usize,
}

impl ViewportState {
    pub fn new(row_extent: u32, overscan: usize) -> Self {
        Self {
            scroll_offset: 0,
            viewport_extent: 0,
            row_extent,
            overscan,
        }
    }

    /// Adopt bounds reported by the surface.
    pub fn set_bounds(&mut self, bounds: ViewportBounds) {
        self.scroll_offset = bounds.scroll_offset;
        self.viewport_extent = bounds.extent;
    }

    pub fn bounds(&self) -> ViewportBounds {
        ViewportBounds::new(self.scroll_offset, self.viewport_extent)
    }

    /// Total content height for `len` rows.
    pub fn content_extent(&self, len: usize) -> u32 {
        u32::try_from(len)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.row_extent)
    }

    /// Largest offset that still shows content.
    pub fn max_offset(&self, len: usize) -> u32 {
        self.content_extent(len)
            .saturating_sub(self.viewport_extent)
    }

    /// Clamp the offset to the content. Returns true if it moved.
    pub fn clamp(&mut self, len: usize) -> bool {
        let clamped = self.scroll_offset.min(self.max_offset(len));
        let moved = clamped != self.scroll_offset;
        self.scroll_offset = clamped;
        moved
    }

    /// Rows to materialize for a view of `len` rows.
    pub fn range(&self, len: usize) -> Option<RowRange> {
        materialize_range(
            len,
            self.row_extent,
            self.scroll_offset,
            self.viewport_extent,
            self.overscan,
        )
    }

    /// Apply a scroll request. Returns true if the offset changed.
    pub fn apply(&mut self, request: ScrollRequest, len: usize) -> bool {
        let old = self.scroll_offset;
        let max = self.max_offset(len);
        let row = self.row_extent;

        self.scroll_offset = match request {
            ScrollRequest::Rows(delta) => {
                let shift = i64::from(delta) * i64::from(row);
                (i64::from(old) + shift).clamp(0, i64::from(max)) as u32
            }
            ScrollRequest::ToOffset(offset) => offset.min(max),
            ScrollRequest::IntoView(index) => {
                let top = u32::try_from(index)
                    .unwrap_or(u32::MAX)
                    .saturating_mul(row);
                let bottom = top.saturating_add(row);
                if top < old {
                    top
                } else if bottom > old.saturating_add(self.viewport_extent) {
                    bottom.saturating_sub(self.viewport_extent).min(max)
                } else {
                    old
                }
            }
            ScrollRequest::PageUp => old.saturating_sub(self.viewport_extent),
            ScrollRequest::PageDown => old.saturating_add(self.viewport_extent).min(max),
            ScrollRequest::Home => 0,
            ScrollRequest::End => max,
        };

        self.scroll_offset != old
    }
}
