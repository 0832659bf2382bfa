//! Grid configuration.

use std::time::Duration;

use crate::error::{GridError, Result};

/// Per-grid configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridConfig {
    /// Name used in log output.
    pub name: String,

    /// Fixed height of every row, in surface units.
    pub row_extent: u32,

    /// Rows materialized beyond each edge of the window.
    pub overscan: usize,

    /// Minimum time between scroll-driven recomputations.
    /// Zero disables throttling.
    pub scroll_throttle: Duration,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            name: "grid".to_string(),
            row_extent: 1,
            overscan: 3,
            scroll_throttle: Duration::ZERO,
        }
    }
}

impl GridConfig {
    /// Create a config with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the row extent.
    pub fn row_extent(mut self, extent: u32) -> Self {
        self.row_extent = extent;
        self
    }

    /// Set the overscan row count.
    pub fn overscan(mut self, rows: usize) -> Self {
        self.overscan = rows;
        self
    }

    /// Throttle scroll recomputation to at most once per `interval`.
    pub fn scroll_throttle(mut self, interval: Duration) -> Self {
        self.scroll_throttle = interval;
        self
    }

    /// Check the config can drive a grid.
    pub fn validate(&self) -> Result<()> {
        if self.row_extent == 0 {
            return Err(GridError::InvalidConfig(format!(
                "'{}': row extent must be greater than zero",
                self.name
            )));
        }
        Ok(())
    }
}
