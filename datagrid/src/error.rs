//! Grid error types.

use thiserror::Error;

/// Errors returned by grid operations.
///
/// Every error is local to the call that produced it. A rejected operation
/// leaves the grid in the state it had before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// A position outside the record store or derived view.
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// The requested position.
        index: usize,
        /// The length of the sequence at the time of the call.
        len: usize,
    },

    /// A derived row with no materialized representation on the surface.
    #[error("Row {row} is not materialized")]
    NotMaterialized {
        /// The requested derived-view row.
        row: usize,
    },

    /// A column name that is not part of the grid.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// A record whose width disagrees with the established column count.
    #[error("Record has {found} cells, expected {expected}")]
    ShapeMismatch {
        /// The established width.
        expected: usize,
        /// The width of the rejected record.
        found: usize,
    },

    /// A subscription to a notification kind that does not exist.
    #[error("Unknown event kind '{0}'")]
    UnknownEventKind(String),

    /// A configuration value the engine cannot work with.
    #[error("Invalid grid config: {0}")]
    InvalidConfig(String),
}

/// Result alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
