//! Error types for the snap engine.

use connect_grid::GridError;
use connect_types::ConnectionId;
use thiserror::Error;

/// Result type for snap engine operations.
pub type SnapResult<T> = Result<T, SnapError>;

/// Errors that can occur while building or feeding the snap engine.
///
/// Failing to find a match is not an error; it is reported as an unlocked
/// [`SnapOutcome`](crate::SnapOutcome).
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SnapError {
    /// The engine was built without a part visibility collaborator.
    #[error("snap engine requires a part query")]
    MissingPartQuery,

    /// A matching parameter is out of range.
    #[error("invalid snap parameter {name}: {value}")]
    InvalidParams {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A point with this id is already registered.
    #[error("connection point {0} is already registered")]
    DuplicatePoint(ConnectionId),

    /// The spatial index failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}
