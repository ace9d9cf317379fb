//! Error types for spatial index operations.

use thiserror::Error;

use crate::grid::BucketHandle;

/// Result type for spatial index operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur during spatial index operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum GridError {
    /// The AABB padding must not be negative.
    #[error("tolerance can't be negative, got {0}")]
    NegativeTolerance(f64),

    /// The cell size must be finite and positive.
    #[error("cell size must be finite and positive, got {0}")]
    InvalidCellSize(f64),

    /// A supernode must span at least one cell per axis.
    #[error("super cell factor must be at least 1, got {0}")]
    InvalidSuperCellFactor(u32),

    /// Growing the index failed.
    #[error("allocation failed while growing {what}")]
    AllocationFailed {
        /// The structure that could not grow.
        what: &'static str,
    },

    /// A bucket handle does not refer to a live bucket.
    #[error("bucket handle {0:?} is not valid for this index")]
    InvalidBucket(BucketHandle),
}
