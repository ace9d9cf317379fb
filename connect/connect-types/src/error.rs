//! Error types for the connection model.

use thiserror::Error;

/// Errors that can occur when decoding connection model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TypeError {
    /// The name does not match any known connection type.
    #[error("unknown connection type '{0}'")]
    UnknownType(String),

    /// The dense index is past the end of the connection type table.
    #[error("connection type index {index} out of range (have {count} types)")]
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// Number of known connection types.
        count: usize,
    },
}
