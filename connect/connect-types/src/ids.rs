//! Identifiers and the shared id generator.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier of a connection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Create a new connection ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for ConnectionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Conn({})", self.0)
    }
}

/// Identifier of a placed part instance.
///
/// Parts are owned by the surrounding application; the engine only uses the
/// id to group points and to ask whether a part is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartId(pub u64);

impl PartId {
    /// Create a new part ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for PartId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Part({})", self.0)
    }
}

/// Monotonic id source shared by connection points and index nodes.
///
/// Thread-safe: ids may be drawn from any thread even though the index itself
/// is single-writer. The first id handed out is `1`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use connect_types::IdGenerator;
///
/// let ids = Arc::new(IdGenerator::new());
/// let a = ids.next_connection_id();
/// let b = ids.next_node_id();
/// assert_eq!(a.raw(), 1);
/// assert_eq!(b, 2);
/// ```
#[derive(Debug)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Create a generator whose first id is `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_after(0)
    }

    /// Create a generator whose first id is `last + 1`.
    #[must_use]
    pub const fn starting_after(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    /// Draw the next raw id.
    pub fn next_raw(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Draw the next connection point id.
    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.next_raw())
    }

    /// Draw the next index node id.
    pub fn next_node_id(&self) -> u64 {
        self.next_raw()
    }

    /// The most recently issued id, or the starting value if none was drawn.
    #[must_use]
    pub fn last_issued(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}
