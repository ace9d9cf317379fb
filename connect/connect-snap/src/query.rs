//! Part visibility collaborator.

use std::sync::Arc;

use connect_types::PartId;
use hashbrown::HashSet;

/// Answers questions about placed parts that the engine does not own.
///
/// Points of hidden parts are never offered as snap targets.
pub trait PartQuery {
    /// Returns `true` if the part is hidden.
    fn is_hidden(&self, part: PartId) -> bool;
}

impl<T: PartQuery + ?Sized> PartQuery for &T {
    fn is_hidden(&self, part: PartId) -> bool {
        (**self).is_hidden(part)
    }
}

impl<T: PartQuery + ?Sized> PartQuery for Box<T> {
    fn is_hidden(&self, part: PartId) -> bool {
        (**self).is_hidden(part)
    }
}

impl<T: PartQuery + ?Sized> PartQuery for Arc<T> {
    fn is_hidden(&self, part: PartId) -> bool {
        (**self).is_hidden(part)
    }
}

/// Every part is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllVisible;

impl PartQuery for AllVisible {
    fn is_hidden(&self, _part: PartId) -> bool {
        false
    }
}

/// An explicit set of hidden parts.
///
/// # Example
///
/// ```
/// use connect_snap::{HiddenParts, PartQuery};
/// use connect_types::PartId;
///
/// let mut hidden = HiddenParts::new();
/// hidden.hide(PartId::new(3));
/// assert!(hidden.is_hidden(PartId::new(3)));
/// assert!(!hidden.is_hidden(PartId::new(4)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenParts {
    hidden: HashSet<PartId>,
}

impl HiddenParts {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide a part. Returns `false` if it was already hidden.
    pub fn hide(&mut self, part: PartId) -> bool {
        self.hidden.insert(part)
    }

    /// Show a part again. Returns `false` if it was not hidden.
    pub fn show(&mut self, part: PartId) -> bool {
        self.hidden.remove(&part)
    }

    /// Number of hidden parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hidden.len()
    }

    /// Returns `true` if no part is hidden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty()
    }
}

impl PartQuery for HiddenParts {
    fn is_hidden(&self, part: PartId) -> bool {
        self.hidden.contains(&part)
    }
}

impl FromIterator<PartId> for HiddenParts {
    fn from_iter<I: IntoIterator<Item = PartId>>(iter: I) -> Self {
        Self {
            hidden: iter.into_iter().collect(),
        }
    }
}
