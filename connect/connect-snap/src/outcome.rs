//! Result of a docking attempt.

use std::fmt;

use connect_types::ConnectionPoint;
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};

/// Lock state of the part being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LockState {
    /// No compatible target near the cursor.
    #[default]
    Unlocked,
    /// Docked onto a target without rotating the part.
    LockedAligned,
    /// Docked onto a target; the part must be rotated.
    LockedNeedsAlign,
}

impl LockState {
    /// Returns `true` for both locked states.
    #[must_use]
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::LockedAligned | Self::LockedNeedsAlign)
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unlocked => "unlocked",
            Self::LockedAligned => "locked",
            Self::LockedNeedsAlign => "locked (needs align)",
        };
        f.write_str(name)
    }
}

/// Where to put the dragged part, recomputed on every cursor move.
///
/// # Example
///
/// ```
/// use connect_snap::{LockState, SnapOutcome};
/// use nalgebra::Point3;
///
/// let free = SnapOutcome::unlocked(Point3::new(1.0, 2.0, 3.0), None);
/// assert_eq!(free.state, LockState::Unlocked);
/// assert!(free.target.is_none());
/// assert!(!free.needs_orientation());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapOutcome {
    /// Lock state.
    pub state: LockState,

    /// The point the part docked onto.
    pub target: Option<ConnectionPoint>,

    /// New position of the part origin: the docking anchor when locked,
    /// the cursor otherwise.
    pub position: Point3<f64>,

    /// New absolute orientation of the part, if it must change.
    pub orientation: Option<UnitQuaternion<f64>>,
}

impl SnapOutcome {
    /// Outcome with no target.
    #[must_use]
    pub const fn unlocked(cursor: Point3<f64>, orientation: Option<UnitQuaternion<f64>>) -> Self {
        Self {
            state: LockState::Unlocked,
            target: None,
            position: cursor,
            orientation,
        }
    }

    /// Outcome docked onto `target`.
    #[must_use]
    pub const fn locked(
        target: ConnectionPoint,
        anchor: Point3<f64>,
        orientation: Option<UnitQuaternion<f64>>,
    ) -> Self {
        let state = if orientation.is_some() {
            LockState::LockedNeedsAlign
        } else {
            LockState::LockedAligned
        };
        Self {
            state,
            target: Some(target),
            position: anchor,
            orientation,
        }
    }

    /// Returns `true` if the part docked onto a target.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    /// Returns `true` if the part orientation must change.
    #[must_use]
    pub const fn needs_orientation(&self) -> bool {
        self.orientation.is_some()
    }

    /// The part's new placement, keeping `current` rotation when no
    /// orientation change is needed.
    #[must_use]
    pub fn placement(&self, current: &UnitQuaternion<f64>) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::from(self.position.coords),
            self.orientation.unwrap_or(*current),
        )
    }
}
