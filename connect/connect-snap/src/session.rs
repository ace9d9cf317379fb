//! Caller-side cache of the last docking outcome.

use connect_types::ConnectionPoint;
use nalgebra::{Point3, UnitQuaternion};

use crate::outcome::{LockState, SnapOutcome};

/// Remembers what the last [`match_connection`](crate::SnapEngine::match_connection)
/// call decided, for the code that draws the dragged part and commits it on
/// release.
///
/// # Example
///
/// ```
/// use connect_snap::{SnapOutcome, SnapSession};
/// use nalgebra::Point3;
///
/// let mut session = SnapSession::new();
/// assert!(session.last_position().is_none());
///
/// session.update(SnapOutcome::unlocked(Point3::new(5.0, 0.0, 0.0), None));
/// assert_eq!(session.last_position(), Some(Point3::new(5.0, 0.0, 0.0)));
/// assert!(!session.is_locked());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapSession {
    state: LockState,
    target: Option<ConnectionPoint>,
    last_position: Option<Point3<f64>>,
    orientation: Option<UnitQuaternion<f64>>,
}

impl SnapSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh outcome, replacing the previous one.
    pub fn update(&mut self, outcome: SnapOutcome) -> LockState {
        self.state = outcome.state;
        self.target = outcome.target;
        self.last_position = Some(outcome.position);
        self.orientation = outcome.orientation;
        self.state
    }

    /// Lock state of the last outcome.
    #[must_use]
    pub const fn state(&self) -> LockState {
        self.state
    }

    /// Returns `true` if the last outcome docked onto a target.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    /// Target of the last outcome.
    #[must_use]
    pub const fn target(&self) -> Option<&ConnectionPoint> {
        self.target.as_ref()
    }

    /// Part origin position of the last outcome.
    #[must_use]
    pub const fn last_position(&self) -> Option<Point3<f64>> {
        self.last_position
    }

    /// Orientation change requested by the last outcome.
    #[must_use]
    pub const fn orientation(&self) -> Option<UnitQuaternion<f64>> {
        self.orientation
    }

    /// Forget the target, e.g. after the part it belonged to was deleted.
    ///
    /// The last position is kept.
    pub fn reset_target(&mut self) {
        self.target = None;
        self.orientation = None;
        self.state = LockState::Unlocked;
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_types::{ConnectionId, ConnectionType, PartId};
    use nalgebra::Vector3;

    fn locked() -> SnapOutcome {
        let target = ConnectionPoint::new(
            ConnectionId::new(1),
            PartId::new(1),
            ConnectionType::Ball,
            Point3::origin(),
            Point3::new(0.0, 1.0, 0.0),
        );
        SnapOutcome::locked(
            target,
            Point3::new(0.0, -10.0, 0.0),
            Some(UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.5)),
        )
    }

    #[test]
    fn test_update_tracks_outcome() {
        let mut session = SnapSession::new();
        assert_eq!(session.update(locked()), LockState::LockedNeedsAlign);
        assert!(session.is_locked());
        assert_eq!(session.target().map(|t| t.id().raw()), Some(1));
        assert!(session.orientation().is_some());

        session.update(SnapOutcome::unlocked(Point3::new(1.0, 1.0, 1.0), None));
        assert!(session.target().is_none());
        assert_eq!(session.state(), LockState::Unlocked);
    }

    #[test]
    fn test_reset_target_keeps_position() {
        let mut session = SnapSession::new();
        session.update(locked());
        session.reset_target();
        assert!(!session.is_locked());
        assert!(session.target().is_none());
        assert_eq!(session.last_position(), Some(Point3::new(0.0, -10.0, 0.0)));

        session.clear();
        assert!(session.last_position().is_none());
    }
}
