//! Placed parts as seen by the engine.

use connect_types::{AttachmentSpec, ConnectionPoint, IdGenerator, PartId, place_all};
use nalgebra::{Isometry3, Point3, UnitQuaternion};

/// A part instance: its placement and the world-space points it carries.
///
/// This is what the application hands to the engine for the part being
/// dragged, and what it registers for parts already in the model.
///
/// # Example
///
/// ```
/// use connect_snap::PartConnections;
/// use connect_types::{AttachmentSpec, ConnectionType, IdGenerator, PartId};
/// use nalgebra::{Isometry3, Point3};
///
/// let ids = IdGenerator::new();
/// let specs = [AttachmentSpec::new(
///     ConnectionType::Stud,
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.0, -4.0, 0.0),
/// )];
/// let brick = PartConnections::from_specs(
///     PartId::new(1),
///     Isometry3::translation(0.0, -24.0, 0.0),
///     &specs,
///     &ids,
/// );
/// assert_eq!(brick.points().len(), 1);
/// assert!((brick.origin().y + 24.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PartConnections {
    id: PartId,
    placement: Isometry3<f64>,
    points: Vec<ConnectionPoint>,
}

impl PartConnections {
    /// Wrap points that were already placed.
    #[must_use]
    pub const fn new(id: PartId, placement: Isometry3<f64>, points: Vec<ConnectionPoint>) -> Self {
        Self {
            id,
            placement,
            points,
        }
    }

    /// Place part-local specs at `placement`, drawing fresh ids.
    #[must_use]
    pub fn from_specs(
        id: PartId,
        placement: Isometry3<f64>,
        specs: &[AttachmentSpec],
        ids: &IdGenerator,
    ) -> Self {
        Self::new(id, placement, place_all(specs, id, &placement, ids))
    }

    /// Get the part id.
    #[must_use]
    pub const fn id(&self) -> PartId {
        self.id
    }

    /// Get the placement transform.
    #[must_use]
    pub const fn placement(&self) -> &Isometry3<f64> {
        &self.placement
    }

    /// World position of the part origin.
    #[must_use]
    pub fn origin(&self) -> Point3<f64> {
        Point3::from(self.placement.translation.vector)
    }

    /// Current rotation of the part.
    #[must_use]
    pub const fn rotation(&self) -> &UnitQuaternion<f64> {
        &self.placement.rotation
    }

    /// The part's connection points.
    #[must_use]
    pub fn points(&self) -> &[ConnectionPoint] {
        &self.points
    }
}
