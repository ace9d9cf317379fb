//! Connection points and their derived views.

use std::fmt;

use nalgebra::{Isometry3, Point3, Vector3};

use crate::connection::{ConnectionFamily, ConnectionType};
use crate::ids::{ConnectionId, IdGenerator, PartId};

/// One attachment feature of a placed part.
///
/// A point is immutable once created. Moving its part means removing the
/// old points and inserting freshly placed ones; [`translated`](Self::translated)
/// and [`transformed`](Self::transformed) return copies and keep the id.
///
/// For [`ConnectionFamily::Point`] types `p2` only encodes a nominal
/// direction. For vector and rail types `p1 → p2` is the oriented axis.
///
/// # Example
///
/// ```
/// use connect_types::{ConnectionId, ConnectionPoint, ConnectionType, PartId};
/// use nalgebra::Point3;
///
/// let stud = ConnectionPoint::new(
///     ConnectionId::new(1),
///     PartId::new(10),
///     ConnectionType::Stud,
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.0, -4.0, 0.0),
/// );
///
/// assert!((stud.length() - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionPoint {
    id: ConnectionId,
    part: PartId,
    connection_type: ConnectionType,
    p1: Point3<f64>,
    p2: Point3<f64>,
}

impl ConnectionPoint {
    /// Create a connection point with an explicit id.
    #[must_use]
    pub const fn new(
        id: ConnectionId,
        part: PartId,
        connection_type: ConnectionType,
        p1: Point3<f64>,
        p2: Point3<f64>,
    ) -> Self {
        Self {
            id,
            part,
            connection_type,
            p1,
            p2,
        }
    }

    /// Create a connection point, drawing its id from `ids`.
    #[must_use]
    pub fn with_generator(
        ids: &IdGenerator,
        part: PartId,
        connection_type: ConnectionType,
        p1: Point3<f64>,
        p2: Point3<f64>,
    ) -> Self {
        Self::new(ids.next_connection_id(), part, connection_type, p1, p2)
    }

    /// Get the point id.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Get the owning part.
    #[must_use]
    pub const fn part(&self) -> PartId {
        self.part
    }

    /// Get the connection type.
    #[must_use]
    pub const fn connection_type(&self) -> ConnectionType {
        self.connection_type
    }

    /// Get the family of the connection type.
    #[must_use]
    pub const fn family(&self) -> ConnectionFamily {
        self.connection_type.family()
    }

    /// Primary position. Decides which spatial bucket the point lives in.
    #[must_use]
    pub const fn p1(&self) -> &Point3<f64> {
        &self.p1
    }

    /// Secondary position.
    #[must_use]
    pub const fn p2(&self) -> &Point3<f64> {
        &self.p2
    }

    /// Direction vector `p1 → p2` (not normalized).
    #[must_use]
    pub fn direction(&self) -> Vector3<f64> {
        self.p2 - self.p1
    }

    /// Segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Squared segment length.
    #[must_use]
    pub fn length_sq(&self) -> f64 {
        self.direction().norm_squared()
    }

    /// Returns `true` if both positions are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.p1.iter().chain(self.p2.iter()).all(|c| c.is_finite())
    }

    /// Copy of this point shifted by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            p1: self.p1 + offset,
            p2: self.p2 + offset,
            ..*self
        }
    }

    /// Copy of this point with both positions mapped through `transform`.
    #[must_use]
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        Self {
            p1: transform * self.p1,
            p2: transform * self.p2,
            ..*self
        }
    }

    /// Moved view used while docking.
    ///
    /// `origin` is the current origin of the owning part; the returned copy
    /// is where this feature would be if that origin were moved to
    /// `new_origin`.
    #[must_use]
    pub fn moved(&self, origin: &Point3<f64>, new_origin: &Point3<f64>) -> MovedPoint {
        MovedPoint {
            point: self.translated(&(new_origin - origin)),
            delta: origin - self.p1,
        }
    }
}

impl fmt::Display for ConnectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} {} p1=({:.2}, {:.2}, {:.2}) p2=({:.2}, {:.2}, {:.2})]",
            self.id,
            self.connection_type,
            self.part,
            self.p1.x,
            self.p1.y,
            self.p1.z,
            self.p2.x,
            self.p2.y,
            self.p2.z
        )
    }
}

/// A candidate point moved together with its part.
///
/// `delta` leads from the moved `p1` back to the part origin, so docking the
/// feature onto an anchor `a` puts the part origin at `a + delta`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovedPoint {
    /// The translated copy.
    pub point: ConnectionPoint,
    /// Vector from `point.p1()` to the part origin.
    pub delta: Vector3<f64>,
}

impl MovedPoint {
    /// Part origin that puts this feature's `p1` on `anchor`.
    #[must_use]
    pub fn origin_for(&self, anchor: &Point3<f64>) -> Point3<f64> {
        anchor + self.delta
    }

    /// Same feature moved so that its `p1` sits on `anchor`.
    #[must_use]
    pub fn anchored_at(&self, anchor: &Point3<f64>) -> Self {
        Self {
            point: self.point.translated(&(anchor - self.point.p1())),
            delta: self.delta,
        }
    }
}

/// Part-local definition of an attachment feature.
///
/// Part libraries describe features in the part's own frame. Placing the
/// part turns each spec into a world-space [`ConnectionPoint`].
///
/// # Example
///
/// ```
/// use connect_types::{AttachmentSpec, ConnectionType, IdGenerator, PartId};
/// use nalgebra::{Isometry3, Point3, Vector3};
///
/// let ids = IdGenerator::new();
/// let spec = AttachmentSpec::new(
///     ConnectionType::Stud,
///     Point3::new(10.0, 0.0, 10.0),
///     Point3::new(10.0, -4.0, 10.0),
/// );
///
/// let placement = Isometry3::translation(100.0, 0.0, 0.0);
/// let placed = spec.place(PartId::new(1), &placement, &ids);
/// assert!((placed.p1().x - 110.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttachmentSpec {
    /// Connection type of the feature.
    pub connection_type: ConnectionType,
    /// Primary position in part coordinates.
    pub p1: Point3<f64>,
    /// Secondary position in part coordinates.
    pub p2: Point3<f64>,
}

impl AttachmentSpec {
    /// Create a new attachment spec.
    #[must_use]
    pub const fn new(connection_type: ConnectionType, p1: Point3<f64>, p2: Point3<f64>) -> Self {
        Self {
            connection_type,
            p1,
            p2,
        }
    }

    /// World-space point for a part placed at `placement`, with a fresh id.
    #[must_use]
    pub fn place(
        &self,
        part: PartId,
        placement: &Isometry3<f64>,
        ids: &IdGenerator,
    ) -> ConnectionPoint {
        ConnectionPoint::with_generator(
            ids,
            part,
            self.connection_type,
            placement * self.p1,
            placement * self.p2,
        )
    }
}

/// Place every spec of a part, in order.
#[must_use]
pub fn place_all(
    specs: &[AttachmentSpec],
    part: PartId,
    placement: &Isometry3<f64>,
    ids: &IdGenerator,
) -> Vec<ConnectionPoint> {
    specs
        .iter()
        .map(|spec| spec.place(part, placement, ids))
        .collect()
}
