//! Padded axis-aligned bounding boxes of grid cells.

use nalgebra::{Point3, Vector3};

use crate::coord::GridCoord;

/// An axis-aligned bounding box in world coordinates.
///
/// # Example
///
/// ```
/// use connect_grid::{Aabb, GridCoord};
/// use nalgebra::Point3;
///
/// // Bucket (0, 0, 0) with 160 LDU cells and 10 LDU padding
/// let aabb = Aabb::padded_cell(GridCoord::new(0, 0, 0), 160.0, 10.0);
/// assert_eq!(aabb.min, Point3::new(-10.0, -10.0, -10.0));
/// assert_eq!(aabb.max, Point3::new(170.0, 170.0, 170.0));
/// assert!(aabb.contains(&Point3::new(165.0, 0.0, 0.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3<f64>,
    /// Maximum corner of the bounding box.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Creates a new AABB from two corners.
    ///
    /// The corners are automatically reordered if necessary.
    #[must_use]
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Box of the cell `coord` with edge `cell_size`, grown by `padding` on
    /// every side.
    #[must_use]
    pub fn padded_cell(coord: GridCoord, cell_size: f64, padding: f64) -> Self {
        let pad = Vector3::repeat(padding);
        Self {
            min: coord.min_corner(cell_size) - pad,
            max: coord.max_corner(cell_size) + pad,
        }
    }

    /// Returns the center point of the AABB.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns the full size (dimensions) of the AABB.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Checks if a point is inside the AABB.
    ///
    /// Points on the boundary are considered inside.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Checks if this AABB intersects another AABB.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}
