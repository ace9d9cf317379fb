//! Integer grid coordinates.

use std::fmt;

use nalgebra::Point3;

/// A discrete 3D cell coordinate.
///
/// Uses `i32` coordinates so cells extend in every direction from the world
/// origin. The same type addresses buckets and supernodes; only the cell size
/// used to compute it differs.
///
/// # Example
///
/// ```
/// use connect_grid::GridCoord;
/// use nalgebra::Point3;
///
/// let c = GridCoord::from_world(&Point3::new(-1.0, 159.9, 160.0), 160.0);
/// assert_eq!(c, GridCoord::new(-1, 0, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCoord {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Cell containing a world position, `floor(p / cell_size)` per axis.
    ///
    /// Out-of-range values saturate and `NaN` maps to zero, so this never
    /// fails. A saturated coordinate names a border cell that does not
    /// contain `p`; see [`in_range`](Self::in_range).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_world(p: &Point3<f64>, cell_size: f64) -> Self {
        Self::new(
            (p.x / cell_size).floor() as i32,
            (p.y / cell_size).floor() as i32,
            (p.z / cell_size).floor() as i32,
        )
    }

    /// Returns `true` if the cell containing `p` has coordinates that fit
    /// in `i32`.
    ///
    /// With 160 LDU cells that is about ±3.4e11 LDU per axis. `NaN` is never
    /// in range.
    #[must_use]
    pub fn in_range(p: &Point3<f64>, cell_size: f64) -> bool {
        let range = f64::from(i32::MIN)..=f64::from(i32::MAX);
        [p.x, p.y, p.z]
            .into_iter()
            .all(|v| range.contains(&(v / cell_size).floor()))
    }

    /// Lookup key ordered X, then Z, then Y.
    #[must_use]
    pub const fn key(self) -> (i32, i32, i32) {
        (self.x, self.z, self.y)
    }

    /// Returns the coordinate as a tuple `(x, y, z)`.
    #[must_use]
    pub const fn as_tuple(self) -> (i32, i32, i32) {
        (self.x, self.y, self.z)
    }

    /// World position of the cell's minimum corner.
    #[must_use]
    pub fn min_corner(self, cell_size: f64) -> Point3<f64> {
        Point3::new(
            f64::from(self.x) * cell_size,
            f64::from(self.y) * cell_size,
            f64::from(self.z) * cell_size,
        )
    }

    /// World position of the cell's maximum corner.
    #[must_use]
    pub fn max_corner(self, cell_size: f64) -> Point3<f64> {
        Point3::new(
            (f64::from(self.x) + 1.0) * cell_size,
            (f64::from(self.y) + 1.0) * cell_size,
            (f64::from(self.z) + 1.0) * cell_size,
        )
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for GridCoord {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}
