//! Rays and the slab intersection test.
//!
//! The index prunes buckets with the slab method: the ray is clipped against
//! the three pairs of axis-aligned planes of a box, using the reciprocal of
//! each direction component. A box is rejected when the clipped interval is
//! empty (`tmin > tmax`) or lies entirely behind the origin (`tmax < 0`).
//!
//! Axis-parallel rays have zero direction components. Those axes are tested
//! directly (origin inside the slab or not) instead of multiplying by an
//! infinite reciprocal, so a box face lying exactly on the ray never yields
//! `0 · ∞ = NaN`.

use nalgebra::{Point3, Vector3};

use crate::aabb::Aabb;

/// A ray with a unit direction.
///
/// # Example
///
/// ```
/// use connect_grid::{Aabb, Ray};
/// use nalgebra::Point3;
///
/// let ray = Ray::through(&Point3::new(0.0, 0.0, -500.0), &Point3::new(0.0, 0.0, 0.0));
/// let aabb = Aabb::new(Point3::new(-10.0, -10.0, -10.0), Point3::new(10.0, 10.0, 10.0));
///
/// let (t_enter, t_exit) = ray.slab_interval(&aabb).unwrap();
/// assert!((t_enter - 490.0).abs() < 1e-9);
/// assert!((t_exit - 510.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin of the ray.
    pub origin: Point3<f64>,
    /// Unit direction, or zero for a degenerate ray.
    pub direction: Vector3<f64>,
    inv_direction: Vector3<f64>,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// A zero direction is kept as zero. Such a ray only "hits" boxes that
    /// contain its origin.
    #[must_use]
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        let norm = direction.norm();
        let direction = if norm < f64::EPSILON {
            Vector3::zeros()
        } else {
            direction / norm
        };
        Self {
            origin,
            direction,
            inv_direction: direction.map(|d| 1.0 / d),
        }
    }

    /// Ray from `eye` toward `target`.
    #[must_use]
    pub fn through(eye: &Point3<f64>, target: &Point3<f64>) -> Self {
        Self::new(*eye, target - eye)
    }

    /// Reciprocal direction components (`±∞` on zero components).
    #[must_use]
    pub const fn inv_direction(&self) -> &Vector3<f64> {
        &self.inv_direction
    }

    /// Returns the point along the ray at parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Returns `true` if the origin and direction are free of `NaN`/`∞`.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.origin.iter().chain(self.direction.iter()).all(|c| c.is_finite())
    }

    /// Clip the ray against `aabb`.
    ///
    /// Returns the parametric `(t_enter, t_exit)` interval, or `None` if the
    /// box is missed or lies entirely behind the origin. A non-finite ray
    /// misses everything.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn slab_interval(&self, aabb: &Aabb) -> Option<(f64, f64)> {
        if !self.is_finite() {
            return None;
        }

        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

            if self.direction[axis] == 0.0 {
                // Parallel to this slab: inside it for every t, or never.
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = self.inv_direction[axis];
            let t1 = (lo - origin) * inv;
            let t2 = (hi - origin) * inv;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }

        if t_enter.is_nan() || t_exit.is_nan() {
            return None;
        }
        // tmin > tmax: the ray misses the box
        if t_enter > t_exit {
            return None;
        }
        // tmax < 0: the line crosses the box, but the box is behind us
        if t_exit < 0.0 {
            return None;
        }
        Some((t_enter, t_exit))
    }

    /// Returns `true` if the ray passes through `aabb`.
    #[must_use]
    pub fn intersects(&self, aabb: &Aabb) -> bool {
        self.slab_interval(aabb).is_some()
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Point3::origin(), Vector3::x())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::coord::GridCoord;
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_new_normalizes() {
        let ray = Ray::new(Point3::origin(), Vector3::new(3.0, 4.0, 0.0));
        assert_relative_eq!(ray.direction.norm(), 1.0);
        assert_relative_eq!(ray.point_at(5.0), Point3::new(3.0, 4.0, 0.0));
    }

    #[test]
    fn test_zero_direction_has_infinite_reciprocal() {
        let ray = Ray::new(Point3::origin(), Vector3::x());
        assert!(ray.inv_direction().y.is_infinite());
        assert!(ray.inv_direction().z.is_infinite());
    }

    #[test]
    fn test_hit_in_front() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vector3::x());
        let (enter, exit) = ray.slab_interval(&unit_box()).unwrap();
        assert_relative_eq!(enter, 5.0);
        assert_relative_eq!(exit, 6.0);
    }

    #[test]
    fn test_box_behind_is_rejected() {
        let ray = Ray::new(Point3::new(5.0, 0.5, 0.5), Vector3::x());
        assert!(!ray.intersects(&unit_box()));
    }

    #[test]
    fn test_origin_inside_box() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vector3::new(1.0, 1.0, 1.0));
        let (enter, exit) = ray.slab_interval(&unit_box()).unwrap();
        assert!(enter < 0.0);
        assert!(exit > 0.0);
    }

    #[test]
    fn test_miss_beside_box() {
        let ray = Ray::new(Point3::new(-5.0, 2.0, 0.5), Vector3::x());
        assert!(!ray.intersects(&unit_box()));
    }

    #[test]
    fn test_diagonal_miss() {
        // passes the corner region without entering
        let ray = Ray::new(Point3::new(-1.0, 1.5, 0.5), Vector3::new(1.0, 1.0, 0.0));
        assert!(!ray.intersects(&unit_box()));
    }

    #[test]
    fn test_parallel_ray_on_box_face() {
        // y == box.min.y exactly, direction.y == 0
        let ray = Ray::new(Point3::new(-5.0, 0.0, 0.5), Vector3::x());
        assert!(ray.intersects(&unit_box()));

        // zero-padded cell boundary, the 0 * inf case
        let cell = Aabb::padded_cell(GridCoord::new(1, 0, 0), 160.0, 0.0);
        let ray = Ray::through(&Point3::new(160.0, 50.0, -1000.0), &Point3::new(160.0, 50.0, 50.0));
        assert!(ray.intersects(&cell));
    }

    #[test]
    fn test_degenerate_ray_only_hits_containing_box() {
        let inside = Ray::through(&Point3::new(0.5, 0.5, 0.5), &Point3::new(0.5, 0.5, 0.5));
        let outside = Ray::through(&Point3::new(5.0, 0.5, 0.5), &Point3::new(5.0, 0.5, 0.5));
        assert!(inside.intersects(&unit_box()));
        assert!(!outside.intersects(&unit_box()));
    }

    #[test]
    fn test_nan_ray_misses() {
        let ray = Ray::through(&Point3::new(f64::NAN, 0.0, 0.0), &Point3::new(0.5, 0.5, 0.5));
        assert!(!ray.intersects(&unit_box()));
    }

    #[test]
    fn test_target_inside_box_is_hit() {
        let target = Point3::new(0.25, 0.75, 0.5);
        let ray = Ray::through(&Point3::new(-100.0, 37.0, 12.0), &target);
        let (enter, exit) = ray.slab_interval(&unit_box()).unwrap();
        let t = (target - ray.origin).norm();
        assert!(enter <= t && t <= exit);
    }
}
