//! Point, line and segment geometry used by the snap engine.
//!
//! Lines are given by two points and are infinite unless a function says
//! otherwise. Degenerate lines (both points equal) collapse to their first
//! point. Zero-length direction vectors yield `NaN` cosines, which compare
//! false against every threshold and therefore never produce a match.

use std::f64::consts::PI;

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};

/// Relative tolerance below which two directions count as parallel.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Dot product of the directions `a1→a2` and `b1→b2`.
#[must_use]
pub fn dot_segments(
    a1: &Point3<f64>,
    a2: &Point3<f64>,
    b1: &Point3<f64>,
    b2: &Point3<f64>,
) -> f64 {
    (a2 - a1).dot(&(b2 - b1))
}

/// Cosine of the angle between two vectors.
///
/// Returns `NaN` if either vector has zero length.
///
/// # Example
///
/// ```
/// use connect_types::geom::cos_between;
/// use nalgebra::Vector3;
///
/// let c = cos_between(&Vector3::x(), &Vector3::new(1.0, 1.0, 0.0));
/// assert!((c - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
/// ```
#[must_use]
pub fn cos_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.dot(b) / (a.norm() * b.norm())
}

/// Cosine of the angle between the directions `a1→a2` and `b1→b2`.
#[must_use]
pub fn cos_between_segments(
    a1: &Point3<f64>,
    a2: &Point3<f64>,
    b1: &Point3<f64>,
    b2: &Point3<f64>,
) -> f64 {
    cos_between(&(a2 - a1), &(b2 - b1))
}

/// Squared perpendicular distance from `p` to the line through `l1` and `l2`.
///
/// # Example
///
/// ```
/// use connect_types::geom::point_line_distance_sq;
/// use nalgebra::Point3;
///
/// let d = point_line_distance_sq(
///     &Point3::new(0.0, 3.0, 0.0),
///     &Point3::origin(),
///     &Point3::new(10.0, 0.0, 0.0),
/// );
/// assert!((d - 9.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn point_line_distance_sq(p: &Point3<f64>, l1: &Point3<f64>, l2: &Point3<f64>) -> f64 {
    let u = l2 - l1;
    let w = p - l1;
    let len_sq = u.norm_squared();
    if len_sq <= f64::EPSILON {
        return w.norm_squared();
    }
    w.cross(&u).norm_squared() / len_sq
}

/// Shortest distance between the line `a1-a2` and the line `b1-b2`.
///
/// Parallel lines fall back to the point-to-line distance.
#[must_use]
pub fn line_line_distance(
    a1: &Point3<f64>,
    a2: &Point3<f64>,
    b1: &Point3<f64>,
    b2: &Point3<f64>,
) -> f64 {
    let u = a2 - a1;
    let v = b2 - b1;
    let uu = u.norm_squared();
    let vv = v.norm_squared();

    if uu <= f64::EPSILON {
        return point_line_distance_sq(a1, b1, b2).sqrt();
    }
    if vv <= f64::EPSILON {
        return point_line_distance_sq(b1, a1, a2).sqrt();
    }

    let n = u.cross(&v);
    let nn = n.norm_squared();
    if nn <= PARALLEL_EPSILON * uu * vv {
        return point_line_distance_sq(b1, a1, a2).sqrt();
    }
    (a1 - b1).dot(&n).abs() / nn.sqrt()
}

/// Parameter `s` of the point `a1 + s * (a2 - a1)` closest to line `b1-b2`.
fn closest_parameter(
    a1: &Point3<f64>,
    a2: &Point3<f64>,
    b1: &Point3<f64>,
    b2: &Point3<f64>,
) -> f64 {
    let u = a2 - a1;
    let v = b2 - b1;
    let w = a1 - b1;
    let a = u.norm_squared();
    if a <= f64::EPSILON {
        return 0.0;
    }
    let b = u.dot(&v);
    let c = v.norm_squared();
    let d = u.dot(&w);
    let e = v.dot(&w);
    let denom = a * c - b * b;

    if c <= f64::EPSILON || denom <= PARALLEL_EPSILON * a * c {
        // Parallel or degenerate: project b1 onto line a.
        return -d / a;
    }
    (b * e - c * d) / denom
}

/// Point on the infinite line `a1-a2` closest to the line `b1-b2`.
///
/// # Example
///
/// ```
/// use connect_types::geom::closest_point_on_line;
/// use nalgebra::Point3;
///
/// // x axis vs. a vertical line through (5, 0, 2)
/// let p = closest_point_on_line(
///     &Point3::origin(),
///     &Point3::new(1.0, 0.0, 0.0),
///     &Point3::new(5.0, -1.0, 2.0),
///     &Point3::new(5.0, 1.0, 2.0),
/// );
/// assert!((p.x - 5.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn closest_point_on_line(
    a1: &Point3<f64>,
    a2: &Point3<f64>,
    b1: &Point3<f64>,
    b2: &Point3<f64>,
) -> Point3<f64> {
    let s = closest_parameter(a1, a2, b1, b2);
    a1 + (a2 - a1) * s
}

/// Point on the segment `a1-a2` closest to the line `b1-b2`.
#[must_use]
pub fn closest_point_on_segment(
    a1: &Point3<f64>,
    a2: &Point3<f64>,
    b1: &Point3<f64>,
    b2: &Point3<f64>,
) -> Point3<f64> {
    let s = closest_parameter(a1, a2, b1, b2).clamp(0.0, 1.0);
    a1 + (a2 - a1) * s
}

/// Some unit vector perpendicular to `v`.
fn any_perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    let other = if v.x.abs() < 0.9 * v.norm() {
        Vector3::x()
    } else {
        Vector3::y()
    };
    v.cross(&other)
}

/// Rotation turning the direction `from` onto the direction `to`.
///
/// Opposite directions give a half turn about an arbitrary perpendicular
/// axis. Zero-length input gives the identity.
#[must_use]
pub fn align_rotation(from: &Vector3<f64>, to: &Vector3<f64>) -> UnitQuaternion<f64> {
    if let Some(rotation) = UnitQuaternion::rotation_between(from, to) {
        return rotation;
    }
    if from.norm_squared() <= f64::EPSILON || to.norm_squared() <= f64::EPSILON {
        return UnitQuaternion::identity();
    }
    let axis = Unit::new_normalize(any_perpendicular(from));
    UnitQuaternion::from_axis_angle(&axis, PI)
}

/// Smallest rotation that makes `from` parallel to the axis `to`.
///
/// The axis is treated as unoriented: if `from` points against `to` it is
/// aligned with `-to` instead, so the angle never exceeds 90°.
///
/// # Example
///
/// ```
/// use connect_types::geom::min_align_rotation;
/// use nalgebra::Vector3;
///
/// let r = min_align_rotation(&Vector3::new(-1.0, 0.1, 0.0), &Vector3::x());
/// assert!(r.angle() < std::f64::consts::FRAC_PI_2);
/// ```
#[must_use]
pub fn min_align_rotation(from: &Vector3<f64>, to: &Vector3<f64>) -> UnitQuaternion<f64> {
    let target = if from.dot(to) < 0.0 { -to } else { *to };
    align_rotation(from, &target)
}
