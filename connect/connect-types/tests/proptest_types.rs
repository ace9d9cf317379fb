//! Property-based tests for connection types and geometry helpers.
//!
//! Run with: cargo test -p connect-types --test proptest_types

#![allow(clippy::unwrap_used)]

use connect_types::geom::{
    align_rotation, closest_point_on_line, line_line_distance, min_align_rotation,
    point_line_distance_sq,
};
use connect_types::{ConnectionType, IdGenerator, PartId};
use nalgebra::{Isometry3, Point3, Vector3};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_point() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-1_000.0..1_000.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_direction() -> impl Strategy<Value = Vector3<f64>> {
    prop::array::uniform3(-1.0..1.0f64)
        .prop_map(|[x, y, z]| Vector3::new(x, y, z))
        .prop_filter("direction must not be tiny", |v| v.norm() > 1e-3)
}

fn arb_type() -> impl Strategy<Value = ConnectionType> {
    (0..ConnectionType::COUNT).prop_map(|i| ConnectionType::ALL[i])
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn opposite_is_an_involution(ty in arb_type()) {
        prop_assert_eq!(ty.opposite().opposite(), ty);
        prop_assert_eq!(ty.opposite().family(), ty.family());
        prop_assert!(ty.accepts(ty.opposite()));
    }

    #[test]
    fn names_round_trip(ty in arb_type()) {
        prop_assert_eq!(ty.as_str().parse::<ConnectionType>().unwrap(), ty);
        prop_assert_eq!(ConnectionType::try_from(ty.index()).unwrap(), ty);
    }

    #[test]
    fn point_line_distance_is_perpendicular(
        a in arb_point(),
        dir in arb_direction(),
        t in -10.0..10.0f64,
        off in arb_direction(),
        scale in 0.0..50.0f64,
    ) {
        let b = a + dir;
        // component of `off` perpendicular to the line
        let u = dir.normalize();
        let perp = off - u * off.dot(&u);
        prop_assume!(perp.norm() > 1e-3);
        let perp = perp.normalize() * scale;

        let p = a + dir * t + perp;
        let d = point_line_distance_sq(&p, &a, &b);
        prop_assert!((d - scale * scale).abs() < 1e-6 * (1.0 + scale * scale));
    }

    #[test]
    fn closest_point_lies_at_line_distance(
        a1 in arb_point(),
        u in arb_direction(),
        b1 in arb_point(),
        v in arb_direction(),
    ) {
        let (a2, b2) = (a1 + u, b1 + v);
        let on_a = closest_point_on_line(&a1, &a2, &b1, &b2);
        let d = line_line_distance(&a1, &a2, &b1, &b2);

        // the point is on line a, and no closer to line b than the line distance
        prop_assert!(point_line_distance_sq(&on_a, &a1, &a2) < 1e-6);
        let to_b = point_line_distance_sq(&on_a, &b1, &b2).sqrt();
        prop_assert!(to_b + 1e-6 >= d);
        prop_assert!((to_b - d).abs() < 1e-4 * (1.0 + d));
    }

    #[test]
    fn align_rotation_maps_direction(from in arb_direction(), to in arb_direction()) {
        let r = align_rotation(&from, &to);
        let mapped = r * from.normalize();
        prop_assert!((mapped - to.normalize()).norm() < 1e-6);
    }

    #[test]
    fn min_align_rotation_never_exceeds_quarter_turn(
        from in arb_direction(),
        to in arb_direction(),
    ) {
        let r = min_align_rotation(&from, &to);
        prop_assert!(r.angle() <= std::f64::consts::FRAC_PI_2 + 1e-9);
        let mapped = r * from.normalize();
        prop_assert!(mapped.cross(&to.normalize()).norm() < 1e-6);
    }

    #[test]
    fn placement_preserves_segment_length(
        p1 in arb_point(),
        dir in arb_direction(),
        shift in arb_direction(),
        axis in arb_direction(),
        angle in -3.0..3.0f64,
        ty in arb_type(),
    ) {
        let ids = IdGenerator::new();
        let spec = connect_types::AttachmentSpec::new(ty, p1, p1 + dir * 20.0);
        let placement = Isometry3::new(shift * 100.0, axis.normalize() * angle);
        let placed = spec.place(PartId::new(1), &placement, &ids);

        prop_assert!((placed.length() - dir.norm() * 20.0).abs() < 1e-9);
        prop_assert_eq!(placed.connection_type(), ty);
        prop_assert_eq!(placed.id().raw(), 1);
    }
}
