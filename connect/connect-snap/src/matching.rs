//! Per-family docking rules.
//!
//! Every candidate point of the dragged part is moved with the part so that
//! the part origin sits on the cursor, then matched against the opposite
//! type by the rule of its family. All families compete for one best score:
//! squared eye distance for vector and point hits, line distance for rails.

use connect_types::geom::{
    align_rotation, closest_point_on_line, cos_between, line_line_distance, min_align_rotation,
};
use connect_types::{ConnectionFamily, ConnectionPoint, MovedPoint, PartId};
use nalgebra::{Point3, UnitQuaternion, Vector3, distance_squared};
use tracing::{debug, trace};

use crate::engine::SnapEngine;
use crate::outcome::SnapOutcome;
use crate::part::PartConnections;
use crate::query::PartQuery;

/// Best hit so far.
struct Best {
    score: f64,
    target: Option<ConnectionPoint>,
    offset: Vector3<f64>,
    rotation: Option<UnitQuaternion<f64>>,
}

impl Best {
    fn new() -> Self {
        Self {
            score: f64::INFINITY,
            target: None,
            offset: Vector3::zeros(),
            rotation: None,
        }
    }

    fn beats(&self, score: f64) -> bool {
        score < self.score
    }

    fn accept(
        &mut self,
        score: f64,
        target: ConnectionPoint,
        offset: Vector3<f64>,
        rotation: Option<UnitQuaternion<f64>>,
    ) {
        self.score = score;
        self.target = Some(target);
        self.offset = offset;
        self.rotation = rotation;
    }
}

pub(crate) fn match_connection<Q: PartQuery>(
    engine: &SnapEngine<Q>,
    part: &PartConnections,
    pointer: &UnitQuaternion<f64>,
    cursor: &Point3<f64>,
    eye: &Point3<f64>,
) -> SnapOutcome {
    let origin = part.origin();
    let mut best = Best::new();

    for candidate in part.points() {
        let moved = candidate.moved(&origin, cursor);
        match candidate.family() {
            ConnectionFamily::Vector => dock_vector(engine, part.id(), &moved, eye, &mut best),
            ConnectionFamily::Rail => dock_rail(engine, part.id(), &moved, eye, &mut best),
            ConnectionFamily::Point => dock_point(engine, part.id(), &moved, eye, &mut best),
            ConnectionFamily::Other => {}
        }
    }

    if let Some(target) = best.target {
        let anchor = target.p1() + best.offset;
        let orientation = best.rotation.map(|r| r * part.rotation());
        let outcome = SnapOutcome::locked(target, anchor, orientation);
        debug!(
            part = %part.id(),
            target = %target.id(),
            state = %outcome.state,
            score = best.score,
            "Locked onto connection"
        );
        return outcome;
    }

    // Free drag: follow the pointer orientation unless the part is already
    // upright the same way.
    let up = part.rotation() * Vector3::y();
    let pointer_up = pointer * Vector3::y();
    let orientation = if cos_between(&up, &pointer_up) >= engine.params().aligned_cos {
        None
    } else {
        Some(*pointer)
    };
    trace!(part = %part.id(), reorient = orientation.is_some(), "No connection in range");
    SnapOutcome::unlocked(*cursor, orientation)
}

/// Studs and pins: the target must point the same way, within
/// `acos(vector_min_cos)`.
fn dock_vector<Q: PartQuery>(
    engine: &SnapEngine<Q>,
    part: PartId,
    moved: &MovedPoint,
    eye: &Point3<f64>,
    best: &mut Best,
) {
    let params = engine.params();
    let feature = &moved.point;
    let direction = feature.direction();
    let hits = engine.nearest_of_type(
        feature.connection_type().opposite(),
        feature.p1(),
        eye,
        params.vector_radius_sq,
    );

    for hit in hits {
        if hit.part() == part {
            continue;
        }
        let score = distance_squared(eye, hit.p1());
        if !best.beats(score) {
            continue;
        }
        let hit_direction = hit.direction();
        if direction.dot(&hit_direction) <= 0.0 {
            continue;
        }
        let cos = cos_between(&direction, &hit_direction);
        if cos.is_nan() || cos < params.vector_min_cos {
            continue;
        }

        let rotation =
            (cos < params.aligned_cos).then(|| align_rotation(&direction, &hit_direction));
        let offset = rotation.map_or(moved.delta, |r| r * moved.delta);
        best.accept(score, hit, offset, rotation);
    }
}

/// Axles and bars: slide along the target axis to the point under the
/// cursor, as long as the two segments still overlap.
fn dock_rail<Q: PartQuery>(
    engine: &SnapEngine<Q>,
    part: PartId,
    moved: &MovedPoint,
    eye: &Point3<f64>,
    best: &mut Best,
) {
    let params = engine.params();
    let feature = &moved.point;
    let direction = feature.direction();
    let rails = engine.rail_candidates(feature.connection_type().opposite(), feature, eye);

    for rail in rails {
        if rail.part() == part {
            continue;
        }
        let score = line_line_distance(eye, feature.p1(), rail.p1(), rail.p2());
        if !best.beats(score) {
            continue;
        }

        let anchor = closest_point_on_line(rail.p1(), rail.p2(), feature.p1(), eye);
        let docked = moved.anchored_at(&anchor).point;
        if !rails_overlap(&docked, &rail) {
            continue;
        }

        let rail_direction = rail.direction();
        let cos = cos_between(&direction, &rail_direction);
        let rotation = (cos.abs() < params.aligned_cos)
            .then(|| min_align_rotation(&direction, &rail_direction));
        let offset = (anchor - rail.p1()) + rotation.map_or(moved.delta, |r| r * moved.delta);
        best.accept(score, rail, offset, rotation);
    }
}

/// Balls: any orientation docks; the hit closest to the eye wins.
fn dock_point<Q: PartQuery>(
    engine: &SnapEngine<Q>,
    part: PartId,
    moved: &MovedPoint,
    eye: &Point3<f64>,
    best: &mut Best,
) {
    let feature = &moved.point;
    let hits = engine.nearest_of_type(
        feature.connection_type().opposite(),
        feature.p1(),
        eye,
        engine.params().point_radius_sq,
    );

    for hit in hits {
        if hit.part() == part {
            continue;
        }
        let score = distance_squared(eye, hit.p1());
        if best.beats(score) {
            best.accept(score, hit, moved.delta, None);
        }
    }
}

/// Overlap test between a docked feature and its rail, on squared lengths.
///
/// When the feature is the shorter segment it is rejected if both of its
/// ends are farther than the rail length from one of the rail ends.
/// Otherwise the roles swap: both rail ends must be farther than the
/// feature length from the feature ends.
fn rails_overlap(docked: &ConnectionPoint, rail: &ConnectionPoint) -> bool {
    let len = rail.length_sq();
    let clen = docked.length_sq();
    let d1 = distance_squared(docked.p1(), rail.p1());
    let d2 = distance_squared(docked.p1(), rail.p2());
    let d3 = distance_squared(docked.p2(), rail.p1());
    let d4 = distance_squared(docked.p2(), rail.p2());

    if clen < len {
        !(d1.max(d2) > len && d3.max(d4) > len)
    } else {
        !(d1.max(d3) > clen && d2.max(d4) > clen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_types::{ConnectionId, ConnectionType};

    fn segment(ty: ConnectionType, x1: f64, x2: f64) -> ConnectionPoint {
        ConnectionPoint::new(
            ConnectionId::new(1),
            PartId::new(1),
            ty,
            Point3::new(x1, 0.0, 0.0),
            Point3::new(x2, 0.0, 0.0),
        )
    }

    #[test]
    fn test_short_feature_inside_rail_overlaps() {
        let rail = segment(ConnectionType::AxleHole, 0.0, 500.0);
        assert!(rails_overlap(&segment(ConnectionType::Axle, 250.0, 300.0), &rail));
        assert!(rails_overlap(&segment(ConnectionType::Axle, 480.0, 530.0), &rail));
    }

    #[test]
    fn test_short_feature_past_rail_end_rejected() {
        let rail = segment(ConnectionType::AxleHole, 0.0, 500.0);
        assert!(!rails_overlap(&segment(ConnectionType::Axle, 1100.0, 1150.0), &rail));
        assert!(!rails_overlap(&segment(ConnectionType::Axle, -600.0, -550.0), &rail));
    }

    #[test]
    fn test_long_feature_over_short_rail() {
        let rail = segment(ConnectionType::Clip, 0.0, 10.0);
        assert!(rails_overlap(&segment(ConnectionType::Bar, -40.0, 40.0), &rail));
        assert!(!rails_overlap(&segment(ConnectionType::Bar, 200.0, 280.0), &rail));
    }

    #[test]
    fn test_best_keeps_lowest_score() {
        let mut best = Best::new();
        let hit = segment(ConnectionType::Stud, 0.0, 1.0);
        assert!(best.beats(1e300));
        best.accept(5.0, hit, Vector3::x(), None);
        assert!(!best.beats(5.0));
        assert!(best.beats(4.0));
        assert!(!best.beats(f64::NAN));
    }
}
