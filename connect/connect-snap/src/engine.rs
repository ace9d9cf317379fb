//! Registries, proximity queries and the engine builder.

use std::sync::Arc;

use connect_grid::{ConnGrid, GridConfig};
use connect_types::geom::{cos_between, line_line_distance, point_line_distance_sq};
use connect_types::{ConnectionId, ConnectionPoint, ConnectionType, IdGenerator, PartId};
use hashbrown::{HashMap, HashSet};
use nalgebra::{Point3, UnitQuaternion};
use tracing::{debug, info, trace, warn};

use crate::error::{SnapError, SnapResult};
use crate::matching;
use crate::outcome::SnapOutcome;
use crate::params::SnapParams;
use crate::part::PartConnections;
use crate::query::PartQuery;

/// Matches dragged parts against the connection points of placed parts.
///
/// The engine keeps three views of the same points consistent: a map by id,
/// one ordered list per connection type, and a [`ConnGrid`] for ray
/// queries. Mutation takes `&mut self`; queries and
/// [`match_connection`](Self::match_connection) take `&self`.
///
/// # Example
///
/// ```
/// use connect_snap::{AllVisible, PartConnections, SnapEngine};
/// use connect_types::{AttachmentSpec, ConnectionType, PartId};
/// use nalgebra::{Isometry3, Point3, UnitQuaternion};
///
/// let mut engine = SnapEngine::builder().part_query(AllVisible).build().unwrap();
/// let ids = engine.ids().clone();
///
/// // A placed brick with one stud on top.
/// let stud = AttachmentSpec::new(
///     ConnectionType::Stud,
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(0.0, -4.0, 0.0),
/// );
/// let base = PartConnections::from_specs(PartId::new(1), Isometry3::identity(), &[stud], &ids);
/// engine.add_all_for_part(&base).unwrap();
///
/// // A brick being dragged, with a receiver under its origin.
/// let receiver = AttachmentSpec::new(
///     ConnectionType::StudReceiver,
///     Point3::new(0.0, 24.0, 0.0),
///     Point3::new(0.0, 20.0, 0.0),
/// );
/// let dragged = PartConnections::from_specs(
///     PartId::new(2),
///     Isometry3::translation(0.0, -100.0, 0.0),
///     &[receiver],
///     &ids,
/// );
///
/// let eye = Point3::new(0.0, -1000.0, 0.0);
/// let cursor = Point3::new(2.0, -23.0, 0.0);
/// let outcome = engine.match_connection(&dragged, &UnitQuaternion::identity(), &cursor, &eye);
///
/// assert!(outcome.is_locked());
/// // receiver lands on the stud, so the origin sits 24 LDU above it
/// assert!((outcome.position - Point3::new(0.0, -24.0, 0.0)).norm() < 1e-9);
/// ```
#[derive(Debug)]
pub struct SnapEngine<Q> {
    params: SnapParams,
    part_query: Q,
    ids: Arc<IdGenerator>,
    by_id: HashMap<ConnectionId, ConnectionPoint>,
    by_type: [Vec<ConnectionPoint>; ConnectionType::COUNT],
    grid: ConnGrid,
}

/// Builder for [`SnapEngine`].
///
/// A part query is required; everything else has defaults.
#[derive(Debug)]
pub struct SnapEngineBuilder<Q> {
    part_query: Option<Q>,
    grid_config: GridConfig,
    params: SnapParams,
    ids: Option<Arc<IdGenerator>>,
}

impl<Q> Default for SnapEngineBuilder<Q> {
    fn default() -> Self {
        Self {
            part_query: None,
            grid_config: GridConfig::default(),
            params: SnapParams::default(),
            ids: None,
        }
    }
}

impl<Q: PartQuery> SnapEngineBuilder<Q> {
    /// Create a builder with default settings and no part query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the part visibility collaborator.
    #[must_use]
    pub fn part_query(mut self, part_query: Q) -> Self {
        self.part_query = Some(part_query);
        self
    }

    /// Set the spatial index configuration.
    #[must_use]
    pub const fn grid_config(mut self, config: GridConfig) -> Self {
        self.grid_config = config;
        self
    }

    /// Set the matching thresholds.
    #[must_use]
    pub const fn params(mut self, params: SnapParams) -> Self {
        self.params = params;
        self
    }

    /// Share an id generator with the code that creates connection points.
    #[must_use]
    pub fn ids(mut self, ids: Arc<IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Build the engine.
    ///
    /// # Errors
    ///
    /// - [`SnapError::MissingPartQuery`] if no part query was set
    /// - [`SnapError::InvalidParams`] if the thresholds fail validation
    /// - [`SnapError::Grid`] if the grid configuration fails validation
    pub fn build(self) -> SnapResult<SnapEngine<Q>> {
        let part_query = self.part_query.ok_or(SnapError::MissingPartQuery)?;
        self.params.validate()?;
        let ids = self.ids.unwrap_or_default();
        let grid = ConnGrid::with_ids(self.grid_config, Arc::clone(&ids))?;

        debug!(
            cell_size = self.grid_config.cell_size,
            tolerance = self.grid_config.tolerance,
            "Built snap engine"
        );

        Ok(SnapEngine {
            params: self.params,
            part_query,
            ids,
            by_id: HashMap::new(),
            by_type: std::array::from_fn(|_| Vec::new()),
            grid,
        })
    }
}

impl<Q: PartQuery> SnapEngine<Q> {
    /// Start building an engine.
    #[must_use]
    pub fn builder() -> SnapEngineBuilder<Q> {
        SnapEngineBuilder::new()
    }

    /// The matching thresholds.
    #[must_use]
    pub const fn params(&self) -> &SnapParams {
        &self.params
    }

    /// The part visibility collaborator.
    #[must_use]
    pub const fn part_query(&self) -> &Q {
        &self.part_query
    }

    /// Mutable access to the part visibility collaborator.
    pub fn part_query_mut(&mut self) -> &mut Q {
        &mut self.part_query
    }

    /// The id generator shared by the engine and its grid.
    #[must_use]
    pub fn ids(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    /// The spatial index.
    #[must_use]
    pub const fn grid(&self) -> &ConnGrid {
        &self.grid
    }

    // =========================================================================
    // Registries
    // =========================================================================

    /// Register a connection point.
    ///
    /// # Errors
    ///
    /// - [`SnapError::DuplicatePoint`] if the id is already registered
    /// - [`SnapError::Grid`] if the spatial index can't grow
    pub fn add_point(&mut self, point: ConnectionPoint) -> SnapResult<()> {
        if self.by_id.contains_key(&point.id()) {
            warn!(id = %point.id(), "Rejected duplicate connection point");
            return Err(SnapError::DuplicatePoint(point.id()));
        }
        self.grid.insert(point)?;
        self.by_id.insert(point.id(), point);
        self.by_type[point.connection_type().index()].push(point);
        Ok(())
    }

    /// Unregister a connection point. Returns the removed point, or `None`
    /// if it was not registered.
    pub fn remove_point(&mut self, id: ConnectionId) -> Option<ConnectionPoint> {
        let point = self.by_id.remove(&id)?;
        self.grid.remove(&point);
        let list = &mut self.by_type[point.connection_type().index()];
        if let Some(pos) = list.iter().position(|p| p.id() == id) {
            list.remove(pos);
        }
        Some(point)
    }

    /// Register every point of a part.
    ///
    /// Duplicates are checked before anything is added, so a rejected part
    /// leaves the registries untouched. Returns the number of points added.
    ///
    /// # Errors
    ///
    /// - [`SnapError::DuplicatePoint`] if a point id is already registered
    ///   or appears twice in the part
    /// - [`SnapError::Grid`] if the spatial index can't grow
    pub fn add_all_for_part(&mut self, part: &PartConnections) -> SnapResult<usize> {
        let mut seen = HashSet::with_capacity(part.points().len());
        for point in part.points() {
            if self.by_id.contains_key(&point.id()) || !seen.insert(point.id()) {
                warn!(
                    id = %point.id(),
                    part = %part.id(),
                    "Rejected part with duplicate connection point"
                );
                return Err(SnapError::DuplicatePoint(point.id()));
            }
        }

        self.add_each(part.points(), Self::add_point)?;
        info!(
            part = %part.id(),
            points = part.points().len(),
            "Registered part connections"
        );
        Ok(part.points().len())
    }

    /// Add `points` one by one with `add`, unregistering the ones already
    /// added if any of them fails.
    fn add_each(
        &mut self,
        points: &[ConnectionPoint],
        mut add: impl FnMut(&mut Self, ConnectionPoint) -> SnapResult<()>,
    ) -> SnapResult<()> {
        for (added, point) in points.iter().enumerate() {
            if let Err(err) = add(self, *point) {
                for undo in &points[..added] {
                    self.remove_point(undo.id());
                }
                warn!(rolled_back = added, error = %err, "Rolled back partially added part");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Unregister every point owned by `part`. Returns the number removed.
    pub fn remove_all_for_part(&mut self, part: PartId) -> usize {
        let ids: Vec<ConnectionId> = self
            .by_type
            .iter()
            .flatten()
            .filter(|p| p.part() == part)
            .map(ConnectionPoint::id)
            .collect();
        for id in &ids {
            self.remove_point(*id);
        }
        if !ids.is_empty() {
            info!(part = %part, points = ids.len(), "Removed part connections");
        }
        ids.len()
    }

    /// Drop every registered point.
    pub fn clear(&mut self) {
        self.by_id.clear();
        for list in &mut self.by_type {
            list.clear();
        }
        self.grid.clear();
    }

    /// Look up a point by id.
    #[must_use]
    pub fn get(&self, id: ConnectionId) -> Option<&ConnectionPoint> {
        self.by_id.get(&id)
    }

    /// Registered points of one type, in registration order.
    #[must_use]
    pub fn points_of_type(&self, connection_type: ConnectionType) -> &[ConnectionPoint] {
        &self.by_type[connection_type.index()]
    }

    /// All registered points, grouped by type.
    pub fn points(&self) -> impl Iterator<Item = &ConnectionPoint> {
        self.by_type.iter().flatten()
    }

    /// Number of registered points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if no points are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    // =========================================================================
    // Proximity queries
    // =========================================================================

    /// Visible points of `connection_type` whose `p1` lies within
    /// `max_dist_sq` (squared) of the line through `eye` and `cursor`.
    #[must_use]
    pub fn nearest_of_type(
        &self,
        connection_type: ConnectionType,
        cursor: &Point3<f64>,
        eye: &Point3<f64>,
        max_dist_sq: f64,
    ) -> Vec<ConnectionPoint> {
        let candidates = self.grid.ray_query(connection_type, eye, cursor);
        let total = candidates.len();
        let hits: Vec<ConnectionPoint> = candidates
            .into_iter()
            .filter(|p| point_line_distance_sq(p.p1(), eye, cursor) < max_dist_sq)
            .filter(|p| !self.part_query.is_hidden(p.part()))
            .collect();
        trace!(
            connection_type = %connection_type,
            candidates = total,
            hits = hits.len(),
            "Nearest of type"
        );
        hits
    }

    /// The visible point of any type closest to the eye, within
    /// `any_type_radius_sq` of the eye–cursor line.
    #[must_use]
    pub fn nearest_any_type(&self, cursor: &Point3<f64>, eye: &Point3<f64>) -> Option<ConnectionPoint> {
        let radius_sq = self.params.any_type_radius_sq;
        let mut best: Option<(f64, ConnectionPoint)> = None;
        for point in self.grid.ray_query_all(eye, cursor) {
            if point_line_distance_sq(point.p1(), eye, cursor) >= radius_sq
                || self.part_query.is_hidden(point.part())
            {
                continue;
            }
            let d = nalgebra::distance_squared(eye, point.p1());
            if best.is_none_or(|(best_d, _)| d < best_d) {
                best = Some((d, point));
            }
        }
        best.map(|(_, point)| point)
    }

    /// The point of `part` closest to the line `l1-l2`, or `None` if the
    /// part is hidden or has no points.
    #[must_use]
    pub fn nearest_to_line(
        &self,
        part: &PartConnections,
        l1: &Point3<f64>,
        l2: &Point3<f64>,
    ) -> Option<ConnectionPoint> {
        self.closest_on_part(part, l1, l2, |_| true)
    }

    /// Like [`nearest_to_line`](Self::nearest_to_line), restricted to one type.
    #[must_use]
    pub fn nearest_to_line_of_type(
        &self,
        connection_type: ConnectionType,
        part: &PartConnections,
        l1: &Point3<f64>,
        l2: &Point3<f64>,
    ) -> Option<ConnectionPoint> {
        self.closest_on_part(part, l1, l2, |p| p.connection_type() == connection_type)
    }

    fn closest_on_part(
        &self,
        part: &PartConnections,
        l1: &Point3<f64>,
        l2: &Point3<f64>,
        keep: impl Fn(&ConnectionPoint) -> bool,
    ) -> Option<ConnectionPoint> {
        if self.part_query.is_hidden(part.id()) {
            return None;
        }
        let mut best: Option<(f64, ConnectionPoint)> = None;
        for point in part.points().iter().filter(|p| keep(p)) {
            let d = point_line_distance_sq(point.p1(), l1, l2);
            // NaN distances never win
            if best.map_or(!d.is_nan(), |(best_d, _)| d < best_d) {
                best = Some((d, *point));
            }
        }
        best.map(|(_, point)| point)
    }

    /// Visible rails of `connection_type` lying along the line from `eye`
    /// through `moved.p1()`.
    ///
    /// A rail qualifies when its axis passes within `rail_proximity` of that
    /// line and its direction is within `acos(rail_min_cos)` of the moved
    /// feature's axis, either way round. Every registered rail of the type is
    /// scanned.
    #[must_use]
    pub fn rail_candidates(
        &self,
        connection_type: ConnectionType,
        moved: &ConnectionPoint,
        eye: &Point3<f64>,
    ) -> Vec<ConnectionPoint> {
        let direction = moved.direction();
        self.points_of_type(connection_type)
            .iter()
            .filter(|rail| !self.part_query.is_hidden(rail.part()))
            .filter(|rail| {
                line_line_distance(eye, moved.p1(), rail.p1(), rail.p2()) < self.params.rail_proximity
            })
            .filter(|rail| cos_between(&direction, &rail.direction()).abs() >= self.params.rail_min_cos)
            .copied()
            .collect()
    }

    // =========================================================================
    // Docking
    // =========================================================================

    /// Find where the dragged `part` should go for the current cursor.
    ///
    /// `pointer` is the orientation the part would take when it is not
    /// docked. See [`SnapOutcome`] for the result.
    #[must_use]
    pub fn match_connection(
        &self,
        part: &PartConnections,
        pointer: &UnitQuaternion<f64>,
        cursor: &Point3<f64>,
        eye: &Point3<f64>,
    ) -> SnapOutcome {
        matching::match_connection(self, part, pointer, cursor, eye)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::query::{AllVisible, HiddenParts};
    use connect_grid::GridError;
    use nalgebra::{Isometry3, Vector3};

    fn engine() -> SnapEngine<HiddenParts> {
        SnapEngine::builder()
            .part_query(HiddenParts::new())
            .build()
            .unwrap()
    }

    fn point(id: u64, part: u64, ty: ConnectionType, p1: Point3<f64>) -> ConnectionPoint {
        ConnectionPoint::new(
            ConnectionId::new(id),
            PartId::new(part),
            ty,
            p1,
            p1 + Vector3::new(0.0, 0.0, 20.0),
        )
    }

    #[test]
    fn test_builder_requires_part_query() {
        let err = SnapEngine::<AllVisible>::builder().build().unwrap_err();
        assert_eq!(err, SnapError::MissingPartQuery);
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        let err = SnapEngine::builder()
            .part_query(AllVisible)
            .grid_config(GridConfig::default().with_tolerance(-1.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, SnapError::Grid(_)));

        let err = SnapEngine::builder()
            .part_query(AllVisible)
            .params(SnapParams::default().with_vector_radius_sq(-1.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, SnapError::InvalidParams { .. }));
    }

    #[test]
    fn test_registries_stay_consistent() {
        let mut engine = engine();
        let a = point(1, 1, ConnectionType::Axle, Point3::origin());
        let b = point(2, 1, ConnectionType::Axle, Point3::new(500.0, 0.0, 0.0));
        engine.add_point(a).unwrap();
        engine.add_point(b).unwrap();

        assert_eq!(engine.len(), 2);
        assert_eq!(engine.points_of_type(ConnectionType::Axle), &[a, b]);
        assert_eq!(engine.grid().point_count(), 2);

        assert_eq!(engine.remove_point(a.id()), Some(a));
        assert_eq!(engine.remove_point(a.id()), None);
        assert!(engine.get(a.id()).is_none());
        assert_eq!(engine.points_of_type(ConnectionType::Axle), &[b]);
        assert_eq!(engine.grid().point_count(), 1);
    }

    #[test]
    fn test_duplicate_point_rejected() {
        let mut engine = engine();
        let a = point(1, 1, ConnectionType::Stud, Point3::origin());
        engine.add_point(a).unwrap();
        let moved = point(1, 1, ConnectionType::Stud, Point3::new(50.0, 0.0, 0.0));

        assert_eq!(
            engine.add_point(moved),
            Err(SnapError::DuplicatePoint(ConnectionId::new(1)))
        );
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.grid().point_count(), 1);
    }

    #[test]
    fn test_add_all_for_part_is_all_or_nothing() {
        let mut engine = engine();
        engine
            .add_point(point(3, 9, ConnectionType::Pin, Point3::origin()))
            .unwrap();
        let part = PartConnections::new(
            PartId::new(1),
            Isometry3::identity(),
            vec![
                point(1, 1, ConnectionType::Stud, Point3::origin()),
                point(3, 1, ConnectionType::Stud, Point3::origin()),
            ],
        );
        assert!(engine.add_all_for_part(&part).is_err());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_add_all_for_part_rolls_back_on_grid_failure() {
        let mut engine = engine();
        let existing = point(9, 2, ConnectionType::Stud, Point3::origin());
        engine.add_point(existing).unwrap();

        let points = [
            point(1, 1, ConnectionType::Stud, Point3::origin()),
            point(2, 1, ConnectionType::Axle, Point3::new(400.0, 0.0, 0.0)),
            point(3, 1, ConnectionType::Ball, Point3::new(0.0, 800.0, 0.0)),
        ];
        let mut calls = 0;
        let err = engine
            .add_each(&points, |engine, p| {
                calls += 1;
                if calls == 3 {
                    Err(SnapError::Grid(GridError::AllocationFailed {
                        what: "bucket arena",
                    }))
                } else {
                    engine.add_point(p)
                }
            })
            .unwrap_err();

        assert!(matches!(err, SnapError::Grid(_)));
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.grid().point_count(), 1);
        assert_eq!(engine.points().copied().collect::<Vec<_>>(), vec![existing]);
        for p in &points {
            assert!(engine.get(p.id()).is_none());
        }
    }

    #[test]
    fn test_remove_all_for_part() {
        let mut engine = engine();
        let part = PartConnections::new(
            PartId::new(1),
            Isometry3::identity(),
            vec![
                point(1, 1, ConnectionType::Stud, Point3::origin()),
                point(2, 1, ConnectionType::PinHole, Point3::new(0.0, 20.0, 0.0)),
            ],
        );
        let other = point(3, 2, ConnectionType::Stud, Point3::origin());
        assert_eq!(engine.add_all_for_part(&part).unwrap(), 2);
        engine.add_point(other).unwrap();

        assert_eq!(engine.remove_all_for_part(PartId::new(1)), 2);
        assert_eq!(engine.remove_all_for_part(PartId::new(1)), 0);
        assert_eq!(engine.points().copied().collect::<Vec<_>>(), vec![other]);

        engine.clear();
        assert!(engine.is_empty());
        assert_eq!(engine.grid().point_count(), 0);
    }

    #[test]
    fn test_nearest_of_type_filters_radius_and_visibility() {
        let mut engine = engine();
        let close = point(1, 1, ConnectionType::Stud, Point3::new(3.0, 0.0, 0.0));
        let far = point(2, 1, ConnectionType::Stud, Point3::new(12.0, 0.0, 0.0));
        let hidden = point(3, 2, ConnectionType::Stud, Point3::new(0.0, 0.0, 2.0));
        for p in [close, far, hidden] {
            engine.add_point(p).unwrap();
        }
        engine.part_query_mut().hide(PartId::new(2));

        let eye = Point3::new(0.0, -1000.0, 0.0);
        let hits = engine.nearest_of_type(ConnectionType::Stud, &Point3::origin(), &eye, 100.0);
        assert_eq!(hits, vec![close]);
    }

    #[test]
    fn test_nearest_any_type_prefers_closest_to_eye() {
        let mut engine = engine();
        let low = point(1, 1, ConnectionType::Stud, Point3::new(0.0, 0.0, 0.0));
        let high = point(2, 1, ConnectionType::Ball, Point3::new(1.0, -50.0, 0.0));
        let wide = point(3, 1, ConnectionType::Pin, Point3::new(5.0, -80.0, 0.0));
        for p in [low, high, wide] {
            engine.add_point(p).unwrap();
        }
        let eye = Point3::new(0.0, -1000.0, 0.0);
        assert_eq!(engine.nearest_any_type(&Point3::origin(), &eye), Some(high));

        let empty = engine.nearest_any_type(&Point3::new(400.0, 0.0, 0.0), &eye);
        assert!(empty.is_none());
    }

    #[test]
    fn test_nearest_to_line() {
        let mut engine = engine();
        let part = PartConnections::new(
            PartId::new(4),
            Isometry3::identity(),
            vec![
                point(1, 4, ConnectionType::Stud, Point3::new(0.0, 0.0, 0.0)),
                point(2, 4, ConnectionType::Pin, Point3::new(20.0, 0.0, 0.0)),
                point(3, 4, ConnectionType::Stud, Point3::new(40.0, 0.0, 0.0)),
            ],
        );
        let l1 = Point3::new(22.0, -100.0, 0.0);
        let l2 = Point3::new(22.0, 100.0, 0.0);

        assert_eq!(engine.nearest_to_line(&part, &l1, &l2).unwrap().id().raw(), 2);
        assert_eq!(
            engine
                .nearest_to_line_of_type(ConnectionType::Stud, &part, &l1, &l2)
                .unwrap()
                .id()
                .raw(),
            3
        );

        engine.part_query_mut().hide(PartId::new(4));
        assert!(engine.nearest_to_line(&part, &l1, &l2).is_none());
    }

    #[test]
    fn test_rail_candidates() {
        let mut engine = engine();
        // rails along +Z
        let near = point(1, 1, ConnectionType::AxleHole, Point3::new(0.0, 0.0, 0.0));
        let far = point(2, 1, ConnectionType::AxleHole, Point3::new(100.0, 0.0, 0.0));
        let crossed = ConnectionPoint::new(
            ConnectionId::new(3),
            PartId::new(1),
            ConnectionType::AxleHole,
            Point3::new(0.0, 5.0, 0.0),
            Point3::new(20.0, 5.0, 0.0),
        );
        for p in [near, far, crossed] {
            engine.add_point(p).unwrap();
        }

        // an axle pointing -Z (reverse direction still qualifies)
        let moved = ConnectionPoint::new(
            ConnectionId::new(10),
            PartId::new(2),
            ConnectionType::Axle,
            Point3::new(4.0, 0.0, 10.0),
            Point3::new(4.0, 0.0, -10.0),
        );
        let eye = Point3::new(4.0, -1000.0, 10.0);
        let rails = engine.rail_candidates(ConnectionType::AxleHole, &moved, &eye);
        assert_eq!(rails, vec![near]);
    }
}
