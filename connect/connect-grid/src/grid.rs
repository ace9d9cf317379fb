//! Two-level uniform grid over connection points.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use connect_types::{ConnectionPoint, ConnectionType, IdGenerator};
use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::{debug, info, trace, warn};

use crate::aabb::Aabb;
use crate::config::GridConfig;
use crate::coord::GridCoord;
use crate::error::{GridError, GridResult};
use crate::ray::Ray;

/// Handle to a bucket in a [`ConnGrid`] (generational).
///
/// Handles stay valid until the bucket is dropped by
/// [`ConnGrid::prune_empty`] or [`ConnGrid::clear`]. A dropped bucket's
/// arena slot is reused, but under a new generation, so an old handle never
/// reaches the new bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketHandle {
    index: usize,
    generation: u32,
}

impl BucketHandle {
    /// Position of the bucket in the grid's arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }

    /// Generation of the arena slot when the handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// Arena slot. The generation is bumped each time the slot is freed.
#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    bucket: Option<Bucket>,
}

/// A leaf cell of the grid.
///
/// Holds one ordered list of points per connection type. A point lives in
/// the bucket that contains its `p1`, and nowhere else.
#[derive(Debug, Clone)]
pub struct Bucket {
    id: u64,
    coord: GridCoord,
    bounds: Aabb,
    lists: [Vec<ConnectionPoint>; ConnectionType::COUNT],
}

impl Bucket {
    fn new(id: u64, coord: GridCoord, bounds: Aabb) -> Self {
        Self {
            id,
            coord,
            bounds,
            lists: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Node id drawn from the grid's id generator.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Cell coordinate.
    #[must_use]
    pub const fn coord(&self) -> GridCoord {
        self.coord
    }

    /// Padded world bounds.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Points of one connection type, in insertion order.
    #[must_use]
    pub fn points(&self, connection_type: ConnectionType) -> &[ConnectionPoint] {
        &self.lists[connection_type.index()]
    }

    /// All points, grouped by type.
    pub fn iter(&self) -> impl Iterator<Item = &ConnectionPoint> {
        self.lists.iter().flatten()
    }

    /// Number of points across all types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    /// Returns `true` if the bucket holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }
}

/// A first-level cell grouping `super_cell_factor³` buckets.
#[derive(Debug, Clone)]
pub struct SuperNode {
    id: u64,
    coord: GridCoord,
    bounds: Aabb,
    children: BTreeMap<(i32, i32, i32), BucketHandle>,
}

impl SuperNode {
    /// Node id drawn from the grid's id generator.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Supernode coordinate.
    #[must_use]
    pub const fn coord(&self) -> GridCoord {
        self.coord
    }

    /// Padded world bounds.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Handles of the child buckets, ordered X, then Z, then Y.
    pub fn children(&self) -> impl Iterator<Item = BucketHandle> + '_ {
        self.children.values().copied()
    }

    /// Number of child buckets.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Spatial index of connection points.
///
/// Points are bucketed by `floor(p1 / cell_size)`; buckets are grouped into
/// supernodes of `super_cell_factor` cells per axis. Both levels keep a
/// bounding box padded by `tolerance`, and a ray query tests supernodes
/// first and only descends into the ones the ray crosses.
///
/// Buckets are created on first use and stay when emptied. Call
/// [`prune_empty`](Self::prune_empty) to drop them.
///
/// # Example
///
/// ```
/// use connect_grid::ConnGrid;
/// use connect_types::{ConnectionId, ConnectionPoint, ConnectionType, PartId};
/// use nalgebra::Point3;
///
/// let mut grid = ConnGrid::default();
/// let stud = ConnectionPoint::new(
///     ConnectionId::new(1),
///     PartId::new(1),
///     ConnectionType::Stud,
///     Point3::new(10.0, 0.0, 10.0),
///     Point3::new(10.0, -4.0, 10.0),
/// );
/// grid.insert(stud).unwrap();
///
/// let hits = grid.ray_query(
///     ConnectionType::Stud,
///     &Point3::new(10.0, -500.0, 10.0),
///     &Point3::new(10.0, 0.0, 10.0),
/// );
/// assert_eq!(hits.len(), 1);
/// ```
#[derive(Debug)]
pub struct ConnGrid {
    config: GridConfig,
    ids: Arc<IdGenerator>,
    supernodes: BTreeMap<(i32, i32, i32), SuperNode>,
    slots: Vec<Slot>,
    free: Vec<usize>,
    lookup: HashMap<GridCoord, BucketHandle>,
}

impl Default for ConnGrid {
    fn default() -> Self {
        Self::build(GridConfig::default(), Arc::new(IdGenerator::new()))
    }
}

impl ConnGrid {
    /// Create an empty grid with its own id generator.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`GridConfig::validate`].
    pub fn new(config: GridConfig) -> GridResult<Self> {
        Self::with_ids(config, Arc::new(IdGenerator::new()))
    }

    /// Create an empty grid drawing node ids from a shared generator.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`GridConfig::validate`].
    pub fn with_ids(config: GridConfig, ids: Arc<IdGenerator>) -> GridResult<Self> {
        config.validate()?;
        Ok(Self::build(config, ids))
    }

    fn build(config: GridConfig, ids: Arc<IdGenerator>) -> Self {
        Self {
            config,
            ids,
            supernodes: BTreeMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// The grid configuration.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The id generator shared with this grid.
    #[must_use]
    pub fn ids(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    /// Coordinate of the bucket containing `p`.
    #[must_use]
    pub fn bucket_coord(&self, p: &Point3<f64>) -> GridCoord {
        GridCoord::from_world(p, self.config.cell_size)
    }

    /// Coordinate of the supernode containing `p`.
    ///
    /// Derived from the bucket coordinate so that a bucket always falls
    /// inside exactly one supernode.
    #[must_use]
    pub fn supernode_coord(&self, p: &Point3<f64>) -> GridCoord {
        self.supernode_of(self.bucket_coord(p))
    }

    fn supernode_of(&self, bucket: GridCoord) -> GridCoord {
        let factor = i32::try_from(self.config.super_cell_factor).unwrap_or(i32::MAX);
        GridCoord::new(
            bucket.x.div_euclid(factor),
            bucket.y.div_euclid(factor),
            bucket.z.div_euclid(factor),
        )
    }

    /// Handle of the bucket containing `p`, if it exists.
    #[must_use]
    pub fn find(&self, p: &Point3<f64>) -> Option<BucketHandle> {
        self.lookup.get(&self.bucket_coord(p)).copied()
    }

    /// Handle of the bucket containing `p`, creating it (and its supernode)
    /// when missing.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::AllocationFailed`] if the index can't grow.
    pub fn locate(&mut self, p: &Point3<f64>) -> GridResult<BucketHandle> {
        let coord = self.bucket_coord(p);
        if let Some(&handle) = self.lookup.get(&coord) {
            return Ok(handle);
        }

        let super_coord = self.supernode_of(coord);
        if !self.supernodes.contains_key(&super_coord.key()) {
            let node = SuperNode {
                id: self.ids.next_node_id(),
                coord: super_coord,
                bounds: Aabb::padded_cell(
                    super_coord,
                    self.config.super_cell_size(),
                    self.config.tolerance,
                ),
                children: BTreeMap::new(),
            };
            debug!(id = node.id, coord = %super_coord, "Created supernode");
            self.supernodes.insert(super_coord.key(), node);
        }

        if self.free.is_empty() {
            self.slots
                .try_reserve(1)
                .map_err(|_| GridError::AllocationFailed {
                    what: "bucket arena",
                })?;
        }
        self.lookup
            .try_reserve(1)
            .map_err(|_| GridError::AllocationFailed {
                what: "bucket lookup",
            })?;

        let bucket = Bucket::new(
            self.ids.next_node_id(),
            coord,
            Aabb::padded_cell(coord, self.config.cell_size, self.config.tolerance),
        );
        debug!(id = bucket.id, coord = %coord, supernode = %super_coord, "Created bucket");

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.bucket = Some(bucket);
                BucketHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    bucket: Some(bucket),
                });
                BucketHandle {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };
        self.lookup.insert(coord, handle);
        if let Some(node) = self.supernodes.get_mut(&super_coord.key()) {
            node.children.insert(coord.key(), handle);
        }
        Ok(handle)
    }

    /// Add a point to the bucket containing its `p1`.
    ///
    /// Points are not deduplicated; inserting the same point twice stores
    /// it twice.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::AllocationFailed`] if the index can't grow.
    pub fn insert(&mut self, point: ConnectionPoint) -> GridResult<BucketHandle> {
        if !point.is_finite() {
            warn!(id = %point.id(), "Inserting connection point with non-finite coordinates");
        } else if !GridCoord::in_range(point.p1(), self.config.cell_size) {
            warn!(
                id = %point.id(),
                cell_size = self.config.cell_size,
                "Connection point lies outside the indexed range, ray queries may miss it"
            );
        }
        let handle = self.locate(point.p1())?;
        let bucket = self.bucket_mut(handle)?;
        let list = &mut bucket.lists[point.connection_type().index()];
        list.try_reserve(1)
            .map_err(|_| GridError::AllocationFailed {
                what: "bucket point list",
            })?;
        list.push(point);
        Ok(handle)
    }

    /// Remove a point, matched by id, from the bucket containing its `p1`.
    ///
    /// Returns `false` if the point was not there. Emptied buckets are kept.
    pub fn remove(&mut self, point: &ConnectionPoint) -> bool {
        let Some(handle) = self.find(point.p1()) else {
            return false;
        };
        let Ok(bucket) = self.bucket_mut(handle) else {
            return false;
        };
        let list = &mut bucket.lists[point.connection_type().index()];
        match list.iter().position(|p| p.id() == point.id()) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Bucket behind a handle, or `None` if it was pruned.
    #[must_use]
    pub fn bucket(&self, handle: BucketHandle) -> Option<&Bucket> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.bucket.as_ref())
    }

    fn bucket_mut(&mut self, handle: BucketHandle) -> GridResult<&mut Bucket> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.bucket.as_mut())
            .ok_or(GridError::InvalidBucket(handle))
    }

    fn live_buckets(&self) -> impl Iterator<Item = &Bucket> + '_ {
        self.slots.iter().filter_map(|slot| slot.bucket.as_ref())
    }

    /// Release a slot for reuse and bump its generation.
    fn free_slot(&mut self, index: usize) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if slot.bucket.take().is_some() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index);
        }
    }

    /// Points of one type stored in a bucket.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidBucket`] if the handle is stale.
    pub fn points_in(
        &self,
        handle: BucketHandle,
        connection_type: ConnectionType,
    ) -> GridResult<&[ConnectionPoint]> {
        self.bucket(handle)
            .map(|b| b.points(connection_type))
            .ok_or(GridError::InvalidBucket(handle))
    }

    /// Buckets whose padded bounds the ray crosses.
    ///
    /// Supernodes are tested first; buckets are visited X, then Z, then Y.
    pub fn buckets_on_ray(&self, ray: Ray) -> impl Iterator<Item = &Bucket> + '_ {
        self.supernodes
            .values()
            .filter(move |node| ray.intersects(&node.bounds))
            .flat_map(|node| node.children.values())
            .filter_map(move |&handle| self.bucket(handle))
            .filter(move |bucket| ray.intersects(&bucket.bounds))
    }

    /// Points of `connection_type` in every bucket crossed by the ray from
    /// `eye` toward `target`.
    ///
    /// This is a coarse filter: callers still measure the distance from each
    /// point to the ray. A non-finite ray returns nothing.
    #[must_use]
    pub fn ray_query(
        &self,
        connection_type: ConnectionType,
        eye: &Point3<f64>,
        target: &Point3<f64>,
    ) -> Vec<ConnectionPoint> {
        let ray = Ray::through(eye, target);
        let mut visited = 0_usize;
        let mut hits = Vec::new();
        for bucket in self.buckets_on_ray(ray) {
            visited += 1;
            hits.extend_from_slice(bucket.points(connection_type));
        }
        trace!(
            connection_type = %connection_type,
            buckets = visited,
            candidates = hits.len(),
            "Ray query"
        );
        hits
    }

    /// Points of every type in the buckets crossed by the ray.
    #[must_use]
    pub fn ray_query_all(&self, eye: &Point3<f64>, target: &Point3<f64>) -> Vec<ConnectionPoint> {
        let ray = Ray::through(eye, target);
        self.buckets_on_ray(ray)
            .flat_map(Bucket::iter)
            .copied()
            .collect()
    }

    /// Drop empty buckets and the supernodes left without children.
    ///
    /// Handles to dropped buckets become stale and their arena slots are
    /// reused by later buckets. Returns the number of buckets dropped.
    pub fn prune_empty(&mut self) -> usize {
        let empty: Vec<(usize, GridCoord)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.bucket
                    .as_ref()
                    .filter(|bucket| bucket.is_empty())
                    .map(|bucket| (index, bucket.coord))
            })
            .collect();
        let pruned = empty.len();

        for (index, coord) in empty {
            let super_key = self.supernode_of(coord).key();
            if let Some(node) = self.supernodes.get_mut(&super_key) {
                node.children.remove(&coord.key());
            }
            self.lookup.remove(&coord);
            self.free_slot(index);
        }

        let before = self.supernodes.len();
        self.supernodes.retain(|_, node| !node.children.is_empty());
        let dropped_supernodes = before - self.supernodes.len();

        if pruned > 0 {
            info!(
                buckets = pruned,
                supernodes = dropped_supernodes,
                "Pruned empty grid cells"
            );
        }
        pruned
    }

    /// Remove every point and node. All handles become stale.
    ///
    /// The arena keeps its slots for reuse.
    pub fn clear(&mut self) {
        self.supernodes.clear();
        self.lookup.clear();
        for index in 0..self.slots.len() {
            self.free_slot(index);
        }
    }

    /// Number of live buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.lookup.len()
    }

    /// Number of supernodes.
    #[must_use]
    pub fn supernode_count(&self) -> usize {
        self.supernodes.len()
    }

    /// Number of stored points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.live_buckets().map(Bucket::len).sum()
    }

    /// Returns `true` if no points are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_buckets().all(Bucket::is_empty)
    }

    /// Number of arena slots, live or free.
    ///
    /// Bounded by the largest number of buckets alive at once.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Live buckets, ordered by supernode and then by cell (X, Z, Y).
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> + '_ {
        self.supernodes
            .values()
            .flat_map(|node| node.children.values())
            .filter_map(move |&handle| self.bucket(handle))
    }

    /// Supernodes, ordered X, then Z, then Y.
    pub fn supernodes(&self) -> impl Iterator<Item = &SuperNode> + '_ {
        self.supernodes.values()
    }
}

impl fmt::Display for ConnGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConnGrid: {} supernodes, {} buckets, {} points (cell {}, factor {}, tolerance {})",
            self.supernode_count(),
            self.bucket_count(),
            self.point_count(),
            self.config.cell_size,
            self.config.super_cell_factor,
            self.config.tolerance
        )
    }
}
