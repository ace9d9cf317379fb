//! Property-based tests for the connection grid.
//!
//! Run with: cargo test -p connect-grid --test proptest_grid

#![allow(clippy::unwrap_used)]

use connect_grid::{ConnGrid, GridConfig, GridCoord};
use connect_types::{ConnectionId, ConnectionPoint, ConnectionType, PartId};
use nalgebra::Point3;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_position() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-5_000.0..5_000.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_type() -> impl Strategy<Value = ConnectionType> {
    (0..ConnectionType::COUNT).prop_map(|i| ConnectionType::ALL[i])
}

fn arb_points(max: usize) -> impl Strategy<Value = Vec<ConnectionPoint>> {
    prop::collection::vec((arb_position(), arb_type()), 1..max).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (p1, ty))| {
                ConnectionPoint::new(
                    ConnectionId::new(i as u64 + 1),
                    PartId::new(1),
                    ty,
                    p1,
                    p1 + nalgebra::Vector3::new(0.0, 0.0, 20.0),
                )
            })
            .collect()
    })
}

fn arb_config() -> impl Strategy<Value = GridConfig> {
    (1.0..500.0f64, 1u32..8, 0.0..50.0f64).prop_map(|(cell, factor, tol)| {
        GridConfig::default()
            .with_cell_size(cell)
            .with_super_cell_factor(factor)
            .with_tolerance(tol)
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn bucket_coord_is_deterministic(p in arb_position(), config in arb_config()) {
        let a = ConnGrid::new(config).unwrap();
        let b = ConnGrid::new(config).unwrap();
        prop_assert_eq!(a.bucket_coord(&p), b.bucket_coord(&p));
        prop_assert_eq!(a.supernode_coord(&p), a.supernode_coord(&p));
    }

    #[test]
    fn bucket_lies_in_its_supernode(p in arb_position(), config in arb_config()) {
        let grid = ConnGrid::new(config).unwrap();
        let bucket = grid.bucket_coord(&p);
        let node = grid.supernode_coord(&p);
        let factor = i32::try_from(config.super_cell_factor).unwrap();
        for (b, s) in [(bucket.x, node.x), (bucket.y, node.y), (bucket.z, node.z)] {
            prop_assert!(b >= s * factor && b < (s + 1) * factor);
        }
    }

    #[test]
    fn locate_agrees_with_bucket_coord(p in arb_position(), config in arb_config()) {
        let mut grid = ConnGrid::new(config).unwrap();
        let handle = grid.locate(&p).unwrap();
        let bucket = grid.bucket(handle).unwrap();
        prop_assert_eq!(bucket.coord(), grid.bucket_coord(&p));
        prop_assert_eq!(grid.find(&p), Some(handle));
        prop_assert_eq!(grid.locate(&p).unwrap(), handle);
    }

    #[test]
    fn every_point_lives_in_exactly_one_bucket(points in arb_points(64)) {
        let mut grid = ConnGrid::default();
        for p in &points {
            grid.insert(*p).unwrap();
        }
        prop_assert_eq!(grid.point_count(), points.len());

        for p in &points {
            let holders: Vec<GridCoord> = grid
                .buckets()
                .filter(|b| b.points(p.connection_type()).iter().any(|q| q.id() == p.id()))
                .map(|b| b.coord())
                .collect();
            prop_assert_eq!(holders, vec![grid.bucket_coord(p.p1())]);
        }
    }

    #[test]
    fn insert_then_remove_leaves_no_trace(points in arb_points(64)) {
        let mut grid = ConnGrid::default();
        for p in &points {
            grid.insert(*p).unwrap();
        }
        let buckets = grid.bucket_count();

        for p in &points {
            prop_assert!(grid.remove(p));
            let eye = p.p1() + nalgebra::Vector3::new(0.0, -1_000.0, 0.0);
            let hits = grid.ray_query(p.connection_type(), &eye, p.p1());
            prop_assert!(hits.iter().all(|h| h.id() != p.id()));
        }
        prop_assert!(grid.is_empty());
        prop_assert_eq!(grid.bucket_count(), buckets);

        // removing again is a no-op
        for p in &points {
            prop_assert!(!grid.remove(p));
        }

        prop_assert_eq!(grid.prune_empty(), buckets);
        prop_assert_eq!(grid.bucket_count(), 0);
        prop_assert_eq!(grid.supernode_count(), 0);
    }
}
