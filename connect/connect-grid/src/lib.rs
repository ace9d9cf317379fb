//! Spatial index over connection points.
//!
//! A coarse, two-level uniform grid that answers one question quickly: which
//! connection points could lie near a ray from the eye through the cursor?
//!
//! - [`ConnGrid`] - the index: insert, remove and ray queries
//! - [`GridConfig`] - cell size, supernode factor and bounding box padding
//! - [`GridCoord`] - integer cell coordinates
//! - [`Aabb`] - padded cell bounds
//! - [`Ray`] - ray with the slab intersection test
//!
//! # Layout
//!
//! Points are bucketed by the cell containing their `p1`. Buckets (default
//! 160 LDU) are grouped into supernodes of `super_cell_factor³` buckets
//! (default 4, so 640 LDU). Both levels are padded by `tolerance` (default
//! 10 LDU), so a ray passing just outside a cell still visits it.
//!
//! Cells are created on first insert. Emptied cells are kept until
//! [`ConnGrid::prune_empty`] is called.
//!
//! # Example
//!
//! ```
//! use connect_grid::{ConnGrid, GridConfig};
//! use connect_types::{ConnectionPoint, ConnectionType, IdGenerator, PartId};
//! use nalgebra::Point3;
//! use std::sync::Arc;
//!
//! let ids = Arc::new(IdGenerator::new());
//! let mut grid = ConnGrid::with_ids(GridConfig::default(), Arc::clone(&ids)).unwrap();
//!
//! let hole = ConnectionPoint::with_generator(
//!     &ids,
//!     PartId::new(1),
//!     ConnectionType::PinHole,
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(0.0, 0.0, 20.0),
//! );
//! grid.insert(hole).unwrap();
//!
//! let eye = Point3::new(0.0, 0.0, -1000.0);
//! let near = grid.ray_query(ConnectionType::PinHole, &eye, &Point3::new(3.0, 0.0, 0.0));
//! assert_eq!(near.len(), 1);
//! assert_eq!(grid.bucket_count(), 1);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod aabb;
mod config;
mod coord;
mod error;
mod grid;
mod ray;

pub use aabb::Aabb;
pub use config::{DEFAULT_CELL_SIZE, DEFAULT_SUPER_CELL_FACTOR, DEFAULT_TOLERANCE, GridConfig};
pub use coord::GridCoord;
pub use error::{GridError, GridResult};
pub use grid::{Bucket, BucketHandle, ConnGrid, SuperNode};
pub use ray::Ray;
