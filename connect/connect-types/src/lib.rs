//! Connection point model for snapping construction parts together.
//!
//! This crate holds the data shared by the spatial index and the snap engine:
//!
//! - [`ConnectionType`] and [`ConnectionFamily`] - what kind of feature a point is
//!   and which type it docks into
//! - [`ConnectionPoint`] - an immutable, typed, oriented feature on a placed part
//! - [`MovedPoint`] - a candidate feature dragged along with its part
//! - [`AttachmentSpec`] - a part-local feature definition, placed into world space
//! - [`IdGenerator`] - shared monotonic ids for points and index nodes
//! - [`geom`] - point/line/segment helpers used by the matching rules
//!
//! # Units
//!
//! Coordinates are `f64` in LDraw units (LDU). One brick stud pitch is 20 LDU.
//!
//! # Example
//!
//! ```
//! use connect_types::{AttachmentSpec, ConnectionType, IdGenerator, PartId};
//! use nalgebra::{Isometry3, Point3};
//!
//! let ids = IdGenerator::new();
//! let stud = AttachmentSpec::new(
//!     ConnectionType::Stud,
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(0.0, -4.0, 0.0),
//! );
//!
//! let point = stud.place(PartId::new(1), &Isometry3::translation(0.0, -24.0, 0.0), &ids);
//! assert_eq!(point.connection_type().opposite(), ConnectionType::StudReceiver);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod connection;
mod error;
pub mod geom;
mod ids;
mod point;

pub use connection::{ConnectionFamily, ConnectionType};
pub use error::TypeError;
pub use ids::{ConnectionId, IdGenerator, PartId};
pub use point::{AttachmentSpec, ConnectionPoint, MovedPoint, place_all};

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};
