//! Snap-matching engine for construction parts.
//!
//! While a part is dragged, the engine looks along the ray from the eye
//! through the cursor for connection points that fit the dragged part's own
//! points, and decides where the part should dock:
//!
//! - [`SnapEngine`] - point registries, proximity queries and docking
//! - [`SnapParams`] - search radii and angle thresholds
//! - [`PartQuery`] - visibility of placed parts, supplied by the caller
//! - [`PartConnections`] - a part's placement and its points
//! - [`SnapOutcome`] and [`LockState`] - the docking decision
//! - [`SnapSession`] - the caller's cache of the last decision
//!
//! # Families
//!
//! | Family | Types | Rule |
//! |--------|-------|------|
//! | Vector | studs, pins | same direction within `acos(0.70)`; rotate unless within `acos(0.999)` |
//! | Rail | axles, bars | slide along the target axis; segments must overlap; may flip 180° |
//! | Point | balls | any direction; closest to the eye wins |
//! | Other | flex ends | never docks |
//!
//! # Example
//!
//! ```
//! use connect_snap::{HiddenParts, SnapEngine};
//! use connect_types::{ConnectionPoint, ConnectionType, PartId};
//! use nalgebra::Point3;
//!
//! let mut engine = SnapEngine::builder()
//!     .part_query(HiddenParts::new())
//!     .build()
//!     .unwrap();
//!
//! let socket = ConnectionPoint::with_generator(
//!     engine.ids(),
//!     PartId::new(1),
//!     ConnectionType::BallSocket,
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! );
//! engine.add_point(socket).unwrap();
//!
//! let eye = Point3::new(0.0, -500.0, 0.0);
//! let hit = engine.nearest_any_type(&Point3::new(1.0, 0.0, 0.0), &eye);
//! assert_eq!(hit, Some(socket));
//!
//! engine.part_query_mut().hide(PartId::new(1));
//! assert!(engine.nearest_any_type(&Point3::new(1.0, 0.0, 0.0), &eye).is_none());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod engine;
mod error;
mod matching;
mod outcome;
mod params;
mod part;
mod query;
mod session;

pub use engine::{SnapEngine, SnapEngineBuilder};
pub use error::{SnapError, SnapResult};
pub use outcome::{LockState, SnapOutcome};
pub use params::SnapParams;
pub use part::PartConnections;
pub use query::{AllVisible, HiddenParts, PartQuery};
pub use session::SnapSession;
