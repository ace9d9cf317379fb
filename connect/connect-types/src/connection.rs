//! Connection families and connection types.
//!
//! Every attachment feature on a part has a [`ConnectionType`]. Types come in
//! compatible pairs: a type only docks into its [`opposite`](ConnectionType::opposite).
//! The [`ConnectionFamily`] decides which geometric test is used when docking.

use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// Geometric family of a connection type.
///
/// The family selects the matching rule used by the snap engine:
///
/// - [`Point`](Self::Point) - omnidirectional socket, orientation is ignored
/// - [`Vector`](Self::Vector) - directional connector, P1→P2 must roughly agree
/// - [`Rail`](Self::Rail) - elongated axis, the moving part may slide along it
/// - [`Other`](Self::Other) - never docks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionFamily {
    /// Ball/socket style connection.
    Point,
    /// Stud/tube or pin/hole style connection.
    Vector,
    /// Axle or bar style connection.
    Rail,
    /// Anything that does not take part in snapping.
    Other,
}

impl ConnectionFamily {
    /// Get a human-readable name for the family.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Vector => "vector",
            Self::Rail => "rail",
            Self::Other => "other",
        }
    }

    /// Returns `true` if connections of this family can ever lock.
    #[must_use]
    pub const fn can_snap(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

impl fmt::Display for ConnectionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of an attachment feature.
///
/// The set is fixed. Each type has a dense index in `0..ConnectionType::COUNT`
/// which spatial buckets use to keep one point list per type.
///
/// # Example
///
/// ```
/// use connect_types::{ConnectionFamily, ConnectionType};
///
/// let stud = ConnectionType::Stud;
/// assert_eq!(stud.family(), ConnectionFamily::Vector);
/// assert_eq!(stud.opposite(), ConnectionType::StudReceiver);
/// assert_eq!(stud.opposite().opposite(), stud);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionType {
    /// Stud on top of a brick.
    Stud,
    /// Tube or cavity that accepts a stud.
    StudReceiver,
    /// Technic pin.
    Pin,
    /// Round hole that accepts a pin.
    PinHole,
    /// Technic axle.
    Axle,
    /// Cross-shaped hole that accepts an axle.
    AxleHole,
    /// Bar or handle.
    Bar,
    /// Clip that grips a bar.
    Clip,
    /// Ball joint.
    Ball,
    /// Socket for a ball joint.
    BallSocket,
    /// End of a flexible element (hoses, strings).
    FlexEnd,
}

impl ConnectionType {
    /// Number of connection types.
    pub const COUNT: usize = 11;

    /// All connection types, in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Stud,
        Self::StudReceiver,
        Self::Pin,
        Self::PinHole,
        Self::Axle,
        Self::AxleHole,
        Self::Bar,
        Self::Clip,
        Self::Ball,
        Self::BallSocket,
        Self::FlexEnd,
    ];

    /// Dense index of this type, in `0..COUNT`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The family that decides how this type docks.
    #[must_use]
    pub const fn family(self) -> ConnectionFamily {
        match self {
            Self::Stud | Self::StudReceiver | Self::Pin | Self::PinHole => {
                ConnectionFamily::Vector
            }
            Self::Axle | Self::AxleHole | Self::Bar | Self::Clip => ConnectionFamily::Rail,
            Self::Ball | Self::BallSocket => ConnectionFamily::Point,
            Self::FlexEnd => ConnectionFamily::Other,
        }
    }

    /// The type that may dock into this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Stud => Self::StudReceiver,
            Self::StudReceiver => Self::Stud,
            Self::Pin => Self::PinHole,
            Self::PinHole => Self::Pin,
            Self::Axle => Self::AxleHole,
            Self::AxleHole => Self::Axle,
            Self::Bar => Self::Clip,
            Self::Clip => Self::Bar,
            Self::Ball => Self::BallSocket,
            Self::BallSocket => Self::Ball,
            Self::FlexEnd => Self::FlexEnd,
        }
    }

    /// Returns `true` if `other` may dock into this type.
    #[must_use]
    pub fn accepts(self, other: Self) -> bool {
        self.opposite() == other
    }

    /// Get the canonical name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stud => "stud",
            Self::StudReceiver => "stud_receiver",
            Self::Pin => "pin",
            Self::PinHole => "pin_hole",
            Self::Axle => "axle",
            Self::AxleHole => "axle_hole",
            Self::Bar => "bar",
            Self::Clip => "clip",
            Self::Ball => "ball",
            Self::BallSocket => "ball_socket",
            Self::FlexEnd => "flex_end",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypeError::UnknownType(s.to_string()))
    }
}

impl TryFrom<usize> for ConnectionType {
    type Error = TypeError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(TypeError::IndexOutOfRange {
                index,
                count: Self::COUNT,
            })
    }
}
