//! Matching thresholds.

use crate::error::{SnapError, SnapResult};

/// Thresholds used by the docking rules.
///
/// Radii are squared distances in LDU² measured from a point to the
/// eye–cursor line. Cosines compare directions.
///
/// # Example
///
/// ```
/// use connect_snap::SnapParams;
///
/// let params = SnapParams::default();
/// assert!((params.vector_radius_sq - 100.0).abs() < 1e-12);
///
/// let loose = SnapParams::default().with_vector_min_cos(0.5);
/// assert!(loose.validate().is_ok());
/// assert!(SnapParams::default().with_aligned_cos(1.5).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapParams {
    /// Search radius² around the cursor ray for vector targets.
    pub vector_radius_sq: f64,

    /// Search radius² around the cursor ray for point targets.
    pub point_radius_sq: f64,

    /// Search radius² for [`nearest_any_type`](crate::SnapEngine::nearest_any_type).
    pub any_type_radius_sq: f64,

    /// Largest distance between the cursor ray and a rail axis.
    pub rail_proximity: f64,

    /// Smallest cosine between a vector feature and its target.
    pub vector_min_cos: f64,

    /// Smallest `|cos|` between a rail feature and its target.
    pub rail_min_cos: f64,

    /// Cosine above which two directions need no rotation.
    pub aligned_cos: f64,
}

impl Default for SnapParams {
    fn default() -> Self {
        Self {
            vector_radius_sq: 100.0,
            point_radius_sq: 100.0,
            any_type_radius_sq: 9.0,
            rail_proximity: 10.0,
            vector_min_cos: 0.70,
            rail_min_cos: 0.9,
            aligned_cos: 0.999,
        }
    }
}

impl SnapParams {
    /// Set the vector search radius².
    #[must_use]
    pub const fn with_vector_radius_sq(mut self, radius_sq: f64) -> Self {
        self.vector_radius_sq = radius_sq;
        self
    }

    /// Set the point search radius².
    #[must_use]
    pub const fn with_point_radius_sq(mut self, radius_sq: f64) -> Self {
        self.point_radius_sq = radius_sq;
        self
    }

    /// Set the any-type search radius².
    #[must_use]
    pub const fn with_any_type_radius_sq(mut self, radius_sq: f64) -> Self {
        self.any_type_radius_sq = radius_sq;
        self
    }

    /// Set the rail proximity.
    #[must_use]
    pub const fn with_rail_proximity(mut self, distance: f64) -> Self {
        self.rail_proximity = distance;
        self
    }

    /// Set the minimum vector cosine.
    #[must_use]
    pub const fn with_vector_min_cos(mut self, cos: f64) -> Self {
        self.vector_min_cos = cos;
        self
    }

    /// Set the minimum rail `|cos|`.
    #[must_use]
    pub const fn with_rail_min_cos(mut self, cos: f64) -> Self {
        self.rail_min_cos = cos;
        self
    }

    /// Set the aligned cosine.
    #[must_use]
    pub const fn with_aligned_cos(mut self, cos: f64) -> Self {
        self.aligned_cos = cos;
        self
    }

    /// Check that all thresholds are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SnapError::InvalidParams`] if a radius is negative or `NaN`,
    /// or a cosine lies outside `[-1, 1]`.
    pub fn validate(&self) -> SnapResult<()> {
        let distances = [
            ("vector_radius_sq", self.vector_radius_sq),
            ("point_radius_sq", self.point_radius_sq),
            ("any_type_radius_sq", self.any_type_radius_sq),
            ("rail_proximity", self.rail_proximity),
        ];
        for (name, value) in distances {
            if value.is_nan() || value < 0.0 {
                return Err(SnapError::InvalidParams { name, value });
            }
        }

        let cosines = [
            ("vector_min_cos", self.vector_min_cos),
            ("rail_min_cos", self.rail_min_cos),
            ("aligned_cos", self.aligned_cos),
        ];
        for (name, value) in cosines {
            if !(-1.0..=1.0).contains(&value) {
                return Err(SnapError::InvalidParams { name, value });
            }
        }
        Ok(())
    }
}
