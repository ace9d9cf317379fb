//! Grid configuration.

use crate::error::{GridError, GridResult};

/// Default bucket edge length in LDU.
pub const DEFAULT_CELL_SIZE: f64 = 160.0;

/// Default number of buckets per supernode edge.
pub const DEFAULT_SUPER_CELL_FACTOR: u32 = 4;

/// Default AABB padding in LDU.
pub const DEFAULT_TOLERANCE: f64 = 10.0;

/// Sizing of the two-level grid.
///
/// With the defaults every bucket is 160×160×160 LDU and every supernode is
/// (160·4)³ = 640×640×640 LDU. Both levels pad their bounding boxes by
/// `tolerance` on every side, so a ray grazing a cell edge still visits it.
///
/// # Example
///
/// ```
/// use connect_grid::GridConfig;
///
/// let config = GridConfig::default();
/// assert!((config.cell_size - 160.0).abs() < 1e-10);
/// assert!((config.super_cell_size() - 640.0).abs() < 1e-10);
///
/// let tight = GridConfig::default().with_tolerance(0.0);
/// assert!(tight.validate().is_ok());
///
/// let bad = GridConfig::default().with_tolerance(-1.0);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig {
    /// Edge length of a bucket.
    pub cell_size: f64,

    /// Buckets per supernode edge.
    pub super_cell_factor: u32,

    /// Padding added to every bounding box.
    pub tolerance: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            super_cell_factor: DEFAULT_SUPER_CELL_FACTOR,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl GridConfig {
    /// Set the bucket edge length.
    #[must_use]
    pub const fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the number of buckets per supernode edge.
    #[must_use]
    pub const fn with_super_cell_factor(mut self, factor: u32) -> Self {
        self.super_cell_factor = factor;
        self
    }

    /// Set the bounding box padding.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Edge length of a supernode.
    #[must_use]
    pub fn super_cell_size(&self) -> f64 {
        self.cell_size * f64::from(self.super_cell_factor)
    }

    /// Check that the configuration describes a usable grid.
    ///
    /// # Errors
    ///
    /// - [`GridError::NegativeTolerance`] if `tolerance < 0` or is `NaN`
    /// - [`GridError::InvalidCellSize`] if `cell_size` is not finite and positive
    /// - [`GridError::InvalidSuperCellFactor`] if `super_cell_factor` is zero
    pub fn validate(&self) -> GridResult<()> {
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(GridError::NegativeTolerance(self.tolerance));
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(self.cell_size));
        }
        if self.super_cell_factor == 0 {
            return Err(GridError::InvalidSuperCellFactor(self.super_cell_factor));
        }
        Ok(())
    }
}
