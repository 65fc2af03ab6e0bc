//! Tunables shared by every execution strategy.

use serde::Deserialize;

use crate::error::{RaycastError, Result};

/// Distance written for triangles the ray misses.
///
/// Outcomes at or beyond this value are ignored by the reducer, which keeps
/// misses comparable numbers in the parallel outcome array.
pub const MISS_DISTANCE: f64 = 1_000_000.0;

/// Determinant threshold for the single-sided culling test.
///
/// The smallest positive subnormal `f32`, so only triangles seen edge-on or
/// from behind are rejected.
pub const DET_EPSILON: f64 = 1.401_298_464_324_817e-45;

/// Default work-group width for the CPU parallel backend.
pub const DEFAULT_GROUP_WIDTH: u32 = 64;

/// Ray cast settings.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// group_width = 256
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RaycastConfig {
    /// Determinant threshold passed to the kernel.
    pub epsilon: f64,
    /// Sentinel distance marking a miss.
    pub miss_distance: f64,
    /// Triangles per work group on the CPU parallel backend.
    pub group_width: u32,
}

impl RaycastConfig {
    /// Parse a config from TOML text and [`validate`](Self::validate) it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values the kernel and reducer depend on.
    ///
    /// `miss_distance` must be finite and at least [`MISS_DISTANCE`], since
    /// every hit at or beyond it is dropped. `epsilon` must be finite and
    /// positive.
    pub fn validate(&self) -> Result<()> {
        if !self.miss_distance.is_finite() || self.miss_distance < MISS_DISTANCE {
            return Err(RaycastError::InvalidConfig {
                field: "miss_distance",
                value: self.miss_distance,
                reason: "must be finite and >= 1000000",
            });
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(RaycastError::InvalidConfig {
                field: "epsilon",
                value: self.epsilon,
                reason: "must be finite and > 0",
            });
        }
        Ok(())
    }
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            epsilon: DET_EPSILON,
            miss_distance: MISS_DISTANCE,
            group_width: DEFAULT_GROUP_WIDTH,
        }
    }
}
