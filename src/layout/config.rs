//! Configuration for the layout engine

use serde::Deserialize;

use super::error::LayoutError;

/// Half-width of the logical interval used when an axis has no extent
pub const DEFAULT_COORDINATE_EPSILON: f64 = 1e-4;

/// Configuration options for layout computation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Logical padding for axes with no (or a single) observed value
    pub coordinate_epsilon: f64,

    /// A row counts as satisfied when `|A x - b|` stays below this
    pub residual_tolerance: f64,

    /// Step used to probe each unknown for the unconstrained check
    pub perturbation: f64,

    /// Residual change (per unit of perturbation) below which an unknown is free
    pub unconstrained_threshold: f64,

    /// Pivots smaller than this (relative to the largest entry) mark the system singular
    pub pivot_tolerance: f64,

    /// Solved values this close to an integer snap to it before truncation
    pub integer_snap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            coordinate_epsilon: DEFAULT_COORDINATE_EPSILON,
            residual_tolerance: 1e-4,
            perturbation: 0.1,
            unconstrained_threshold: 1e-6,
            pivot_tolerance: 1e-10,
            integer_snap: 1e-6,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the coordinate epsilon
    pub fn with_coordinate_epsilon(mut self, epsilon: f64) -> Self {
        self.coordinate_epsilon = epsilon;
        self
    }

    /// Set the residual tolerance used by the diagnostics pass
    pub fn with_residual_tolerance(mut self, tolerance: f64) -> Self {
        self.residual_tolerance = tolerance;
        self
    }

    /// Reject settings that would leave an inferred axis without extent
    pub fn validate(&self) -> Result<(), LayoutError> {
        let epsilon = self.coordinate_epsilon;
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(LayoutError::InvalidEpsilon { epsilon });
        }
        Ok(())
    }

    /// Set the pivot tolerance for singularity detection
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }
}
