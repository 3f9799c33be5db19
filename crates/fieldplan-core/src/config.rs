//! Planner constants and tuning knobs.

use serde::{Deserialize, Serialize};

/// Configuration for coverage planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Safety border inside the field edges where points are invalid
    pub margin: f64,
    /// Zigzag row spacing as a multiple of the coverage radius
    pub row_spacing_factor: f64,
    /// Sweep/grid step as a multiple of the coverage radius
    pub sweep_step_factor: f64,
    /// Angle increment of the spiral in radians
    pub spiral_angle_step: f64,
    /// Residual bound for the smoothing spline (0 = interpolate)
    pub smoothing_factor: f64,
    /// Resampled points per input point after smoothing
    pub resample_factor: usize,
    /// Average traversal speed (distance units per time unit)
    pub average_speed: f64,
    /// Spraying rate applied when the caller gives none
    pub default_spraying_rate: f64,
    /// Largest routing lattice the planner will allocate
    pub max_lattice_nodes: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            margin: 1.0,
            row_spacing_factor: 1.2,
            sweep_step_factor: 0.5,
            spiral_angle_step: 0.1,
            smoothing_factor: 0.5,
            resample_factor: 2,
            average_speed: 10.0,
            default_spraying_rate: 1.0,
            max_lattice_nodes: 50_000_000,
        }
    }
}

impl PlannerConfig {
    /// Distance between zigzag rows for a coverage radius.
    pub fn row_spacing(&self, coverage_radius: f64) -> f64 {
        coverage_radius * self.row_spacing_factor
    }

    /// Step between sweep samples (and candidate grid points).
    pub fn sweep_step(&self, coverage_radius: f64) -> f64 {
        coverage_radius * self.sweep_step_factor
    }
}
