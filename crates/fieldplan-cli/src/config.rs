//! Caller-side limits from environment.

use std::env;

pub const DEFAULT_MAX_FIELD_DIM: f64 = 10_000.0;
pub const DEFAULT_MAX_SAMPLE_CELLS: usize = 4_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Largest accepted field width or height.
    pub max_field_dim: f64,
    /// Upper bound on area-estimation grid cells, lattice nodes and
    /// rendered grid cells for a single request.
    pub max_sample_cells: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_field_dim: DEFAULT_MAX_FIELD_DIM,
            max_sample_cells: DEFAULT_MAX_SAMPLE_CELLS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing, unparsable or
    /// non-positive values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            max_field_dim: lookup("FIELDPLAN_MAX_FIELD_DIM")
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(DEFAULT_MAX_FIELD_DIM),
            max_sample_cells: lookup("FIELDPLAN_MAX_SAMPLE_CELLS")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_MAX_SAMPLE_CELLS),
        }
    }
}
