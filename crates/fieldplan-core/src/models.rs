//! Core data models for the coverage planner.

use crate::error::PlanError;
use crate::field::Obstacle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A bare position in field coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A planned stop with the rate to spray at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_spraying_rate")]
    pub spraying_rate: f64,
}

fn default_spraying_rate() -> f64 {
    1.0
}

impl Waypoint {
    pub fn new(x: f64, y: f64, spraying_rate: f64) -> Self {
        Self {
            x,
            y,
            spraying_rate,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Coverage strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pattern {
    /// Boustrophedon row sweep
    Zigzag,
    /// Outward Archimedean spiral around the start point
    Spiral,
    /// Greedy nearest-neighbor walk over a candidate grid
    Custom,
}

impl Pattern {
    pub const ALL: [Pattern; 3] = [Pattern::Zigzag, Pattern::Spiral, Pattern::Custom];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Zigzag => "zigzag",
            Pattern::Spiral => "spiral",
            Pattern::Custom => "custom",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pattern {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::ALL
            .into_iter()
            .find(|pattern| pattern.as_str() == s)
            .ok_or_else(|| PlanError::UnknownPattern(s.to_string()))
    }
}

/// Coverage planning request, keyed the way the web API sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub field_width: f64,
    pub field_height: f64,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    pub start_x: f64,
    pub start_y: f64,
    pub coverage_radius: f64,
    pub pattern: String,
    #[serde(default)]
    pub spraying_rate: Option<f64>,
    #[serde(default = "default_smooth_path")]
    pub smooth_path: bool,
}

fn default_smooth_path() -> bool {
    true
}

impl PlanRequest {
    pub fn start_point(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }
}

/// Point-to-point lattice routing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub field_width: f64,
    pub field_height: f64,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    pub start: (usize, usize),
    pub end: (usize, usize),
}

/// Summary figures reported with a finished path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStatistics {
    pub total_distance: f64,
    pub covered_area: f64,
    pub estimated_time: f64,
    pub point_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    pub spraying_rate: f64,
}

/// A finished coverage plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoveragePlan {
    pub path: Vec<Waypoint>,
    pub statistics: PathStatistics,
}
