//! Field model: rectangular bounds, circular obstacles and point validity.

use crate::config::PlannerConfig;
use crate::models::Point;
use serde::{Deserialize, Serialize};

/// Circular no-go area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Obstacle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    /// Distance from the obstacle center to `(x, y)`.
    pub fn center_distance(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.x;
        let dy = y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A rectangular field with origin at (0, 0), owned by a single request.
///
/// Obstacles are append-only; adding one never touches paths already
/// produced from this field.
#[derive(Debug, Clone)]
pub struct Field {
    width: f64,
    height: f64,
    obstacles: Vec<Obstacle>,
    config: PlannerConfig,
}

impl Field {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_config(width, height, PlannerConfig::default())
    }

    pub fn with_config(width: f64, height: f64, config: PlannerConfig) -> Self {
        Self {
            width,
            height,
            obstacles: Vec::new(),
            config,
        }
    }

    /// Build a field and register all `obstacles` in order.
    pub fn with_obstacles(width: f64, height: f64, obstacles: &[Obstacle]) -> Self {
        let mut field = Self::new(width, height);
        for obstacle in obstacles {
            field.add_obstacle(obstacle.x, obstacle.y, obstacle.radius);
        }
        field
    }

    /// Append an obstacle. Obstacles outside the field are accepted and
    /// simply never affect in-field validity.
    pub fn add_obstacle(&mut self, x: f64, y: f64, radius: f64) {
        self.obstacles.push(Obstacle::new(x, y, radius));
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// True when `(x, y)` lies inside the margin-inset rectangle and not
    /// strictly inside any obstacle disc. A point exactly on an obstacle's
    /// rim is valid.
    pub fn is_valid(&self, x: f64, y: f64) -> bool {
        let margin = self.config.margin;
        if !(margin <= x && x <= self.width - margin && margin <= y && y <= self.height - margin) {
            return false;
        }

        self.obstacles
            .iter()
            .all(|obstacle| obstacle.center_distance(x, y) >= obstacle.radius)
    }

    pub fn is_valid_point(&self, point: &Point) -> bool {
        self.is_valid(point.x, point.y)
    }
}
