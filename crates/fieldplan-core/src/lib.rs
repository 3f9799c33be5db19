//! Coverage path planning for field spraying.
//!
//! Given a rectangular field with circular obstacles, produces an ordered
//! waypoint sequence that sweeps the field (zigzag, spiral or greedy
//! nearest-neighbor), optionally smoothed, plus metrics, an ASCII preview and
//! a lattice shortest-route mode.

pub mod config;
pub mod error;
pub mod field;
pub mod graph;
pub mod metrics;
pub mod models;
pub mod patterns;
pub mod planner;
pub mod smoothing;
pub mod spatial;
pub mod visualize;

pub use config::PlannerConfig;
pub use error::{PlanError, Result};
pub use field::{Field, Obstacle};
pub use graph::{LatticeGraph, Node};
pub use metrics::{covered_area, estimated_time, path_statistics, total_distance};
pub use models::{CoveragePlan, PathStatistics, Pattern, PlanRequest, Point, RouteRequest, Waypoint};
pub use patterns::{SpiralCandidate, SpiralWalk};
pub use planner::{metrics, optimize_coverage, plan, route, visualize};
pub use smoothing::smooth_path;
pub use spatial::CandidateIndex;
