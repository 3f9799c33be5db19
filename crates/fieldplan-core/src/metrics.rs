//! Distance, coverage and timing figures for a finished path.

use crate::config::PlannerConfig;
use crate::models::{PathStatistics, Pattern, Point, Waypoint};
use crate::spatial::CandidateIndex;

/// Sum of straight-line distances between consecutive waypoints.
pub fn total_distance(path: &[Waypoint]) -> f64 {
    path.windows(2)
        .map(|pair| pair[0].point().distance_to(&pair[1].point()))
        .sum()
}

/// Approximate area within `coverage_radius` of any waypoint.
///
/// Samples a grid at half the radius over the path's bounding box grown by
/// the radius and counts samples inside at least one coverage disc. Each
/// sample is tested against its nearest waypoint only, through an R-tree
/// over the path.
pub fn covered_area(path: &[Waypoint], coverage_radius: f64) -> f64 {
    if path.is_empty() || !(coverage_radius > 0.0) {
        return 0.0;
    }

    let x_min = path.iter().map(|p| p.x).fold(f64::INFINITY, f64::min) - coverage_radius;
    let x_max = path.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max) + coverage_radius;
    let y_min = path.iter().map(|p| p.y).fold(f64::INFINITY, f64::min) - coverage_radius;
    let y_max = path.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max) + coverage_radius;
    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return 0.0;
    }

    let resolution = coverage_radius / 2.0;
    let columns = sample_count(x_max - x_min, resolution);
    let rows = sample_count(y_max - y_min, resolution);
    let radius2 = coverage_radius * coverage_radius;
    let points: Vec<Point> = path.iter().map(Waypoint::point).collect();
    let index = CandidateIndex::new(&points);

    let mut covered = 0usize;
    for i in 0..columns {
        let x = x_min + i as f64 * resolution;
        for j in 0..rows {
            let y = y_min + j as f64 * resolution;
            let hit = index.nearest(&Point::new(x, y)).is_some_and(|k| {
                let dx = x - points[k].x;
                let dy = y - points[k].y;
                dx * dx + dy * dy <= radius2
            });
            if hit {
                covered += 1;
            }
        }
    }

    covered as f64 * resolution * resolution
}

/// Number of grid samples needed to reach from 0 to `span` at `resolution`,
/// both ends included.
pub fn sample_count(span: f64, resolution: f64) -> usize {
    (span / resolution - 1e-9).ceil().max(0.0) as usize + 1
}

/// Traversal time at the configured average speed, scaled by the rate.
pub fn estimated_time(path: &[Waypoint], spraying_rate: f64, average_speed: f64) -> f64 {
    total_distance(path) / average_speed * spraying_rate
}

/// All figures for a path in one pass over the config.
pub fn path_statistics(
    path: &[Waypoint],
    coverage_radius: f64,
    spraying_rate: Option<f64>,
    pattern: Option<Pattern>,
    config: &PlannerConfig,
) -> PathStatistics {
    let spraying_rate = spraying_rate.unwrap_or(config.default_spraying_rate);
    let total_distance = total_distance(path);
    PathStatistics {
        total_distance,
        covered_area: covered_area(path, coverage_radius),
        estimated_time: total_distance / config.average_speed * spraying_rate,
        point_count: path.len(),
        pattern,
        spraying_rate,
    }
}
