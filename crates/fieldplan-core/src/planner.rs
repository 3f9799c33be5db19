//! Planning entry points.
//!
//! [`optimize_coverage`] runs the coverage pipeline against an existing
//! [`Field`]. [`plan`], [`metrics`], [`visualize`] and [`route`] are the
//! request-level operations a service layer wraps; each builds its own field
//! and shares nothing across calls.

use crate::config::PlannerConfig;
use crate::error::{PlanError, Result};
use crate::field::Field;
use crate::graph::{LatticeGraph, Node};
use crate::metrics::path_statistics;
use crate::models::{CoveragePlan, PathStatistics, Pattern, PlanRequest, Point, RouteRequest, Waypoint};
use crate::patterns;
use crate::smoothing::smooth_path;
use crate::visualize::render_path;

/// Generate a coverage path over `field`.
///
/// Checks run in a fixed order: radius, start point, pattern, then the raw
/// path length. The smoothed path may hold fewer points than the raw one,
/// possibly none.
pub fn optimize_coverage(
    field: &Field,
    start: Point,
    coverage_radius: f64,
    pattern: &str,
    spraying_rate: Option<f64>,
    smooth: bool,
) -> Result<Vec<Waypoint>> {
    if !(coverage_radius > 0.0) {
        return Err(PlanError::InvalidRadius(coverage_radius));
    }
    if !field.is_valid_point(&start) {
        return Err(PlanError::InvalidStartPoint {
            x: start.x,
            y: start.y,
        });
    }
    let pattern: Pattern = pattern.parse()?;

    let raw = patterns::generate(pattern, field, start, coverage_radius);
    if raw.len() < 2 {
        return Err(PlanError::InsufficientPath(raw.len()));
    }

    let path = if smooth { smooth_path(field, &raw)? } else { raw };

    let rate = spraying_rate.unwrap_or(field.config().default_spraying_rate);
    Ok(path
        .into_iter()
        .map(|p| Waypoint::new(p.x, p.y, rate))
        .collect())
}

/// Plan a coverage path for a full request and attach its statistics.
pub fn plan(request: &PlanRequest) -> Result<CoveragePlan> {
    let field = Field::with_obstacles(request.field_width, request.field_height, &request.obstacles);
    let path = optimize_coverage(
        &field,
        request.start_point(),
        request.coverage_radius,
        &request.pattern,
        request.spraying_rate,
        request.smooth_path,
    )?;

    // Pattern was validated by optimize_coverage.
    let pattern = request.pattern.parse::<Pattern>().ok();
    let statistics = path_statistics(
        &path,
        request.coverage_radius,
        request.spraying_rate,
        pattern,
        field.config(),
    );
    tracing::info!(
        pattern = %request.pattern,
        points = statistics.point_count,
        total_distance = statistics.total_distance,
        "planned coverage path"
    );
    Ok(CoveragePlan { path, statistics })
}

/// Distance, area and time figures for an existing path.
pub fn metrics(path: &[Waypoint], coverage_radius: f64, spraying_rate: Option<f64>) -> PathStatistics {
    path_statistics(path, coverage_radius, spraying_rate, None, &PlannerConfig::default())
}

pub fn visualize(path: &[Waypoint], field_width: f64, field_height: f64, coverage_radius: f64) -> String {
    render_path(path, field_width, field_height, coverage_radius)
}

/// Shortest lattice route between two integer nodes.
pub fn route(request: &RouteRequest) -> Result<Vec<Node>> {
    let field = Field::with_obstacles(request.field_width, request.field_height, &request.obstacles);
    let graph = LatticeGraph::build(&field)?;
    graph.shortest_path(request.start, request.end).ok_or_else(|| {
        tracing::warn!(start = ?request.start, end = ?request.end, "no lattice route found");
        PlanError::NoRoute {
            start: request.start,
            end: request.end,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Obstacle;

    fn request(pattern: &str) -> PlanRequest {
        PlanRequest {
            field_width: 100.0,
            field_height: 100.0,
            obstacles: Vec::new(),
            start_x: 1.0,
            start_y: 1.0,
            coverage_radius: 10.0,
            pattern: pattern.to_string(),
            spraying_rate: None,
            smooth_path: false,
        }
    }

    #[test]
    fn radius_is_checked_before_start_and_pattern() {
        let field = Field::new(100.0, 100.0);
        let err = optimize_coverage(&field, Point::new(500.0, 500.0), 0.0, "bogus", None, true).unwrap_err();
        assert_eq!(err, PlanError::InvalidRadius(0.0));
        let err = optimize_coverage(&field, Point::new(5.0, 5.0), f64::NAN, "zigzag", None, true).unwrap_err();
        assert!(matches!(err, PlanError::InvalidRadius(r) if r.is_nan()));
    }

    #[test]
    fn start_is_checked_before_pattern() {
        let field = Field::new(100.0, 100.0);
        let err = optimize_coverage(&field, Point::new(150.0, 150.0), 10.0, "bogus", None, true).unwrap_err();
        assert_eq!(err, PlanError::InvalidStartPoint { x: 150.0, y: 150.0 });
    }

    #[test]
    fn start_inside_obstacle_is_rejected() {
        let mut field = Field::new(100.0, 100.0);
        field.add_obstacle(50.0, 50.0, 5.0);
        let err = optimize_coverage(&field, Point::new(51.0, 50.0), 10.0, "zigzag", None, false).unwrap_err();
        assert!(matches!(err, PlanError::InvalidStartPoint { .. }));
    }

    #[test]
    fn unknown_pattern_is_rejected() {
        let field = Field::new(100.0, 100.0);
        let err = optimize_coverage(&field, Point::new(5.0, 5.0), 10.0, "diagonal", None, true).unwrap_err();
        assert_eq!(err, PlanError::UnknownPattern("diagonal".into()));
    }

    #[test]
    fn tiny_field_yields_insufficient_path() {
        // Nothing but the start point clears the margin.
        let field = Field::new(2.0, 2.0);
        let err = optimize_coverage(&field, Point::new(1.0, 1.0), 10.0, "custom", None, false).unwrap_err();
        assert_eq!(err, PlanError::InsufficientPath(1));
        let err = optimize_coverage(&field, Point::new(1.0, 1.0), 10.0, "zigzag", None, false).unwrap_err();
        assert!(matches!(err, PlanError::InsufficientPath(n) if n < 2));
    }

    #[test]
    fn rate_is_attached_to_every_waypoint() {
        let field = Field::new(100.0, 100.0);
        let path = optimize_coverage(&field, Point::new(1.0, 1.0), 10.0, "zigzag", Some(2.5), false).unwrap();
        assert!(path.len() > 2);
        assert!(path.iter().all(|wp| wp.spraying_rate == 2.5));

        let path = optimize_coverage(&field, Point::new(1.0, 1.0), 10.0, "zigzag", None, false).unwrap();
        assert!(path.iter().all(|wp| wp.spraying_rate == 1.0));
    }

    #[test]
    fn smoothed_path_stays_valid() {
        let mut field = Field::new(100.0, 100.0);
        field.add_obstacle(50.0, 50.0, 8.0);
        let raw = optimize_coverage(&field, Point::new(1.0, 1.0), 10.0, "zigzag", None, false).unwrap();
        let smoothed = optimize_coverage(&field, Point::new(1.0, 1.0), 10.0, "zigzag", None, true).unwrap();
        assert!(smoothed.len() <= raw.len() * 2);
        assert!(smoothed.iter().all(|wp| field.is_valid(wp.x, wp.y)));
    }

    #[test]
    fn plan_reports_statistics_for_path() {
        let mut req = request("spiral");
        req.start_x = 50.0;
        req.start_y = 50.0;
        req.spraying_rate = Some(2.0);
        let plan = plan(&req).unwrap();
        assert_eq!(plan.statistics.point_count, plan.path.len());
        assert_eq!(plan.statistics.pattern, Some(Pattern::Spiral));
        assert_eq!(plan.statistics.spraying_rate, 2.0);
        let expected_time = plan.statistics.total_distance / 10.0 * 2.0;
        assert!((plan.statistics.estimated_time - expected_time).abs() < 1e-9);
    }

    #[test]
    fn plan_applies_request_obstacles() {
        let mut req = request("zigzag");
        req.obstacles = vec![Obstacle::new(50.0, 48.0, 15.0)];
        let plan = plan(&req).unwrap();
        assert!(plan
            .path
            .iter()
            .all(|wp| Point::new(50.0, 48.0).distance_to(&wp.point()) >= 15.0));
    }

    #[test]
    fn metrics_default_rate_is_one() {
        let path = vec![Waypoint::new(0.0, 0.0, 1.0), Waypoint::new(3.0, 0.0, 1.0), Waypoint::new(3.0, 4.0, 1.0)];
        let stats = metrics(&path, 1.0, None);
        assert!((stats.total_distance - 7.0).abs() < 1e-12);
        assert!((stats.estimated_time - 0.7).abs() < 1e-12);
        assert_eq!(stats.point_count, 3);
        assert!(stats.pattern.is_none());
    }

    #[test]
    fn route_without_connection_is_no_route() {
        let req = RouteRequest {
            field_width: 10.0,
            field_height: 10.0,
            obstacles: vec![Obstacle::new(5.0, 5.0, 1.0)],
            start: (0, 0),
            end: (5, 5),
        };
        assert_eq!(route(&req).unwrap_err(), PlanError::NoRoute { start: (0, 0), end: (5, 5) });
    }

    #[test]
    fn route_on_huge_field_fails_without_allocating() {
        let req = RouteRequest {
            field_width: 1e10,
            field_height: 1e10,
            obstacles: Vec::new(),
            start: (0, 0),
            end: (1, 1),
        };
        let err = route(&req).unwrap_err();
        assert!(matches!(err, PlanError::Internal(_)), "{err:?}");
    }

    #[test]
    fn route_on_open_field_connects_nodes() {
        let req = RouteRequest {
            field_width: 10.0,
            field_height: 10.0,
            obstacles: Vec::new(),
            start: (0, 0),
            end: (9, 9),
        };
        let nodes = route(&req).unwrap();
        assert_eq!(nodes.len(), 19);
    }
}
