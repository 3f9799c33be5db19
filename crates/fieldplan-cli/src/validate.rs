//! Caller-side input contract and resource bounds.
//!
//! The core re-checks radius, start point and pattern on its own. The checks
//! here reject malformed requests early and keep the quadratic parts of the
//! core (area sampling, lattice construction) within configured limits.

use crate::config::Config;
use crate::requests::{MetricsRequest, VisualizeRequest};
use anyhow::{bail, Result};
use fieldplan_core::metrics::sample_count;
use fieldplan_core::{Pattern, PlanRequest, RouteRequest, Waypoint};

pub fn validate_plan(request: &PlanRequest, config: &Config) -> Result<()> {
    check_field(request.field_width, request.field_height, config)?;
    check_radius(request.coverage_radius)?;

    let (x, y) = (request.start_x, request.start_y);
    if !(0.0 <= x && x <= request.field_width && 0.0 <= y && y <= request.field_height) {
        bail!(
            "start point ({}, {}) must lie within 0..={} x 0..={}",
            x,
            y,
            request.field_width,
            request.field_height
        );
    }
    request.pattern.parse::<Pattern>()?;
    if let Some(rate) = request.spraying_rate {
        if !(rate.is_finite() && rate >= 0.0) {
            bail!("spraying rate must be a non-negative number, got {}", rate);
        }
    }

    // Area estimation samples the field grown by the radius on each side.
    // Generators step at the same resolution or coarser over the bare field,
    // so this also bounds the waypoint count.
    let resolution = request.coverage_radius / 2.0;
    let cells = grid_cells(
        request.field_width + 2.0 * request.coverage_radius,
        request.field_height + 2.0 * request.coverage_radius,
        resolution,
    );
    check_cells("coverage sampling grid", cells, config)
}

pub fn validate_metrics(request: &MetricsRequest, config: &Config) -> Result<()> {
    check_radius(request.coverage_radius)?;
    if request.path.iter().any(|wp| !(wp.x.is_finite() && wp.y.is_finite())) {
        bail!("path contains non-finite coordinates");
    }
    let Some((width, height)) = bounding_extent(&request.path) else {
        return Ok(());
    };
    let cells = grid_cells(
        width + 2.0 * request.coverage_radius,
        height + 2.0 * request.coverage_radius,
        request.coverage_radius / 2.0,
    );
    check_cells("coverage sampling grid", cells, config)
}

pub fn validate_visualize(request: &VisualizeRequest, config: &Config) -> Result<()> {
    check_field(request.field_width, request.field_height, config)?;
    let cells = (request.field_width.floor() + 1.0) * (request.field_height.floor() + 1.0);
    check_cells("rendered grid", cells, config)
}

pub fn validate_route(request: &RouteRequest, config: &Config) -> Result<()> {
    check_field(request.field_width, request.field_height, config)?;
    let (width, height) = (request.field_width.ceil(), request.field_height.ceil());
    check_cells("routing lattice", width * height, config)?;
    for (name, (i, j)) in [("start", request.start), ("end", request.end)] {
        if i as f64 >= width || j as f64 >= height {
            bail!("{} node ({}, {}) lies outside the {}x{} lattice", name, i, j, width, height);
        }
    }
    Ok(())
}

fn check_field(width: f64, height: f64, config: &Config) -> Result<()> {
    if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
        bail!("field dimensions must be positive, got {}x{}", width, height);
    }
    if width > config.max_field_dim || height > config.max_field_dim {
        bail!(
            "field {}x{} exceeds the maximum dimension {}",
            width,
            height,
            config.max_field_dim
        );
    }
    Ok(())
}

fn check_radius(radius: f64) -> Result<()> {
    if !(radius > 0.0) || !radius.is_finite() {
        bail!("coverage radius must be positive, got {}", radius);
    }
    Ok(())
}

fn check_cells(what: &str, cells: f64, config: &Config) -> Result<()> {
    if cells > config.max_sample_cells as f64 {
        bail!(
            "{} would need {} cells, limit is {}",
            what,
            cells,
            config.max_sample_cells
        );
    }
    Ok(())
}

fn grid_cells(width: f64, height: f64, resolution: f64) -> f64 {
    sample_count(width, resolution) as f64 * sample_count(height, resolution) as f64
}

fn bounding_extent(path: &[Waypoint]) -> Option<(f64, f64)> {
    let first = path.first()?;
    let (mut x_min, mut x_max, mut y_min, mut y_max) = (first.x, first.x, first.y, first.y);
    for wp in path {
        x_min = x_min.min(wp.x);
        x_max = x_max.max(wp.x);
        y_min = y_min.min(wp.y);
        y_max = y_max.max(wp.y);
    }
    Some((x_max - x_min, y_max - y_min))
}
