//! Coverage pattern generators.
//!
//! Each generator returns the raw (unsmoothed) waypoint sequence for a
//! validated coverage radius. Candidates failing [`Field::is_valid`] are
//! dropped, never moved, so every returned point is valid.

use crate::field::Field;
use crate::models::{Pattern, Point};
use crate::spatial::CandidateIndex;
use std::f64::consts::PI;

/// Tolerance used when counting how many steps fit into an extent.
const STEP_EPS: f64 = 1e-9;

/// Run the generator selected by `pattern`.
pub fn generate(pattern: Pattern, field: &Field, start: Point, coverage_radius: f64) -> Vec<Point> {
    let path = match pattern {
        Pattern::Zigzag => zigzag(field, coverage_radius),
        Pattern::Spiral => spiral(field, start, coverage_radius),
        Pattern::Custom => nearest_neighbor(field, start, coverage_radius),
    };
    tracing::debug!(
        pattern = %pattern,
        coverage_radius,
        points = path.len(),
        "generated raw coverage path"
    );
    path
}

/// Number of zigzag rows for a radius, before validity filtering.
pub fn zigzag_row_count(field: &Field, coverage_radius: f64) -> usize {
    let row_spacing = field.config().row_spacing(coverage_radius);
    (field.height() / row_spacing).floor() as usize + 1
}

/// Unfiltered zigzag rows in visiting order.
///
/// Even rows run from `x = 0` up to the field width, odd rows from the
/// width back down to zero.
pub fn zigzag_candidate_rows(field: &Field, coverage_radius: f64) -> Vec<Vec<Point>> {
    let row_spacing = field.config().row_spacing(coverage_radius);
    let step = field.config().sweep_step(coverage_radius);
    let width = field.width();
    let last = inclusive_steps(width, step);

    (0..zigzag_row_count(field, coverage_radius))
        .map(|row| {
            let y = row as f64 * row_spacing;
            (0..=last)
                .map(|k| {
                    let x = if row % 2 == 0 {
                        k as f64 * step
                    } else {
                        width - k as f64 * step
                    };
                    Point::new(x, y)
                })
                .collect()
        })
        .collect()
}

/// Boustrophedon sweep. Rows keep only their valid points, so a row may be
/// partially covered or skipped entirely.
pub fn zigzag(field: &Field, coverage_radius: f64) -> Vec<Point> {
    zigzag_candidate_rows(field, coverage_radius)
        .into_iter()
        .flatten()
        .filter(|p| field.is_valid_point(p))
        .collect()
}

/// A spiral sample with the radius it was generated at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralCandidate {
    pub point: Point,
    pub radius: f64,
}

/// Outward Archimedean spiral around a center, unfiltered.
///
/// Stops once the radius reaches the larger field dimension. The spiral is
/// centered on the start point, not on the field.
#[derive(Debug, Clone)]
pub struct SpiralWalk {
    center: Point,
    angle: f64,
    radius: f64,
    angle_step: f64,
    radius_step: f64,
    max_radius: f64,
}

impl SpiralWalk {
    pub fn new(field: &Field, center: Point, coverage_radius: f64) -> Self {
        Self {
            center,
            angle: 0.0,
            radius: coverage_radius,
            angle_step: field.config().spiral_angle_step,
            radius_step: coverage_radius / (2.0 * PI),
            max_radius: field.width().max(field.height()),
        }
    }

    /// Radius of the next sample; after exhaustion, the terminating radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn radius_step(&self) -> f64 {
        self.radius_step
    }
}

impl Iterator for SpiralWalk {
    type Item = SpiralCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.radius >= self.max_radius {
            return None;
        }
        let candidate = SpiralCandidate {
            point: Point::new(
                self.center.x + self.radius * self.angle.cos(),
                self.center.y + self.radius * self.angle.sin(),
            ),
            radius: self.radius,
        };
        self.angle += self.angle_step;
        self.radius += self.radius_step;
        Some(candidate)
    }
}

pub fn spiral(field: &Field, start: Point, coverage_radius: f64) -> Vec<Point> {
    SpiralWalk::new(field, start, coverage_radius)
        .map(|candidate| candidate.point)
        .filter(|p| field.is_valid_point(p))
        .collect()
}

/// Valid points of the `[0, width) x [0, height)` grid at the sweep step,
/// x-major.
pub fn candidate_grid(field: &Field, coverage_radius: f64) -> Vec<Point> {
    let step = field.config().sweep_step(coverage_radius);
    let columns = exclusive_steps(field.width(), step);
    let rows = exclusive_steps(field.height(), step);

    let mut points = Vec::new();
    for i in 0..columns {
        let x = i as f64 * step;
        for j in 0..rows {
            let y = j as f64 * step;
            if field.is_valid(x, y) {
                points.push(Point::new(x, y));
            }
        }
    }
    points
}

/// Greedy nearest-neighbor walk starting at `start`.
///
/// Each step asks the index for the single nearest candidate. The walk ends
/// as soon as that candidate was already visited, even if unvisited
/// candidates remain elsewhere.
pub fn nearest_neighbor(field: &Field, start: Point, coverage_radius: f64) -> Vec<Point> {
    let candidates = candidate_grid(field, coverage_radius);
    let index = CandidateIndex::new(&candidates);
    let mut path = vec![start];
    if index.is_empty() {
        tracing::debug!("no valid candidates for nearest-neighbor walk");
        return path;
    }

    let mut visited = vec![false; index.len()];
    let mut remaining = index.len();
    let mut current = start;

    while remaining > 0 {
        let Some(nearest) = index.nearest(&current) else {
            break;
        };
        if visited[nearest] {
            break;
        }
        visited[nearest] = true;
        remaining -= 1;
        current = candidates[nearest];
        path.push(current);
    }

    tracing::debug!(
        candidates = index.len(),
        unvisited = remaining,
        "nearest-neighbor walk finished"
    );
    path
}

/// Largest `k` with `k * step <= extent`.
fn inclusive_steps(extent: f64, step: f64) -> usize {
    if extent < 0.0 {
        return 0;
    }
    (extent / step + STEP_EPS).floor() as usize
}

/// Number of `k >= 0` with `k * step < extent`.
fn exclusive_steps(extent: f64, step: f64) -> usize {
    if extent <= 0.0 {
        return 0;
    }
    (extent / step - STEP_EPS).ceil().max(0.0) as usize
}
