//! Path smoothing with a parametric cubic smoothing spline.
//!
//! The points are parameterized by normalized chord length and each
//! coordinate gets a natural cubic smoothing spline (Reinsch form). Both
//! coordinates share one penalty weight, chosen as the largest weight whose
//! total squared residual stays within the smoothing factor. The curve is
//! then resampled and points that leave the valid field area are dropped.

use crate::error::{PlanError, Result};
use crate::field::Field;
use crate::models::Point;

/// Search range of the penalty weight, in decades relative to the cube of
/// the mean knot spacing. Keeps the banded system well conditioned.
const MIN_LOG_WEIGHT: f64 = -6.0;
const MAX_LOG_WEIGHT: f64 = 8.0;
const WEIGHT_SEARCH_ITERATIONS: usize = 64;

/// Smooth `path` with the field's configured smoothing factor.
///
/// Paths shorter than three points are returned unchanged. The result can
/// be shorter than the resample count, or empty, when resampled points fall
/// outside the valid area.
pub fn smooth_path(field: &Field, path: &[Point]) -> Result<Vec<Point>> {
    smooth_path_with(field, path, field.config().smoothing_factor)
}

pub fn smooth_path_with(field: &Field, path: &[Point], smoothing_factor: f64) -> Result<Vec<Point>> {
    if path.len() < 3 {
        return Ok(path.to_vec());
    }

    let distinct = collapse_duplicates(path);
    if distinct.len() < 3 {
        return Ok(path.to_vec());
    }

    let spline = SmoothingSpline::fit(&distinct, smoothing_factor)?;
    let samples = path.len() * field.config().resample_factor.max(1);
    let resampled = spline.sample(samples)?;
    let smoothed: Vec<Point> = resampled
        .into_iter()
        .filter(|p| field.is_valid_point(p))
        .collect();

    if smoothed.len() < samples {
        tracing::warn!(
            dropped = samples - smoothed.len(),
            kept = smoothed.len(),
            "smoothing moved points outside the valid area"
        );
    }
    tracing::debug!(
        input = path.len(),
        output = smoothed.len(),
        weight = spline.weight,
        "smoothed path"
    );
    Ok(smoothed)
}

fn collapse_duplicates(path: &[Point]) -> Vec<Point> {
    let mut distinct: Vec<Point> = Vec::with_capacity(path.len());
    for point in path {
        if distinct.last() != Some(point) {
            distinct.push(*point);
        }
    }
    distinct
}

/// Fitted spline: knot parameters, smoothed knot values and the second
/// derivatives at the knots (zero at both ends).
#[derive(Debug, Clone)]
pub(crate) struct SmoothingSpline {
    knots: Vec<f64>,
    values: [Vec<f64>; 2],
    second_derivs: [Vec<f64>; 2],
    weight: f64,
}

impl SmoothingSpline {
    pub(crate) fn fit(points: &[Point], smoothing_factor: f64) -> Result<Self> {
        let knots = chord_parameters(points)?;
        let system = ReinschSystem::new(&knots);
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();

        let weight = choose_weight(&system, &xs, &ys, smoothing_factor)?;
        let fit_x = system.solve(&xs, weight)?;
        let fit_y = system.solve(&ys, weight)?;

        Ok(Self {
            knots,
            values: [fit_x.values, fit_y.values],
            second_derivs: [fit_x.second_derivs, fit_y.second_derivs],
            weight,
        })
    }

    /// Smoothed values at the knots.
    #[cfg(test)]
    pub(crate) fn knot_points(&self) -> Vec<Point> {
        self.values[0]
            .iter()
            .zip(&self.values[1])
            .map(|(&x, &y)| Point::new(x, y))
            .collect()
    }

    /// Evaluate at `count` evenly spaced parameters over `[0, 1]`.
    pub(crate) fn sample(&self, count: usize) -> Result<Vec<Point>> {
        let mut out = Vec::with_capacity(count);
        let mut segment = 0usize;
        let last_segment = self.knots.len() - 2;

        for k in 0..count {
            let t = if count == 1 {
                0.0
            } else {
                k as f64 / (count - 1) as f64
            };
            while segment < last_segment && t > self.knots[segment + 1] {
                segment += 1;
            }
            let point = Point::new(self.evaluate(0, segment, t), self.evaluate(1, segment, t));
            if !point.x.is_finite() || !point.y.is_finite() {
                return Err(PlanError::Internal(format!(
                    "spline evaluation produced a non-finite point at t = {t}"
                )));
            }
            out.push(point);
        }
        Ok(out)
    }

    fn evaluate(&self, axis: usize, i: usize, t: f64) -> f64 {
        let g = &self.values[axis];
        let gamma = &self.second_derivs[axis];
        let left = self.knots[i];
        let right = self.knots[i + 1];
        let h = right - left;
        let a = t - left;
        let b = right - t;

        (a * g[i + 1] + b * g[i]) / h
            - a * b / 6.0 * ((1.0 + a / h) * gamma[i + 1] + (1.0 + b / h) * gamma[i])
    }
}

/// Cumulative chord length normalized to `[0, 1]`.
fn chord_parameters(points: &[Point]) -> Result<Vec<f64>> {
    let mut knots = Vec::with_capacity(points.len());
    let mut total = 0.0;
    knots.push(0.0);
    for pair in points.windows(2) {
        total += pair[0].distance_to(&pair[1]);
        knots.push(total);
    }
    if !total.is_finite() || total <= 0.0 {
        return Err(PlanError::Internal(format!(
            "cannot parameterize path of length {total}"
        )));
    }
    for knot in &mut knots {
        *knot /= total;
    }
    Ok(knots)
}

struct AxisFit {
    values: Vec<f64>,
    second_derivs: Vec<f64>,
    residual: f64,
}

/// Banded matrices of the penalized fit for a fixed knot sequence.
///
/// `q[j]` holds the three nonzeros of column `j` of Q (rows `j..=j+2`),
/// `r_diag`/`r_off` the tridiagonal R.
struct ReinschSystem {
    q: Vec<[f64; 3]>,
    r_diag: Vec<f64>,
    r_off: Vec<f64>,
}

impl ReinschSystem {
    fn new(knots: &[f64]) -> Self {
        let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();
        let m = knots.len() - 2;
        let mut q = Vec::with_capacity(m);
        let mut r_diag = Vec::with_capacity(m);
        let mut r_off = Vec::with_capacity(m.saturating_sub(1));

        for j in 0..m {
            q.push([1.0 / h[j], -1.0 / h[j] - 1.0 / h[j + 1], 1.0 / h[j + 1]]);
            r_diag.push((h[j] + h[j + 1]) / 3.0);
            if j + 1 < m {
                r_off.push(h[j + 1] / 6.0);
            }
        }
        Self { q, r_diag, r_off }
    }

    fn interior(&self) -> usize {
        self.q.len()
    }

    /// Solve `(R + w QᵀQ) γ = Qᵀy` and recover the smoothed values
    /// `g = y - w Qγ`.
    fn solve(&self, y: &[f64], weight: f64) -> Result<AxisFit> {
        let m = self.interior();
        let q = &self.q;

        let mut diag = vec![0.0; m];
        let mut off1 = vec![0.0; m.saturating_sub(1)];
        let mut off2 = vec![0.0; m.saturating_sub(2)];
        let mut rhs = vec![0.0; m];

        for j in 0..m {
            diag[j] = self.r_diag[j] + weight * (q[j][0] * q[j][0] + q[j][1] * q[j][1] + q[j][2] * q[j][2]);
            if j + 1 < m {
                off1[j] = self.r_off[j] + weight * (q[j][1] * q[j + 1][0] + q[j][2] * q[j + 1][1]);
            }
            if j + 2 < m {
                off2[j] = weight * q[j][2] * q[j + 2][0];
            }
            rhs[j] = q[j][0] * y[j] + q[j][1] * y[j + 1] + q[j][2] * y[j + 2];
        }

        let interior_gamma = solve_pentadiagonal(&diag, &off1, &off2, &rhs)?;

        let mut q_gamma = vec![0.0; y.len()];
        for (j, gamma) in interior_gamma.iter().enumerate() {
            q_gamma[j] += q[j][0] * gamma;
            q_gamma[j + 1] += q[j][1] * gamma;
            q_gamma[j + 2] += q[j][2] * gamma;
        }

        let mut residual = 0.0;
        let values: Vec<f64> = y
            .iter()
            .zip(&q_gamma)
            .map(|(&value, &qg)| {
                let r = weight * qg;
                residual += r * r;
                value - r
            })
            .collect();

        let mut second_derivs = Vec::with_capacity(y.len());
        second_derivs.push(0.0);
        second_derivs.extend_from_slice(&interior_gamma);
        second_derivs.push(0.0);

        Ok(AxisFit {
            values,
            second_derivs,
            residual,
        })
    }
}

/// Largest penalty weight keeping the summed residual of both axes within
/// `smoothing_factor`. Residual grows monotonically with the weight.
fn choose_weight(system: &ReinschSystem, xs: &[f64], ys: &[f64], smoothing_factor: f64) -> Result<f64> {
    if smoothing_factor <= 0.0 {
        return Ok(0.0);
    }

    let mean_spacing = 1.0 / (xs.len() - 1) as f64;
    let scale = mean_spacing.powi(3);
    let weight_at = |log_weight: f64| scale * 10f64.powf(log_weight);
    let residual_at = |log_weight: f64| -> Result<f64> {
        let weight = weight_at(log_weight);
        Ok(system.solve(xs, weight)?.residual + system.solve(ys, weight)?.residual)
    };

    if residual_at(MAX_LOG_WEIGHT)? <= smoothing_factor {
        return Ok(weight_at(MAX_LOG_WEIGHT));
    }
    if residual_at(MIN_LOG_WEIGHT)? > smoothing_factor {
        return Ok(0.0);
    }

    let mut lo = MIN_LOG_WEIGHT;
    let mut hi = MAX_LOG_WEIGHT;
    for _ in 0..WEIGHT_SEARCH_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if residual_at(mid)? <= smoothing_factor {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(weight_at(lo))
}

/// LDLᵀ solve of a symmetric positive definite pentadiagonal system given
/// by its diagonal and first/second super-diagonals.
fn solve_pentadiagonal(diag: &[f64], off1: &[f64], off2: &[f64], rhs: &[f64]) -> Result<Vec<f64>> {
    let m = diag.len();
    let mut d = vec![0.0; m];
    let mut l1 = vec![0.0; m];
    let mut l2 = vec![0.0; m];

    for i in 0..m {
        if i >= 2 {
            l2[i] = off2[i - 2] / d[i - 2];
        }
        if i >= 1 {
            let mut value = off1[i - 1];
            if i >= 2 {
                value -= l2[i] * l1[i - 1] * d[i - 2];
            }
            l1[i] = value / d[i - 1];
        }
        let mut pivot = diag[i];
        if i >= 1 {
            pivot -= l1[i] * l1[i] * d[i - 1];
        }
        if i >= 2 {
            pivot -= l2[i] * l2[i] * d[i - 2];
        }
        if !pivot.is_finite() || pivot <= 0.0 {
            return Err(PlanError::Internal(format!(
                "smoothing system is not positive definite (pivot {pivot} at {i})"
            )));
        }
        d[i] = pivot;
    }

    let mut z = vec![0.0; m];
    for i in 0..m {
        let mut value = rhs[i];
        if i >= 1 {
            value -= l1[i] * z[i - 1];
        }
        if i >= 2 {
            value -= l2[i] * z[i - 2];
        }
        z[i] = value;
    }

    let mut x = vec![0.0; m];
    for i in (0..m).rev() {
        let mut value = z[i] / d[i];
        if i + 1 < m {
            value -= l1[i + 1] * x[i + 1];
        }
        if i + 2 < m {
            value -= l2[i + 2] * x[i + 2];
        }
        x[i] = value;
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(PlanError::Internal(
            "smoothing system produced non-finite values".to_string(),
        ));
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn short_paths_are_returned_unchanged() {
        let field = Field::new(100.0, 100.0);
        let two = pts(&[(0.0, 0.0), (500.0, 500.0)]);
        assert_eq!(smooth_path(&field, &two).unwrap(), two);
        assert!(smooth_path(&field, &[]).unwrap().is_empty());
    }

    #[test]
    fn duplicate_heavy_path_is_returned_unchanged() {
        let field = Field::new(100.0, 100.0);
        let path = pts(&[(10.0, 10.0), (10.0, 10.0), (20.0, 20.0)]);
        assert_eq!(smooth_path(&field, &path).unwrap(), path);
    }

    #[test]
    fn straight_line_stays_straight() {
        let field = Field::new(100.0, 100.0);
        let path = pts(&[(10.0, 10.0), (20.0, 10.0), (30.0, 10.0), (40.0, 10.0)]);
        let smoothed = smooth_path(&field, &path).unwrap();
        assert_eq!(smoothed.len(), 8);
        for (k, p) in smoothed.iter().enumerate() {
            let expected_x = 10.0 + 30.0 * k as f64 / 7.0;
            assert!((p.x - expected_x).abs() < 1e-6, "x[{k}] = {}", p.x);
            assert!((p.y - 10.0).abs() < 1e-6, "y[{k}] = {}", p.y);
        }
    }

    #[test]
    fn zero_factor_interpolates_knots() {
        let points = pts(&[(10.0, 10.0), (20.0, 30.0), (40.0, 20.0), (50.0, 45.0)]);
        let spline = SmoothingSpline::fit(&points, 0.0).unwrap();
        for (fitted, original) in spline.knot_points().iter().zip(&points) {
            assert!(fitted.distance_to(original) < 1e-9);
        }
        let ends = spline.sample(2).unwrap();
        assert!(ends[0].distance_to(&points[0]) < 1e-9);
        assert!(ends[1].distance_to(&points[3]) < 1e-9);
    }

    #[test]
    fn residual_stays_within_factor() {
        let points = pts(&[
            (10.0, 10.0),
            (20.0, 14.0),
            (30.0, 9.0),
            (40.0, 15.0),
            (50.0, 8.0),
            (60.0, 13.0),
        ]);
        let spline = SmoothingSpline::fit(&points, 0.5).unwrap();
        let residual: f64 = spline
            .knot_points()
            .iter()
            .zip(&points)
            .map(|(a, b)| {
                let d = a.distance_to(b);
                d * d
            })
            .sum();
        assert!(residual <= 0.5 + 1e-9, "residual {residual}");
        assert!(residual > 0.0);
        assert!(spline.weight > 0.0);
    }

    #[test]
    fn smoothed_points_are_valid_and_bounded() {
        let mut field = Field::new(50.0, 50.0);
        field.add_obstacle(25.0, 25.0, 5.0);
        let path = pts(&[
            (2.0, 2.0),
            (48.0, 2.0),
            (48.0, 10.0),
            (2.0, 10.0),
            (2.0, 40.0),
            (48.0, 40.0),
        ]);
        let smoothed = smooth_path(&field, &path).unwrap();
        assert!(smoothed.len() <= 12);
        assert!(smoothed.iter().all(|p| field.is_valid_point(p)));
    }

    #[test]
    fn non_finite_input_is_internal_error() {
        let field = Field::new(100.0, 100.0);
        let path = pts(&[(10.0, 10.0), (f64::NAN, 20.0), (30.0, 30.0)]);
        let err = smooth_path(&field, &path).unwrap_err();
        assert!(matches!(err, PlanError::Internal(_)));
    }

    #[test]
    fn pentadiagonal_solver_matches_known_system() {
        // [4 1 1; 1 4 1; 1 1 4] x = [6 6 6] -> x = [1 1 1]
        let x = solve_pentadiagonal(&[4.0, 4.0, 4.0], &[1.0, 1.0], &[1.0], &[6.0, 6.0, 6.0]).unwrap();
        for value in x {
            assert!((value - 1.0).abs() < 1e-12);
        }
    }
}
