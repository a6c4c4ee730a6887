//! Ordinary least squares for a single predictor.
//!
//! Every kinetic model in this crate reduces to fitting
//!
//! ```text
//! y'_i = slope * x'_i + intercept
//! ```
//!
//! on linearized data, so the regressor works from the closed-form sums
//! (`Σx`, `Σy`, `Σxy`, `Σx²`, `Σy²`) and reports the squared Pearson correlation
//! as R².
//!
//! Two entry points:
//! - [`try_fit`] returns a typed error for mismatched, degenerate or non-finite input.
//! - [`fit`] collapses every failure to [`RegressionResult::INVALID`] (`rsq = -1`)
//!   for callers that only inspect the sentinel.

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{KineticsError, KineticsResult};

/// Relative tolerance for treating a centred sum of squares as zero.
const VARIANCE_EPS: f64 = 1e-12;

/// Slope, intercept and coefficient of determination of a straight-line fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    pub rsq: f64,
}

impl RegressionResult {
    /// Sentinel for "input invalid". `rsq = -1` is never a measured value.
    pub const INVALID: RegressionResult = RegressionResult {
        slope: 0.0,
        intercept: 0.0,
        rsq: -1.0,
    };

    pub fn is_invalid(&self) -> bool {
        self.rsq < 0.0
    }

    /// Evaluate the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `y` against `x`, returning [`RegressionResult::INVALID`] on any failure.
pub fn fit(x: &[f64], y: &[f64]) -> RegressionResult {
    try_fit(x, y).unwrap_or(RegressionResult::INVALID)
}

/// Fit `y` against `x` by ordinary least squares.
///
/// Fails with:
/// - `LengthMismatch` if the series differ in length
/// - `NonFinite` if any input is NaN or infinite
/// - `DegenerateInput` for fewer than two points or zero variance in `x` or `y`
///   (the slope or the correlation would divide by zero)
pub fn try_fit(x: &[f64], y: &[f64]) -> KineticsResult<RegressionResult> {
    if x.len() != y.len() {
        return Err(KineticsError::LengthMismatch {
            expected: x.len(),
            found: y.len(),
        });
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(KineticsError::NonFinite);
    }
    if x.len() < 2 {
        return Err(KineticsError::DegenerateInput("fewer than two points"));
    }

    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_sq_x: f64 = x.iter().map(|v| v * v).sum();
    let sum_sq_y: f64 = y.iter().map(|v| v * v).sum();
    let sum_xy: f64 = x.iter().zip(y.iter()).map(|(a, b)| a * b).sum();

    let sxx = n * sum_sq_x - sum_x * sum_x;
    let syy = n * sum_sq_y - sum_y * sum_y;
    let sxy = n * sum_xy - sum_x * sum_y;

    // Cancellation can leave a tiny (even negative) residue for constant data.
    if sxx <= VARIANCE_EPS * n * sum_sq_x {
        return Err(KineticsError::DegenerateInput("zero variance in x"));
    }
    if syy <= VARIANCE_EPS * n * sum_sq_y {
        return Err(KineticsError::DegenerateInput("zero variance in y"));
    }

    let slope = sxy / sxx;
    let intercept = sum_y / n - slope * (sum_x / n);
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    let rsq = r * r;

    if !(slope.is_finite() && intercept.is_finite() && rsq.is_finite()) {
        return Err(KineticsError::NonFinite);
    }

    Ok(RegressionResult {
        slope,
        intercept,
        rsq,
    })
}

/// Solve a 2×2 linear system `a · v = b` via LU.
///
/// Returns `None` if the matrix is singular or the solution is not finite.
pub fn solve_2x2(a: Matrix2<f64>, b: Vector2<f64>) -> Option<Vector2<f64>> {
    let v = a.lu().solve(&b)?;
    if v.iter().all(|c| c.is_finite()) {
        Some(v)
    } else {
        None
    }
}
