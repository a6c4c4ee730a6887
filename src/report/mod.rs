//! Reporting utilities: fitted values, residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::Linearized;
use crate::error::AppError;
use crate::math::RegressionResult;

/// One linearized point against the fitted line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointRow {
    pub x: f64,
    pub y: f64,
    pub y_fit: f64,
    pub residual: f64,
}

/// Compute fitted values and residuals for each linearized point.
pub fn compute_point_rows(linearized: &Linearized, line: &RegressionResult) -> Result<Vec<PointRow>, AppError> {
    let residuals = linearized.residuals(line);
    let mut out = Vec::with_capacity(linearized.len());
    for ((&x, &y), residual) in linearized.x.iter().zip(linearized.y.iter()).zip(residuals) {
        let y_fit = line.predict(x);
        if !(y_fit.is_finite() && residual.is_finite()) {
            return Err(AppError::new(4, "Non-finite fitted value during residual computation."));
        }
        out.push(PointRow { x, y, y_fit, residual });
    }
    Ok(out)
}

/// Indices of the `top_n` points farthest from the line, largest first.
pub fn largest_residuals(rows: &[PointRow], top_n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        rows[b]
            .residual
            .abs()
            .partial_cmp(&rows[a].residual.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.truncate(top_n);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> RegressionResult {
        RegressionResult {
            slope: 2.0,
            intercept: 1.0,
            rsq: 0.98,
        }
    }

    #[test]
    fn point_rows_basic() {
        let lin = Linearized::new(vec![0.0, 1.0, 2.0], vec![1.0, 3.5, 4.0]);
        let rows = compute_point_rows(&lin, &line()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].y_fit, 3.0);
        assert_eq!(rows[1].residual, 0.5);
        assert_eq!(rows[2].residual, -1.0);
    }

    #[test]
    fn largest_residuals_rank_by_magnitude() {
        let lin = Linearized::new(vec![0.0, 1.0, 2.0], vec![1.0, 3.5, 4.0]);
        let rows = compute_point_rows(&lin, &line()).unwrap();
        assert_eq!(largest_residuals(&rows, 2), vec![2, 1]);
        assert_eq!(largest_residuals(&rows, 10).len(), 3);
    }
}
