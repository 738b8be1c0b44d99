//! Least-squares trend lines.
//!
//! Fits `y = intercept + slope * x` by solving the design system with SVD.
//! `nalgebra`'s `QR::solve` only accepts square systems, and the design
//! matrix here is tall (one row per observation).

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }
    None
}

/// Fit a straight line through `(x, y)` pairs.
///
/// Returns `None` for fewer than two points or a constant `x`.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let x0 = x[0];
    if x[..n].iter().all(|v| (v - x0).abs() < 1e-12) {
        return None;
    }

    let design = DMatrix::from_fn(n, 2, |r, c| if c == 0 { 1.0 } else { x[r] });
    let target = DVector::from_row_slice(&y[..n]);
    let beta = solve_least_squares(&design, &target)?;

    Some(LinearFit {
        intercept: beta[0],
        slope: beta[1],
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_recovers_exact_relationship() {
        let vix = [12.0, 18.0, 25.0, 33.0, 41.0];
        let hy: Vec<f64> = vix.iter().map(|v| 2.0 * v + 5.0).collect();
        let fit = fit_line(&vix, &hy).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 5.0).abs() < 1e-9);
        assert!((fit.predict(10.0) - 25.0).abs() < 1e-9);
        assert_eq!(fit.n, 5);
    }

    #[test]
    fn fit_line_rejects_constant_x() {
        assert!(fit_line(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(fit_line(&[1.0], &[1.0]).is_none());
    }
}
