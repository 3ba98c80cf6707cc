//! Ordinary least squares.
//!
//! The dashboard only fits straight lines (`y = a + b·x`), but the solver takes
//! a general design matrix so the trend code can stay a thin wrapper:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation notes:
//! - The system is solved through SVD, which copes with tall matrices (far
//!   more rows than columns) and with nearly collinear columns.
//!   (Nalgebra's `QR::solve` is intended for square systems and panics for
//!   non-square matrices.)
//! - Callers reject degenerate inputs (too few rows, constant regressor)
//!   before getting here; `None` is the last line for what slips through.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || x.nrows() == 0 {
        return None;
    }
    let svd = x.clone().svd(true, true);

    // Loosen the singular-value cutoff step by step before giving up.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Design matrix `[1, x_i]` for a simple linear regression.
pub fn intercept_design(xs: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(xs.len(), 2, |i, j| if j == 0 { 1.0 } else { xs[i] })
}

/// Fit `y = intercept + slope·x`, returning `(intercept, slope)`.
///
/// x is centered and scaled to [-1, 1] before solving, so the singular-value
/// cutoff in `solve_least_squares` is relative to the spread of x rather than
/// its units. `None` when x has no spread.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() != ys.len() || xs.is_empty() {
        return None;
    }
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    let scale = xs.iter().fold(0.0_f64, |m, x| m.max((x - mean).abs()));
    if !(scale.is_finite() && scale > 0.0) {
        return None;
    }

    let scaled: Vec<f64> = xs.iter().map(|x| (x - mean) / scale).collect();
    let beta = solve_least_squares(&intercept_design(&scaled), &DVector::from_column_slice(ys))?;
    let slope = beta[1] / scale;
    let intercept = beta[0] - slope * mean;
    (slope.is_finite() && intercept.is_finite()).then_some((intercept, slope))
}

/// Coefficient of determination of `fitted` against `observed`.
///
/// `None` when `observed` is constant (R² is undefined).
pub fn r_squared(observed: &[f64], fitted: &[f64]) -> Option<f64> {
    let n = observed.len();
    if n == 0 || n != fitted.len() {
        return None;
    }
    let mean = observed.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();
    if ss_tot <= f64::EPSILON * n as f64 {
        return None;
    }
    let ss_res: f64 = observed.iter().zip(fitted).map(|(y, f)| (y - f).powi(2)).sum();
    Some((1.0 - ss_res / ss_tot).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = intercept_design(&[0.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn line_fit_survives_tiny_x_scale() {
        let xs = [0.0, 1e-11, 2e-11, 3e-11];
        let (intercept, slope) = fit_line(&xs, &[0.0, 1.0, 2.0, 3.0]).unwrap();
        assert!((slope / 1e11 - 1.0).abs() < 1e-9);
        assert!(intercept.abs() < 1e-9);

        let (intercept, slope) = fit_line(&[1e6, 1e6 + 1.0, 1e6 + 2.0], &[5.0, 7.0, 9.0]).unwrap();
        assert!((slope - 2.0).abs() < 1e-6);
        assert!((intercept - (5.0 - 2e6)).abs() < 1e-3);
    }

    #[test]
    fn line_fit_needs_spread() {
        assert!(fit_line(&[2.0, 2.0], &[1.0, 3.0]).is_none());
        assert!(fit_line(&[], &[]).is_none());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let x = intercept_design(&[0.0, 1.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(solve_least_squares(&x, &y).is_none());
    }

    #[test]
    fn r_squared_of_perfect_and_constant_fits() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(r_squared(&y, &y), Some(1.0));
        assert_eq!(r_squared(&[4.0, 4.0], &[4.0, 4.0]), None);

        let r2 = r_squared(&[1.0, 3.0, 2.0], &[1.5, 2.0, 2.5]).unwrap();
        assert!(r2 > 0.0 && r2 < 1.0);
    }
}
