//! Straight-line trend fits (`y = intercept + slope·x`).

use serde::Serialize;

use super::resolve_feature;
use crate::error::InsufficientData;
use crate::filter::FilteredView;
use crate::math::{fit_line, r_squared};

/// Trend lines the dashboard fits by default, as `(x, y)` column pairs.
pub const DEFAULT_TREND_PAIRS: [(&str, &str); 2] = [("temp_actual", "cnt"), ("hum_actual", "cnt")];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearFit {
    pub x: String,
    pub y: String,
    pub slope: f64,
    pub intercept: f64,
    /// NaN when `y` is constant over the view.
    pub r_squared: f64,
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// End points of the fitted line over `[x_min, x_max]`.
    pub fn segment(&self, x_min: f64, x_max: f64) -> [(f64, f64); 2] {
        [(x_min, self.predict(x_min)), (x_max, self.predict(x_max))]
    }
}

/// Ordinary least squares fit of `y` on `x` over the view.
pub fn linear_fit(view: &FilteredView<'_>, x: &str, y: &str) -> Result<LinearFit, InsufficientData> {
    let points = scatter_points(view, x, y)?;
    if points.len() < 2 {
        return Err(InsufficientData::new(format!(
            "need at least 2 records to fit {y} on {x}, got {}",
            points.len()
        )));
    }

    let xs: Vec<f64> = points.iter().map(|(px, _)| *px).collect();
    let ys: Vec<f64> = points.iter().map(|(_, py)| *py).collect();
    let (lo, hi) = bounds(&xs).ok_or_else(|| InsufficientData::new("no points"))?;
    if lo == hi {
        return Err(InsufficientData::new(format!("{x} has zero variance")));
    }

    let (intercept, slope) =
        fit_line(&xs, &ys).ok_or_else(|| InsufficientData::new(format!("least squares failed for {y} on {x}")))?;

    let fitted: Vec<f64> = xs.iter().map(|v| intercept + slope * v).collect();
    Ok(LinearFit {
        x: x.to_string(),
        y: y.to_string(),
        slope,
        intercept,
        r_squared: r_squared(&ys, &fitted).unwrap_or(f64::NAN),
        n: xs.len(),
    })
}

/// `(x, y)` pairs for a scatter plot, in view order.
pub fn scatter_points(view: &FilteredView<'_>, x: &str, y: &str) -> Result<Vec<(f64, f64)>, InsufficientData> {
    let unknown = |name: &str| InsufficientData::new(format!("'{name}' is not a numeric column"));
    let fx = resolve_feature(view, x).ok_or_else(|| unknown(x))?;
    let fy = resolve_feature(view, y).ok_or_else(|| unknown(y))?;

    let xs = fx.values(view).ok_or_else(|| unknown(x))?;
    let ys = fy.values(view).ok_or_else(|| unknown(y))?;
    Ok(xs.into_iter().zip(ys).collect())
}

/// Smallest and largest value, or `None` for an empty slice.
pub fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(values.iter().fold((first, first), |(lo, hi), v| (lo.min(*v), hi.max(*v))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dataset, record};

    fn fit_data(points: &[(f64, u32)]) -> crate::domain::Dataset {
        let rows = points
            .iter()
            .map(|(t, cnt)| {
                let mut r = record("2011-01-03 08:00:00", "Winter", 0, *cnt);
                r.temp_actual = *t;
                r
            })
            .collect();
        dataset(rows)
    }

    #[test]
    fn exact_line_is_recovered() {
        let ds = fit_data(&[(0.0, 2), (1.0, 5), (2.0, 8), (3.0, 11)]);
        let fit = linear_fit(&FilteredView::all(&ds), "temp_actual", "cnt").unwrap();
        assert!((fit.slope - 3.0).abs() < 1e-9);
        assert!((fit.intercept - 2.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(fit.n, 4);
        assert!((fit.predict(10.0) - 32.0).abs() < 1e-9);
    }

    #[test]
    fn tiny_regressor_scale_keeps_true_slope() {
        let ds = fit_data(&[(0.0, 0), (1e-11, 1), (2e-11, 2), (3e-11, 3)]);
        let fit = linear_fit(&FilteredView::all(&ds), "temp_actual", "cnt").unwrap();
        assert!((fit.slope / 1e11 - 1.0).abs() < 1e-9);
        assert!(fit.intercept.abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn noisy_fit_has_partial_r_squared() {
        let ds = fit_data(&[(0.0, 1), (1.0, 3), (2.0, 2), (3.0, 5)]);
        let fit = linear_fit(&FilteredView::all(&ds), "temp_actual", "cnt").unwrap();
        assert!(fit.slope > 0.0);
        assert!(fit.r_squared > 0.0 && fit.r_squared < 1.0);
    }

    #[test]
    fn single_record_is_insufficient() {
        let ds = fit_data(&[(3.0, 4)]);
        assert!(linear_fit(&FilteredView::all(&ds), "temp_actual", "cnt").is_err());
    }

    #[test]
    fn constant_regressor_is_insufficient() {
        let ds = fit_data(&[(3.0, 4), (3.0, 9)]);
        let err = linear_fit(&FilteredView::all(&ds), "temp_actual", "cnt").unwrap_err();
        assert!(err.reason.contains("zero variance"));
    }

    #[test]
    fn unknown_column_is_insufficient() {
        let ds = fit_data(&[(0.0, 1), (1.0, 2)]);
        assert!(linear_fit(&FilteredView::all(&ds), "temp_actual", "station").is_err());
    }

    #[test]
    fn scatter_keeps_view_order() {
        let ds = fit_data(&[(2.0, 7), (1.0, 3)]);
        let points = scatter_points(&FilteredView::all(&ds), "temp_actual", "cnt").unwrap();
        assert_eq!(points, vec![(2.0, 7.0), (1.0, 3.0)]);
    }
}
