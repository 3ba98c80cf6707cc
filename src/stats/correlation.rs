//! Pearson correlation matrix.

use log::debug;
use nalgebra::DMatrix;
use serde::Serialize;

use super::{Feature, resolve_features};
use crate::error::InsufficientData;
use crate::filter::FilteredView;

/// Columns of the dashboard heatmap.
pub const DEFAULT_CORRELATION_COLUMNS: [&str; 9] = [
    "temp_actual",
    "atemp_actual",
    "hum_actual",
    "windspeed_actual",
    "casual",
    "registered",
    "cnt",
    "hour_of_day",
    "is_weekend",
];

/// Symmetric matrix of Pearson coefficients.
///
/// Entries involving a zero-variance column are NaN. Everything else lies in
/// [-1, 1] and the diagonal of a varying column is exactly 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
    records: usize,
}

impl CorrelationMatrix {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row-major coefficients, `values()[i][j]` pairs `columns()[i]` with `columns()[j]`.
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Number of records the coefficients were computed from.
    pub fn records(&self) -> usize {
        self.records
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.values[self.index_of(a)?][self.index_of(b)?])
    }

    /// Column with the largest |r| against `target`, skipping `target` itself,
    /// the `exclude`d names and undefined coefficients.
    pub fn strongest_with(&self, target: &str, exclude: &[&str]) -> Option<(&str, f64)> {
        let t = self.index_of(target)?;
        self.columns
            .iter()
            .enumerate()
            .filter(|(i, name)| *i != t && !exclude.contains(&name.as_str()))
            .map(|(i, name)| (name.as_str(), self.values[t][i]))
            .filter(|(_, r)| !r.is_nan())
            .fold(None, |best: Option<(&str, f64)>, (name, r)| match best {
                Some((_, b)) if b.abs() >= r.abs() => best,
                _ => Some((name, r)),
            })
    }
}

/// Pearson correlation of every pair of `columns` over `view`.
///
/// Unresolvable names are dropped; fewer than two remaining columns, or fewer
/// than two records, is `InsufficientData`.
pub fn correlation_matrix(view: &FilteredView<'_>, columns: &[&str]) -> Result<CorrelationMatrix, InsufficientData> {
    let features = resolve_features(view, columns);
    if features.len() < 2 {
        return Err(InsufficientData::new(format!(
            "need at least 2 numeric columns, got {}",
            features.len()
        )));
    }
    if view.len() < 2 {
        return Err(InsufficientData::new(format!(
            "need at least 2 records, got {}",
            view.len()
        )));
    }

    let data = feature_matrix(view, &features)?;
    let values = pearson(&data);
    debug!("correlation over {} column(s), {} record(s)", features.len(), view.len());

    Ok(CorrelationMatrix {
        columns: features.iter().map(|f| f.name().to_string()).collect(),
        values,
        records: view.len(),
    })
}

fn feature_matrix(view: &FilteredView<'_>, features: &[Feature]) -> Result<DMatrix<f64>, InsufficientData> {
    let mut data = DMatrix::zeros(view.len(), features.len());
    for (j, feature) in features.iter().enumerate() {
        let column = feature
            .values(view)
            .ok_or_else(|| InsufficientData::new(format!("column '{}' is not numeric", feature.name())))?;
        for (i, v) in column.into_iter().enumerate() {
            data[(i, j)] = v;
        }
    }
    Ok(data)
}

/// Coefficients of the columns of `data` (one observation per row).
fn pearson(data: &DMatrix<f64>) -> Vec<Vec<f64>> {
    let k = data.ncols();
    let n = data.nrows() as f64;

    // Exact min == max detects constant columns; a centered variance would
    // pick up rounding noise from the mean.
    let constant: Vec<bool> = data.column_iter().map(|c| c.min() == c.max()).collect();

    let mut centered = data.clone();
    for mut col in centered.column_iter_mut() {
        let mean = col.sum() / n;
        col.add_scalar_mut(-mean);
    }
    let cov = centered.transpose() * &centered;

    let mut out = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        if constant[i] {
            continue;
        }
        out[i][i] = 1.0;
        for j in (i + 1)..k {
            if constant[j] {
                continue;
            }
            let r = (cov[(i, j)] / (cov[(i, i)] * cov[(j, j)]).sqrt()).clamp(-1.0, 1.0);
            out[i][j] = r;
            out[j][i] = r;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dataset, record};

    fn view_data() -> crate::domain::Dataset {
        let temps = [5.0, 10.0, 15.0, 20.0];
        let hums = [0.9, 0.7, 0.8, 0.4];
        let counts = [(1, 9), (3, 17), (6, 24), (10, 40)];
        let rows = temps
            .iter()
            .zip(hums)
            .zip(counts)
            .map(|((t, h), (c, r))| {
                let mut rec = record("2011-01-03 08:00:00", "Winter", c, r);
                rec.temp_actual = *t;
                rec.atemp_actual = t * 2.0;
                rec.hum_actual = h;
                rec
            })
            .collect();
        dataset(rows)
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let ds = view_data();
        let m = correlation_matrix(&FilteredView::all(&ds), &["temp_actual", "hum_actual", "cnt"]).unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(m.records(), 4);
        for i in 0..3 {
            assert_eq!(m.values()[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(m.values()[i][j], m.values()[j][i]);
                assert!((-1.0..=1.0).contains(&m.values()[i][j]));
            }
        }
        assert!(m.get("temp_actual", "cnt").unwrap() > 0.9);
        assert!(m.get("hum_actual", "cnt").unwrap() < 0.0);
    }

    #[test]
    fn linear_relation_is_exactly_one() {
        let ds = view_data();
        let m = correlation_matrix(&FilteredView::all(&ds), &["temp_actual", "atemp_actual"]).unwrap();
        assert!((m.get("temp_actual", "atemp_actual").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_variance_column_is_nan_not_zero() {
        let ds = view_data();
        // windspeed is the same in every fixture record.
        let m = correlation_matrix(&FilteredView::all(&ds), &["windspeed_actual", "cnt"]).unwrap();
        assert!(m.get("windspeed_actual", "cnt").unwrap().is_nan());
        assert!(m.get("windspeed_actual", "windspeed_actual").unwrap().is_nan());
        assert_eq!(m.get("cnt", "cnt"), Some(1.0));
    }

    #[test]
    fn fewer_than_two_columns_is_insufficient() {
        let ds = view_data();
        let err = correlation_matrix(&FilteredView::all(&ds), &["cnt", "bogus"]).unwrap_err();
        assert!(err.reason.contains("2 numeric columns"));
    }

    #[test]
    fn fewer_than_two_records_is_insufficient() {
        let ds = dataset(vec![record("2011-01-03 08:00:00", "Winter", 1, 2)]);
        assert!(correlation_matrix(&FilteredView::all(&ds), &DEFAULT_CORRELATION_COLUMNS).is_err());
    }

    #[test]
    fn strongest_feature_ignores_self_and_nan() {
        let ds = view_data();
        let m = correlation_matrix(&FilteredView::all(&ds), &DEFAULT_CORRELATION_COLUMNS).unwrap();
        let (name, r) = m.strongest_with("cnt", &[]).unwrap();
        assert_ne!(name, "cnt");
        assert!(!r.is_nan());
        assert!(r.abs() > 0.9);

        let (name, _) = m.strongest_with("cnt", &["casual", "registered"]).unwrap();
        assert!(["temp_actual", "atemp_actual", "hum_actual"].contains(&name), "{name}");
    }
}
