//! Correlation and trend statistics over a `FilteredView`.
//!
//! Both computations work on named numeric features. A name resolves to one of
//! the typed schema fields or to an extra header column whose value parses as
//! a number in every viewed record; anything else is dropped.

use log::debug;

use crate::domain::{NumericColumn, Record};
use crate::filter::FilteredView;

pub mod correlation;
pub mod trend;

pub use correlation::*;
pub use trend::*;

/// A numeric feature that can be read off every record of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature {
    Schema(NumericColumn),
    Extra(String),
}

impl Feature {
    pub fn name(&self) -> &str {
        match self {
            Feature::Schema(col) => col.name(),
            Feature::Extra(name) => name,
        }
    }

    /// Numeric value for `record`; `None` only for extras that fail to parse.
    pub fn value(&self, record: &Record) -> Option<f64> {
        match self {
            Feature::Schema(col) => Some(record.numeric(*col)),
            Feature::Extra(name) => record
                .extras
                .get(name)
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite()),
        }
    }

    /// Column of values over the whole view, or `None` if any record lacks one.
    pub fn values(&self, view: &FilteredView<'_>) -> Option<Vec<f64>> {
        view.iter().map(|r| self.value(r)).collect()
    }
}

/// Resolve `name` against the view's schema.
pub fn resolve_feature(view: &FilteredView<'_>, name: &str) -> Option<Feature> {
    if let Some(col) = NumericColumn::from_name(name) {
        return Some(Feature::Schema(col));
    }

    let name = name.trim().to_ascii_lowercase();
    if !view.columns().iter().any(|c| *c == name) {
        return None;
    }
    let feature = Feature::Extra(name);
    view.iter().all(|r| feature.value(r).is_some()).then_some(feature)
}

/// Resolve every name, dropping unknown, non-numeric and repeated ones.
pub fn resolve_features(view: &FilteredView<'_>, names: &[&str]) -> Vec<Feature> {
    let mut features: Vec<Feature> = Vec::with_capacity(names.len());
    for name in names {
        match resolve_feature(view, name) {
            Some(f) if features.iter().any(|seen| seen.name() == f.name()) => {}
            Some(f) => features.push(f),
            None => debug!("dropping column '{name}': not a numeric column of this view"),
        }
    }
    features
}
