//! Aggregation engine: group a `FilteredView` by a key and reduce the rental
//! measures of each group.
//!
//! - groups exist only for keys that at least one record maps to, so a MEAN
//!   never divides by zero
//! - output order is chosen by the caller (`KeyOrder`), never hash order
//! - `group_by` is a pure function of its inputs

use std::collections::HashMap;
use std::hash::Hash;

use log::trace;
use serde::Serialize;

use crate::domain::{Measure, Record, Reducer};
use crate::filter::FilteredView;

pub mod views;

pub use views::*;

/// How the rows of an `AggregateTable` are ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOrder<K> {
    /// Ascending by the key's `Ord` (dates, hours).
    Natural,
    /// Caller-supplied sequence; keys not in it follow in first-seen order.
    Canonical(Vec<K>),
    /// First-seen order.
    Discovery,
}

impl KeyOrder<String> {
    pub fn labels(order: &[&str]) -> Self {
        KeyOrder::Canonical(order.iter().map(|s| s.to_string()).collect())
    }
}

/// One group of an `AggregateTable`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow<K> {
    pub key: K,
    /// Number of records that landed in this group (always > 0).
    pub records: usize,
    /// Reduced value of each requested measure, in request order.
    pub values: Vec<(Measure, f64)>,
}

impl<K> AggregateRow<K> {
    pub fn value(&self, measure: Measure) -> Option<f64> {
        self.values.iter().find(|(m, _)| *m == measure).map(|(_, v)| *v)
    }
}

/// Grouped summary of a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable<K> {
    measures: Vec<Measure>,
    reducer: Reducer,
    rows: Vec<AggregateRow<K>>,
}

impl<K: PartialEq> AggregateTable<K> {
    pub fn rows(&self) -> &[AggregateRow<K>] {
        &self.rows
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn reducer(&self) -> Reducer {
        self.reducer
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&AggregateRow<K>> {
        self.rows.iter().find(|r| r.key == *key)
    }

    pub fn value(&self, key: &K, measure: Measure) -> Option<f64> {
        self.get(key).and_then(|r| r.value(measure))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.iter().map(|r| &r.key)
    }

    /// `(key, value)` pairs of one measure in table order.
    pub fn series(&self, measure: Measure) -> Vec<(&K, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.value(measure).map(|v| (&r.key, v)))
            .collect()
    }

    /// Sum of the per-group record counts.
    pub fn total_records(&self) -> usize {
        self.rows.iter().map(|r| r.records).sum()
    }

    /// Row with the largest value of `measure` (first one wins on ties).
    pub fn max_by(&self, measure: Measure) -> Option<&AggregateRow<K>> {
        self.extreme_by(measure, |candidate, best| candidate > best)
    }

    /// Row with the smallest value of `measure` (first one wins on ties).
    pub fn min_by(&self, measure: Measure) -> Option<&AggregateRow<K>> {
        self.extreme_by(measure, |candidate, best| candidate < best)
    }

    fn extreme_by(&self, measure: Measure, better: fn(f64, f64) -> bool) -> Option<&AggregateRow<K>> {
        let mut best: Option<(&AggregateRow<K>, f64)> = None;
        for row in &self.rows {
            let Some(v) = row.value(measure) else { continue };
            match best {
                Some((_, b)) if !better(v, b) => {}
                _ => best = Some((row, v)),
            }
        }
        best.map(|(row, _)| row)
    }

    /// Drop the rows whose key fails `keep`.
    pub fn retain(mut self, keep: impl Fn(&K) -> bool) -> Self {
        self.rows.retain(|r| keep(&r.key));
        self
    }

    /// Convert to a string-keyed table for reports and exports.
    pub fn labeled(&self, key_columns: &[&str], cells: impl Fn(&K) -> Vec<String>) -> LabeledTable {
        LabeledTable {
            key_columns: key_columns.iter().map(|s| s.to_string()).collect(),
            measures: self.measures.clone(),
            reducer: self.reducer,
            rows: self
                .rows
                .iter()
                .map(|r| LabeledRow {
                    keys: cells(&r.key),
                    records: r.records,
                    values: r.values.iter().map(|(_, v)| *v).collect(),
                })
                .collect(),
        }
    }
}

/// A table whose keys are already rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledTable {
    pub key_columns: Vec<String>,
    pub measures: Vec<Measure>,
    pub reducer: Reducer,
    pub rows: Vec<LabeledRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledRow {
    pub keys: Vec<String>,
    pub records: usize,
    pub values: Vec<f64>,
}

/// Group `view` by `key_fn` and reduce each of `measures` with `reducer`.
pub fn group_by<K, F>(
    view: &FilteredView<'_>,
    key_fn: F,
    measures: &[Measure],
    reducer: Reducer,
    order: KeyOrder<K>,
) -> AggregateTable<K>
where
    K: Clone + Eq + Hash + Ord,
    F: Fn(&Record) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, usize, Vec<u64>)> = Vec::new();

    for record in view.iter() {
        let key = key_fn(record);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, 0, vec![0; measures.len()]));
                groups.len() - 1
            }
        };

        let (_, n, sums) = &mut groups[slot];
        *n += 1;
        for (sum, measure) in sums.iter_mut().zip(measures) {
            *sum += u64::from(record.measure(*measure));
        }
    }

    let mut rows: Vec<AggregateRow<K>> = groups
        .into_iter()
        .map(|(key, n, sums)| AggregateRow {
            key,
            records: n,
            values: measures
                .iter()
                .zip(sums)
                .map(|(m, sum)| (*m, reducer.reduce(sum, n)))
                .collect(),
        })
        .collect();

    sort_rows(&mut rows, order);
    trace!("group_by produced {} group(s) from {} record(s)", rows.len(), view.len());

    AggregateTable {
        measures: measures.to_vec(),
        reducer,
        rows,
    }
}

fn sort_rows<K: Eq + Hash + Ord>(rows: &mut [AggregateRow<K>], order: KeyOrder<K>) {
    match order {
        KeyOrder::Natural => rows.sort_by(|a, b| a.key.cmp(&b.key)),
        KeyOrder::Canonical(sequence) => {
            let position: HashMap<&K, usize> = sequence.iter().enumerate().map(|(i, k)| (k, i)).collect();
            // Stable sort: unknown keys share the last rank and keep first-seen order.
            rows.sort_by_key(|r| position.get(&r.key).copied().unwrap_or(sequence.len()));
        }
        KeyOrder::Discovery => {}
    }
}

/// Sums of the three measures over a view (the KPI cards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub records: usize,
    pub casual: u64,
    pub registered: u64,
    pub cnt: u64,
}

impl Totals {
    pub fn of(view: &FilteredView<'_>) -> Self {
        view.iter().fold(Totals::default(), |acc, r| Totals {
            records: acc.records + 1,
            casual: acc.casual + u64::from(r.casual),
            registered: acc.registered + u64::from(r.registered),
            cnt: acc.cnt + u64::from(r.cnt),
        })
    }

    /// Casual vs registered share of all rentals, or `None` for zero rentals.
    pub fn user_share(&self) -> Option<UserShare> {
        let total = self.casual + self.registered;
        if total == 0 {
            return None;
        }
        let casual = self.casual as f64 / total as f64;
        Some(UserShare {
            casual,
            registered: 1.0 - casual,
        })
    }
}

/// Fractions in [0, 1] that sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UserShare {
    pub casual: f64,
    pub registered: f64,
}
