//! Filter engine: `Dataset` + `FilterSpec` → `FilteredView`.
//!
//! Every predicate is an independent, side-effect-free test on one record, so
//! the order in which they are checked does not matter. A record either passes
//! all of them or is excluded.

use log::trace;

use crate::domain::{Dataset, FilterSpec, Measure, Record};

/// Records of a dataset that satisfy a filter, in dataset order.
///
/// Borrowed from the dataset; recompute it whenever the filter changes.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    columns: &'a [String],
    records: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    /// The unfiltered view of a dataset.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            columns: dataset.columns(),
            records: dataset.records().iter().collect(),
        }
    }

    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }

    /// Header schema of the underlying dataset.
    pub fn columns(&self) -> &'a [String] {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of one measure across the view.
    pub fn sum(&self, measure: Measure) -> u64 {
        self.iter().map(|r| u64::from(r.measure(measure))).sum()
    }
}

/// Apply every active predicate of `spec` to `dataset`.
pub fn apply<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> FilteredView<'a> {
    let records: Vec<&Record> = dataset.records().iter().filter(|r| matches(r, spec)).collect();
    trace!("filter [{}] kept {}/{} records", spec.describe(), records.len(), dataset.len());
    FilteredView {
        columns: dataset.columns(),
        records,
    }
}

/// True when `record` satisfies every active predicate of `spec`.
pub fn matches(record: &Record, spec: &FilterSpec) -> bool {
    spec.dates.contains(record.date())
        && spec.season.matches(&record.season_label)
        && spec.weather.matches(&record.weathersit_label)
        && spec.day_type.matches(&record.workingday_label)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Choice, DateSelection};
    use crate::testing::{dataset, record, summer_dataset};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mixed_dataset() -> Dataset {
        let mut rows = vec![
            record("2011-01-01 08:00:00", "Spring", 1, 10),
            record("2011-04-10 17:00:00", "Summer", 5, 20),
            record("2011-07-04 12:00:00", "Summer", 40, 60),
            record("2011-10-31 18:00:00", "Fall", 7, 30),
            record("2011-12-25 09:00:00", "Winter", 2, 3),
        ];
        rows[1].weathersit_label = "Cloudy".to_string();
        rows[2].workingday_label = "Weekend/Holiday".to_string();
        rows[4].weathersit_label = "Light Rain/Snow".to_string();
        dataset(rows)
    }

    #[test]
    fn summer_filter_keeps_all_summer_records() {
        let ds = summer_dataset();
        let spec = FilterSpec {
            season: Choice::parse("Summer"),
            ..FilterSpec::default()
        };
        assert_eq!(apply(&ds, &spec).len(), 3);
    }

    #[test]
    fn absent_season_yields_empty_view() {
        let ds = summer_dataset();
        let spec = FilterSpec {
            season: Choice::parse("Winter"),
            ..FilterSpec::default()
        };
        assert!(apply(&ds, &spec).is_empty());
    }

    #[test]
    fn inclusive_date_range() {
        let ds = mixed_dataset();
        let spec = FilterSpec {
            dates: DateSelection::Range {
                start: date(2011, 4, 10),
                end: date(2011, 10, 31),
            },
            ..FilterSpec::default()
        };
        let view = apply(&ds, &spec);
        let seasons: Vec<&str> = view.iter().map(|r| r.season_label.as_str()).collect();
        assert_eq!(seasons, ["Summer", "Summer", "Fall"]);
    }

    #[test]
    fn inverted_range_is_empty_not_error() {
        let ds = mixed_dataset();
        let spec = FilterSpec {
            dates: DateSelection::Range {
                start: date(2011, 12, 31),
                end: date(2011, 1, 1),
            },
            ..FilterSpec::default()
        };
        assert!(apply(&ds, &spec).is_empty());
    }

    #[test]
    fn single_date_falls_back_to_whole_dataset() {
        let ds = mixed_dataset();
        let spec = FilterSpec {
            dates: DateSelection::Single(date(2011, 7, 4)),
            ..FilterSpec::default()
        };
        assert_eq!(apply(&ds, &spec).len(), ds.len());
    }

    #[test]
    fn predicates_are_conjunctive() {
        let ds = mixed_dataset();
        let spec = FilterSpec {
            season: Choice::parse("Summer"),
            weather: Choice::parse("Clear"),
            day_type: Choice::parse("Weekday"),
            ..FilterSpec::default()
        };
        // Only the April record is Cloudy; only the July record is a holiday.
        assert!(apply(&ds, &spec).is_empty());

        let spec = FilterSpec {
            season: Choice::parse("Summer"),
            weather: Choice::parse("Clear"),
            ..FilterSpec::default()
        };
        let view = apply(&ds, &spec);
        assert_eq!(view.len(), 1);
        assert_eq!(view.records()[0].cnt, 100);
    }

    #[test]
    fn view_is_ordered_subsequence_satisfying_spec() {
        let ds = mixed_dataset();
        let spec = FilterSpec {
            dates: DateSelection::Range {
                start: date(2011, 1, 1),
                end: date(2011, 11, 1),
            },
            weather: Choice::All,
            day_type: Choice::parse("Weekday"),
            ..FilterSpec::default()
        };
        let view = apply(&ds, &spec);

        let mut cursor = 0;
        for kept in view.iter() {
            let pos = ds.records()[cursor..]
                .iter()
                .position(|r| std::ptr::eq(r, kept))
                .expect("view record must come from the dataset, in order");
            cursor += pos + 1;
            assert!(matches(kept, &spec));
        }
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn apply_is_deterministic() {
        let ds = mixed_dataset();
        let spec = FilterSpec {
            season: Choice::parse("Summer"),
            ..FilterSpec::default()
        };
        let a: Vec<*const Record> = apply(&ds, &spec).iter().map(|r| r as *const _).collect();
        let b: Vec<*const Record> = apply(&ds, &spec).iter().map(|r| r as *const _).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn sums_respect_count_invariant() {
        let ds = mixed_dataset();
        let view = FilteredView::all(&ds);
        assert_eq!(view.sum(Measure::Casual) + view.sum(Measure::Registered), view.sum(Measure::Cnt));
    }
}
