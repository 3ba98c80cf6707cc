//! Shared domain types.
//!
//! These types are intentionally plain data so they can be:
//!
//! - loaded once and shared read-only between views
//! - filtered and grouped without copying records
//! - exported to CSV/JSON

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sentinel accepted wherever a categorical filter can be left unconstrained.
pub const ALL_SENTINEL: &str = "All";

/// Canonical weekday order (Monday first).
pub const WEEKDAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Canonical month order.
pub const MONTH_ORDER: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Canonical season order.
pub const SEASON_ORDER: [&str; 4] = ["Spring", "Summer", "Fall", "Winter"];

/// Canonical temperature bucket order (coldest first).
pub const TEMP_CATEGORY_ORDER: [&str; 4] = ["Cold", "Mild", "Warm", "Hot"];

/// Canonical weather order (best weather first).
pub const WEATHER_ORDER: [&str; 4] = ["Clear", "Cloudy", "Light Rain/Snow", "Heavy Rain/Snow"];

/// One row of the rental dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub timestamp: NaiveDateTime,

    pub season_label: String,
    pub weathersit_label: String,
    pub workingday_label: String,
    pub weekday_label: String,
    pub month_name: String,
    pub hour_of_day: u8,
    pub temp_category: String,

    pub temp_actual: f64,
    pub atemp_actual: f64,
    pub hum_actual: f64,
    pub windspeed_actual: f64,

    pub is_rush_hour_morning: bool,
    pub is_rush_hour_evening: bool,
    pub is_weekend: bool,

    pub casual: u32,
    pub registered: u32,
    /// Always `casual + registered` (checked at load).
    pub cnt: u32,

    /// Columns outside the known schema, keyed by normalized header name.
    pub extras: BTreeMap<String, String>,
}

impl Record {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn measure(&self, measure: Measure) -> u32 {
        match measure {
            Measure::Casual => self.casual,
            Measure::Registered => self.registered,
            Measure::Cnt => self.cnt,
        }
    }

    pub fn rush_window(&self) -> RushWindow {
        RushWindow::classify(self.is_rush_hour_morning, self.is_rush_hour_evening)
    }

    pub fn numeric(&self, column: NumericColumn) -> f64 {
        match column {
            NumericColumn::TempActual => self.temp_actual,
            NumericColumn::AtempActual => self.atemp_actual,
            NumericColumn::HumActual => self.hum_actual,
            NumericColumn::WindspeedActual => self.windspeed_actual,
            NumericColumn::Casual => f64::from(self.casual),
            NumericColumn::Registered => f64::from(self.registered),
            NumericColumn::Cnt => f64::from(self.cnt),
            NumericColumn::HourOfDay => f64::from(self.hour_of_day),
            NumericColumn::IsWeekend => {
                if self.is_weekend {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// The loaded dataset: records in file order plus the header schema.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    columns: Vec<String>,
}

impl Dataset {
    pub fn new(records: Vec<Record>, columns: Vec<String>) -> Self {
        Self { records, columns }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Normalized header names, in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest calendar date in the dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().map(Record::date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    pub fn season_labels(&self) -> Vec<String> {
        distinct_sorted(self.records.iter().map(|r| r.season_label.as_str()))
    }

    pub fn weather_labels(&self) -> Vec<String> {
        distinct_sorted(self.records.iter().map(|r| r.weathersit_label.as_str()))
    }

    pub fn day_type_labels(&self) -> Vec<String> {
        distinct_sorted(self.records.iter().map(|r| r.workingday_label.as_str()))
    }
}

fn distinct_sorted<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    labels
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Rental counts that can be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Casual,
    Registered,
    Cnt,
}

impl Measure {
    pub const ALL: [Measure; 3] = [Measure::Casual, Measure::Registered, Measure::Cnt];

    pub fn name(self) -> &'static str {
        match self {
            Measure::Casual => "casual",
            Measure::Registered => "registered",
            Measure::Cnt => "cnt",
        }
    }
}

/// How a group's values are folded into one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Sum,
    Mean,
}

impl Reducer {
    /// Reduce an integer sum over `n` records. `n` is never zero for an emitted group.
    pub fn reduce(self, sum: u64, n: usize) -> f64 {
        match self {
            Reducer::Sum => sum as f64,
            Reducer::Mean => sum as f64 / n as f64,
        }
    }
}

/// Date part of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSelection {
    /// No date constraint.
    #[default]
    All,
    /// Only one endpoint picked. Treated as "no date constraint".
    Single(NaiveDate),
    /// Inclusive range. `start > end` matches nothing.
    Range { start: NaiveDate, end: NaiveDate },
}

impl DateSelection {
    pub fn from_endpoints(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => DateSelection::Range { start, end },
            (Some(d), None) | (None, Some(d)) => DateSelection::Single(d),
            (None, None) => DateSelection::All,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DateSelection::All | DateSelection::Single(_) => true,
            DateSelection::Range { start, end } => start <= date && date <= end,
        }
    }
}

impl fmt::Display for DateSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateSelection::All => write!(f, "all dates"),
            DateSelection::Single(d) => write!(f, "{d} (single date, unfiltered)"),
            DateSelection::Range { start, end } => write!(f, "{start} → {end}"),
        }
    }
}

/// A categorical filter value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    #[default]
    All,
    Only(String),
}

impl Choice {
    /// Parse a user-facing value. Empty input and `All` (any case) mean no constraint.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL_SENTINEL) {
            Choice::All
        } else {
            Choice::Only(value.to_string())
        }
    }

    pub fn from_option(value: Option<&str>) -> Self {
        value.map(Choice::parse).unwrap_or_default()
    }

    pub fn matches(&self, label: &str) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => wanted == label,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => write!(f, "{ALL_SENTINEL}"),
            Choice::Only(v) => write!(f, "{v}"),
        }
    }
}

/// The analyst's current selection. Every field defaults to "no constraint".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    pub dates: DateSelection,
    pub season: Choice,
    pub weather: Choice,
    pub day_type: Choice,
}

impl FilterSpec {
    pub fn describe(&self) -> String {
        format!(
            "dates: {} | season: {} | weather: {} | day type: {}",
            self.dates, self.season, self.weather, self.day_type
        )
    }
}

/// Rush-hour bucket derived from the two rush-hour flags.
///
/// The evening flag wins when both are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RushWindow {
    Baseline,
    Morning,
    Evening,
}

impl RushWindow {
    pub fn classify(morning: bool, evening: bool) -> Self {
        if evening {
            RushWindow::Evening
        } else if morning {
            RushWindow::Morning
        } else {
            RushWindow::Baseline
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RushWindow::Baseline => "Regular hours",
            RushWindow::Morning => "Morning rush (7-9)",
            RushWindow::Evening => "Evening rush (17-19)",
        }
    }
}

impl fmt::Display for RushWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Numeric schema fields usable in correlations and trend fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    TempActual,
    AtempActual,
    HumActual,
    WindspeedActual,
    Casual,
    Registered,
    Cnt,
    HourOfDay,
    IsWeekend,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 9] = [
        NumericColumn::TempActual,
        NumericColumn::AtempActual,
        NumericColumn::HumActual,
        NumericColumn::WindspeedActual,
        NumericColumn::Casual,
        NumericColumn::Registered,
        NumericColumn::Cnt,
        NumericColumn::HourOfDay,
        NumericColumn::IsWeekend,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::TempActual => "temp_actual",
            NumericColumn::AtempActual => "atemp_actual",
            NumericColumn::HumActual => "hum_actual",
            NumericColumn::WindspeedActual => "windspeed_actual",
            NumericColumn::Casual => "casual",
            NumericColumn::Registered => "registered",
            NumericColumn::Cnt => "cnt",
            NumericColumn::HourOfDay => "hour_of_day",
            NumericColumn::IsWeekend => "is_weekend",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|c| c.name().eq_ignore_ascii_case(name))
    }
}
