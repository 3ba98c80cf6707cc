//! Shared "dashboard pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset -> filter -> aggregate tables / correlation / trend fits
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::NaiveDate;
use clap::ValueEnum;
use log::debug;

use crate::aggregate::{self, AggregateTable, LabeledTable, Totals, UserShare};
use crate::domain::{Dataset, FilterSpec, RushWindow};
use crate::error::InsufficientData;
use crate::filter::{self, FilteredView};
use crate::stats::{self, CorrelationMatrix, DEFAULT_CORRELATION_COLUMNS, DEFAULT_TREND_PAIRS, LinearFit};

/// One fitted trend plus the points it was fitted on.
#[derive(Debug, Clone)]
pub struct TrendLine {
    pub x: &'static str,
    pub y: &'static str,
    pub points: Vec<(f64, f64)>,
    pub fit: Result<LinearFit, InsufficientData>,
}

/// Everything the dashboard shows for one filter.
///
/// Recomputed from scratch whenever the filter changes.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub filter: FilterSpec,
    pub totals: Totals,
    pub user_share: Option<UserShare>,

    pub daily: AggregateTable<NaiveDate>,
    pub hourly: AggregateTable<u8>,
    pub weekday: AggregateTable<String>,
    pub monthly: AggregateTable<String>,
    pub season: AggregateTable<String>,
    pub weather: AggregateTable<String>,
    pub temperature: AggregateTable<String>,
    pub workingday: AggregateTable<String>,
    pub hourly_workingday: AggregateTable<(u8, String)>,
    pub rush_hour: AggregateTable<RushWindow>,

    pub correlation: Result<CorrelationMatrix, InsufficientData>,
    pub trends: Vec<TrendLine>,
}

impl DashboardSnapshot {
    pub fn compute(dataset: &Dataset, spec: &FilterSpec) -> Self {
        let view = filter::apply(dataset, spec);
        let snapshot = Self::from_view(&view, spec.clone());
        debug!(
            "snapshot [{}]: {} record(s), {} day(s)",
            spec.describe(),
            snapshot.totals.records,
            snapshot.daily.len()
        );
        snapshot
    }

    pub fn from_view(view: &FilteredView<'_>, filter: FilterSpec) -> Self {
        let totals = Totals::of(view);
        let trends = DEFAULT_TREND_PAIRS
            .iter()
            .map(|&(x, y)| TrendLine {
                x,
                y,
                points: stats::scatter_points(view, x, y).unwrap_or_default(),
                fit: stats::linear_fit(view, x, y),
            })
            .collect();

        Self {
            filter,
            totals,
            user_share: totals.user_share(),
            daily: aggregate::daily_totals(view),
            hourly: aggregate::hourly_means(view),
            weekday: aggregate::weekday_means(view),
            monthly: aggregate::monthly_means(view),
            season: aggregate::season_means(view),
            weather: aggregate::weather_means(view),
            temperature: aggregate::temperature_means(view),
            workingday: aggregate::workingday_means(view),
            hourly_workingday: aggregate::hourly_by_day_type(view),
            rush_hour: aggregate::rush_hour_means(view),
            correlation: stats::correlation_matrix(view, &DEFAULT_CORRELATION_COLUMNS),
            trends,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.totals.records == 0
    }

    pub fn trend(&self, x: &str, y: &str) -> Option<&TrendLine> {
        self.trends.iter().find(|t| t.x == x && t.y == y)
    }

    /// A grouped table rendered with text keys; `None` for the correlation matrix.
    pub fn labeled(&self, name: TableName) -> Option<LabeledTable> {
        let text = |k: &String| vec![k.clone()];
        let table = match name {
            TableName::Daily => self.daily.labeled(&["date"], |d| vec![d.to_string()]),
            TableName::Hourly => self.hourly.labeled(&["hour"], |h| vec![h.to_string()]),
            TableName::Weekday => self.weekday.labeled(&["weekday"], text),
            TableName::Monthly => self.monthly.labeled(&["month"], text),
            TableName::Season => self.season.labeled(&["season"], text),
            TableName::Weather => self.weather.labeled(&["weather"], text),
            TableName::Temperature => self.temperature.labeled(&["temp_category"], text),
            TableName::Workingday => self.workingday.labeled(&["workingday"], text),
            TableName::HourlyWorkingday => self
                .hourly_workingday
                .labeled(&["hour", "workingday"], |(h, d)| vec![h.to_string(), d.clone()]),
            TableName::RushHour => self.rush_hour.labeled(&["window"], |w| vec![w.label().to_string()]),
            TableName::Correlation => return None,
        };
        Some(table)
    }
}

/// Tables that can be printed or exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableName {
    Daily,
    Hourly,
    Weekday,
    Monthly,
    Season,
    Weather,
    Temperature,
    Workingday,
    HourlyWorkingday,
    RushHour,
    Correlation,
}

impl TableName {
    pub const ALL: [TableName; 11] = [
        TableName::Daily,
        TableName::Hourly,
        TableName::Weekday,
        TableName::Monthly,
        TableName::Season,
        TableName::Weather,
        TableName::Temperature,
        TableName::Workingday,
        TableName::HourlyWorkingday,
        TableName::RushHour,
        TableName::Correlation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            TableName::Daily => "Daily rentals (sum)",
            TableName::Hourly => "Rentals by hour (mean)",
            TableName::Weekday => "Rentals by weekday (mean)",
            TableName::Monthly => "Rentals by month (mean)",
            TableName::Season => "Rentals by season (mean)",
            TableName::Weather => "Rentals by weather (mean)",
            TableName::Temperature => "Rentals by temperature (mean)",
            TableName::Workingday => "Rentals by day type (mean)",
            TableName::HourlyWorkingday => "Hourly users by day type (mean)",
            TableName::RushHour => "Rush hour rentals (mean)",
            TableName::Correlation => "Correlation matrix",
        }
    }
}
