//! The grouped tables the dashboard renders.
//!
//! Each function fixes a key, a reducer and an ordering; the generic work is
//! done by [`group_by`](super::group_by).

use chrono::NaiveDate;

use super::{AggregateTable, KeyOrder, group_by};
use crate::domain::{
    MONTH_ORDER, Measure, Reducer, RushWindow, SEASON_ORDER, TEMP_CATEGORY_ORDER, WEATHER_ORDER, WEEKDAY_ORDER,
};
use crate::filter::FilteredView;

/// Rentals summed per calendar date (the trend lines).
pub fn daily_totals(view: &FilteredView<'_>) -> AggregateTable<NaiveDate> {
    group_by(view, |r| r.date(), &Measure::ALL, Reducer::Sum, KeyOrder::Natural)
}

/// Mean rentals per hour of day.
pub fn hourly_means(view: &FilteredView<'_>) -> AggregateTable<u8> {
    group_by(view, |r| r.hour_of_day, &Measure::ALL, Reducer::Mean, KeyOrder::Natural)
}

/// Mean rentals per weekday, Monday first.
pub fn weekday_means(view: &FilteredView<'_>) -> AggregateTable<String> {
    label_means(view, |r| r.weekday_label.clone(), &WEEKDAY_ORDER)
}

/// Mean rentals per month, January first.
pub fn monthly_means(view: &FilteredView<'_>) -> AggregateTable<String> {
    label_means(view, |r| r.month_name.clone(), &MONTH_ORDER)
}

pub fn season_means(view: &FilteredView<'_>) -> AggregateTable<String> {
    label_means(view, |r| r.season_label.clone(), &SEASON_ORDER)
}

pub fn weather_means(view: &FilteredView<'_>) -> AggregateTable<String> {
    label_means(view, |r| r.weathersit_label.clone(), &WEATHER_ORDER)
}

pub fn temperature_means(view: &FilteredView<'_>) -> AggregateTable<String> {
    label_means(view, |r| r.temp_category.clone(), &TEMP_CATEGORY_ORDER)
}

/// Mean rentals per working-day label (alphabetical).
pub fn workingday_means(view: &FilteredView<'_>) -> AggregateTable<String> {
    group_by(
        view,
        |r| r.workingday_label.clone(),
        &Measure::ALL,
        Reducer::Mean,
        KeyOrder::Natural,
    )
}

/// Mean casual/registered rentals per (hour, working-day label).
pub fn hourly_by_day_type(view: &FilteredView<'_>) -> AggregateTable<(u8, String)> {
    group_by(
        view,
        |r| (r.hour_of_day, r.workingday_label.clone()),
        &[Measure::Casual, Measure::Registered],
        Reducer::Mean,
        KeyOrder::Natural,
    )
}

/// Mean rentals in the morning and evening rush windows.
///
/// Records outside both windows form the baseline bucket, which is dropped.
pub fn rush_hour_means(view: &FilteredView<'_>) -> AggregateTable<RushWindow> {
    group_by(view, |r| r.rush_window(), &Measure::ALL, Reducer::Mean, KeyOrder::Natural)
        .retain(|w| *w != RushWindow::Baseline)
}

fn label_means(
    view: &FilteredView<'_>,
    key: impl Fn(&crate::domain::Record) -> String,
    order: &[&str],
) -> AggregateTable<String> {
    group_by(view, key, &Measure::ALL, Reducer::Mean, KeyOrder::labels(order))
}
