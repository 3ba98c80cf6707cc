//! Test fixtures shared by the unit tests.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::domain::{Dataset, Record};

pub const HEADER: &str = "datetime,season_label,weathersit_label,workingday_label,weekday_label,month_name,\
hour_of_day,temp_category,temp_actual,atemp_actual,hum_actual,windspeed_actual,\
is_rush_hour_morning,is_rush_hour_evening,is_weekend,casual,registered,cnt";

/// A valid CSV line matching `HEADER` with the given timestamp and counts.
pub fn csv_line(datetime: &str, season: &str, casual: u32, registered: u32) -> String {
    format!(
        "{datetime},{season},Clear,Weekday,Monday,January,8,Mild,14.5,17.2,0.55,12.0,1,0,0,{casual},{registered},{}",
        casual + registered
    )
}

pub fn csv_text(lines: &[String]) -> String {
    let mut out = String::from(HEADER);
    for line in lines {
        out.push('\n');
        out.push_str(line);
    }
    out.push('\n');
    out
}

/// A record with neutral defaults; tests override the fields they care about.
pub fn record(timestamp: &str, season: &str, casual: u32, registered: u32) -> Record {
    Record {
        timestamp: NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").unwrap(),
        season_label: season.to_string(),
        weathersit_label: "Clear".to_string(),
        workingday_label: "Weekday".to_string(),
        weekday_label: "Monday".to_string(),
        month_name: "January".to_string(),
        hour_of_day: 8,
        temp_category: "Mild".to_string(),
        temp_actual: 14.5,
        atemp_actual: 17.2,
        hum_actual: 0.55,
        windspeed_actual: 12.0,
        is_rush_hour_morning: true,
        is_rush_hour_evening: false,
        is_weekend: false,
        casual,
        registered,
        cnt: casual + registered,
        extras: BTreeMap::new(),
    }
}

pub fn dataset(records: Vec<Record>) -> Dataset {
    let columns = HEADER.split(',').map(str::to_string).collect();
    Dataset::new(records, columns)
}

/// The three-record "Summer" scenario: cnt = [10, 20, 30].
pub fn summer_dataset() -> Dataset {
    dataset(vec![
        record("2011-06-01 08:00:00", "Summer", 2, 8),
        record("2011-06-02 08:00:00", "Summer", 4, 16),
        record("2011-06-03 08:00:00", "Summer", 6, 24),
    ])
}
