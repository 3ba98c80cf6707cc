//! CSV ingest and validation.
//!
//! This module turns a bike-rental CSV into a typed `Dataset`.
//!
//! Design goals:
//! - **Strict schema** for required columns (missing header = malformed load)
//! - **All-or-nothing**: the first bad value fails the load with its row and column;
//!   rows are never silently skipped
//! - **Lenient spelling** for flags (`0/1`, `true/false`) and float-formatted counts
//! - **No fallback**: a missing source is reported, the caller decides what to do

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use log::{debug, info};

use crate::domain::{Dataset, Record};
use crate::error::DatasetError;

const COL_DATETIME: &str = "datetime";
const COL_SEASON: &str = "season_label";
const COL_WEATHER: &str = "weathersit_label";
const COL_WORKINGDAY: &str = "workingday_label";
const COL_WEEKDAY: &str = "weekday_label";
const COL_MONTH: &str = "month_name";
const COL_HOUR: &str = "hour_of_day";
const COL_TEMP_CATEGORY: &str = "temp_category";
const COL_TEMP: &str = "temp_actual";
const COL_ATEMP: &str = "atemp_actual";
const COL_HUM: &str = "hum_actual";
const COL_WINDSPEED: &str = "windspeed_actual";
const COL_RUSH_MORNING: &str = "is_rush_hour_morning";
const COL_RUSH_EVENING: &str = "is_rush_hour_evening";
const COL_WEEKEND: &str = "is_weekend";
const COL_CASUAL: &str = "casual";
const COL_REGISTERED: &str = "registered";
const COL_CNT: &str = "cnt";

/// Every column the loader requires in the header.
pub const REQUIRED_COLUMNS: [&str; 18] = [
    COL_DATETIME,
    COL_SEASON,
    COL_WEATHER,
    COL_WORKINGDAY,
    COL_WEEKDAY,
    COL_MONTH,
    COL_HOUR,
    COL_TEMP_CATEGORY,
    COL_TEMP,
    COL_ATEMP,
    COL_HUM,
    COL_WINDSPEED,
    COL_RUSH_MORNING,
    COL_RUSH_EVENING,
    COL_WEEKEND,
    COL_CASUAL,
    COL_REGISTERED,
    COL_CNT,
];

const TIMESTAMP_FMTS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Load a dataset from a CSV file.
///
/// A path that cannot be opened is `SourceUnavailable`; everything after a
/// successful open is parsed by [`load_dataset`].
pub fn load_dataset_from_path(path: &Path) -> Result<Dataset, DatasetError> {
    let file = File::open(path)
        .map_err(|e| DatasetError::unavailable(format!("cannot open '{}': {e}", path.display())))?;
    let dataset = load_dataset(file)?;
    info!(
        "loaded {} records ({} columns) from {}",
        dataset.len(),
        dataset.columns().len(),
        path.display()
    );
    Ok(dataset)
}

/// Load a dataset from any byte stream containing CSV with a header row.
pub fn load_dataset<R: Read>(reader: R) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| DatasetError::malformed(None, "<header>", format!("failed to read CSV header: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let schema = Schema::resolve(&header_map)?;
    let columns: Vec<String> = headers.iter().map(normalize_header).collect();

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let raw = result.map_err(|e| DatasetError::malformed(Some(row), "<record>", format!("CSV parse error: {e}")))?;
        records.push(parse_record(&raw, &schema, row)?);
    }

    debug!("parsed {} records, {} extra column(s)", records.len(), schema.extras.len());
    Ok(Dataset::new(records, columns))
}

/// Column positions resolved from the header.
struct Schema {
    required: HashMap<&'static str, usize>,
    extras: Vec<(String, usize)>,
}

impl Schema {
    fn resolve(header_map: &HashMap<String, usize>) -> Result<Self, DatasetError> {
        let mut required = HashMap::with_capacity(REQUIRED_COLUMNS.len());
        for name in REQUIRED_COLUMNS {
            let idx = header_map
                .get(name)
                .ok_or_else(|| DatasetError::malformed(None, name, "missing required column"))?;
            required.insert(name, *idx);
        }

        let mut extras: Vec<(String, usize)> = header_map
            .iter()
            .filter(|(name, _)| !REQUIRED_COLUMNS.contains(&name.as_str()))
            .map(|(name, idx)| (name.clone(), *idx))
            .collect();
        extras.sort_by_key(|(_, idx)| *idx);

        Ok(Self { required, extras })
    }

    fn index(&self, name: &'static str) -> usize {
        // Every required name is inserted by `resolve`.
        self.required.get(name).copied().unwrap_or(usize::MAX)
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header(name)).or_insert(idx);
    }
    map
}

fn normalize_header(name: &str) -> String {
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Field accessor for one CSV row; every failure names the row and column.
struct RowReader<'a> {
    raw: &'a StringRecord,
    schema: &'a Schema,
    row: usize,
}

impl<'a> RowReader<'a> {
    fn text(&self, name: &'static str) -> Result<&'a str, DatasetError> {
        self.raw
            .get(self.schema.index(name))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DatasetError::malformed(Some(self.row), name, "missing value"))
    }

    fn label(&self, name: &'static str) -> Result<String, DatasetError> {
        self.text(name).map(str::to_string)
    }

    fn invalid(&self, name: &'static str, message: String) -> DatasetError {
        DatasetError::malformed(Some(self.row), name, message)
    }

    fn measurement(&self, name: &'static str) -> Result<f64, DatasetError> {
        let s = self.text(name)?;
        parse_measurement(s).ok_or_else(|| self.invalid(name, format!("invalid number '{s}'")))
    }

    fn count(&self, name: &'static str) -> Result<u32, DatasetError> {
        let s = self.text(name)?;
        parse_count(s).ok_or_else(|| self.invalid(name, format!("invalid count '{s}'")))
    }

    fn flag(&self, name: &'static str) -> Result<bool, DatasetError> {
        let s = self.text(name)?;
        parse_flag(s).ok_or_else(|| self.invalid(name, format!("invalid flag '{s}'")))
    }
}

fn parse_record(raw: &StringRecord, schema: &Schema, row: usize) -> Result<Record, DatasetError> {
    let r = RowReader { raw, schema, row };

    let ts_text = r.text(COL_DATETIME)?;
    let timestamp = parse_timestamp(ts_text)
        .ok_or_else(|| r.invalid(COL_DATETIME, format!("invalid timestamp '{ts_text}'")))?;

    let hour_text = r.text(COL_HOUR)?;
    let hour_of_day = parse_count(hour_text)
        .filter(|h| *h <= 23)
        .and_then(|h| u8::try_from(h).ok())
        .ok_or_else(|| r.invalid(COL_HOUR, format!("invalid hour '{hour_text}' (expected 0-23)")))?;

    let casual = r.count(COL_CASUAL)?;
    let registered = r.count(COL_REGISTERED)?;
    let cnt = r.count(COL_CNT)?;
    if u64::from(casual) + u64::from(registered) != u64::from(cnt) {
        return Err(r.invalid(
            COL_CNT,
            format!("cnt {cnt} != casual {casual} + registered {registered}"),
        ));
    }

    let extras: BTreeMap<String, String> = schema
        .extras
        .iter()
        .map(|(name, idx)| (name.clone(), raw.get(*idx).unwrap_or("").trim().to_string()))
        .collect();

    Ok(Record {
        timestamp,
        season_label: r.label(COL_SEASON)?,
        weathersit_label: r.label(COL_WEATHER)?,
        workingday_label: r.label(COL_WORKINGDAY)?,
        weekday_label: r.label(COL_WEEKDAY)?,
        month_name: r.label(COL_MONTH)?,
        hour_of_day,
        temp_category: r.label(COL_TEMP_CATEGORY)?,
        temp_actual: r.measurement(COL_TEMP)?,
        atemp_actual: r.measurement(COL_ATEMP)?,
        hum_actual: r.measurement(COL_HUM)?,
        windspeed_actual: r.measurement(COL_WINDSPEED)?,
        is_rush_hour_morning: r.flag(COL_RUSH_MORNING)?,
        is_rush_hour_evening: r.flag(COL_RUSH_EVENING)?,
        is_weekend: r.flag(COL_WEEKEND)?,
        casual,
        registered,
        cnt,
        extras,
    })
}

/// Parse a combined date+time. A bare `YYYY-MM-DD` is read as midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in TIMESTAMP_FMTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_count(s: &str) -> Option<u32> {
    if let Ok(v) = s.parse::<u32>() {
        return Some(v);
    }
    // Exports from dataframes often write integer columns as `12.0`.
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
        Some(v as u32)
    } else {
        None
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Some(true),
        "0" | "0.0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_measurement(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
