//! Command-line parsing for the bike rental dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the filtering/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::app::pipeline::TableName;
use crate::domain::{Choice, DateSelection, FilterSpec};
use crate::io::ExportFormat;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bike-dash", version, about = "Bike rental analytics dashboard")]
pub struct Cli {
    /// Dataset CSV (overrides BIKE_DASH_DATA and the default location).
    #[arg(long, global = true, value_name = "CSV")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive terminal dashboard (default).
    Tui(FilterArgs),
    /// Print KPIs, every table, correlations, trends and insights.
    Summary(FilterArgs),
    /// Write one table or the correlation matrix to a file.
    Export(ExportArgs),
    /// Print the first filtered records.
    Sample(SampleArgs),
}

/// Filters shared by every subcommand.
#[derive(Debug, Args, Clone, Default)]
pub struct FilterArgs {
    /// First date of the range (YYYY-MM-DD). Alone, it does not filter.
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last date of the range (YYYY-MM-DD), inclusive.
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Season label, or "All".
    #[arg(long)]
    pub season: Option<String>,

    /// Weather label, or "All".
    #[arg(long)]
    pub weather: Option<String>,

    /// Working-day label, or "All".
    #[arg(long = "day-type")]
    pub day_type: Option<String>,
}

impl FilterArgs {
    pub fn to_filter_spec(&self) -> FilterSpec {
        FilterSpec {
            dates: DateSelection::from_endpoints(self.from, self.to),
            season: Choice::from_option(self.season.as_deref()),
            weather: Choice::from_option(self.weather.as_deref()),
            day_type: Choice::from_option(self.day_type.as_deref()),
        }
    }
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Which table to export.
    #[arg(long, value_enum)]
    pub table: TableName,

    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Output file.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub out: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Number of records to show.
    #[arg(long, short = 'n', default_value_t = 10)]
    pub rows: usize,

    #[command(flatten)]
    pub filters: FilterArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn filters_map_to_spec() {
        let cli = parse(&[
            "bike-dash",
            "summary",
            "--from",
            "2011-01-01",
            "--to",
            "2011-03-31",
            "--season",
            "Spring",
            "--day-type",
            "all",
        ]);
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        let spec = args.to_filter_spec();
        assert_eq!(
            spec.dates,
            DateSelection::Range {
                start: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2011, 3, 31).unwrap(),
            }
        );
        assert_eq!(spec.season, Choice::Only("Spring".to_string()));
        assert_eq!(spec.weather, Choice::All);
        assert_eq!(spec.day_type, Choice::All);
    }

    #[test]
    fn export_parses_kebab_case_tables_and_global_data() {
        let cli = parse(&[
            "bike-dash",
            "export",
            "--table",
            "hourly-workingday",
            "--format",
            "json",
            "--out",
            "x.json",
            "--data",
            "d.csv",
        ]);
        assert_eq!(cli.data, Some(PathBuf::from("d.csv")));
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.table, TableName::HourlyWorkingday);
        assert_eq!(args.format, ExportFormat::Json);
    }

    #[test]
    fn sample_defaults_to_ten_rows() {
        let Command::Sample(args) = parse(&["bike-dash", "sample"]).command else {
            panic!("expected sample");
        };
        assert_eq!(args.rows, 10);
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["bike-dash", "summary", "--from", "01/02/2011"]).is_err());
    }
}
