//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the dataset location and loads it once
//! - dispatches to the TUI or one of the printing/export commands

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use log::{debug, info, warn};

use crate::cli::{Command, ExportArgs, FilterArgs, SampleArgs};
use crate::config::{COMMAND_LOG_FILTER, Config, TUI_LOG_FILTER, init_logging};
use crate::domain::Dataset;
use crate::error::{AppError, ExportError};
use crate::io::{DatasetCache, write_correlation, write_table};

pub mod pipeline;

use pipeline::{DashboardSnapshot, TableName};

/// Entry point for the `bike-dash` binary.
pub fn run() -> Result<(), AppError> {
    // `bike-dash` and `bike-dash --season Summer` behave like `bike-dash tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let filter = match &cli.command {
        Command::Tui(_) => TUI_LOG_FILTER,
        _ => COMMAND_LOG_FILTER,
    };
    init_logging(filter);

    let config = Config::resolve(cli.data);
    info!("dataset path {} (from {:?})", config.data_path.display(), config.source);

    let mut cache = DatasetCache::new();
    let (dataset, path) = load_or_pick(&mut cache, config.data_path)?;
    let source = path.display().to_string();

    match cli.command {
        Command::Tui(args) => crate::tui::run(dataset, args.to_filter_spec(), source),
        Command::Summary(args) => handle_summary(&dataset, &args, &source),
        Command::Export(args) => handle_export(&dataset, &args),
        Command::Sample(args) => handle_sample(&dataset, &args),
    }
}

/// Load `path`, falling back to the interactive picker while the source is
/// missing or unreadable. Malformed data is not retried.
fn load_or_pick(cache: &mut DatasetCache, mut path: PathBuf) -> Result<(Arc<Dataset>, PathBuf), AppError> {
    loop {
        match cache.load_path(&path) {
            Ok(dataset) => {
                debug!("using {} records from {}", dataset.len(), path.display());
                return Ok((dataset, path));
            }
            Err(err) if err.is_source_unavailable() => {
                warn!("{err}");
                path = crate::cli::picker::prompt_for_csv_path(&err.to_string())?;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn handle_summary(dataset: &Dataset, args: &FilterArgs, source: &str) -> Result<(), AppError> {
    let snapshot = DashboardSnapshot::compute(dataset, &args.to_filter_spec());
    println!("{}", crate::report::format_summary(&snapshot, source));
    Ok(())
}

fn handle_export(dataset: &Dataset, args: &ExportArgs) -> Result<(), AppError> {
    let snapshot = DashboardSnapshot::compute(dataset, &args.filters.to_filter_spec());
    export_snapshot(&snapshot, args.table, args)?;
    println!("Wrote {} to {}", args.table.title(), args.out.display());
    Ok(())
}

fn export_snapshot(snapshot: &DashboardSnapshot, table: TableName, args: &ExportArgs) -> Result<(), ExportError> {
    let out: &Path = &args.out;
    match snapshot.labeled(table) {
        Some(labeled) => write_table(out, &labeled, args.format),
        None => {
            let matrix = snapshot.correlation.as_ref().map_err(|e| e.clone())?;
            write_correlation(out, matrix, args.format)
        }
    }
}

fn handle_sample(dataset: &Dataset, args: &SampleArgs) -> Result<(), AppError> {
    let view = crate::filter::apply(dataset, &args.filters.to_filter_spec());
    println!("{}", crate::report::format_sample(view.records(), args.rows));
    Ok(())
}

/// Rewrite argv so `bike-dash` defaults to `bike-dash tui`.
///
/// Rules:
/// - `bike-dash`                          -> `bike-dash tui`
/// - `bike-dash --season Summer ...`      -> `bike-dash tui --season Summer ...`
/// - `bike-dash --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "summary" | "export" | "sample");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::cli::Cli;
    use crate::error::{EXIT_EXPORT, EXIT_INPUT};
    use crate::testing::{dataset, record};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_and_leading_flags_go_to_tui() {
        assert_eq!(rewrite_args(args(&["bike-dash"])), args(&["bike-dash", "tui"]));
        assert_eq!(
            rewrite_args(args(&["bike-dash", "--season", "Summer"])),
            args(&["bike-dash", "tui", "--season", "Summer"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for argv in [
            args(&["bike-dash", "summary", "--from", "2011-01-01"]),
            args(&["bike-dash", "--help"]),
            args(&["bike-dash", "-V"]),
            args(&["bike-dash", "sample"]),
        ] {
            assert_eq!(rewrite_args(argv.clone()), argv);
        }
    }

    #[test]
    fn rewritten_flags_parse_as_tui() {
        let cli = Cli::try_parse_from(rewrite_args(args(&["bike-dash", "--data", "x.csv"]))).unwrap();
        assert!(matches!(cli.command, Command::Tui(_)));
        assert_eq!(cli.data, Some(PathBuf::from("x.csv")));
    }

    fn export_args(list: &[&str]) -> ExportArgs {
        let mut full = vec!["bike-dash", "export"];
        full.extend_from_slice(list);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Export(a) => a,
            other => panic!("expected export, got {other:?}"),
        }
    }

    #[test]
    fn correlation_export_needs_two_records() {
        let ds = dataset(vec![record("2011-01-01 08:00:00", "Winter", 1, 2)]);
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("corr.csv");
        let args = export_args(&["--table", "correlation", "--out", out.to_str().unwrap()]);

        let err = handle_export(&ds, &args).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_EXPORT);
        assert!(!out.exists());
    }

    #[test]
    fn table_export_writes_file() {
        let ds = dataset(vec![
            record("2011-01-01 08:00:00", "Winter", 1, 2),
            record("2011-07-01 08:00:00", "Summer", 3, 4),
        ]);
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("season.csv");
        let args = export_args(&["--table", "season", "--out", out.to_str().unwrap()]);

        handle_export(&ds, &args).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("season,records,casual,registered,cnt"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn malformed_source_is_not_retried() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("bad.csv");
        std::fs::write(&path, "datetime,cnt\n2011-01-01 00:00:00,1\n").unwrap();
        let mut cache = DatasetCache::new();
        let err = load_or_pick(&mut cache, path.clone()).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }
}
