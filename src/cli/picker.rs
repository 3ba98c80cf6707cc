//! Interactive CSV picker.
//!
//! Used when the configured dataset cannot be opened: the user picks one of
//! the `*.csv` files found under the current directory, or types a path.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker is the recovery path for `SourceUnavailable`

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::{AppError, EXIT_INPUT};

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt on stdin/stdout for a substitute dataset.
///
/// `reason` explains why the configured source was rejected.
pub fn prompt_for_csv_path(reason: &str) -> Result<PathBuf, AppError> {
    let files = discover_csv_files();
    let stdin = io::stdin();
    choose_csv(&files, reason, stdin.lock(), io::stdout())
}

/// Picker loop over arbitrary input/output streams.
///
/// Behavior:
/// - list discovered `*.csv` files (if any)
/// - accept either a number (from the list) or an explicit path
/// - `q` or end of input cancels
pub fn choose_csv<R: BufRead, W: Write>(
    files: &[PathBuf],
    reason: &str,
    mut input: R,
    mut output: W,
) -> Result<PathBuf, AppError> {
    let io_err = |e: io::Error| AppError::new(EXIT_INPUT, format!("Failed to prompt for a dataset: {e}"));

    writeln!(output, "{reason}").map_err(io_err)?;
    if files.is_empty() {
        writeln!(output, "No .csv files found under the current directory.").map_err(io_err)?;
    } else {
        writeln!(output, "Found {} CSV file(s):", files.len()).map_err(io_err)?;
        for (idx, path) in files.iter().enumerate() {
            writeln!(output, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(io_err)?;
        }
    }

    loop {
        if files.is_empty() {
            write!(output, "Type a CSV path (q to quit): ").map_err(io_err)?;
        } else {
            write!(output, "Select a file by number (1-{}) or type a path (q to quit): ", files.len())
                .map_err(io_err)?;
        }
        output.flush().map_err(io_err)?;

        let mut line = String::new();
        let bytes = input.read_line(&mut line).map_err(io_err)?;
        if bytes == 0 {
            return Err(AppError::new(
                EXIT_INPUT,
                "No input received. Provide a dataset with `bike-dash --data <file.csv>`.",
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::new(EXIT_INPUT, "Canceled."));
        }
        if line.is_empty() {
            continue;
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_csv_path(&files[choice - 1]);
            }
            writeln!(output, "Invalid choice: {choice}.").map_err(io_err)?;
            continue;
        }

        match validate_csv_path(Path::new(line)) {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(output, "{err}").map_err(io_err)?,
        }
    }
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("CSV file not found: {}", path.display()),
        ));
    }
    if path.is_dir() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("Expected a .csv file (got: {}).", path.display()),
        ));
    }

    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory (deterministic order).
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_csv_files_inner(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}
