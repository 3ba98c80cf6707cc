//! Error types.
//!
//! Library code returns typed errors (`DatasetError`, `ExportError`,
//! `InsufficientData`); the binary folds them into `AppError`, which carries the
//! process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for input/configuration problems (missing or malformed dataset).
pub const EXIT_INPUT: u8 = 2;
/// Exit code for export failures.
pub const EXIT_EXPORT: u8 = 3;
/// Exit code for runtime failures (terminal, rendering).
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure to turn a tabular source into a `Dataset`.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// No input stream could be obtained. Recoverable by retrying with a
    /// substitute source.
    #[error("dataset source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// A required column is missing or one of its values failed to parse.
    /// `row` is the zero-based data row index; `None` means the header.
    #[error("malformed dataset at {}, column `{column}`: {message}", row_label(.row))]
    Malformed {
        row: Option<usize>,
        column: String,
        message: String,
    },
}

impl DatasetError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            reason: reason.into(),
        }
    }

    pub fn malformed(row: Option<usize>, column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            row,
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

fn row_label(row: &Option<usize>) -> String {
    match row {
        // +2: one for the header line, one because CSV lines are 1-based.
        Some(idx) => format!("row {idx} (line {})", idx + 2),
        None => "header".to_string(),
    }
}

/// Too few columns or records for a correlation matrix or a linear fit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("insufficient data: {reason}")]
pub struct InsufficientData {
    pub reason: String,
}

impl InsufficientData {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Failure while writing an exported table.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create '{}': {source}", .path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Insufficient(#[from] InsufficientData),
}

impl From<DatasetError> for AppError {
    fn from(err: DatasetError) -> Self {
        AppError::new(EXIT_INPUT, err.to_string())
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::new(EXIT_EXPORT, err.to_string())
    }
}
