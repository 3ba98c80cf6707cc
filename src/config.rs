//! Runtime configuration: dataset location and logging.
//!
//! The dataset path is resolved in priority order:
//!
//! 1. `--data <path>` on the command line
//! 2. `BIKE_DASH_DATA` in the environment (a `.env` file is honored)
//! 3. `./submission/dashboard/main_data.csv`

use std::path::PathBuf;

/// Environment variable naming the dataset CSV.
pub const DATA_ENV: &str = "BIKE_DASH_DATA";

/// Dataset path used when nothing else is configured.
pub const DEFAULT_DATA_PATH: &str = "submission/dashboard/main_data.csv";

/// Default log filter for the interactive dashboard (logs would tear the screen).
pub const TUI_LOG_FILTER: &str = "warn";
/// Default log filter for one-shot commands.
pub const COMMAND_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    pub source: PathSource,
}

/// Where the dataset path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    Cli,
    Env,
    Default,
}

impl Config {
    /// Resolve from the CLI value and the process environment.
    pub fn resolve(cli_path: Option<PathBuf>) -> Self {
        dotenvy::dotenv().ok();
        let env_path = std::env::var(DATA_ENV).ok();
        Self::resolve_with(cli_path, env_path)
    }

    pub fn resolve_with(cli_path: Option<PathBuf>, env_path: Option<String>) -> Self {
        if let Some(path) = cli_path {
            return Self {
                data_path: path,
                source: PathSource::Cli,
            };
        }
        match env_path.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            Some(path) => Self {
                data_path: PathBuf::from(path),
                source: PathSource::Env,
            },
            None => Self {
                data_path: PathBuf::from(DEFAULT_DATA_PATH),
                source: PathSource::Default,
            },
        }
    }
}

/// Install the `env_logger` backend writing to stderr.
///
/// `RUST_LOG` overrides `default_filter`. Calling this twice is harmless.
pub fn init_logging(default_filter: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .format_timestamp_millis()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_path_wins() {
        let cfg = Config::resolve_with(Some(PathBuf::from("a.csv")), Some("b.csv".to_string()));
        assert_eq!(cfg.data_path, PathBuf::from("a.csv"));
        assert_eq!(cfg.source, PathSource::Cli);
    }

    #[test]
    fn env_path_beats_default() {
        let cfg = Config::resolve_with(None, Some(" /data/day.csv ".to_string()));
        assert_eq!(cfg.data_path, PathBuf::from("/data/day.csv"));
        assert_eq!(cfg.source, PathSource::Env);
    }

    #[test]
    fn blank_env_falls_back_to_default() {
        let cfg = Config::resolve_with(None, Some("  ".to_string()));
        assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(cfg.source, PathSource::Default);
    }
}
