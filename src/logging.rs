//! Debug logging.
//!
//! The TUI owns the terminal, so events go to a file and only when asked for
//! with `--debug` or `YATOP_DEBUG=1`. Filter directives come from
//! `YATOP_LOG` (default `yatop=debug`).

use crate::error::{MonitorError, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable that enables debug logging.
pub const DEBUG_ENV: &str = "YATOP_DEBUG";

/// Environment variable holding filter directives.
pub const FILTER_ENV: &str = "YATOP_LOG";

/// Filter used when `YATOP_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "yatop=debug";

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "yatop.log";

/// Where and whether to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Install a subscriber at all.
    pub enabled: bool,
    /// File to append to.
    pub file: PathBuf,
}

impl LogSettings {
    /// Settings from the `--debug` flag and the environment.
    #[must_use]
    pub fn from_env(debug_flag: bool, file: Option<PathBuf>) -> Self {
        let env_enabled = std::env::var(DEBUG_ENV).is_ok_and(|value| is_truthy(&value));
        Self {
            enabled: debug_flag || env_enabled,
            file: file.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

/// Accepts `1`, `true`, `yes` and `on`, case-insensitively.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Returns false when logging is disabled.
///
/// # Errors
///
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init(settings: &LogSettings) -> Result<bool> {
    if !settings.enabled {
        return Ok(false);
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.file)
        .map_err(|e| MonitorError::LoggingInit(format!("{}: {e}", settings.file.display())))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| MonitorError::LoggingInit(e.to_string()))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), file = %settings.file.display(), "yatop logging started");
    Ok(true)
}
