//! Configuration for a monitoring session.
//!
//! Supports YAML configuration with precedence: CLI > file > defaults.
//! The binary loads the file first and then applies its flags on top.

use crate::delta::DeltaOptions;
use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Restrict the table to this pid (or the process owning this tid) and
    /// select it.
    pub pid: Option<u32>,

    /// Take two samples, print once and exit.
    pub one_shot: bool,

    /// Idle cycles before an inactive entity is hidden.
    pub ignore: u32,

    /// Seconds between samples.
    pub delay_secs: f64,

    /// Show idle entities too.
    pub show_all: bool,

    /// Do not draw the history histogram.
    pub no_histogram: bool,

    /// Disable colors; emphasis uses reverse video.
    pub no_color: bool,

    /// Enable `j`/`k` navigation.
    pub vim_keys: bool,

    /// procfs mount to read from.
    pub proc_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pid: None,
            one_shot: false,
            ignore: 3,
            delay_secs: 0.5,
            show_all: false,
            no_histogram: false,
            no_color: false,
            vim_keys: true,
            proc_root: PathBuf::from("/proc"),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default file location: `<config dir>/yatop/config.yaml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("yatop").join("config.yaml"))
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| MonitorError::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Loads `explicit` if given, else the default file if it exists.
    ///
    /// # Errors
    ///
    /// A missing explicit file is an error; a missing default file is not.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading default config");
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            MonitorError::ConfigParse { line, message: e.to_string() }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for a delay that is not positive or does not
    /// fit in a `Duration`.
    pub fn validate(&self) -> Result<()> {
        if self.delay_secs <= 0.0 || Duration::try_from_secs_f64(self.delay_secs).is_err() {
            return Err(MonitorError::ConfigInvalid {
                key: "delay_secs".to_string(),
                message: format!("must be a positive number of seconds, got {}", self.delay_secs),
            });
        }
        Ok(())
    }

    /// Returns the sample delay as a Duration.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or(Duration::MAX)
    }

    /// Delta engine options for the given tick rate.
    #[must_use]
    pub fn delta_options(&self, tick_rate: u64) -> DeltaOptions {
        DeltaOptions { show_all: self.show_all, ignore: self.ignore, tick_rate, delay_secs: self.delay_secs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::new();

        assert_eq!(config.pid, None);
        assert_eq!(config.ignore, 3);
        assert_eq!(config.delay_secs, 0.5);
        assert!(config.vim_keys);
        assert!(!config.show_all);
        assert_eq!(config.proc_root, PathBuf::from("/proc"));
        assert_eq!(config.delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_config_parse_minimal() {
        let config = Config::parse("pid: 913").unwrap();
        assert_eq!(config.pid, Some(913));
        assert_eq!(config.ignore, 3);
    }

    #[test]
    fn test_config_parse_full() {
        let yaml = r#"
pid: 7154
one_shot: true
ignore: 10
delay_secs: 2.0
show_all: true
no_histogram: true
no_color: true
vim_keys: false
proc_root: /host/proc
"#;

        let config = Config::parse(yaml).unwrap();

        assert_eq!(config.pid, Some(7154));
        assert!(config.one_shot);
        assert_eq!(config.ignore, 10);
        assert_eq!(config.delay(), Duration::from_secs(2));
        assert!(config.show_all && config.no_histogram && config.no_color);
        assert!(!config.vim_keys);
        assert_eq!(config.proc_root, PathBuf::from("/host/proc"));
    }

    #[test]
    fn test_config_parse_error_includes_line() {
        let yaml = r#"
ignore: 3
show_all: false
delay_secs: not_a_number
"#;

        let err = Config::parse(yaml).unwrap_err();
        assert!(matches!(err, MonitorError::ConfigParse { line: 4, .. }), "got {err:?}");
    }

    #[test]
    fn test_config_rejects_bad_delay() {
        assert!(matches!(Config::parse("delay_secs: 0"), Err(MonitorError::ConfigInvalid { .. })));
        assert!(matches!(Config::parse("delay_secs: -1.5"), Err(MonitorError::ConfigInvalid { .. })));
        assert!(matches!(Config::parse("delay_secs: .nan"), Err(MonitorError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_config_rejects_delay_past_duration_range() {
        assert!(matches!(Config::parse("delay_secs: 1.0e30"), Err(MonitorError::ConfigInvalid { .. })));
        assert!(matches!(Config::parse("delay_secs: .inf"), Err(MonitorError::ConfigInvalid { .. })));

        let config = Config { delay_secs: 1e30, ..Config::default() };
        assert!(config.validate().is_err());
        assert_eq!(config.delay(), Duration::MAX);
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = Config::load("/nonexistent/yatop.yaml").unwrap_err();
        assert!(matches!(err, MonitorError::ConfigNotFound(_)));
        assert!(Config::discover(Some(Path::new("/nonexistent/yatop.yaml"))).is_err());
    }

    #[test]
    fn test_config_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "ignore: 5\n").unwrap();
        let config = Config::discover(Some(&path)).unwrap();
        assert_eq!(config.ignore, 5);
    }

    #[test]
    fn test_delta_options() {
        let config = Config { show_all: true, ignore: 7, ..Config::default() };
        let options = config.delta_options(250);
        assert!(options.show_all);
        assert_eq!(options.ignore, 7);
        assert_eq!(options.tick_rate, 250);
        assert_eq!(options.delay_secs, 0.5);
    }
}
