//! Error types for the monitor.
//!
//! Only conditions that should stop a session are errors. An entity that
//! vanishes between listing and reading, or a record that is too short to
//! decode, is skipped by returning `None` from the source or parser and never
//! reaches this type.

use std::io;
use thiserror::Error;

/// Error type for monitoring operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A snapshot source is not available on this system.
    #[error("collector '{0}' is not available on this system")]
    CollectorUnavailable(&'static str),

    /// Failed to collect data that the session cannot continue without.
    #[error("failed to collect metrics from '{collector}': {message}")]
    CollectionFailed {
        /// The collector that failed.
        collector: &'static str,
        /// Error message describing the failure.
        message: String,
    },

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key with invalid value.
        key: String,
        /// Error message describing why the value is invalid.
        message: String,
    },

    /// The log subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    LoggingInit(String),

    /// Terminal initialization or rendering error.
    #[error("terminal error: {0}")]
    TerminalError(#[from] io::Error),
}

/// Result type alias for monitoring operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
