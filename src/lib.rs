//! # yatop
//!
//! Yet another top: a terminal monitor for CPU cores, processes and threads
//! that keeps a session history per entity and draws it as a histogram.
//!
//! Each cycle samples `/proc`, compares the new snapshot with the previous
//! one, renders the core and process tables, appends to the history store
//! and draws the selected entity's CPU history scaled to its own extrema.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use yatop::app::App;
//! use yatop::collectors::{clock_ticks_per_second, ProcFsSource};
//! use yatop::config::Config;
//!
//! let config = Config::default();
//! let source = ProcFsSource::new(&config.proc_root);
//! App::new(config, source, clock_ticks_per_second()).run()?;
//! ```
//!
//! ## Pipeline
//!
//! - [`collectors`]: raw records from a [`collectors::SnapshotSource`], parsed into a [`collectors::Snapshot`]
//! - [`delta`]: percentages, running bounds, idle decay, core switches
//! - [`history`]: append-only per-entity series
//! - [`state`]: selection and Up/Down navigation
//! - [`widgets`]: table and histogram text

#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Types
// ============================================================================

/// Entity identifiers, raw samples and derived per-entity state.
pub mod types;

/// Error types for monitoring operations.
pub mod error;

pub use error::{MonitorError, Result};

// ============================================================================
// Sampling Engine
// ============================================================================

/// Snapshot sources and the `/proc` record parser.
pub mod collectors;

/// Delta computation between consecutive snapshots.
pub mod delta;

/// Session history per entity.
pub mod history;

/// Selection and navigation state.
pub mod state;

// ============================================================================
// Presentation
// ============================================================================

/// Styles for colored and monochrome output.
pub mod theme;

/// Table and histogram renderers.
pub mod widgets;

/// Keyboard input.
pub mod input;

// ============================================================================
// Application
// ============================================================================

/// Configuration loading and validation.
pub mod config;

/// File-based debug logging.
pub mod logging;

/// The sampling loop and single-shot mode.
pub mod app;

pub use app::App;
pub use config::Config;
