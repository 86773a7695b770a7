//! Linux `/proc` snapshot source.
//!
//! Reads `<root>/stat`, `<root>/<pid>/stat`, `<root>/<pid>/task/<tid>/stat`
//! and `<root>/<pid>/cmdline`. The root is configurable so tests can point
//! it at a fixture tree.

use super::SnapshotSource;
use crate::error::{MonitorError, Result};
use std::path::{Path, PathBuf};

/// Fallback tick rate when `sysconf` is unavailable.
const DEFAULT_TICK_RATE: u64 = 100;

/// Snapshot source backed by a procfs mount.
#[derive(Debug, Clone)]
pub struct ProcFsSource {
    root: PathBuf,
}

impl ProcFsSource {
    /// Creates a source reading from `root` (normally `/proc`).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the procfs root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn task_dir(&self, pid: u32) -> PathBuf {
        self.root.join(pid.to_string()).join("task")
    }

    /// Reads a file as text. `comm` and `cmdline` may hold arbitrary bytes.
    fn read_lossy(path: &Path) -> Option<String> {
        let raw = std::fs::read(path).ok()?;
        Some(String::from_utf8_lossy(&raw).into_owned())
    }

    /// Lists the numeric entries of a directory, sorted ascending.
    fn numeric_entries(dir: &Path) -> Vec<u32> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut ids: Vec<u32> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().to_str().and_then(|name| name.parse().ok()))
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for ProcFsSource {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl SnapshotSource for ProcFsSource {
    fn id(&self) -> &'static str {
        "procfs"
    }

    fn is_available(&self) -> bool {
        self.root.join("stat").exists()
    }

    fn list_cores(&mut self) -> Result<Vec<String>> {
        let path = self.root.join("stat");
        let content = std::fs::read_to_string(&path).map_err(|e| MonitorError::CollectionFailed {
            collector: "procfs",
            message: format!("failed to read {}: {e}", path.display()),
        })?;

        let cores: Vec<String> = content
            .lines()
            .filter(|line| {
                line.strip_prefix("cpu").and_then(|rest| rest.chars().next()).is_some_and(|c| c.is_ascii_digit())
            })
            .map(str::to_string)
            .collect();
        tracing::trace!(count = cores.len(), "listed cpu cores");
        Ok(cores)
    }

    fn list_entities(&mut self) -> Vec<u32> {
        Self::numeric_entries(&self.root)
    }

    fn read_process_record(&mut self, pid: u32) -> Option<String> {
        Self::read_lossy(&self.root.join(pid.to_string()).join("stat"))
    }

    fn read_thread_ids(&mut self, pid: u32) -> Vec<u32> {
        Self::numeric_entries(&self.task_dir(pid))
    }

    fn read_thread_record(&mut self, pid: u32, tid: u32) -> Option<String> {
        Self::read_lossy(&self.task_dir(pid).join(tid.to_string()).join("stat"))
    }

    fn read_display_name(&mut self, pid: u32) -> Option<String> {
        Self::read_lossy(&self.root.join(pid.to_string()).join("cmdline"))
    }
}

/// Returns the kernel accounting tick rate (`CLK_TCK`).
#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
pub fn clock_ticks_per_second() -> u64 {
    // SAFETY: sysconf reads a static system constant and has no preconditions.
    let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if ticks > 0 {
        ticks as u64
    } else {
        tracing::warn!(fallback = DEFAULT_TICK_RATE, "sysconf(_SC_CLK_TCK) failed");
        DEFAULT_TICK_RATE
    }
}

/// Returns the kernel accounting tick rate (`CLK_TCK`).
#[cfg(not(target_os = "linux"))]
pub fn clock_ticks_per_second() -> u64 {
    DEFAULT_TICK_RATE
}
