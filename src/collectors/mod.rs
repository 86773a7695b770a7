//! Snapshot sources and the record parser.
//!
//! A [`SnapshotSource`] hands out raw text records; [`parse`] decodes them and
//! [`Snapshot::capture`] assembles one point-in-time [`Snapshot`].
//!
//! Every read except [`SnapshotSource::list_cores`] may report absence. A
//! process that exits between being listed and being read is normal and just
//! drops out of that snapshot.

pub mod parse;
pub mod procfs;
pub mod snapshot;

pub use parse::{clean_display_name, parse_cpu_line, parse_task_stat, parse_thread_stat};
pub use procfs::{clock_ticks_per_second, ProcFsSource};
pub use snapshot::Snapshot;

use crate::error::Result;

/// Source of raw accounting records.
///
/// # Example
///
/// ```rust,ignore
/// use yatop::collectors::{ProcFsSource, Snapshot};
///
/// let mut source = ProcFsSource::new("/proc");
/// let snapshot = Snapshot::capture(&mut source)?;
/// println!("{} cores, {} processes", snapshot.core_count(), snapshot.processes.len());
/// ```
pub trait SnapshotSource {
    /// Returns the unique identifier for this source.
    ///
    /// This is used for error messages.
    fn id(&self) -> &'static str;

    /// Returns true if the source can be read on this system.
    fn is_available(&self) -> bool;

    /// Returns one raw record per CPU core, in core order.
    ///
    /// # Errors
    ///
    /// Failing to list cores is the only fatal collection error: without a
    /// core clock there is no percentage denominator.
    fn list_cores(&mut self) -> Result<Vec<String>>;

    /// Returns the ids of all processes currently present.
    fn list_entities(&mut self) -> Vec<u32>;

    /// Returns the raw status record of a process.
    fn read_process_record(&mut self, pid: u32) -> Option<String>;

    /// Returns the thread ids of a process, empty if unreadable.
    fn read_thread_ids(&mut self, pid: u32) -> Vec<u32>;

    /// Returns the raw status record of one thread.
    fn read_thread_record(&mut self, pid: u32, tid: u32) -> Option<String>;

    /// Returns the raw display name (command line) of a process.
    fn read_display_name(&mut self, pid: u32) -> Option<String>;
}
