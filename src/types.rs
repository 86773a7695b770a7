//! Core types for the sampling engine.
//!
//! - [`EntityId`]: which CPU core, process, or thread a value belongs to
//! - [`CpuSample`] and [`TaskSample`]: raw counters decoded from one snapshot
//! - [`Bounds`]: running session extrema of a percentage
//! - [`Derived`]: per-entity state written by the delta engine and carried
//!   into the next cycle through the snapshot that becomes "previous"

use std::collections::BTreeMap;
use std::fmt;

/// Kind of a monitored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A CPU core.
    Cpu,
    /// A process (thread group leader).
    Process,
    /// A thread owned by a process.
    Thread,
}

/// Identifier of a monitored entity.
///
/// Process ids and thread ids share one kernel id space. A process's main
/// thread has `tid == pid`, so threads also carry their owning pid to keep
/// the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    /// CPU core by dense index.
    Cpu(usize),
    /// Process by pid.
    Process(u32),
    /// Thread by owning pid and tid.
    Thread {
        /// Owning process id.
        pid: u32,
        /// Kernel thread id.
        tid: u32,
    },
}

impl EntityId {
    /// Returns the entity kind.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Cpu(_) => EntityKind::Cpu,
            Self::Process(_) => EntityKind::Process,
            Self::Thread { .. } => EntityKind::Thread,
        }
    }

    /// Returns the bare kernel id (core index, pid, or tid).
    #[must_use]
    pub fn numeric(&self) -> u32 {
        match *self {
            Self::Cpu(core) => core as u32,
            Self::Process(pid) => pid,
            Self::Thread { tid, .. } => tid,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu(core) => write!(f, "cpu {core}"),
            Self::Process(pid) => write!(f, "pid {pid}"),
            Self::Thread { pid, tid } => write!(f, "tid {tid} (pid {pid})"),
        }
    }
}

/// Run state of a process or thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Running or runnable (on run queue).
    Running,
    /// Interruptible sleep (waiting for an event).
    Sleeping,
    /// Uninterruptible sleep (usually IO).
    DiskWait,
    /// Idle kernel thread.
    Idle,
    /// Defunct/zombie process.
    Zombie,
    /// Stopped (on signal or by debugger).
    Stopped,
    /// Tracing stop (by debugger).
    Traced,
    /// Dead (should never be seen).
    Dead,
    /// Unknown state.
    Unknown,
}

impl TaskState {
    /// Parses the state character of a `stat` record.
    #[must_use]
    pub fn from_char(c: char) -> Self {
        match c {
            'R' => Self::Running,
            'S' => Self::Sleeping,
            'D' => Self::DiskWait,
            'I' => Self::Idle,
            'Z' => Self::Zombie,
            'T' => Self::Stopped,
            't' => Self::Traced,
            'X' | 'x' => Self::Dead,
            _ => Self::Unknown,
        }
    }

    /// Returns a display character.
    #[must_use]
    pub fn as_char(&self) -> char {
        match self {
            Self::Running => 'R',
            Self::Sleeping => 'S',
            Self::DiskWait => 'D',
            Self::Idle => 'I',
            Self::Zombie => 'Z',
            Self::Stopped => 'T',
            Self::Traced => 't',
            Self::Dead => 'X',
            Self::Unknown => '?',
        }
    }
}

/// Running minimum and maximum of a percentage across a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest value observed.
    pub min: f64,
    /// Largest value observed.
    pub max: f64,
}

impl Bounds {
    /// Bounds forced to zero by a degenerate or rejected sample.
    pub const ZERO: Self = Self { min: 0.0, max: 0.0 };

    /// Bounds seeded from a first observation.
    #[must_use]
    pub fn seeded(value: f64) -> Self {
        Self { min: value, max: value }
    }

    /// Widens the bounds to include `value`. Never shrinks.
    #[must_use]
    pub fn merged(self, value: f64) -> Self {
        Self { min: self.min.min(value), max: self.max.max(value) }
    }

    /// Seeds on first observation, merges afterwards.
    #[must_use]
    pub fn observe(previous: Option<Self>, value: f64) -> Self {
        match previous {
            Some(bounds) => bounds.merged(value),
            None => Self::seeded(value),
        }
    }

    /// Returns `max - min`.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Returns true if `min <= value <= max`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Fields populated only by the delta engine.
///
/// A freshly parsed sample has every field unset. The engine fills them on
/// the current snapshot, which becomes the previous snapshot of the next
/// cycle; that is how bounds and decay counters survive across cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Derived {
    /// Combined user + system percentage of the owning core.
    pub cpu_pct: Option<f64>,
    /// Session extrema of `cpu_pct`.
    pub cpu_bounds: Option<Bounds>,
    /// Block I/O wait percentage of the sample window.
    pub iowait_pct: Option<f64>,
    /// Session extrema of `iowait_pct`.
    pub iowait_bounds: Option<Bounds>,
    /// Idle-decay counter.
    pub decay: Option<u32>,
    /// Whether the owning core changed since the previous sample.
    pub cpu_switch: bool,
}

/// Per-core tick counters from one `cpuN` line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuSample {
    /// Core index.
    pub core: usize,
    /// Ticks in user mode.
    pub user: u64,
    /// Ticks in user mode at low priority.
    pub nice: u64,
    /// Ticks in kernel mode.
    pub system: u64,
    /// Ticks idle.
    pub idle: u64,
    /// Ticks waiting for I/O.
    pub iowait: u64,
    /// Ticks servicing interrupts.
    pub irq: u64,
    /// Ticks servicing softirqs.
    pub softirq: u64,
    /// Idle-decay counter, set by the delta engine.
    pub decay: Option<u32>,
}

impl CpuSample {
    /// Sum of all seven accounted tick categories.
    #[must_use]
    pub fn clock(&self) -> u64 {
        self.user + self.nice + self.system + self.idle + self.iowait + self.irq + self.softirq
    }
}

/// Counters shared by processes and threads, decoded from a `stat` record.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSample {
    /// pid for a process, tid for a thread.
    pub id: u32,
    /// Parent pid for a process, owning pid for a thread.
    pub parent: u32,
    /// Parenthesized name from the record, spaces replaced by `_`.
    pub name: String,
    /// Run state.
    pub state: TaskState,
    /// Core the task last ran on.
    pub processor: usize,
    /// Cumulative user-mode ticks.
    pub utime: u64,
    /// Cumulative kernel-mode ticks.
    pub stime: u64,
    /// Cumulative block I/O delay ticks, `None` when the kernel does not
    /// report them.
    pub blkio_ticks: Option<u64>,
    /// State written by the delta engine.
    pub derived: Derived,
}

/// A thread has the same layout as a process record.
pub type ThreadSample = TaskSample;

/// One process with its threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    /// The process's own counters.
    pub task: TaskSample,
    /// Cleaned command line, if one was readable and non-empty.
    pub display_name: Option<String>,
    /// Threads by tid.
    pub threads: BTreeMap<u32, ThreadSample>,
}

impl ProcessSample {
    /// Returns the pid.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.task.id
    }

    /// Command line if known, otherwise the record name.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.task.name)
    }

    /// Returns true if the process owns a thread with this tid.
    #[must_use]
    pub fn has_thread(&self, tid: u32) -> bool {
        self.threads.contains_key(&tid)
    }
}
