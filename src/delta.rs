//! Delta engine: turns two consecutive snapshots into percentages.
//!
//! Process and thread percentages are normalized by the clock delta of the
//! core the task ran on in the *previous* snapshot. Running bounds and idle
//! decay counters are written back into the current snapshot's
//! [`Derived`] fields, so they carry over once it becomes the previous one.
//!
//! The output is a [`CycleReport`] of plain numbers; formatting lives in
//! [`crate::widgets`].

use crate::collectors::Snapshot;
use crate::types::{Bounds, CpuSample, Derived, EntityId, ProcessSample, TaskSample, TaskState};
use std::collections::BTreeMap;

/// Engine settings derived from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaOptions {
    /// Disable the idle-decay filter.
    pub show_all: bool,
    /// Idle cycles tolerated before an entity is hidden.
    pub ignore: u32,
    /// Kernel accounting ticks per second.
    pub tick_rate: u64,
    /// Seconds between the two snapshots.
    pub delay_secs: f64,
}

impl DeltaOptions {
    /// Ticks that elapse in one sample window; the iowait denominator.
    #[must_use]
    pub fn io_window_ticks(&self) -> f64 {
        self.tick_rate as f64 * self.delay_secs
    }

    /// Returns the decay policy for these options.
    #[must_use]
    pub fn decay_policy(&self) -> DecayPolicy {
        DecayPolicy { threshold: self.ignore, show_all: self.show_all }
    }
}

impl Default for DeltaOptions {
    fn default() -> Self {
        Self { show_all: false, ignore: 3, tick_rate: 100, delay_secs: 0.5 }
    }
}

/// Idle-decay visibility rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayPolicy {
    /// Counter value restored on activity.
    pub threshold: u32,
    /// When set, nothing is ever hidden.
    pub show_all: bool,
}

/// Result of one decay step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayStep {
    /// Counter to store on the current sample.
    pub counter: u32,
    /// Whether the entity is shown this cycle.
    pub visible: bool,
}

impl DecayPolicy {
    /// Advances a decay counter by one cycle.
    ///
    /// `previous` is `None` the first time an entity is compared; that cycle
    /// seeds the counter. The counter never goes below zero and the entity is
    /// hidden while it is zero.
    #[must_use]
    pub fn step(&self, previous: Option<u32>, active: bool, selected: bool) -> DecayStep {
        let visible = |counter| DecayStep { counter, visible: true };
        match previous {
            _ if selected => visible(self.threshold),
            None => visible(self.threshold),
            Some(counter) if self.show_all => visible(counter),
            Some(_) if active => visible(self.threshold),
            Some(counter) => {
                let counter = counter.saturating_sub(1);
                DecayStep { counter, visible: counter > 0 }
            }
        }
    }
}

/// Percentages for one task between two samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskDelta {
    /// User-mode share of the core clock.
    pub user_pct: f64,
    /// Kernel-mode share of the core clock.
    pub system_pct: f64,
    /// Combined user + system share.
    pub cpu_pct: f64,
    /// Session extrema of `cpu_pct`.
    pub cpu_bounds: Bounds,
    /// Block I/O wait share of the sample window.
    pub iowait_pct: f64,
    /// Session extrema of `iowait_pct`.
    pub iowait_bounds: Bounds,
    /// The task moved to another core.
    pub cpu_switch: bool,
}

fn percent(delta: u64, total: u64) -> f64 {
    delta as f64 / total as f64 * 100.0
}

/// Computes percentages and bounds for one task.
///
/// `total_clock` is the clock delta of the core the task ran on in `prev`.
/// A zero clock makes every CPU percentage zero and resets its bounds.
/// An iowait figure outside `[0, 100]` is a kernel accounting artifact: it is
/// replaced by zero and its bounds are reset instead of merged.
#[must_use]
pub fn compute_delta(prev: &TaskSample, curr: &TaskSample, total_clock: u64, io_window_ticks: f64) -> TaskDelta {
    let utime = curr.utime.saturating_sub(prev.utime);
    let stime = curr.stime.saturating_sub(prev.stime);

    let (user_pct, system_pct, cpu_pct, cpu_bounds) = if total_clock == 0 {
        (0.0, 0.0, 0.0, Bounds::ZERO)
    } else {
        let cpu_pct = percent(utime + stime, total_clock);
        (
            percent(utime, total_clock),
            percent(stime, total_clock),
            cpu_pct,
            Bounds::observe(prev.derived.cpu_bounds, cpu_pct),
        )
    };

    let (iowait_pct, iowait_bounds) = match (prev.blkio_ticks, curr.blkio_ticks) {
        (Some(before), Some(after)) if after != before && io_window_ticks > 0.0 => {
            let delta = after as f64 - before as f64;
            let pct = delta / io_window_ticks * 100.0;
            if (0.0..=100.0).contains(&pct) {
                (pct, Bounds::observe(prev.derived.iowait_bounds, pct))
            } else {
                (0.0, Bounds::ZERO)
            }
        }
        _ => (0.0, Bounds::observe(prev.derived.iowait_bounds, 0.0)),
    };

    TaskDelta {
        user_pct,
        system_pct,
        cpu_pct,
        cpu_bounds,
        iowait_pct,
        iowait_bounds,
        cpu_switch: prev.processor != curr.processor,
    }
}

/// One row of the CPU core table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuMetrics {
    /// Core index.
    pub core: usize,
    /// User time percentage.
    pub user_pct: f64,
    /// System time percentage.
    pub system_pct: f64,
    /// Idle percentage.
    pub idle_pct: f64,
    /// I/O wait percentage.
    pub iowait_pct: f64,
    /// Interrupt percentage.
    pub irq_pct: f64,
    /// Softirq percentage.
    pub softirq_pct: f64,
    /// The core clock advanced.
    pub active: bool,
    /// Shown after idle-decay filtering.
    pub visible: bool,
}

/// One process or thread row.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskMetrics {
    /// Entity identifier.
    pub id: EntityId,
    /// Command line for processes, record name for threads.
    pub name: String,
    /// Run state in the current sample.
    pub state: TaskState,
    /// Core in the previous sample.
    pub prev_processor: usize,
    /// Core in the current sample.
    pub processor: usize,
    /// Computed percentages.
    pub delta: TaskDelta,
    /// Shown after idle-decay filtering.
    pub visible: bool,
}

impl TaskMetrics {
    /// Returns true when the task changed cores.
    #[must_use]
    pub fn cpu_switch(&self) -> bool {
        self.delta.cpu_switch
    }

    /// Combined CPU percentage.
    #[must_use]
    pub fn cpu_pct(&self) -> f64 {
        self.delta.cpu_pct
    }
}

/// A process row with its thread rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessMetrics {
    /// The process itself.
    pub task: TaskMetrics,
    /// Threads the process owns in the current sample.
    pub thread_count: usize,
    /// Thread rows present in both samples, in tid order.
    pub threads: Vec<TaskMetrics>,
}

impl ProcessMetrics {
    /// Returns the pid.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.task.id.numeric()
    }
}

/// Everything computed in one cycle, visible or not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Core rows in core order.
    pub cpus: Vec<CpuMetrics>,
    /// Process rows in pid order.
    pub processes: Vec<ProcessMetrics>,
}

impl CycleReport {
    /// Iterates every process and thread row in display order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskMetrics> {
        self.processes.iter().flat_map(|process| std::iter::once(&process.task).chain(process.threads.iter()))
    }

    /// Looks up a process or thread row.
    #[must_use]
    pub fn task(&self, id: EntityId) -> Option<&TaskMetrics> {
        self.tasks().find(|task| task.id == id)
    }

    /// Number of visible process and thread rows.
    #[must_use]
    pub fn visible_tasks(&self) -> usize {
        self.tasks().filter(|task| task.visible).count()
    }
}

/// Selection context for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Focus {
    /// Entity exempt from idle decay.
    pub selected: Option<EntityId>,
    /// Restrict output to the process with this pid or owning this tid.
    pub filter: Option<u32>,
}

impl Focus {
    fn admits(&self, prev: &ProcessSample) -> bool {
        match self.filter {
            None => true,
            Some(id) => prev.pid() == id || prev.has_thread(id),
        }
    }
}

/// Compares consecutive snapshots.
#[derive(Debug, Clone, Default)]
pub struct DeltaEngine {
    options: DeltaOptions,
}

impl DeltaEngine {
    /// Creates an engine.
    #[must_use]
    pub fn new(options: DeltaOptions) -> Self {
        Self { options }
    }

    /// Returns the engine options.
    #[must_use]
    pub fn options(&self) -> &DeltaOptions {
        &self.options
    }

    /// Computes one cycle and writes derived state into `curr`.
    ///
    /// Only entities present in both snapshots are reported. Processes and
    /// threads that appear for the first time in `curr` are left untouched
    /// and are picked up on the next cycle.
    pub fn compute(&self, prev: &Snapshot, curr: &mut Snapshot, focus: &Focus) -> CycleReport {
        let policy = self.options.decay_policy();
        let io_window = self.options.io_window_ticks();

        let core_clocks: BTreeMap<usize, u64> = curr
            .cpus
            .iter()
            .filter_map(|c1| prev.cpu(c1.core).map(|c0| (c1.core, c1.clock().saturating_sub(c0.clock()))))
            .collect();

        let mut report = CycleReport::default();

        for c1 in &mut curr.cpus {
            let Some(c0) = prev.cpu(c1.core) else {
                continue;
            };
            report.cpus.push(Self::cpu_row(&policy, c0, c1));
        }

        for (pid, p1) in &mut curr.processes {
            let Some(p0) = prev.processes.get(pid) else {
                continue;
            };
            if !focus.admits(p0) {
                continue;
            }

            let clock_of = |task: &TaskSample| core_clocks.get(&task.processor).copied().unwrap_or(0);

            let mut threads = Vec::new();
            let mut thread_selected = false;
            for (tid, t1) in &mut p1.threads {
                let Some(t0) = p0.threads.get(tid) else {
                    continue;
                };
                let id = EntityId::Thread { pid: *pid, tid: *tid };
                let selected = focus.selected == Some(id);
                thread_selected |= selected;

                let delta = compute_delta(t0, t1, clock_of(t0), io_window);
                let step = Self::record(&policy, t0, t1, &delta, selected);
                threads.push(TaskMetrics {
                    id,
                    name: t1.name.clone(),
                    state: t1.state,
                    prev_processor: t0.processor,
                    processor: t1.processor,
                    delta,
                    visible: step.visible,
                });
            }

            let id = EntityId::Process(*pid);
            let selected = focus.selected == Some(id) || thread_selected;
            let delta = compute_delta(&p0.task, &p1.task, clock_of(&p0.task), io_window);
            let step = Self::record(&policy, &p0.task, &mut p1.task, &delta, selected);

            report.processes.push(ProcessMetrics {
                task: TaskMetrics {
                    id,
                    name: p1.label().to_string(),
                    state: p1.task.state,
                    prev_processor: p0.task.processor,
                    processor: p1.task.processor,
                    delta,
                    visible: step.visible,
                },
                thread_count: p1.threads.len(),
                threads,
            });
        }

        tracing::trace!(
            cores = report.cpus.len(),
            processes = report.processes.len(),
            visible = report.visible_tasks(),
            "computed cycle"
        );
        report
    }

    fn cpu_row(policy: &DecayPolicy, c0: &CpuSample, c1: &mut CpuSample) -> CpuMetrics {
        let total = c1.clock().saturating_sub(c0.clock());
        let share = |after: u64, before: u64| {
            if total == 0 {
                0.0
            } else {
                percent(after.saturating_sub(before), total)
            }
        };

        let active = total != 0;
        let step = policy.step(c0.decay, active, false);
        c1.decay = Some(step.counter);

        CpuMetrics {
            core: c1.core,
            user_pct: share(c1.user, c0.user),
            system_pct: share(c1.system, c0.system),
            idle_pct: share(c1.idle, c0.idle),
            iowait_pct: share(c1.iowait, c0.iowait),
            irq_pct: share(c1.irq, c0.irq),
            softirq_pct: share(c1.softirq, c0.softirq),
            active,
            visible: step.visible,
        }
    }

    /// Stores the delta and the next decay counter on the current sample.
    fn record(
        policy: &DecayPolicy,
        prev: &TaskSample,
        curr: &mut TaskSample,
        delta: &TaskDelta,
        selected: bool,
    ) -> DecayStep {
        let active = delta.cpu_pct != 0.0 || delta.iowait_pct != 0.0;
        let step = policy.step(prev.derived.decay, active, selected);
        curr.derived = Derived {
            cpu_pct: Some(delta.cpu_pct),
            cpu_bounds: Some(delta.cpu_bounds),
            iowait_pct: Some(delta.iowait_pct),
            iowait_bounds: Some(delta.iowait_bounds),
            decay: Some(step.counter),
            cpu_switch: delta.cpu_switch,
        };
        step
    }
}
