//! Shared fixtures for integration tests.
//!
//! [`FixtureSource`] replays a scripted sequence of [`Frame`]s, one per
//! capture, so tests can drive the engine through exact tick counts without
//! touching `/proc`.
#![allow(dead_code)]

use std::collections::BTreeMap;

use yatop::collectors::{Snapshot, SnapshotSource};
use yatop::delta::{CycleReport, DeltaEngine, DeltaOptions, Focus};
use yatop::Result;

/// Counters of one process or thread in one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ticks {
    pub utime: u64,
    pub stime: u64,
    pub processor: usize,
    pub blkio: u64,
}

impl Ticks {
    pub fn user(utime: u64) -> Self {
        Self { utime, ..Self::default() }
    }

    pub fn on(mut self, processor: usize) -> Self {
        self.processor = processor;
        self
    }

    pub fn system(mut self, stime: u64) -> Self {
        self.stime = stime;
        self
    }

    pub fn blkio(mut self, blkio: u64) -> Self {
        self.blkio = blkio;
        self
    }
}

/// Builds a 44-field `stat` record.
pub fn stat_line(id: u32, name: &str, ppid: u32, ticks: Ticks) -> String {
    let mut fields: Vec<String> = vec![id.to_string(), format!("({name})"), "S".into(), ppid.to_string()];
    fields.extend((4..44).map(|i| match i {
        13 => ticks.utime.to_string(),
        14 => ticks.stime.to_string(),
        38 => ticks.processor.to_string(),
        41 => ticks.blkio.to_string(),
        _ => "0".to_string(),
    }));
    fields.join(" ")
}

#[derive(Debug, Clone)]
struct FixtureProcess {
    stat: String,
    cmdline: Option<String>,
    threads: BTreeMap<u32, String>,
}

/// What the source reports for one capture.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    cores: Vec<String>,
    processes: BTreeMap<u32, FixtureProcess>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next core: user, nice, system, idle, iowait, irq, softirq.
    pub fn core(mut self, counters: [u64; 7]) -> Self {
        let index = self.cores.len();
        let counters: Vec<String> = counters.iter().map(u64::to_string).collect();
        self.cores.push(format!("cpu{index} {} 0 0 0", counters.join(" ")));
        self
    }

    /// Appends `count` cores that all have ticked `clock` times, all idle.
    pub fn idle_cores(mut self, count: usize, clock: u64) -> Self {
        for _ in 0..count {
            self = self.core([0, 0, 0, clock, 0, 0, 0]);
        }
        self
    }

    /// Adds a process with a command line equal to its name.
    pub fn process(mut self, pid: u32, name: &str, ticks: Ticks) -> Self {
        self.processes.insert(
            pid,
            FixtureProcess {
                stat: stat_line(pid, name, 1, ticks),
                cmdline: Some(format!("{name}\0")),
                threads: BTreeMap::new(),
            },
        );
        self
    }

    /// Adds a process without a command line, like a kernel thread.
    pub fn kernel_process(mut self, pid: u32, name: &str, ticks: Ticks) -> Self {
        self.processes.insert(
            pid,
            FixtureProcess { stat: stat_line(pid, name, 2, ticks), cmdline: None, threads: BTreeMap::new() },
        );
        self
    }

    /// Adds a thread to an already added process.
    pub fn thread(mut self, pid: u32, tid: u32, name: &str, ticks: Ticks) -> Self {
        if let Some(process) = self.processes.get_mut(&pid) {
            process.threads.insert(tid, stat_line(tid, name, pid, ticks));
        }
        self
    }
}

/// Replays frames in order. The last frame repeats once the script runs out.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    frames: Vec<Frame>,
    next: usize,
    current: Frame,
}

impl FixtureSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames, ..Self::default() }
    }

    /// Number of captures started so far.
    pub fn captures(&self) -> usize {
        self.next
    }
}

impl SnapshotSource for FixtureSource {
    fn id(&self) -> &'static str {
        "fixture"
    }

    fn is_available(&self) -> bool {
        !self.frames.is_empty()
    }

    fn list_cores(&mut self) -> Result<Vec<String>> {
        let index = self.next.min(self.frames.len() - 1);
        self.current = self.frames[index].clone();
        self.next += 1;
        Ok(self.current.cores.clone())
    }

    fn list_entities(&mut self) -> Vec<u32> {
        self.current.processes.keys().copied().collect()
    }

    fn read_process_record(&mut self, pid: u32) -> Option<String> {
        self.current.processes.get(&pid).map(|p| p.stat.clone())
    }

    fn read_thread_ids(&mut self, pid: u32) -> Vec<u32> {
        self.current.processes.get(&pid).map(|p| p.threads.keys().copied().collect()).unwrap_or_default()
    }

    fn read_thread_record(&mut self, pid: u32, tid: u32) -> Option<String> {
        self.current.processes.get(&pid)?.threads.get(&tid).cloned()
    }

    fn read_display_name(&mut self, pid: u32) -> Option<String> {
        self.current.processes.get(&pid)?.cmdline.clone()
    }
}

/// Captures every frame and runs the engine over consecutive pairs.
pub fn run_cycles(frames: Vec<Frame>, options: DeltaOptions, focus: Focus) -> Vec<CycleReport> {
    let count = frames.len();
    let mut source = FixtureSource::new(frames);
    let engine = DeltaEngine::new(options);

    let mut prev = Snapshot::capture(&mut source).unwrap();
    let mut reports = Vec::new();
    for _ in 1..count {
        let mut curr = Snapshot::capture(&mut source).unwrap();
        reports.push(engine.compute(&prev, &mut curr, &focus));
        prev = curr;
    }
    reports
}
