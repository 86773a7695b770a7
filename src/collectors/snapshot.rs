//! One point-in-time capture of cores, processes and threads.

use super::parse::{clean_display_name, parse_cpu_line, parse_task_stat, parse_thread_stat};
use super::SnapshotSource;
use crate::error::{MonitorError, Result};
use crate::types::{CpuSample, ProcessSample};
use std::collections::BTreeMap;

/// A complete snapshot.
///
/// Entities that vanish or fail to decode between listing and reading are
/// left out and counted in `skipped`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Per-core counters in core order.
    pub cpus: Vec<CpuSample>,
    /// Processes by pid.
    pub processes: BTreeMap<u32, ProcessSample>,
    /// Number of processes and threads skipped during capture.
    pub skipped: usize,
}

impl Snapshot {
    /// Captures a snapshot from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is unavailable or reports no usable
    /// core lines. Missing processes and threads are never errors.
    pub fn capture<S: SnapshotSource + ?Sized>(source: &mut S) -> Result<Self> {
        if !source.is_available() {
            return Err(MonitorError::CollectorUnavailable(source.id()));
        }

        let cpus: Vec<CpuSample> = source.list_cores()?.iter().filter_map(|line| parse_cpu_line(line)).collect();
        if cpus.is_empty() {
            return Err(MonitorError::CollectionFailed {
                collector: source.id(),
                message: "no per-core cpu lines found".to_string(),
            });
        }

        let mut snapshot = Self { cpus, ..Self::default() };

        for pid in source.list_entities() {
            let Some(task) = source.read_process_record(pid).and_then(|record| parse_task_stat(&record)) else {
                snapshot.skipped += 1;
                continue;
            };

            let display_name = source.read_display_name(pid).and_then(|raw| clean_display_name(&raw));

            let mut threads = BTreeMap::new();
            for tid in source.read_thread_ids(pid) {
                match source.read_thread_record(pid, tid).and_then(|record| parse_thread_stat(pid, &record)) {
                    Some(thread) => {
                        threads.insert(tid, thread);
                    }
                    None => snapshot.skipped += 1,
                }
            }

            snapshot.processes.insert(pid, ProcessSample { task, display_name, threads });
        }

        tracing::debug!(
            cores = snapshot.cpus.len(),
            processes = snapshot.processes.len(),
            skipped = snapshot.skipped,
            "captured snapshot"
        );
        Ok(snapshot)
    }

    /// Returns the number of cores.
    #[must_use]
    pub fn core_count(&self) -> usize {
        self.cpus.len()
    }

    /// Returns the counters of a core.
    #[must_use]
    pub fn cpu(&self, core: usize) -> Option<&CpuSample> {
        self.cpus.iter().find(|cpu| cpu.core == core)
    }

    /// Returns a process by pid.
    #[must_use]
    pub fn process(&self, pid: u32) -> Option<&ProcessSample> {
        self.processes.get(&pid)
    }

    /// Returns the pid of the process owning thread `tid`.
    #[must_use]
    pub fn owner_of(&self, tid: u32) -> Option<u32> {
        self.processes.values().find(|process| process.has_thread(tid)).map(ProcessSample::pid)
    }

    /// Total number of threads across all processes.
    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.processes.values().map(|process| process.threads.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StubSource {
        cores: Vec<String>,
        records: BTreeMap<u32, String>,
        threads: BTreeMap<u32, Vec<(u32, Option<String>)>>,
        available: bool,
    }

    fn record(id: u32, processor: usize) -> String {
        let mut fields: Vec<String> = vec![id.to_string(), "(t)".into(), "R".into(), "1".into()];
        fields.extend((4..42).map(|i| if i == 38 { processor.to_string() } else { "0".to_string() }));
        fields.join(" ")
    }

    impl SnapshotSource for StubSource {
        fn id(&self) -> &'static str {
            "stub"
        }
        fn is_available(&self) -> bool {
            self.available
        }
        fn list_cores(&mut self) -> Result<Vec<String>> {
            Ok(self.cores.clone())
        }
        fn list_entities(&mut self) -> Vec<u32> {
            // 99 is listed but exits before it can be read
            let mut ids: Vec<u32> = self.records.keys().copied().collect();
            ids.push(99);
            ids
        }
        fn read_process_record(&mut self, pid: u32) -> Option<String> {
            self.records.get(&pid).cloned()
        }
        fn read_thread_ids(&mut self, pid: u32) -> Vec<u32> {
            self.threads.get(&pid).map(|t| t.iter().map(|(tid, _)| *tid).collect()).unwrap_or_default()
        }
        fn read_thread_record(&mut self, pid: u32, tid: u32) -> Option<String> {
            self.threads.get(&pid)?.iter().find(|(t, _)| *t == tid)?.1.clone()
        }
        fn read_display_name(&mut self, _pid: u32) -> Option<String> {
            Some("worker\0--fast\0".to_string())
        }
    }

    fn stub() -> StubSource {
        let mut source = StubSource {
            cores: vec!["cpu0 1 0 1 8 0 0 0".into(), "cpu1 2 0 2 6 0 0 0".into()],
            available: true,
            ..StubSource::default()
        };
        source.records.insert(10, record(10, 1));
        source.threads.insert(10, vec![(10, Some(record(10, 1))), (11, Some(record(11, 0))), (12, None)]);
        source
    }

    #[test]
    fn test_capture_collects_everything_present() {
        let snapshot = Snapshot::capture(&mut stub()).unwrap();
        assert_eq!(snapshot.core_count(), 2);
        assert_eq!(snapshot.processes.len(), 1);

        let process = snapshot.process(10).unwrap();
        assert_eq!(process.label(), "worker --fast");
        assert_eq!(process.threads.len(), 2);
        assert_eq!(process.threads[&11].parent, 10);
        assert_eq!(snapshot.thread_count(), 2);
        // pid 99 vanished, thread 12 vanished
        assert_eq!(snapshot.skipped, 2);
    }

    #[test]
    fn test_capture_without_cores_is_fatal() {
        let mut source = stub();
        source.cores.clear();
        assert!(matches!(Snapshot::capture(&mut source), Err(MonitorError::CollectionFailed { .. })));
    }

    #[test]
    fn test_capture_unavailable_source() {
        let mut source = stub();
        source.available = false;
        assert!(matches!(Snapshot::capture(&mut source), Err(MonitorError::CollectorUnavailable("stub"))));
    }

    #[test]
    fn test_lookup_helpers() {
        let snapshot = Snapshot::capture(&mut stub()).unwrap();
        assert_eq!(snapshot.cpu(1).unwrap().clock(), 10);
        assert!(snapshot.cpu(5).is_none());
        assert_eq!(snapshot.owner_of(11), Some(10));
        assert_eq!(snapshot.owner_of(500), None);
    }
}
