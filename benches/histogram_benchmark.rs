#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmarks for histogram rendering and the per-cycle delta pass.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::BTreeMap;
use std::hint::black_box;
use yatop::collectors::Snapshot;
use yatop::delta::{DeltaEngine, DeltaOptions, Focus};
use yatop::history::HistoryStore;
use yatop::types::{CpuSample, Derived, EntityId, ProcessSample, TaskSample, TaskState};
use yatop::widgets::HistoryHistogram;

fn histogram_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram");

    for size in [100, 1_000, 10_000] {
        let mut store = HistoryStore::new();
        let id = EntityId::Process(1);
        for i in 0..size {
            let x = i as f64 / size as f64;
            let v = (x * std::f64::consts::TAU).sin() * 40.0 + 50.0 + (i % 7) as f64;
            store.append(id, v, 3.0, 97.0);
        }
        let series = store.get(id).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| HistoryHistogram::new(black_box(series), 200, 40).lines());
        });
    }

    group.finish();
}

fn task(id: u32, parent: u32, utime: u64, processor: usize) -> TaskSample {
    TaskSample {
        id,
        parent,
        name: format!("(task-{id})"),
        state: TaskState::Sleeping,
        processor,
        utime,
        stime: utime / 4,
        blkio_ticks: Some(utime / 8),
        derived: Derived::default(),
    }
}

fn snapshot(cores: usize, processes: u32, threads: u32, tick: u64) -> Snapshot {
    let cpus = (0..cores)
        .map(|core| CpuSample { core, user: 30 * tick, system: 10 * tick, idle: 60 * tick, ..CpuSample::default() })
        .collect();
    let processes = (1..=processes)
        .map(|pid| {
            let base = pid * 1000;
            let threads: BTreeMap<u32, TaskSample> = (0..threads)
                .map(|t| (base + t, task(base + t, base, tick * u64::from(t % 5), (t as usize) % cores)))
                .collect();
            let process = ProcessSample {
                task: task(base, 1, tick * u64::from(pid % 9), pid as usize % cores),
                display_name: None,
                threads,
            };
            (base, process)
        })
        .collect();
    Snapshot { cpus, processes, skipped: 0 }
}

fn delta_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("delta_cycle");
    let engine = DeltaEngine::new(DeltaOptions::default());

    for processes in [50u32, 500] {
        let prev = snapshot(16, processes, 8, 1);
        let next = snapshot(16, processes, 8, 2);

        group.bench_with_input(BenchmarkId::from_parameter(processes), &processes, |b, _| {
            b.iter(|| {
                let mut curr = next.clone();
                engine.compute(black_box(&prev), &mut curr, &Focus::default())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, histogram_benchmark, delta_benchmark);
criterion_main!(benches);
