//! Session history of CPU percentages per entity.
//!
//! Series are append-only and live for the whole session: there is no
//! eviction, and an entity that exits keeps its series. Bounds are the delta
//! engine's running extrema, overwritten on each append.
//!
//! # Example
//!
//! ```rust,ignore
//! use yatop::history::HistoryStore;
//! use yatop::types::EntityId;
//!
//! let mut store = HistoryStore::new();
//! store.append(EntityId::Process(42), 12.5, 3.0, 40.0);
//! let series = store.get(EntityId::Process(42)).unwrap();
//! assert_eq!(series.last_n(10), &[12.5]);
//! ```

use crate::delta::CycleReport;
use crate::types::{Bounds, EntityId};
use std::collections::HashMap;

/// History of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySeries {
    values: Vec<f64>,
    bounds: Bounds,
}

impl HistorySeries {
    fn new(bounds: Bounds) -> Self {
        Self { values: Vec::new(), bounds }
    }

    /// Returns all values, oldest first.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the newest `n` values, oldest first.
    ///
    /// Returns everything when fewer than `n` values exist.
    #[must_use]
    pub fn last_n(&self, n: usize) -> &[f64] {
        let start = self.values.len().saturating_sub(n);
        &self.values[start..]
    }

    /// Returns the latest value.
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Returns the stored minimum.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.bounds.min
    }

    /// Returns the stored maximum.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.bounds.max
    }

    /// Returns the stored bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no value was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-entity history for the session.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    series: HashMap<EntityId, HistorySeries>,
}

impl HistoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one value, creating the series on first sight.
    pub fn append(&mut self, id: EntityId, cpu_pct: f64, min: f64, max: f64) {
        let bounds = Bounds { min, max };
        let series = self.series.entry(id).or_insert_with(|| HistorySeries::new(bounds));
        series.values.push(cpu_pct);
        series.bounds = bounds;
    }

    /// Returns the series of an entity never observed as `None`.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&HistorySeries> {
        self.series.get(&id)
    }

    /// Appends every process and thread computed in a cycle.
    ///
    /// Hidden rows are recorded too: a series advances whenever the entity
    /// was present in both snapshots.
    pub fn record(&mut self, report: &CycleReport) {
        for task in report.tasks() {
            let bounds = task.delta.cpu_bounds;
            self.append(task.id, task.cpu_pct(), bounds.min, bounds.max);
        }
    }

    /// Number of entities with a series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Returns true if nothing was recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
