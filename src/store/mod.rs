//! Shared telemetry store
//!
//! The ingestion worker is the only writer; the renderer reads on its own
//! timer. Each sensor history and each log sits behind its own `RwLock`, so a
//! line's update takes exactly one write lock and is visible to readers either
//! completely or not at all.
//!
//! # Reading
//!
//! - [`TelemetryStore::snapshot`] copies a whole sensor history
//! - [`TelemetryStore::read_since`] copies only what was appended after a
//!   known length; [`SensorSnapshot::refresh`] uses it to keep a reader-owned
//!   mirror current while holding the lock only for the new tail
//! - [`TelemetryStore::generation`] changes on every committed update, so a
//!   reader can skip work when nothing happened
//!
//! # Example
//!
//! ```ignore
//! use sensorvis_rs::store::{SensorSnapshot, TelemetryStore};
//! use sensorvis_rs::types::SensorKind;
//!
//! let store = TelemetryStore::shared();
//! store.append(SensorKind::Light, &[300.0, 280.5], false)?;
//!
//! let mut mirror = SensorSnapshot::empty(SensorKind::Light);
//! mirror.refresh(&store);
//! assert_eq!(mirror.len(), 1);
//! ```

pub mod history;
pub mod timing;

pub use history::{SensorDelta, SensorHistory, SensorSnapshot};
pub use timing::{ProcessingLog, ProcessingSnapshot, TimingLog, TimingSnapshot};

use crate::types::{Sample, SensorKind, TimingRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use thiserror::Error;

/// Rejected store updates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{sensor} sample has {found} values, expected {expected}")]
    ArityMismatch {
        sensor: SensorKind,
        expected: usize,
        found: usize,
    },
}

/// Store handle shared between the worker and the renderer
pub type SharedStore = Arc<TelemetryStore>;

// Every critical section is all-or-nothing, so a poisoned lock still guards
// consistent data.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Per-sensor histories plus the timing and processing logs
#[derive(Debug)]
pub struct TelemetryStore {
    started: Instant,
    histories: [RwLock<SensorHistory>; 3],
    timings: RwLock<TimingLog>,
    processing: RwLock<ProcessingLog>,
    generation: AtomicU64,
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            histories: SensorKind::ALL.map(|sensor| RwLock::new(SensorHistory::new(sensor))),
            timings: RwLock::new(TimingLog::new()),
            processing: RwLock::new(ProcessingLog::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Create an empty store behind an `Arc`
    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Counter advanced by every committed update
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Append one value tuple to a sensor; returns the new sample's index
    pub fn append(
        &self,
        sensor: SensorKind,
        values: &[f64],
        is_anomaly: bool,
    ) -> Result<usize, StoreError> {
        let arrival = self.started.elapsed();
        let index = write(&self.histories[sensor.index()]).append(values, is_anomaly, arrival)?;
        self.bump();
        Ok(index)
    }

    /// Append a typed sample to its sensor's history
    pub fn append_sample(&self, sample: &Sample) -> Result<usize, StoreError> {
        self.append(sample.sensor(), &sample.values(), sample.is_anomaly())
    }

    /// Append a rolling anomaly-check latency
    pub fn record_rolling(&self, micros: u64) {
        write(&self.timings).record_rolling(micros);
        self.bump();
    }

    /// Append a simple anomaly-check latency
    pub fn record_simple(&self, micros: u64) {
        write(&self.timings).record_simple(micros);
        self.bump();
    }

    /// Append a parsed timing record
    pub fn record_timing(&self, record: &TimingRecord) {
        write(&self.timings).record(record);
        self.bump();
    }

    /// Append a host processing measurement for a sensor
    pub fn record_processing(&self, sensor: SensorKind, micros: f64) {
        write(&self.processing).record(sensor, micros);
        self.bump();
    }

    /// Number of samples stored for a sensor
    pub fn len(&self, sensor: SensorKind) -> usize {
        read(&self.histories[sensor.index()]).len()
    }

    /// Number of anomalies stored for a sensor
    pub fn anomaly_count(&self, sensor: SensorKind) -> usize {
        read(&self.histories[sensor.index()]).anomalies().len()
    }

    /// Point-in-time copy of one sensor
    pub fn snapshot(&self, sensor: SensorKind) -> SensorSnapshot {
        read(&self.histories[sensor.index()]).snapshot()
    }

    /// Samples of one sensor appended at or after `from`
    pub fn read_since(&self, sensor: SensorKind, from: usize) -> SensorDelta {
        read(&self.histories[sensor.index()]).delta_since(from)
    }

    /// Point-in-time copy of the timing log
    pub fn timing_snapshot(&self) -> TimingSnapshot {
        read(&self.timings).snapshot()
    }

    /// Timing entries at or after the given offsets
    pub fn timing_since(&self, rolling_from: usize, simple_from: usize) -> TimingSnapshot {
        read(&self.timings).since(rolling_from, simple_from)
    }

    /// Point-in-time copy of the processing log
    pub fn processing_snapshot(&self) -> ProcessingSnapshot {
        read(&self.processing).since([0; 3])
    }

    /// Processing entries at or after the given per-sensor offsets
    pub fn processing_since(&self, from: [usize; 3]) -> ProcessingSnapshot {
        read(&self.processing).since(from)
    }
}

impl SensorSnapshot {
    /// Pull everything appended since this snapshot was last refreshed.
    ///
    /// Returns the number of new samples.
    pub fn refresh(&mut self, store: &TelemetryStore) -> usize {
        let delta = store.read_since(self.sensor, self.len());
        let added = delta.len();
        if !self.apply(delta) {
            // Only reachable if the mirror was built from another store
            *self = store.snapshot(self.sensor);
            return self.len();
        }
        added
    }
}

impl TimingSnapshot {
    /// Pull everything appended since this snapshot was last refreshed
    pub fn refresh(&mut self, store: &TelemetryStore) {
        let newer = store.timing_since(self.rolling.len(), self.simple.len());
        self.extend(newer);
    }
}

impl ProcessingSnapshot {
    /// Pull everything appended since this snapshot was last refreshed
    pub fn refresh(&mut self, store: &TelemetryStore) {
        let newer = store.processing_since(self.lengths());
        self.extend(newer);
    }
}
