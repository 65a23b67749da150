//! Timing logs.
//!
//! [`TimingLog`] keeps the upstream anomaly-check latencies reported by the
//! device. [`ProcessingLog`] keeps how long this host spent turning each
//! stored reading into a sample. Neither is indexed like a sensor history:
//! each sequence advances at its own rate.

use crate::types::{SensorKind, TimingCategory, TimingRecord};

/// Rolling and simple anomaly-check latencies, in microseconds
#[derive(Debug, Clone, Default)]
pub struct TimingLog {
    rolling: Vec<u64>,
    simple: Vec<u64>,
}

impl TimingLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rolling-check measurement
    pub fn record_rolling(&mut self, micros: u64) {
        self.rolling.push(micros);
    }

    /// Append a simple-check measurement
    pub fn record_simple(&mut self, micros: u64) {
        self.simple.push(micros);
    }

    /// Append a parsed timing record to its category's sequence
    pub fn record(&mut self, record: &TimingRecord) {
        match record.category {
            TimingCategory::Rolling => self.record_rolling(record.micros),
            TimingCategory::Simple => self.record_simple(record.micros),
        }
    }

    /// Rolling-check sequence
    pub fn rolling(&self) -> &[u64] {
        &self.rolling
    }

    /// Simple-check sequence
    pub fn simple(&self) -> &[u64] {
        &self.simple
    }

    /// Full point-in-time copy
    pub fn snapshot(&self) -> TimingSnapshot {
        self.since(0, 0)
    }

    /// Entries at or after the given per-sequence offsets
    pub fn since(&self, rolling_from: usize, simple_from: usize) -> TimingSnapshot {
        TimingSnapshot {
            rolling: self.rolling[rolling_from.min(self.rolling.len())..].to_vec(),
            simple: self.simple[simple_from.min(self.simple.len())..].to_vec(),
        }
    }
}

/// Reader-owned copy of the timing log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimingSnapshot {
    /// Rolling-check latencies
    pub rolling: Vec<u64>,
    /// Simple-check latencies
    pub simple: Vec<u64>,
}

impl TimingSnapshot {
    /// Append entries read with [`TimingLog::since`] at this snapshot's lengths
    pub fn extend(&mut self, newer: TimingSnapshot) {
        self.rolling.extend(newer.rolling);
        self.simple.extend(newer.simple);
    }

    /// Whether neither sequence has entries
    pub fn is_empty(&self) -> bool {
        self.rolling.is_empty() && self.simple.is_empty()
    }

    /// Plot points for one category, x = own index
    pub fn points(&self, category: TimingCategory) -> Vec<[f64; 2]> {
        let series = match category {
            TimingCategory::Rolling => &self.rolling,
            TimingCategory::Simple => &self.simple,
        };
        series
            .iter()
            .enumerate()
            .map(|(i, &us)| [i as f64, us as f64])
            .collect()
    }
}

/// Host-side processing time per stored reading, per sensor, in microseconds
#[derive(Debug, Clone, Default)]
pub struct ProcessingLog {
    per_sensor: [Vec<f64>; 3],
}

impl ProcessingLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one measurement for a sensor
    pub fn record(&mut self, sensor: SensorKind, micros: f64) {
        self.per_sensor[sensor.index()].push(micros);
    }

    /// Measurements for one sensor
    pub fn series(&self, sensor: SensorKind) -> &[f64] {
        &self.per_sensor[sensor.index()]
    }

    /// Entries at or after the given per-sensor offsets
    pub fn since(&self, from: [usize; 3]) -> ProcessingSnapshot {
        let mut out = ProcessingSnapshot::default();
        for sensor in SensorKind::ALL {
            let series = self.series(sensor);
            let start = from[sensor.index()].min(series.len());
            out.per_sensor[sensor.index()] = series[start..].to_vec();
        }
        out
    }
}

/// Reader-owned copy of the processing log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingSnapshot {
    /// Measurements indexed by [`SensorKind::index`]
    pub per_sensor: [Vec<f64>; 3],
}

impl ProcessingSnapshot {
    /// Measurements for one sensor
    pub fn series(&self, sensor: SensorKind) -> &[f64] {
        &self.per_sensor[sensor.index()]
    }

    /// Current length per sensor, for the next incremental read
    pub fn lengths(&self) -> [usize; 3] {
        [
            self.per_sensor[0].len(),
            self.per_sensor[1].len(),
            self.per_sensor[2].len(),
        ]
    }

    /// Append entries read with [`ProcessingLog::since`] at [`Self::lengths`]
    pub fn extend(&mut self, newer: ProcessingSnapshot) {
        for (series, new) in self.per_sensor.iter_mut().zip(newer.per_sensor) {
            series.extend(new);
        }
    }

    /// Plot points for one sensor, x = own index
    pub fn points(&self, sensor: SensorKind) -> Vec<[f64; 2]> {
        self.series(sensor)
            .iter()
            .enumerate()
            .map(|(i, &us)| [i as f64, us])
            .collect()
    }
}
