//! Per-sensor append-only history.
//!
//! A [`SensorHistory`] holds one `f64` sequence per value channel, an aligned
//! sequence of arrival offsets, and the set of anomalous sample indices.
//!
//! # Invariants
//!
//! - Every channel and `arrivals` have the same length at all times
//! - Every anomaly index is `< len()` and was `len() - 1` when inserted
//!
//! Both hold because [`SensorHistory::append`] validates the value tuple
//! before touching any sequence.

use super::StoreError;
use crate::types::SensorKind;
use std::collections::BTreeSet;
use std::time::Duration;

/// Append-only history of one sensor
#[derive(Debug, Clone)]
pub struct SensorHistory {
    sensor: SensorKind,
    channels: Vec<Vec<f64>>,
    arrivals: Vec<Duration>,
    anomalies: BTreeSet<usize>,
}

impl SensorHistory {
    /// Create an empty history with the sensor's channel layout
    pub fn new(sensor: SensorKind) -> Self {
        Self {
            sensor,
            channels: vec![Vec::new(); sensor.channel_count()],
            arrivals: Vec::new(),
            anomalies: BTreeSet::new(),
        }
    }

    /// Sensor this history belongs to
    pub fn sensor(&self) -> SensorKind {
        self.sensor
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    /// Whether no sample has been appended yet
    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    /// Append one sample; returns its index
    pub fn append(
        &mut self,
        values: &[f64],
        is_anomaly: bool,
        arrival: Duration,
    ) -> Result<usize, StoreError> {
        if values.len() != self.channels.len() {
            return Err(StoreError::ArityMismatch {
                sensor: self.sensor,
                expected: self.channels.len(),
                found: values.len(),
            });
        }

        for (channel, value) in self.channels.iter_mut().zip(values) {
            channel.push(*value);
        }
        self.arrivals.push(arrival);

        let index = self.arrivals.len() - 1;
        if is_anomaly {
            self.anomalies.insert(index);
        }
        Ok(index)
    }

    /// Values of one channel
    pub fn channel(&self, channel: usize) -> &[f64] {
        self.channels.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Arrival offsets since the store was created
    pub fn arrivals(&self) -> &[Duration] {
        &self.arrivals
    }

    /// Anomalous sample indices
    pub fn anomalies(&self) -> &BTreeSet<usize> {
        &self.anomalies
    }

    /// Full point-in-time copy
    pub fn snapshot(&self) -> SensorSnapshot {
        let mut snapshot = SensorSnapshot::empty(self.sensor);
        snapshot.apply(self.delta_since(0));
        snapshot
    }

    /// Everything appended at or after index `from`
    pub fn delta_since(&self, from: usize) -> SensorDelta {
        let from = from.min(self.len());
        SensorDelta {
            sensor: self.sensor,
            from,
            channels: self.channels.iter().map(|c| c[from..].to_vec()).collect(),
            arrivals: self.arrivals[from..].to_vec(),
            anomalies: self.anomalies.range(from..).copied().collect(),
        }
    }
}

/// Samples appended after a known length, produced under the read lock
#[derive(Debug, Clone)]
pub struct SensorDelta {
    /// Sensor the delta belongs to
    pub sensor: SensorKind,
    /// Index of the first sample in this delta
    pub from: usize,
    /// New values per channel
    pub channels: Vec<Vec<f64>>,
    /// New arrival offsets
    pub arrivals: Vec<Duration>,
    /// New anomaly indices (absolute)
    pub anomalies: Vec<usize>,
}

impl SensorDelta {
    /// Number of new samples
    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    /// Whether nothing new was appended
    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }
}

/// Immutable view of a sensor's sequences, owned by the reader
#[derive(Debug, Clone)]
pub struct SensorSnapshot {
    /// Sensor the snapshot belongs to
    pub sensor: SensorKind,
    /// Values per channel, in [`SensorKind::channel_names`] order
    pub channels: Vec<Vec<f64>>,
    /// Arrival offsets
    pub arrivals: Vec<Duration>,
    /// Anomalous indices, ascending
    pub anomalies: Vec<usize>,
}

impl SensorSnapshot {
    /// A snapshot with zero samples
    pub fn empty(sensor: SensorKind) -> Self {
        Self {
            sensor,
            channels: vec![Vec::new(); sensor.channel_count()],
            arrivals: Vec::new(),
            anomalies: Vec::new(),
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    /// Whether the snapshot holds no samples
    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    /// Values of one channel
    pub fn channel(&self, channel: usize) -> &[f64] {
        self.channels.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Extend with a delta taken at this snapshot's length.
    ///
    /// Returns `false` and leaves the snapshot untouched if the delta does not
    /// start where the snapshot ends.
    pub fn apply(&mut self, delta: SensorDelta) -> bool {
        if delta.sensor != self.sensor
            || delta.from != self.len()
            || delta.channels.len() != self.channels.len()
        {
            return false;
        }
        for (channel, new) in self.channels.iter_mut().zip(delta.channels) {
            channel.extend(new);
        }
        self.arrivals.extend(delta.arrivals);
        self.anomalies.extend(delta.anomalies);
        true
    }

    /// Whether all sequences are equally long and every anomaly is in range
    pub fn is_aligned(&self) -> bool {
        let len = self.len();
        self.channels.iter().all(|c| c.len() == len)
            && self.anomalies.iter().all(|&i| i < len)
            && self.anomalies.windows(2).all(|w| w[0] < w[1])
    }
}
