//! Core data types for SensorVis-RS
//!
//! This module contains the fundamental data structures used throughout
//! the application for representing sensors, parsed records, and ingestion
//! statistics.
//!
//! # Main Types
//!
//! - [`SensorKind`] - The three sensors multiplexed onto the serial channel
//! - [`RecordKind`] - Classification tag assigned to every received line
//! - [`Mq2Reading`] / [`LightReading`] / [`DhtReading`] - Typed sensor samples
//! - [`TimingRecord`] - Upstream anomaly-check latency report
//! - [`Record`] - Any successfully extracted line
//! - [`IngestStats`] - Counters published by the ingestion worker
//!
//! # Value Layout
//!
//! Each sensor stores its samples as parallel `f64` channels. The channel
//! order is fixed per sensor and exposed through [`SensorKind::channel_names`]
//! so the store and the renderer agree on which column is which.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Size of the rolling window for recent processing times
const RECENT_WINDOW_SIZE: usize = 100;

/// One of the sensors multiplexed onto the serial stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SensorKind {
    /// MQ-2 gas sensor (raw, smoothed, rolling average)
    Mq2,
    /// Light sensor (level, rolling average)
    Light,
    /// DHT temperature/humidity sensor
    Dht,
}

impl SensorKind {
    /// All sensors in panel order
    pub const ALL: [SensorKind; 3] = [SensorKind::Mq2, SensorKind::Light, SensorKind::Dht];

    /// Number of value channels stored per sample
    pub fn channel_count(&self) -> usize {
        self.channel_names().len()
    }

    /// Names of the value channels, in storage order
    pub fn channel_names(&self) -> &'static [&'static str] {
        match self {
            SensorKind::Mq2 => &["Raw PPM", "Smoothed PPM", "Rolling Avg"],
            SensorKind::Light => &["Light Level", "Light Rolling Avg"],
            SensorKind::Dht => &["Temperature (°C)", "Humidity (%)"],
        }
    }

    /// Index of the channel anomaly markers are drawn against
    pub fn marker_channel(&self) -> usize {
        0
    }

    /// Display name for panel titles
    pub fn display_name(&self) -> &'static str {
        match self {
            SensorKind::Mq2 => "MQ2 Sensor Data",
            SensorKind::Light => "Light Sensor Data",
            SensorKind::Dht => "DHT Sensor Data",
        }
    }

    /// Y-axis label for the sensor's panel
    pub fn unit_label(&self) -> &'static str {
        match self {
            SensorKind::Mq2 => "PPM",
            SensorKind::Light => "Light Level",
            SensorKind::Dht => "Temperature / Humidity",
        }
    }

    /// Position in [`SensorKind::ALL`]
    pub fn index(&self) -> usize {
        match self {
            SensorKind::Mq2 => 0,
            SensorKind::Light => 1,
            SensorKind::Dht => 2,
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorKind::Mq2 => write!(f, "MQ-2"),
            SensorKind::Light => write!(f, "Light"),
            SensorKind::Dht => write!(f, "DHT"),
        }
    }
}

/// Which upstream anomaly-check algorithm a timing report belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimingCategory {
    /// Rolling-window anomaly check
    Rolling,
    /// Simple threshold anomaly check
    Simple,
}

impl std::fmt::Display for TimingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingCategory::Rolling => write!(f, "rolling"),
            TimingCategory::Simple => write!(f, "simple"),
        }
    }
}

/// Classification tag for a received line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// MQ-2 sensor reading
    Mq2Reading,
    /// MQ-2 rolling anomaly-check timing report
    Mq2RollingTiming,
    /// MQ-2 simple anomaly-check timing report
    Mq2SimpleTiming,
    /// Light sensor reading
    LightReading,
    /// DHT sensor reading
    DhtReading,
    /// Nothing we know how to parse
    Unrecognized,
}

impl RecordKind {
    /// All record kinds, in classification order
    pub const ALL: [RecordKind; 6] = [
        RecordKind::Mq2Reading,
        RecordKind::Mq2RollingTiming,
        RecordKind::Mq2SimpleTiming,
        RecordKind::LightReading,
        RecordKind::DhtReading,
        RecordKind::Unrecognized,
    ];

    /// Position in [`RecordKind::ALL`]
    pub fn index(&self) -> usize {
        match self {
            RecordKind::Mq2Reading => 0,
            RecordKind::Mq2RollingTiming => 1,
            RecordKind::Mq2SimpleTiming => 2,
            RecordKind::LightReading => 3,
            RecordKind::DhtReading => 4,
            RecordKind::Unrecognized => 5,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordKind::Mq2Reading => "MQ2 reading",
            RecordKind::Mq2RollingTiming => "MQ2 rolling timing",
            RecordKind::Mq2SimpleTiming => "MQ2 simple timing",
            RecordKind::LightReading => "Light reading",
            RecordKind::DhtReading => "DHT reading",
            RecordKind::Unrecognized => "unrecognized",
        };
        write!(f, "{}", name)
    }
}

/// A parsed MQ-2 gas sensor line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mq2Reading {
    /// Raw PPM value
    pub raw: f64,
    /// Upstream-smoothed PPM value
    pub smoothed: f64,
    /// Upstream rolling average
    pub rolling_avg: f64,
    /// Whether the device flagged this sample
    pub anomaly: bool,
}

/// A parsed light sensor line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightReading {
    /// Current light level (ADC counts)
    pub level: u32,
    /// Upstream rolling average
    pub rolling_avg: f64,
    /// Whether the device flagged this sample
    pub anomaly: bool,
}

/// A parsed DHT line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DhtReading {
    /// Temperature in °C
    pub temperature: f64,
    /// Relative humidity in %
    pub humidity: f64,
    /// Whether the device flagged this sample
    pub anomaly: bool,
}

/// A typed sample for one sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Mq2(Mq2Reading),
    Light(LightReading),
    Dht(DhtReading),
}

impl Sample {
    /// The sensor this sample belongs to
    pub fn sensor(&self) -> SensorKind {
        match self {
            Sample::Mq2(_) => SensorKind::Mq2,
            Sample::Light(_) => SensorKind::Light,
            Sample::Dht(_) => SensorKind::Dht,
        }
    }

    /// Whether the device flagged this sample
    pub fn is_anomaly(&self) -> bool {
        match self {
            Sample::Mq2(r) => r.anomaly,
            Sample::Light(r) => r.anomaly,
            Sample::Dht(r) => r.anomaly,
        }
    }

    /// Values in the sensor's channel order (see [`SensorKind::channel_names`])
    pub fn values(&self) -> Vec<f64> {
        match self {
            Sample::Mq2(r) => vec![r.raw, r.smoothed, r.rolling_avg],
            Sample::Light(r) => vec![r.level as f64, r.rolling_avg],
            Sample::Dht(r) => vec![r.temperature, r.humidity],
        }
    }
}

/// An upstream anomaly-check latency report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingRecord {
    /// Which check was timed
    pub category: TimingCategory,
    /// Elapsed time in microseconds
    pub micros: u64,
}

/// Any successfully extracted line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Record {
    /// A sensor sample destined for a history
    Sample(Sample),
    /// A timing report destined for the timing log
    Timing(TimingRecord),
}

impl Record {
    /// The classification this record was extracted under
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Sample(Sample::Mq2(_)) => RecordKind::Mq2Reading,
            Record::Sample(Sample::Light(_)) => RecordKind::LightReading,
            Record::Sample(Sample::Dht(_)) => RecordKind::DhtReading,
            Record::Timing(t) => match t.category {
                TimingCategory::Rolling => RecordKind::Mq2RollingTiming,
                TimingCategory::Simple => RecordKind::Mq2SimpleTiming,
            },
        }
    }
}

/// Connection status of the line source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// No source attached
    #[default]
    Disconnected,
    /// Source is delivering lines
    Connected,
    /// Source reported read errors and is being retried
    Retrying,
    /// Source is gone for good
    Lost,
}

/// Statistics published by the ingestion worker
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    /// Lines pulled from the source (including malformed ones)
    pub lines_received: u64,
    /// Successfully stored records, indexed by [`RecordKind::index`]
    pub records_by_kind: [u64; 6],
    /// Lines dropped as unrecognized (includes undecodable bytes)
    pub unrecognized_lines: u64,
    /// Extraction failures: too few fields
    pub field_count_errors: u64,
    /// Extraction failures: pattern did not match
    pub pattern_mismatch_errors: u64,
    /// Extraction failures: numeric text did not parse
    pub number_format_errors: u64,
    /// Failed reads from the source
    pub transport_errors: u64,
    /// Samples flagged anomalous by the device
    pub anomalies: u64,
    /// Messages dropped because the UI queue was full
    pub dropped_messages: u64,
    /// Average host processing time per stored line (microseconds)
    pub avg_processing_us: f64,
    /// Minimum processing time in recent window (microseconds)
    pub min_processing_us: f64,
    /// Maximum processing time in recent window (microseconds)
    pub max_processing_us: f64,
    /// Wall-clock time of the most recent line
    pub last_line_at: Option<chrono::DateTime<chrono::Local>>,
}

impl IngestStats {
    /// Total extraction failures of any kind
    pub fn parse_failures(&self) -> u64 {
        self.field_count_errors + self.pattern_mismatch_errors + self.number_format_errors
    }

    /// Records stored for one kind
    pub fn records(&self, kind: RecordKind) -> u64 {
        self.records_by_kind[kind.index()]
    }

    /// Total records stored
    pub fn total_records(&self) -> u64 {
        self.records_by_kind.iter().sum()
    }

    /// Share of received lines that produced a record, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.lines_received == 0 {
            100.0
        } else {
            (self.total_records() as f64 / self.lines_received as f64) * 100.0
        }
    }
}

/// Running processing-time tracker feeding [`IngestStats`]
#[derive(Debug, Clone, Default)]
pub struct ProcessingTimer {
    total_us: f64,
    samples: u64,
    recent: VecDeque<f64>,
}

impl ProcessingTimer {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one measurement in microseconds
    pub fn record(&mut self, micros: f64) {
        self.total_us += micros;
        self.samples += 1;
        self.recent.push_back(micros);
        if self.recent.len() > RECENT_WINDOW_SIZE {
            self.recent.pop_front();
        }
    }

    /// Average over all measurements
    pub fn avg_us(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total_us / self.samples as f64
        }
    }

    /// Minimum over the recent window
    pub fn recent_min_us(&self) -> f64 {
        self.recent.iter().copied().reduce(f64::min).unwrap_or(0.0)
    }

    /// Maximum over the recent window
    pub fn recent_max_us(&self) -> f64 {
        self.recent.iter().copied().reduce(f64::max).unwrap_or(0.0)
    }

    /// Copy the tracker's figures into a stats snapshot
    pub fn fill(&self, stats: &mut IngestStats) {
        stats.avg_processing_us = self.avg_us();
        stats.min_processing_us = self.recent_min_us();
        stats.max_processing_us = self.recent_max_us();
    }
}
