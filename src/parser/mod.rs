//! Line grammar for the multiplexed sensor stream
//!
//! Parsing is split in two stages:
//!
//! 1. [`classify`] tags a line with a [`RecordKind`] using substring markers
//! 2. One extractor per kind turns the line into a typed record
//!
//! [`parse_line`] runs both stages and is what the ingestion worker calls for
//! every line it receives.
//!
//! # Recognized Lines
//!
//! ```text
//! [MQ-2 Sensor]<TAB>Raw: 120.5<TAB>Smoothed: 118.2<TAB>RollingAvg: 119.0 [ANOMALY]
//! [MQ-2 Sensor] Execution time for rolling anomaly check: 87 µs
//! [MQ-2 Sensor] Execution time for simple anomaly check: 12 µs
//! [Light Sensor] Current: 300 Rolling Avg: 280.5 [ANOMALY]
//! [DHT Sensor] Temperature: 23.5 (feels warm) Humidity: 45.0 [ANOMALY]
//! ```

pub mod classifier;
pub mod error;
pub mod extractors;

pub use classifier::{classify, has_anomaly_marker, Classified};
pub use error::{ParseError, ParseResult};
pub use extractors::{extract_dht, extract_light, extract_mq2, extract_timing};

use crate::types::{Record, RecordKind, Sample, TimingCategory};

/// Classify a line and extract its record
pub fn parse_line(line: &str) -> ParseResult<Record> {
    let classified = classify(line);
    extract(classified)
}

/// Run the extractor matching an already-classified line
pub fn extract(classified: Classified<'_>) -> ParseResult<Record> {
    let line = classified.payload;
    match classified.kind {
        RecordKind::Mq2Reading => extract_mq2(line).map(|r| Record::Sample(Sample::Mq2(r))),
        RecordKind::Mq2RollingTiming => {
            extract_timing(line, TimingCategory::Rolling).map(Record::Timing)
        }
        RecordKind::Mq2SimpleTiming => {
            extract_timing(line, TimingCategory::Simple).map(Record::Timing)
        }
        RecordKind::LightReading => extract_light(line).map(|r| Record::Sample(Sample::Light(r))),
        RecordKind::DhtReading => extract_dht(line).map(|r| Record::Sample(Sample::Dht(r))),
        RecordKind::Unrecognized => Err(ParseError::Unrecognized),
    }
}
