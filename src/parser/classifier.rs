//! Line classification by section and report markers.
//!
//! Markers are plain substring checks. MQ-2 readings and MQ-2 timing reports
//! share the same section marker, so the timing markers are checked before a
//! line is handed to the MQ-2 reading extractor.

use crate::types::RecordKind;

/// Section marker for MQ-2 gas sensor lines
pub const MQ2_MARKER: &str = "[MQ-2 Sensor]";

/// Section marker for light sensor lines
pub const LIGHT_MARKER: &str = "[Light Sensor]";

/// Section marker for DHT lines
pub const DHT_MARKER: &str = "[DHT Sensor]";

/// Report marker for the rolling anomaly-check timing line
pub const ROLLING_TIMING_MARKER: &str = "Execution time for rolling anomaly check";

/// Report marker for the simple anomaly-check timing line
pub const SIMPLE_TIMING_MARKER: &str = "Execution time for simple anomaly check";

/// Token the device appends to flagged samples
pub const ANOMALY_MARKER: &str = "ANOMALY";

/// A line tagged with its record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified<'a> {
    /// Record kind chosen by [`classify`]
    pub kind: RecordKind,
    /// The unparsed line, handed to the matching extractor
    pub payload: &'a str,
}

/// Tag a line with its record kind. First match wins.
pub fn classify(line: &str) -> Classified<'_> {
    let kind = if line.contains(MQ2_MARKER) {
        let rolling = line.contains(ROLLING_TIMING_MARKER);
        let simple = line.contains(SIMPLE_TIMING_MARKER);
        if !rolling && !simple {
            RecordKind::Mq2Reading
        } else if rolling {
            RecordKind::Mq2RollingTiming
        } else {
            RecordKind::Mq2SimpleTiming
        }
    } else if line.contains(LIGHT_MARKER) {
        RecordKind::LightReading
    } else if line.contains(DHT_MARKER) {
        RecordKind::DhtReading
    } else {
        RecordKind::Unrecognized
    };

    Classified {
        kind,
        payload: line,
    }
}

/// Whether the device flagged the line as anomalous
pub fn has_anomaly_marker(line: &str) -> bool {
    line.contains(ANOMALY_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mq2_reading() {
        let c = classify("[MQ-2 Sensor]\tRaw: 120.5\tSmoothed: 118.2\tRollingAvg: 119.0");
        assert_eq!(c.kind, RecordKind::Mq2Reading);
    }

    #[test]
    fn test_mq2_timing_lines() {
        assert_eq!(
            classify("[MQ-2 Sensor] Execution time for rolling anomaly check: 87 µs").kind,
            RecordKind::Mq2RollingTiming
        );
        assert_eq!(
            classify("[MQ-2 Sensor] Execution time for simple anomaly check: 12 µs").kind,
            RecordKind::Mq2SimpleTiming
        );
    }

    #[test]
    fn test_rolling_wins_when_both_timing_markers_present() {
        let line = "[MQ-2 Sensor] Execution time for rolling anomaly check / \
                    Execution time for simple anomaly check: 5 µs";
        assert_eq!(classify(line).kind, RecordKind::Mq2RollingTiming);
    }

    #[test]
    fn test_timing_marker_without_mq2_section() {
        // Only MQ-2 lines carry timing reports; elsewhere the marker is ignored
        let line = "[Light Sensor] Execution time for rolling anomaly check: 5 µs";
        assert_eq!(classify(line).kind, RecordKind::LightReading);
    }

    #[test]
    fn test_light_and_dht() {
        assert_eq!(
            classify("[Light Sensor] Current: 300 Rolling Avg: 280.5").kind,
            RecordKind::LightReading
        );
        assert_eq!(
            classify("[DHT Sensor] Temperature: 23.5 Humidity: 45.0").kind,
            RecordKind::DhtReading
        );
    }

    #[test]
    fn test_mq2_marker_takes_precedence() {
        let line = "[MQ-2 Sensor] [Light Sensor] [DHT Sensor]";
        assert_eq!(classify(line).kind, RecordKind::Mq2Reading);
        assert_eq!(
            classify("[Light Sensor] [DHT Sensor]").kind,
            RecordKind::LightReading
        );
    }

    #[test]
    fn test_unrecognized() {
        for line in ["", "boot ok", "MQ-2 Sensor Raw: 1", "[mq-2 sensor]"] {
            assert_eq!(classify(line).kind, RecordKind::Unrecognized, "{line:?}");
        }
    }

    #[test]
    fn test_payload_is_the_line() {
        let line = "[DHT Sensor] Temperature: 1 Humidity: 2";
        assert_eq!(classify(line).payload, line);
    }

    #[test]
    fn test_anomaly_marker() {
        assert!(has_anomaly_marker("... 470.0 ANOMALY"));
        assert!(!has_anomaly_marker("... 470.0 anomaly"));
    }
}
