//! Per-kind field extractors.
//!
//! Each extractor takes the raw line for its record kind and returns a typed
//! record or a [`ParseError`]. Extractors never panic on arbitrary input.
//!
//! All patterns are defined here so they can be tested against literal
//! device output in one place.

use super::classifier::has_anomaly_marker;
use super::error::{ParseError, ParseResult};
use crate::types::{DhtReading, LightReading, Mq2Reading, RecordKind, TimingCategory, TimingRecord};
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum number of tab-separated fields in an MQ-2 reading
pub const MQ2_FIELD_COUNT: usize = 4;

/// Field delimiter used by MQ-2 reading lines
pub const MQ2_FIELD_DELIMITER: char = '\t';

/// Separator between a field label and its value
pub const LABEL_SEPARATOR: &str = ": ";

/// Integer immediately preceding the microseconds unit (micro sign, Greek mu, or ASCII)
static TIMING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)\s?(?:µs|μs|us)\b").expect("timing pattern is valid")
});

/// `Current:` integer, then `Rolling Avg:` number. Anything between the two
/// must start with whitespace, so `300.7` or `300abc` never yields a level.
static LIGHT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Current:\s*(\d+)(?:\s.*?)?Rolling Avg:\s*([0-9.]+)")
        .expect("light pattern is valid")
});

/// `Temperature:` number, optional parenthetical (which may nest), then
/// `Humidity:` number
static DHT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Temperature:\s*(-?[0-9.]+)[^(]*?(?:\(.*\))?\s*\S*?\s*Humidity:\s*([0-9.]+)")
        .expect("dht pattern is valid")
});

/// Parse a float, rejecting text that is not a finite number
fn parse_f64(text: &str) -> ParseResult<f64> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::NumberFormat {
            text: text.to_string(),
        }),
    }
}

fn parse_int<T: std::str::FromStr>(text: &str) -> ParseResult<T> {
    text.parse::<T>().map_err(|_| ParseError::NumberFormat {
        text: text.to_string(),
    })
}

/// Number after the first `": "` of a `label: number` field.
///
/// Only the first whitespace-delimited token is parsed, so a trailing
/// ` ANOMALY` on the last field does not spoil the value.
fn labelled_number(field: &str) -> ParseResult<f64> {
    let (_, value) = field
        .split_once(LABEL_SEPARATOR)
        .ok_or(ParseError::PatternMismatch {
            kind: RecordKind::Mq2Reading,
        })?;
    let token = value.split_whitespace().next().unwrap_or("");
    parse_f64(token)
}

/// Extract an MQ-2 reading from a tab-delimited line
pub fn extract_mq2(line: &str) -> ParseResult<Mq2Reading> {
    let parts: Vec<&str> = line.split(MQ2_FIELD_DELIMITER).collect();
    if parts.len() < MQ2_FIELD_COUNT {
        return Err(ParseError::FieldCount {
            expected: MQ2_FIELD_COUNT,
            found: parts.len(),
        });
    }

    Ok(Mq2Reading {
        raw: labelled_number(parts[1])?,
        smoothed: labelled_number(parts[2])?,
        rolling_avg: labelled_number(parts[3])?,
        anomaly: has_anomaly_marker(line),
    })
}

/// Extract an anomaly-check timing report
pub fn extract_timing(line: &str, category: TimingCategory) -> ParseResult<TimingRecord> {
    let kind = match category {
        TimingCategory::Rolling => RecordKind::Mq2RollingTiming,
        TimingCategory::Simple => RecordKind::Mq2SimpleTiming,
    };
    let caps = TIMING_PATTERN
        .captures(line)
        .ok_or(ParseError::PatternMismatch { kind })?;

    Ok(TimingRecord {
        category,
        micros: parse_int(&caps[1])?,
    })
}

/// Extract a light sensor reading
pub fn extract_light(line: &str) -> ParseResult<LightReading> {
    let caps = LIGHT_PATTERN
        .captures(line)
        .ok_or(ParseError::PatternMismatch {
            kind: RecordKind::LightReading,
        })?;

    Ok(LightReading {
        level: parse_int(&caps[1])?,
        rolling_avg: parse_f64(&caps[2])?,
        anomaly: has_anomaly_marker(line),
    })
}

/// Extract a DHT reading
pub fn extract_dht(line: &str) -> ParseResult<DhtReading> {
    let caps = DHT_PATTERN
        .captures(line)
        .ok_or(ParseError::PatternMismatch {
            kind: RecordKind::DhtReading,
        })?;

    Ok(DhtReading {
        temperature: parse_f64(&caps[1])?,
        humidity: parse_f64(&caps[2])?,
        anomaly: has_anomaly_marker(line),
    })
}
