//! Integration tests for the line pipeline
//!
//! These tests push device-format text through a replaying backend and
//! check what lands in the store:
//! - Reference lines and their extracted values
//! - Alignment of every sensor's channels and anomaly indices
//! - Malformed lines leaving the store untouched
//! - Arbitrary interleavings of all record kinds

mod common;

use common::assert_float_eq;
use common::builders::{stream, LineBuilder};
use common::mock_helpers::{ingest, last_stats};
use proptest::prelude::*;
use sensorvis_rs::parse_line;
use sensorvis_rs::store::TelemetryStore;
use sensorvis_rs::types::{RecordKind, SensorKind};

fn assert_store_consistent(store: &TelemetryStore) {
    for sensor in SensorKind::ALL {
        let snap = store.snapshot(sensor);
        assert!(snap.is_aligned(), "{} channels out of step", sensor);
        assert!(
            snap.anomalies.iter().all(|&i| i < snap.len()),
            "{} anomaly index out of range",
            sensor
        );
        assert!(
            snap.anomalies.windows(2).all(|w| w[0] < w[1]),
            "{} anomaly indices not increasing",
            sensor
        );
    }
}

#[test]
fn test_reference_lines() {
    let text = "[MQ-2 Sensor]\tRaw: 120.5\tSmoothed: 118.2\tRollingAvg: 119.0\n\
                [MQ-2 Sensor]\tRaw: 500.0\tSmoothed: 480.0\tRollingAvg: 470.0 ANOMALY\n\
                [Light Sensor] Current: 300 Rolling Avg: 280.5\n\
                [DHT Sensor] Temperature: 23.5 (feels warm) Humidity: 45.0 ANOMALY\n\
                [MQ-2 Sensor] Execution time for rolling anomaly check: 87 µs\n";
    let (store, messages) = ingest(text);

    let mq2 = store.snapshot(SensorKind::Mq2);
    assert_eq!(mq2.len(), 2);
    assert_eq!(mq2.channel(0), &[120.5, 500.0]);
    assert_eq!(mq2.channel(1), &[118.2, 480.0]);
    assert_eq!(mq2.channel(2), &[119.0, 470.0]);
    // The flagged line was appended when the history held one sample
    assert_eq!(mq2.anomalies, vec![1]);

    let light = store.snapshot(SensorKind::Light);
    assert_eq!(light.channel(0), &[300.0]);
    assert_float_eq(light.channel(1)[0], 280.5, 1e-9);
    assert!(light.anomalies.is_empty());

    let dht = store.snapshot(SensorKind::Dht);
    assert_eq!(dht.channel(0), &[23.5]);
    assert_eq!(dht.channel(1), &[45.0]);
    assert_eq!(dht.anomalies, vec![0]);

    let timing = store.timing_snapshot();
    assert_eq!(timing.rolling, vec![87]);
    assert!(timing.simple.is_empty());

    let stats = last_stats(&messages).unwrap();
    assert_eq!(stats.lines_received, 5);
    assert_eq!(stats.total_records(), 5);
    assert_eq!(stats.anomalies, 2);
    assert_eq!(stats.records(RecordKind::Mq2Reading), 2);
    assert_eq!(stats.records(RecordKind::Mq2RollingTiming), 1);
}

#[test]
fn test_counts_match_valid_lines() {
    let mut lines = Vec::new();
    for i in 0..40u32 {
        let line = LineBuilder::light(i, f64::from(i) / 2.0);
        lines.push(if i % 8 == 0 { line.anomaly() } else { line }.build());
    }
    let (store, _) = ingest(stream(&lines));

    assert_eq!(store.len(SensorKind::Light), 40);
    assert_eq!(store.anomaly_count(SensorKind::Light), 5);
    assert_eq!(
        store.snapshot(SensorKind::Light).anomalies,
        vec![0, 8, 16, 24, 32]
    );
    assert_eq!(store.len(SensorKind::Mq2), 0);
    assert_store_consistent(&store);
}

#[test]
fn test_malformed_lines_leave_store_untouched() {
    let text = "[MQ-2 Sensor]\tRaw: 1.0\tSmoothed: 2.0 ANOMALY\n\
                [MQ-2 Sensor]\tRaw: 1..0\tSmoothed: 2.0\tRollingAvg: 3.0\n\
                [MQ-2 Sensor]\tRaw 1.0\tSmoothed: 2.0\tRollingAvg: 3.0\n\
                [Light Sensor] Current: ANOMALY\n\
                [DHT Sensor] Temperature: warm Humidity: damp\n\
                [MQ-2 Sensor] Execution time for simple anomaly check: soon\n\
                hello from the bootloader\n";
    let (store, messages) = ingest(text);

    for sensor in SensorKind::ALL {
        assert_eq!(store.len(sensor), 0);
        assert_eq!(store.anomaly_count(sensor), 0);
    }
    assert!(store.timing_snapshot().is_empty());

    let stats = last_stats(&messages).unwrap();
    assert_eq!(stats.lines_received, 7);
    assert_eq!(stats.total_records(), 0);
    assert_eq!(stats.field_count_errors, 1);
    assert_eq!(stats.number_format_errors, 1);
    assert_eq!(stats.pattern_mismatch_errors, 4);
    assert_eq!(stats.unrecognized_lines, 1);
}

#[test]
fn test_malformed_lines_between_valid_ones() {
    let lines = vec![
        LineBuilder::dht(20.0, 40.0).build(),
        "[DHT Sensor] Temperature: 21.0".to_string(),
        LineBuilder::dht(22.0, 42.0).anomaly().build(),
    ];
    let (store, _) = ingest(stream(&lines));

    let dht = store.snapshot(SensorKind::Dht);
    assert_eq!(dht.channel(0), &[20.0, 22.0]);
    assert_eq!(dht.anomalies, vec![1]);
}

#[test]
fn test_windows_line_endings_and_blank_lines() {
    let text = "[Light Sensor] Current: 7 Rolling Avg: 6.5\r\n\r\n[Light Sensor] Current: 8 Rolling Avg: 7.0\r\n";
    let (store, messages) = ingest(text);

    assert_eq!(store.snapshot(SensorKind::Light).channel(0), &[7.0, 8.0]);
    assert_eq!(last_stats(&messages).unwrap().unrecognized_lines, 1);
}

#[test]
fn test_processing_log_follows_stored_samples() {
    let lines = vec![
        LineBuilder::mq2(1.0, 1.0, 1.0).build(),
        LineBuilder::simple_timing(5).build(),
        LineBuilder::mq2(2.0, 2.0, 2.0).build(),
        "[MQ-2 Sensor]\tbroken".to_string(),
    ];
    let (store, _) = ingest(stream(&lines));

    let processing = store.processing_snapshot();
    assert_eq!(processing.lengths(), [2, 0, 0]);
    assert!(processing.series(SensorKind::Mq2).iter().all(|&us| us >= 0.0));
}

/// One generated line and what it should do to the store
#[derive(Debug, Clone)]
enum Generated {
    Mq2 { raw: u32, anomaly: bool },
    Light { level: u32, anomaly: bool },
    Dht { temp: i32, anomaly: bool },
    Rolling(u32),
    Simple(u32),
    Malformed(usize),
    Noise,
}

const MALFORMED: [&str; 4] = [
    "[MQ-2 Sensor]\tRaw: 9.0 ANOMALY",
    "[Light Sensor] Current: x Rolling Avg: y ANOMALY",
    "[DHT Sensor] Humidity: 5.0 ANOMALY",
    "[MQ-2 Sensor] Execution time for rolling anomaly check: fast",
];

impl Generated {
    fn line(&self) -> String {
        match *self {
            Generated::Mq2 { raw, anomaly } => {
                let f = f64::from(raw) / 10.0;
                let b = LineBuilder::mq2(f, f, f);
                (if anomaly { b.anomaly() } else { b }).build()
            }
            Generated::Light { level, anomaly } => {
                let b = LineBuilder::light(level, f64::from(level) / 2.0);
                (if anomaly { b.anomaly() } else { b }).build()
            }
            Generated::Dht { temp, anomaly } => {
                let b = LineBuilder::dht(f64::from(temp) / 10.0, 50.0);
                (if anomaly { b.anomaly() } else { b }).build()
            }
            Generated::Rolling(us) => LineBuilder::rolling_timing(u64::from(us)).build(),
            Generated::Simple(us) => LineBuilder::simple_timing(u64::from(us)).build(),
            Generated::Malformed(i) => MALFORMED[i].to_string(),
            Generated::Noise => "ets Jul 29 2019 12:21:46 rst:0x1".to_string(),
        }
    }
}

fn generated_line() -> impl Strategy<Value = Generated> {
    prop_oneof![
        (0u32..10_000, any::<bool>()).prop_map(|(raw, anomaly)| Generated::Mq2 { raw, anomaly }),
        (0u32..4096, any::<bool>()).prop_map(|(level, anomaly)| Generated::Light { level, anomaly }),
        (-400i32..600, any::<bool>()).prop_map(|(temp, anomaly)| Generated::Dht { temp, anomaly }),
        (0u32..5000).prop_map(Generated::Rolling),
        (0u32..5000).prop_map(Generated::Simple),
        (0usize..MALFORMED.len()).prop_map(Generated::Malformed),
        Just(Generated::Noise),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_any_interleaving_keeps_store_consistent(
        generated in prop::collection::vec(generated_line(), 0..120)
    ) {
        let lines: Vec<String> = generated.iter().map(Generated::line).collect();
        let (store, _) = ingest(stream(&lines));

        // Expected lengths and anomaly indices per sensor, in arrival order
        let mut expected: [(usize, Vec<usize>); 3] = Default::default();
        let mut rolling = Vec::new();
        let mut simple = Vec::new();
        for g in &generated {
            let (sensor, anomaly) = match *g {
                Generated::Mq2 { anomaly, .. } => (SensorKind::Mq2, anomaly),
                Generated::Light { anomaly, .. } => (SensorKind::Light, anomaly),
                Generated::Dht { anomaly, .. } => (SensorKind::Dht, anomaly),
                Generated::Rolling(us) => { rolling.push(u64::from(us)); continue; }
                Generated::Simple(us) => { simple.push(u64::from(us)); continue; }
                Generated::Malformed(_) | Generated::Noise => continue,
            };
            let (len, anomalies) = &mut expected[sensor.index()];
            if anomaly {
                anomalies.push(*len);
            }
            *len += 1;
        }

        for sensor in SensorKind::ALL {
            let snap = store.snapshot(sensor);
            let (len, anomalies) = &expected[sensor.index()];
            prop_assert!(snap.is_aligned());
            prop_assert_eq!(snap.len(), *len);
            prop_assert_eq!(&snap.anomalies, anomalies);
        }

        let timing = store.timing_snapshot();
        prop_assert_eq!(timing.rolling, rolling);
        prop_assert_eq!(timing.simple, simple);
    }

    #[test]
    fn prop_parser_never_panics(line in ".*") {
        let _ = parse_line(&line);
    }

    #[test]
    fn prop_parser_never_panics_on_marked_lines(
        marker in prop::sample::select(vec!["[MQ-2 Sensor]", "[Light Sensor]", "[DHT Sensor]"]),
        rest in "[ -~\t µ]{0,80}",
    ) {
        let _ = parse_line(&format!("{}{}", marker, rest));
    }
}
