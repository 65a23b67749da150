//! Integration tests for backend lifecycle
//!
//! These tests validate the complete backend workflow:
//! - Startup, shutdown and end of stream
//! - Transport retries and terminal loss
//! - Backend message handling

mod common;

use common::builders::{stream, LineBuilder};
use common::mock_helpers::{fast_retry_config, last_stats, replay_source, run_backend};
use sensorvis_rs::backend::{BackendMessage, IngestBackend, LineRead, LineSource};
use sensorvis_rs::config::AppConfig;
use sensorvis_rs::error::Result;
use sensorvis_rs::store::TelemetryStore;
use sensorvis_rs::types::{ConnectionStatus, SensorKind};
use sensorvis_rs::SensorVisError;
use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

/// Source that replays a fixed script of reads, then reports end of stream
struct ScriptedSource {
    script: VecDeque<Result<LineRead>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<LineRead>>) -> Box<dyn LineSource> {
        Box::new(Self {
            script: script.into(),
        })
    }
}

impl LineSource for ScriptedSource {
    fn read_line(&mut self) -> Result<LineRead> {
        self.script.pop_front().unwrap_or(Ok(LineRead::Eof))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Source that never delivers anything
struct IdleSource;

impl LineSource for IdleSource {
    fn read_line(&mut self) -> Result<LineRead> {
        thread::sleep(Duration::from_millis(1));
        Ok(LineRead::Idle)
    }

    fn describe(&self) -> String {
        "idle".to_string()
    }
}

fn statuses(messages: &[BackendMessage]) -> Vec<ConnectionStatus> {
    messages
        .iter()
        .filter_map(|m| match m {
            BackendMessage::ConnectionStatus(s) => Some(*s),
            _ => None,
        })
        .collect()
}

fn line(text: String) -> Result<LineRead> {
    Ok(LineRead::Line(text))
}

#[test]
fn test_backend_creation_and_shutdown() {
    let (backend, frontend) =
        IngestBackend::new(AppConfig::default(), TelemetryStore::shared(), Box::new(IdleSource));

    // Spawn backend thread
    let handle = thread::spawn(move || backend.run());

    // Give it a moment to initialize
    thread::sleep(Duration::from_millis(50));

    // Shutdown
    frontend.shutdown();

    // Backend should exit cleanly
    let result = handle.join();
    assert!(result.is_ok(), "Backend thread should exit cleanly");

    let messages = frontend.drain();
    assert_eq!(statuses(&messages).first(), Some(&ConnectionStatus::Connected));
    assert!(matches!(messages.last(), Some(BackendMessage::Shutdown)));
}

#[test]
fn test_dropping_frontend_stops_backend() {
    let (backend, frontend) =
        IngestBackend::new(AppConfig::default(), TelemetryStore::shared(), Box::new(IdleSource));
    let handle = thread::spawn(move || backend.run());

    drop(frontend);

    assert!(handle.join().is_ok());
}

#[test]
fn test_request_stats() {
    let (backend, frontend) =
        IngestBackend::new(AppConfig::default(), TelemetryStore::shared(), Box::new(IdleSource));
    let handle = thread::spawn(move || backend.run());

    frontend.request_stats();
    let mut stats = None;
    while stats.is_none() {
        match frontend.receiver.recv_timeout(Duration::from_secs(2)) {
            Ok(BackendMessage::Stats(s)) => stats = Some(s),
            Ok(_) => {}
            Err(_) => break,
        }
    }
    assert!(stats.is_some(), "Should receive stats");

    frontend.shutdown();
    handle.join().unwrap();
}

#[test]
fn test_end_of_stream_disconnects() {
    let text = stream(&[
        LineBuilder::mq2(1.0, 2.0, 3.0).build(),
        LineBuilder::light(10, 9.5).build(),
    ]);
    let (store, messages) = run_backend(replay_source(text), AppConfig::default());

    assert_eq!(store.len(SensorKind::Mq2), 1);
    assert_eq!(store.len(SensorKind::Light), 1);
    assert_eq!(
        statuses(&messages),
        vec![ConnectionStatus::Connected, ConnectionStatus::Disconnected]
    );
    assert!(matches!(messages.last(), Some(BackendMessage::Shutdown)));
}

#[test]
fn test_transport_errors_are_retried() {
    let source = ScriptedSource::new(vec![
        line(LineBuilder::dht(20.0, 40.0).build()),
        Err(SensorVisError::Transport("framing error".into())),
        Err(SensorVisError::Transport("framing error".into())),
        line(LineBuilder::dht(21.0, 41.0).build()),
    ]);
    let (store, messages) = run_backend(source, fast_retry_config(5));

    assert_eq!(store.len(SensorKind::Dht), 2);
    assert_eq!(
        statuses(&messages),
        vec![
            ConnectionStatus::Connected,
            ConnectionStatus::Retrying,
            ConnectionStatus::Connected,
            ConnectionStatus::Disconnected,
        ]
    );
    let errors = messages
        .iter()
        .filter(|m| matches!(m, BackendMessage::TransportError(_)))
        .count();
    assert_eq!(errors, 2);
    assert_eq!(last_stats(&messages).unwrap().transport_errors, 2);
}

#[test]
fn test_too_many_consecutive_errors_lose_transport() {
    let mut script: Vec<Result<LineRead>> = (0..5)
        .map(|_| Err(SensorVisError::Transport("timeout".into())))
        .collect();
    script.push(line(LineBuilder::light(1, 1.0).build()));
    let (store, messages) = run_backend(ScriptedSource::new(script), fast_retry_config(3));

    // The line after the third failure is never read
    assert_eq!(store.len(SensorKind::Light), 0);
    assert_eq!(statuses(&messages).last(), Some(&ConnectionStatus::Lost));
    assert!(messages
        .iter()
        .any(|m| matches!(m, BackendMessage::TransportLost(_))));
    assert_eq!(last_stats(&messages).unwrap().transport_errors, 3);
}

#[test]
fn test_terminal_error_loses_transport_immediately() {
    let source = ScriptedSource::new(vec![
        line(LineBuilder::rolling_timing(42).build()),
        Err(SensorVisError::TransportLost("device unplugged".into())),
        line(LineBuilder::rolling_timing(43).build()),
    ]);
    let (store, messages) = run_backend(source, fast_retry_config(20));

    assert_eq!(store.timing_snapshot().rolling, vec![42]);
    let lost = messages.iter().find_map(|m| match m {
        BackendMessage::TransportLost(e) => Some(e.clone()),
        _ => None,
    });
    assert!(lost.unwrap().contains("device unplugged"));
}

#[test]
fn test_undecodable_bytes_are_counted_and_skipped() {
    let source = ScriptedSource::new(vec![
        Ok(LineRead::Undecodable(vec![0xff, 0xfe, b'[', b'M'])),
        line(LineBuilder::mq2(5.0, 5.0, 5.0).anomaly().build()),
    ]);
    let (store, messages) = run_backend(source, AppConfig::default());

    assert_eq!(store.snapshot(SensorKind::Mq2).anomalies, vec![0]);
    let stats = last_stats(&messages).unwrap();
    assert_eq!(stats.lines_received, 2);
    assert_eq!(stats.unrecognized_lines, 1);
}

#[test]
fn test_store_readable_while_backend_runs() {
    let lines: Vec<String> = (0..2_000)
        .map(|i| LineBuilder::mq2(f64::from(i), 0.0, 0.0).build())
        .collect();
    let store = TelemetryStore::shared();
    let (backend, frontend) =
        IngestBackend::new(AppConfig::default(), store.clone(), replay_source(stream(&lines)));
    let handle = thread::spawn(move || backend.run());

    let mut mirror = sensorvis_rs::store::SensorSnapshot::empty(SensorKind::Mq2);
    while !handle.is_finished() {
        mirror.refresh(&store);
        assert!(mirror.is_aligned());
    }
    handle.join().unwrap();
    mirror.refresh(&store);

    assert_eq!(mirror.len(), 2_000);
    assert_eq!(mirror.channel(0)[1_999], 1_999.0);
    drop(frontend);
}

#[test]
#[cfg(feature = "mock-source")]
fn test_backend_with_mock_source() {
    use sensorvis_rs::backend::{MockLineSource, MockSourceConfig};

    let source = MockLineSource::new(MockSourceConfig {
        line_interval: Duration::ZERO,
        max_lines: Some(500),
        ..MockSourceConfig::default()
    });
    let (store, messages) = run_backend(Box::new(source), AppConfig::default());

    let stats = last_stats(&messages).unwrap();
    assert_eq!(stats.lines_received, 500);
    assert!(stats.parse_failures() + stats.unrecognized_lines > 0);
    for sensor in SensorKind::ALL {
        assert!(store.len(sensor) > 0);
        assert!(store.snapshot(sensor).is_aligned());
    }
    assert!(!store.timing_snapshot().is_empty());
}
