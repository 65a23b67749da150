//! Mock construction helpers

use sensorvis_rs::backend::{BackendMessage, IngestBackend, LineSource, ReaderLineSource};
use sensorvis_rs::config::AppConfig;
use sensorvis_rs::store::{SharedStore, TelemetryStore};
use sensorvis_rs::types::IngestStats;
use std::io::Cursor;

/// A line source replaying in-memory text
pub fn replay_source(text: impl Into<String>) -> Box<dyn LineSource> {
    let text: String = text.into();
    Box::new(ReaderLineSource::new(Cursor::new(text.into_bytes()), "test replay"))
}

/// Config with retries that do not sleep
pub fn fast_retry_config(max_consecutive_errors: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.transport.retry_delay_ms = 0;
    config.transport.max_consecutive_errors = max_consecutive_errors;
    config
}

/// Run a backend over `source` on the current thread until it stops
pub fn run_backend(
    source: Box<dyn LineSource>,
    config: AppConfig,
) -> (SharedStore, Vec<BackendMessage>) {
    let store = TelemetryStore::shared();
    let (backend, frontend) = IngestBackend::new(config, store.clone(), source);
    backend.run();
    (store, frontend.drain())
}

/// Replay text through a backend until end of stream
pub fn ingest(text: impl Into<String>) -> (SharedStore, Vec<BackendMessage>) {
    run_backend(replay_source(text), AppConfig::default())
}

/// The last statistics message, if any
pub fn last_stats(messages: &[BackendMessage]) -> Option<IngestStats> {
    messages.iter().rev().find_map(|m| match m {
        BackendMessage::Stats(s) => Some(s.clone()),
        _ => None,
    })
}
