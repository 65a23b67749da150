//! Windowless monitoring of a running backend
//!
//! Follows the worker's messages until it stops, logging ingestion
//! statistics at a fixed interval. A lost transport is reported as an error
//! so the process can exit unsuccessfully instead of looking like a clean
//! end of stream.

use crate::backend::{BackendMessage, FrontendReceiver};
use crate::error::{Result, SensorVisError};
use crate::store::SharedStore;
use crate::types::{IngestStats, SensorKind};
use crossbeam_channel::RecvTimeoutError;
use std::time::{Duration, Instant};

/// How long one wait for a backend message may block
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Follow the backend until it shuts down.
///
/// Returns the final statistics, or [`SensorVisError::TransportLost`] if the
/// worker stopped because its transport went away.
pub fn monitor(
    frontend: &FrontendReceiver,
    store: &SharedStore,
    log_interval: Duration,
) -> Result<IngestStats> {
    tracing::info!("Running headless on {}", frontend.source_description);
    let mut stats = IngestStats::default();
    let mut lost: Option<String> = None;
    let mut last_log = Instant::now();

    loop {
        match frontend.receiver.recv_timeout(POLL_INTERVAL) {
            Ok(BackendMessage::Stats(latest)) => stats = latest,
            Ok(BackendMessage::ConnectionStatus(status)) => {
                tracing::info!("Connection status: {:?}", status);
            }
            Ok(BackendMessage::TransportError(e)) => tracing::warn!("Transport error: {}", e),
            Ok(BackendMessage::TransportLost(e)) => {
                tracing::error!("Transport lost: {}", e);
                lost = Some(e);
            }
            Ok(BackendMessage::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        if last_log.elapsed() >= log_interval {
            log_stats(&stats, store);
            last_log = Instant::now();
        }
    }

    // Pick up the final stats sent just before shutdown
    for msg in frontend.drain() {
        match msg {
            BackendMessage::Stats(latest) => stats = latest,
            BackendMessage::TransportLost(e) => lost = Some(e),
            _ => {}
        }
    }
    log_stats(&stats, store);

    match lost {
        Some(e) => Err(SensorVisError::TransportLost(e)),
        None => Ok(stats),
    }
}

/// Log one line of ingestion statistics with per-sensor sample counts
pub fn log_stats(stats: &IngestStats, store: &SharedStore) {
    let counts: Vec<String> = SensorKind::ALL
        .iter()
        .map(|&s| format!("{}={} ({} anomalies)", s, store.len(s), store.anomaly_count(s)))
        .collect();
    tracing::info!(
        lines = stats.lines_received,
        stored_pct = stats.success_rate(),
        unrecognized = stats.unrecognized_lines,
        parse_failures = stats.parse_failures(),
        transport_errors = stats.transport_errors,
        avg_us = stats.avg_processing_us,
        "{}",
        counts.join(", ")
    );
}
