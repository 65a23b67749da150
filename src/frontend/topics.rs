//! Shared topic data consumed by the panels.
//!
//! The `Topics` struct is a plain data bus: the renderer-owned mirrors of the
//! store plus whatever the backend reported over its channel. The app writes
//! to it once per frame; panels only read.

use crate::backend::BackendMessage;
use crate::store::{ProcessingSnapshot, SensorSnapshot, TelemetryStore, TimingSnapshot};
use crate::types::{ConnectionStatus, IngestStats, SensorKind};

/// All data the panels draw from.
pub struct Topics {
    /// Mirrors of the sensor histories, indexed by [`SensorKind::index`]
    pub sensors: [SensorSnapshot; 3],
    /// Mirror of the timing log
    pub timings: TimingSnapshot,
    /// Mirror of the host processing log
    pub processing: ProcessingSnapshot,

    /// Ingestion statistics (updated ~2Hz by the worker)
    pub stats: IngestStats,
    /// Current transport status
    pub connection_status: ConnectionStatus,
    /// Where lines come from
    pub source_description: String,
    /// Most recent transport error
    pub last_error: Option<String>,
    /// Whether the backend has stopped
    pub backend_stopped: bool,

    /// Store generation the mirrors were last refreshed at
    seen_generation: Option<u64>,
}

impl Default for Topics {
    fn default() -> Self {
        Self {
            sensors: SensorKind::ALL.map(SensorSnapshot::empty),
            timings: TimingSnapshot::default(),
            processing: ProcessingSnapshot::default(),
            stats: IngestStats::default(),
            connection_status: ConnectionStatus::default(),
            source_description: String::new(),
            last_error: None,
            backend_stopped: false,
            seen_generation: None,
        }
    }
}

impl Topics {
    /// Empty topics for a given line source
    pub fn new(source_description: impl Into<String>) -> Self {
        Self {
            source_description: source_description.into(),
            ..Self::default()
        }
    }

    /// Mirror of one sensor
    pub fn sensor(&self, sensor: SensorKind) -> &SensorSnapshot {
        &self.sensors[sensor.index()]
    }

    /// Pull new entries from the store into the mirrors.
    ///
    /// Returns `false` without touching any lock when nothing changed since the
    /// last refresh.
    pub fn refresh(&mut self, store: &TelemetryStore) -> bool {
        let generation = store.generation();
        if self.seen_generation == Some(generation) {
            return false;
        }
        for mirror in &mut self.sensors {
            mirror.refresh(store);
        }
        self.timings.refresh(store);
        self.processing.refresh(store);
        self.seen_generation = Some(generation);
        true
    }

    /// Apply one backend message
    pub fn apply_message(&mut self, msg: BackendMessage) {
        match msg {
            BackendMessage::ConnectionStatus(status) => {
                self.connection_status = status;
                if status == ConnectionStatus::Connected {
                    self.last_error = None;
                }
            }
            BackendMessage::TransportError(err) => {
                self.last_error = Some(err);
            }
            BackendMessage::TransportLost(err) => {
                tracing::error!("Transport lost: {}", err);
                self.connection_status = ConnectionStatus::Lost;
                self.last_error = Some(format!("Transport lost: {}", err));
            }
            BackendMessage::Stats(stats) => {
                self.stats = stats;
            }
            BackendMessage::Shutdown => {
                tracing::info!("Backend shutdown received");
                self.backend_stopped = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_skips_unchanged_store() {
        let store = TelemetryStore::new();
        let mut topics = Topics::new("test");
        assert!(topics.refresh(&store));
        assert!(!topics.refresh(&store));

        store.append(SensorKind::Light, &[1.0, 2.0], true).unwrap();
        store.record_simple(9);
        assert!(topics.refresh(&store));
        assert_eq!(topics.sensor(SensorKind::Light).anomalies, vec![0]);
        assert_eq!(topics.timings.simple, vec![9]);
        assert!(!topics.refresh(&store));
    }

    #[test]
    fn test_transport_messages() {
        let mut topics = Topics::new("test");
        topics.apply_message(BackendMessage::ConnectionStatus(ConnectionStatus::Retrying));
        topics.apply_message(BackendMessage::TransportError("framing".into()));
        assert_eq!(topics.last_error.as_deref(), Some("framing"));

        topics.apply_message(BackendMessage::ConnectionStatus(ConnectionStatus::Connected));
        assert!(topics.last_error.is_none());

        topics.apply_message(BackendMessage::TransportLost("unplugged".into()));
        assert_eq!(topics.connection_status, ConnectionStatus::Lost);
        assert!(topics.last_error.unwrap().contains("unplugged"));
    }

    #[test]
    fn test_stats_and_shutdown() {
        let mut topics = Topics::default();
        let stats = IngestStats {
            lines_received: 7,
            ..IngestStats::default()
        };
        topics.apply_message(BackendMessage::Stats(stats));
        topics.apply_message(BackendMessage::Shutdown);
        assert_eq!(topics.stats.lines_received, 7);
        assert!(topics.backend_stopped);
    }
}
