//! Ingestion Worker Thread Implementation
//!
//! This module contains the main worker loop that runs in a separate thread
//! and drives the line pipeline. It is the only writer to the
//! [`TelemetryStore`]; the UI reads the store on its own timer and talks to the
//! worker through crossbeam channels.
//!
//! # Responsibilities
//!
//! - **Command processing**: Responds to UI commands (stats request, shutdown)
//! - **Line pipeline**: Receive, classify, extract, then store or log each line
//! - **Statistics tracking**: Per-kind counts, failures, processing latency
//! - **Error handling**: Retries transport read errors, stops on transport loss
//!
//! # Failure Policy
//!
//! A line that fails extraction is logged with its text and dropped; the
//! store is not touched. A failed transport read is retried after
//! `retry_delay_ms`. After `max_consecutive_errors` failures in a row, or on
//! an error the source reports as terminal, the worker publishes
//! [`BackendMessage::TransportLost`] and stops.

use crate::backend::source::{LineRead, LineSource};
use crate::backend::{BackendCommand, BackendMessage};
use crate::config::TransportConfig;
use crate::error::SensorVisError;
use crate::parser::{classify, extract, ParseError};
use crate::store::{SharedStore, StoreError};
use crate::types::{
    ConnectionStatus, IngestStats, ProcessingTimer, Record, RecordKind,
};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Interval between periodic stats messages
const STATS_INTERVAL: Duration = Duration::from_millis(500);

/// What happened to a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The record was appended to a history or the timing log
    Stored(RecordKind),
    /// No classifier marker matched
    Unrecognized,
    /// Classification succeeded but extraction failed
    ParseFailed(ParseError),
    /// The store refused the sample
    StoreRejected(StoreError),
}

/// The backend worker that runs the ingestion loop
pub struct IngestWorker {
    /// Transport retry policy
    config: TransportConfig,
    /// Shared store (this worker is its only writer)
    store: SharedStore,
    /// Where lines come from
    source: Box<dyn LineSource>,
    /// Command receiver from the UI
    command_rx: Receiver<BackendCommand>,
    /// Message sender to the UI
    message_tx: Sender<BackendMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Current connection status
    connection_status: ConnectionStatus,
    /// Statistics
    stats: IngestStats,
    /// Host processing time tracker
    timer: ProcessingTimer,
    /// Failed reads since the last successful one
    consecutive_errors: u32,
    /// Last time stats were sent to UI
    last_stats_time: Instant,
}

impl IngestWorker {
    /// Create a new ingestion worker
    pub fn new(
        config: TransportConfig,
        store: SharedStore,
        source: Box<dyn LineSource>,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            store,
            source,
            command_rx,
            message_tx,
            running,
            connection_status: ConnectionStatus::Disconnected,
            stats: IngestStats::default(),
            timer: ProcessingTimer::new(),
            consecutive_errors: 0,
            last_stats_time: Instant::now(),
        }
    }

    /// Current statistics
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Current connection status
    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection_status
    }

    /// Run the main worker loop until shutdown, end of stream or transport loss
    pub fn run(&mut self) {
        tracing::info!("Ingestion worker started on {}", self.source.describe());
        self.update_connection_status(ConnectionStatus::Connected);

        while self.running.load(Ordering::SeqCst) {
            self.process_commands();
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            self.poll_source();

            if self.last_stats_time.elapsed() >= STATS_INTERVAL {
                self.send_stats();
                self.last_stats_time = Instant::now();
            }
        }

        self.send_stats();
        self.try_send_message(BackendMessage::Shutdown);
        tracing::info!(
            "Ingestion worker stopped after {} lines ({} records, {} failures)",
            self.stats.lines_received,
            self.stats.total_records(),
            self.stats.parse_failures()
        );
    }

    /// Process pending commands from the UI
    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::RequestStats => self.send_stats(),
            BackendCommand::Shutdown => {
                tracing::info!("Shutdown requested");
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Pull one read from the source and act on it
    fn poll_source(&mut self) {
        match self.source.read_line() {
            Ok(LineRead::Line(line)) => {
                self.mark_healthy();
                self.process_line(&line);
            }
            Ok(LineRead::Undecodable(bytes)) => {
                self.mark_healthy();
                self.stats.lines_received += 1;
                self.stats.unrecognized_lines += 1;
                self.stats.last_line_at = Some(chrono::Local::now());
                tracing::debug!("Dropping {} undecodable bytes", bytes.len());
            }
            Ok(LineRead::Idle) => {}
            Ok(LineRead::Eof) => {
                tracing::info!("End of stream on {}", self.source.describe());
                self.update_connection_status(ConnectionStatus::Disconnected);
                self.running.store(false, Ordering::SeqCst);
            }
            Err(e) => self.handle_transport_error(e),
        }
    }

    fn mark_healthy(&mut self) {
        self.consecutive_errors = 0;
        if self.connection_status != ConnectionStatus::Connected {
            self.update_connection_status(ConnectionStatus::Connected);
        }
    }

    /// Retry a failed read, or give up if the transport is gone
    fn handle_transport_error(&mut self, err: SensorVisError) {
        self.stats.transport_errors += 1;
        self.consecutive_errors += 1;

        if err.is_terminal() || self.consecutive_errors >= self.config.max_consecutive_errors {
            tracing::error!(
                "Transport lost on {} after {} consecutive errors: {}",
                self.source.describe(),
                self.consecutive_errors,
                err
            );
            self.update_connection_status(ConnectionStatus::Lost);
            self.try_send_message(BackendMessage::TransportLost(err.to_string()));
            self.running.store(false, Ordering::SeqCst);
            return;
        }

        tracing::warn!(
            "Transport read error ({}/{}): {}",
            self.consecutive_errors,
            self.config.max_consecutive_errors,
            err
        );
        if self.connection_status != ConnectionStatus::Retrying {
            self.update_connection_status(ConnectionStatus::Retrying);
        }
        self.try_send_message(BackendMessage::TransportError(err.to_string()));
        std::thread::sleep(Duration::from_millis(self.config.retry_delay_ms));
    }

    /// Classify, extract and store one line
    ///
    /// A failure at any stage leaves the store untouched.
    pub fn process_line(&mut self, line: &str) -> LineOutcome {
        let started = Instant::now();
        self.stats.lines_received += 1;
        self.stats.last_line_at = Some(chrono::Local::now());
        tracing::trace!("Received line: {}", line);

        let classified = classify(line);
        let kind = classified.kind;
        if kind == RecordKind::Unrecognized {
            self.stats.unrecognized_lines += 1;
            tracing::debug!("Unrecognized line: {:?}", line);
            return LineOutcome::Unrecognized;
        }

        let record = match extract(classified) {
            Ok(record) => record,
            Err(e) => {
                self.count_parse_failure(&e);
                tracing::warn!("Failed to parse {} line: {} ({:?})", kind, e, line);
                return LineOutcome::ParseFailed(e);
            }
        };

        match record {
            Record::Sample(sample) => {
                let index = match self.store.append_sample(&sample) {
                    Ok(index) => index,
                    Err(e) => {
                        tracing::error!("Store rejected {} sample: {}", kind, e);
                        return LineOutcome::StoreRejected(e);
                    }
                };
                if sample.is_anomaly() {
                    self.stats.anomalies += 1;
                    tracing::debug!("{} anomaly at index {}", sample.sensor(), index);
                }

                let micros = started.elapsed().as_secs_f64() * 1_000_000.0;
                self.store.record_processing(sample.sensor(), micros);
                self.timer.record(micros);
            }
            Record::Timing(timing) => {
                self.store.record_timing(&timing);
            }
        }

        self.stats.records_by_kind[kind.index()] += 1;
        LineOutcome::Stored(kind)
    }

    fn count_parse_failure(&mut self, err: &ParseError) {
        match err {
            ParseError::Unrecognized => self.stats.unrecognized_lines += 1,
            ParseError::FieldCount { .. } => self.stats.field_count_errors += 1,
            ParseError::PatternMismatch { .. } => self.stats.pattern_mismatch_errors += 1,
            ParseError::NumberFormat { .. } => self.stats.number_format_errors += 1,
        }
    }

    /// Update connection status and notify UI
    fn update_connection_status(&mut self, status: ConnectionStatus) {
        self.connection_status = status;
        self.try_send_message(BackendMessage::ConnectionStatus(status));
    }

    /// Send statistics to UI (using try_send for backpressure)
    fn send_stats(&mut self) {
        self.timer.fill(&mut self.stats);
        let stats = self.stats.clone();
        self.try_send_message(BackendMessage::Stats(stats));
    }

    /// Try to send a message, tracking dropped messages if queue is full
    ///
    /// The worker never blocks on the UI. If the queue is full, the message
    /// is dropped and the dropped_messages counter is incremented.
    fn try_send_message(&mut self, msg: BackendMessage) {
        if self.message_tx.try_send(msg).is_err() {
            self.stats.dropped_messages += 1;
        }
    }
}
