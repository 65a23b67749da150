//! Backend module for line ingestion
//!
//! This module reads the multiplexed sensor stream in a separate thread to
//! keep the UI responsive. Parsed records go straight into the shared
//! [`TelemetryStore`]; crossbeam channels carry only control traffic, status
//! and statistics between the worker and the frontend.
//!
//! # Architecture
//!
//! - [`BackendCommand`] - Messages sent from UI to backend (stats request, shutdown)
//! - [`BackendMessage`] - Messages sent from backend to UI (status, errors, stats)
//! - [`FrontendReceiver`] - UI-side handle for sending commands and receiving messages
//! - [`IngestBackend`] - Main backend entry point that owns the worker
//!
//! # Components
//!
//! - [`LineSource`] - Transport abstraction
//! - [`SerialLineSource`] - Serial port transport
//! - [`ReaderLineSource`] - Capture file replay / stdin
//! - [`MockLineSource`] - Synthetic sensor hub (feature-gated)
//! - [`IngestWorker`] - Main worker loop that drives the line pipeline
//!
//! # Example
//!
//! ```ignore
//! use sensorvis_rs::backend::{IngestBackend, SerialLineSource};
//! use sensorvis_rs::config::AppConfig;
//! use sensorvis_rs::store::TelemetryStore;
//!
//! let config = AppConfig::default();
//! let store = TelemetryStore::shared();
//! let source = SerialLineSource::open(&config.transport)?;
//! let (backend, frontend) = IngestBackend::new(config, store.clone(), Box::new(source));
//!
//! // Spawn backend thread
//! std::thread::spawn(move || backend.run());
//!
//! // Receive messages
//! for msg in frontend.drain() {
//!     if let BackendMessage::Stats(stats) = msg {
//!         println!("{} lines", stats.lines_received);
//!     }
//! }
//! ```

#[cfg(feature = "mock-source")]
pub mod mock_source;
pub mod serial;
pub mod source;
pub mod worker;

#[cfg(feature = "mock-source")]
pub use mock_source::{MockLineSource, MockSourceConfig};
pub use serial::SerialLineSource;
pub use source::{LineRead, LineSource, ReaderLineSource};
pub use worker::{IngestWorker, LineOutcome};

use crate::config::AppConfig;
use crate::store::SharedStore;
use crate::types::{ConnectionStatus, IngestStats};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Message sent from the UI to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCommand {
    /// Request current statistics
    RequestStats,
    /// Shutdown the backend
    Shutdown,
}

/// Message sent from the backend to the UI
#[derive(Debug, Clone)]
pub enum BackendMessage {
    /// Connection status changed
    ConnectionStatus(ConnectionStatus),
    /// A transport read failed; the worker is retrying
    TransportError(String),
    /// The transport is gone; the worker has stopped
    TransportLost(String),
    /// Statistics update
    Stats(IngestStats),
    /// Backend is shutting down
    Shutdown,
}

/// Frontend receiver for backend messages
pub struct FrontendReceiver {
    /// Receiver for backend messages
    pub receiver: Receiver<BackendMessage>,
    /// Sender for commands to the backend
    pub command_sender: Sender<BackendCommand>,
    /// Description of the line source
    pub source_description: String,
}

impl FrontendReceiver {
    /// Receive all pending messages
    pub fn drain(&self) -> Vec<BackendMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: BackendCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Ask the worker for a fresh stats message
    pub fn request_stats(&self) {
        let _ = self.command_sender.send(BackendCommand::RequestStats);
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(BackendCommand::Shutdown);
    }
}

/// The ingestion backend that runs in a separate thread
pub struct IngestBackend {
    /// Configuration
    config: AppConfig,
    /// Store the worker writes into
    store: SharedStore,
    /// Where lines come from
    source: Box<dyn LineSource>,
    /// Receiver for commands from the UI
    command_receiver: Receiver<BackendCommand>,
    /// Sender for messages to the UI
    message_sender: Sender<BackendMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
}

impl IngestBackend {
    /// Create a new backend with communication channels
    pub fn new(
        config: AppConfig,
        store: SharedStore,
        source: Box<dyn LineSource>,
    ) -> (Self, FrontendReceiver) {
        let (cmd_tx, cmd_rx) = bounded(64);
        // Only status and stats travel here; samples go through the store
        let (msg_tx, msg_rx) = bounded(1_024);

        let frontend = FrontendReceiver {
            receiver: msg_rx,
            command_sender: cmd_tx,
            source_description: source.describe(),
        };

        let backend = Self {
            config,
            store,
            source,
            command_receiver: cmd_rx,
            message_sender: msg_tx,
            running: Arc::new(AtomicBool::new(true)),
        };

        (backend, frontend)
    }

    /// Run the backend loop
    pub fn run(self) {
        let mut worker = IngestWorker::new(
            self.config.transport,
            self.store,
            self.source,
            self.command_receiver,
            self.message_sender,
            self.running,
        );
        worker.run();
    }

    /// Get a handle to stop the backend
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}
