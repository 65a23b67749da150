//! # SensorVis-RS: Serial Sensor Telemetry Visualizer
//!
//! A real-time dashboard for a sensor hub that multiplexes MQ-2 gas, light and
//! DHT temperature/humidity readings onto one serial line stream, interleaved
//! with reports of how long the device's anomaly checks took.
//!
//! ## Architecture
//!
//! - **Parser**: Classifies each line and extracts typed values
//! - **Store**: Append-only per-sensor histories shared between threads
//! - **Backend**: Reads lines in a separate thread and feeds the store
//! - **Frontend**: Renders five stacked plots using eframe/egui with egui_plot
//! - **Headless**: Follows the backend without a window, logging statistics
//! - **Communication**: Crossbeam channels for status, stats and shutdown
//!
//! ## Configuration
//!
//! Configuration is read from `config.toml` in the platform-appropriate data
//! directory under `dev.sensorvis.sensorvis-rs`:
//!
//! - **Linux**: `~/.local/share/dev.sensorvis.sensorvis-rs/`
//! - **macOS**: `~/Library/Application Support/dev.sensorvis.sensorvis-rs/`
//! - **Windows**: `%APPDATA%\dev.sensorvis.sensorvis-rs\`
//!
//! ## Example
//!
//! ```ignore
//! use sensorvis_rs::{
//!     backend::{IngestBackend, SerialLineSource},
//!     config::AppConfig,
//!     frontend::SensorVisApp,
//!     store::TelemetryStore,
//! };
//!
//! fn main() -> eframe::Result<()> {
//!     let config = AppConfig::default();
//!     let store = TelemetryStore::shared();
//!     let source = SerialLineSource::open(&config.transport).expect("serial port");
//!
//!     let (backend, frontend) = IngestBackend::new(config.clone(), store.clone(), Box::new(source));
//!     std::thread::spawn(move || backend.run());
//!
//!     eframe::run_native(
//!         "SensorVis-RS",
//!         eframe::NativeOptions::default(),
//!         Box::new(|cc| Ok(Box::new(SensorVisApp::new(cc, frontend, store, config)))),
//!     )
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod frontend;
pub mod headless;
pub mod parser;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use backend::{BackendCommand, BackendMessage, FrontendReceiver, IngestBackend, LineSource};
pub use config::AppConfig;
pub use error::{Result, SensorVisError};
pub use frontend::SensorVisApp;
pub use parser::{parse_line, ParseError};
pub use store::{SharedStore, TelemetryStore};
pub use types::{IngestStats, Record, RecordKind, SensorKind};
