//! Configuration module for SensorVis-RS
//!
//! This module handles application configuration including:
//! - The TOML config file (transport, UI and logging settings)
//! - Runtime settings during execution (see [`settings`])
//!
//! # App Data Location
//!
//! The default config file lives in the platform-appropriate data directory:
//! - **Linux**: `~/.local/share/dev.sensorvis.sensorvis-rs/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.sensorvis.sensorvis-rs/config.toml`
//! - **Windows**: `%APPDATA%\dev.sensorvis.sensorvis-rs\config.toml`
//!
//! Command-line flags override whatever the file says.
//!
//! # Example
//!
//! ```ignore
//! use sensorvis_rs::config::{default_config_path, AppConfig};
//!
//! let path = default_config_path().unwrap();
//! let mut config = AppConfig::load_or_default(&path);
//! config.transport.port = "/dev/ttyACM0".to_string();
//! config.save(&path)?;
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{Result, SensorVisError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.sensorvis.sensorvis-rs";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default serial port
#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM3";
/// Default serial port
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Default baud rate of the sensor hub
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Default renderer cadence in milliseconds
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 100;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== App Config ====================

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Line transport configuration
    #[serde(default)]
    pub transport: TransportConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UiConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SensorVisError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            SensorVisError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Load a config file, returning defaults if it is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the config to disk as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SensorVisError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        std::fs::write(path, content).map_err(|e| {
            SensorVisError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }
}

// ==================== Transport Config ====================

/// Serial transport and retry policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Serial port name
    pub port: String,

    /// Baud rate
    pub baud_rate: u32,

    /// Read timeout in milliseconds; bounds how long a read may block
    pub read_timeout_ms: u64,

    /// Pause after a failed read before trying again
    pub retry_delay_ms: u64,

    /// Failed reads in a row after which the transport counts as lost
    pub max_consecutive_errors: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            retry_delay_ms: 250,
            max_consecutive_errors: 20,
        }
    }
}

// ==================== UI Config ====================

/// UI configuration for plotting and display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Redraw cadence in milliseconds
    pub refresh_interval_ms: u64,

    /// Show legend on plots
    pub show_legend: bool,

    /// Plot line width in pixels
    pub line_width: f32,

    /// Radius of anomaly markers in pixels
    pub anomaly_marker_radius: f32,

    /// Initial window size
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            show_legend: true,
            line_width: 1.5,
            anomaly_marker_radius: 4.0,
            window_width: 1200.0,
            window_height: 1000.0,
        }
    }
}

// ==================== Logging Config ====================

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily-rolling log files; stderr only when unset
    pub file_dir: Option<PathBuf>,
}
