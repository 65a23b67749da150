//! Error handling for the SensorVis-RS application
//!
//! This module defines the crate-level error type and a Result alias for use
//! throughout the application. Line-level extraction failures live in
//! [`crate::parser::ParseError`] and store invariant violations in
//! [`crate::store::StoreError`]; both convert into [`SensorVisError`].

use crate::parser::ParseError;
use crate::store::StoreError;
use thiserror::Error;

/// Main error type for SensorVis-RS operations
#[derive(Error, Debug)]
pub enum SensorVisError {
    /// A single read from the transport failed; the driver retries
    #[error("Transport read error: {0}")]
    Transport(String),

    /// The transport is gone and will not come back
    #[error("Transport lost: {0}")]
    TransportLost(String),

    /// Errors raised while opening or configuring the serial port
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// A line could not be turned into a record
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A store update was rejected
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SensorVisError>,
    },
}

impl SensorVisError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SensorVisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    fn from_source<E: Into<SensorVisError>>(err: E) -> Self {
        err.into()
    }

    /// Whether this error means the transport cannot deliver any more lines
    pub fn is_terminal(&self) -> bool {
        match self {
            SensorVisError::TransportLost(_) => true,
            SensorVisError::WithContext { source, .. } => source.is_terminal(),
            _ => false,
        }
    }
}

impl From<toml::de::Error> for SensorVisError {
    fn from(err: toml::de::Error) -> Self {
        SensorVisError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for SensorVisError {
    fn from(err: toml::ser::Error) -> Self {
        SensorVisError::Serialization(err.to_string())
    }
}

/// Result type alias for SensorVis-RS operations
pub type Result<T> = std::result::Result<T, SensorVisError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SensorVisError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| SensorVisError::from_source(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| SensorVisError::from_source(e).with_context(f()))
    }
}
