//! LineSource trait for unified transport access
//!
//! This module provides a common trait for everything that can deliver the
//! device's newline-terminated text stream: the serial port, a replayed
//! capture file, stdin, or the synthetic mock source used for testing.

use crate::error::{Result, SensorVisError};
use std::io::{self, BufRead};

/// Outcome of one read from a [`LineSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// A complete line (or a partial one cut off by a read timeout),
    /// without its terminator
    Line(String),
    /// A line whose bytes are not valid UTF-8
    Undecodable(Vec<u8>),
    /// Nothing arrived within the read timeout
    Idle,
    /// The stream has ended and will not deliver more lines
    Eof,
}

/// Unified interface for line transports
///
/// Implementations must be `Send` so the ingestion worker can own them on its
/// own thread. A read blocks for at most the transport's timeout.
///
/// # Errors
///
/// [`SensorVisError::Transport`] is a single failed read the worker may retry.
/// [`SensorVisError::TransportLost`] means the transport cannot recover.
#[cfg_attr(test, mockall::automock)]
pub trait LineSource: Send {
    /// Read the next line
    fn read_line(&mut self) -> Result<LineRead>;

    /// Human-readable description for logs and the status bar
    fn describe(&self) -> String;
}

/// Strip the trailing terminator and decode strictly as UTF-8
pub(crate) fn decode_line(mut bytes: Vec<u8>) -> LineRead {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    match String::from_utf8(bytes) {
        Ok(line) => LineRead::Line(line),
        Err(e) => LineRead::Undecodable(e.into_bytes()),
    }
}

/// Map an IO error to a retryable or terminal transport error
pub(crate) fn transport_error(err: io::Error, source: &str) -> SensorVisError {
    match err.kind() {
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::NotFound
        | io::ErrorKind::PermissionDenied => {
            SensorVisError::TransportLost(format!("{}: {}", source, err))
        }
        _ => SensorVisError::Transport(format!("{}: {}", source, err)),
    }
}

/// Line source over any buffered reader (capture file replay, stdin)
pub struct ReaderLineSource<R: BufRead + Send> {
    reader: R,
    name: String,
    buf: Vec<u8>,
}

impl<R: BufRead + Send> ReaderLineSource<R> {
    /// Wrap a reader; `name` shows up in logs
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            buf: Vec::with_capacity(256),
        }
    }
}

impl ReaderLineSource<io::BufReader<std::fs::File>> {
    /// Replay a capture file line by line
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            SensorVisError::Io(e).with_context(format!("Opening replay file {}", path.display()))
        })?;
        Ok(Self::new(
            io::BufReader::new(file),
            format!("replay:{}", path.display()),
        ))
    }
}

impl ReaderLineSource<io::BufReader<io::Stdin>> {
    /// Read lines from the process's standard input
    pub fn stdin() -> Self {
        Self::new(io::BufReader::new(io::stdin()), "stdin")
    }
}

impl<R: BufRead + Send> LineSource for ReaderLineSource<R> {
    fn read_line(&mut self) -> Result<LineRead> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => Ok(LineRead::Eof),
            Ok(_) => Ok(decode_line(std::mem::take(&mut self.buf))),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(LineRead::Idle),
            Err(e) => Err(transport_error(e, &self.name)),
        }
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}
