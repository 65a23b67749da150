//! Serial port line source
//!
//! Wraps a `serialport` handle in a `BufReader` and splits the byte stream on
//! `\n`. The port's read timeout bounds every call to
//! [`LineSource::read_line`], which keeps the worker responsive to shutdown.
//!
//! A timeout that arrives before any byte of the next line is reported as
//! [`LineRead::Idle`]. A timeout in the middle of a line hands over the bytes
//! received so far as a (truncated) line; the parser treats it like any other
//! malformed input.

use super::source::{decode_line, transport_error, LineRead, LineSource};
use crate::config::TransportConfig;
use crate::error::{Result, ResultExt};
use serialport::SerialPort;
use std::io::{self, BufRead, BufReader};
use std::time::Duration;

/// Line source reading from a serial port
pub struct SerialLineSource {
    reader: BufReader<Box<dyn SerialPort>>,
    port_name: String,
    baud_rate: u32,
    buf: Vec<u8>,
}

impl SerialLineSource {
    /// Open the configured port
    pub fn open(config: &TransportConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .flow_control(serialport::FlowControl::None)
            .open()
            .with_context(|| format!("Failed to open serial port '{}'", config.port))?;

        tracing::info!(
            "Opened serial port {} at {} baud",
            config.port,
            config.baud_rate
        );

        Ok(Self {
            reader: BufReader::new(port),
            port_name: config.port.clone(),
            baud_rate: config.baud_rate,
            buf: Vec::with_capacity(256),
        })
    }

    /// Names of serial ports present on this machine
    pub fn available_ports() -> Vec<String> {
        match serialport::available_ports() {
            Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
            Err(e) => {
                tracing::warn!("Serial port enumeration failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Read one line from a timeout-bounded reader.
///
/// `read_until` leaves the bytes consumed before a timeout in `buf`, so a
/// timeout with a non-empty buffer hands over a truncated line.
fn read_timed_line(
    reader: &mut impl BufRead,
    buf: &mut Vec<u8>,
    port_name: &str,
) -> Result<LineRead> {
    buf.clear();
    match reader.read_until(b'\n', buf) {
        Ok(0) => Ok(LineRead::Eof),
        Ok(_) => Ok(decode_line(std::mem::take(buf))),
        Err(e) if e.kind() == io::ErrorKind::TimedOut => {
            if buf.is_empty() {
                Ok(LineRead::Idle)
            } else {
                tracing::debug!(
                    "Read timeout after {} bytes on {}, passing partial line",
                    buf.len(),
                    port_name
                );
                Ok(decode_line(std::mem::take(buf)))
            }
        }
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(LineRead::Idle),
        Err(e) => Err(transport_error(e, port_name)),
    }
}

impl LineSource for SerialLineSource {
    fn read_line(&mut self) -> Result<LineRead> {
        read_timed_line(&mut self.reader, &mut self.buf, &self.port_name)
    }

    fn describe(&self) -> String {
        format!("{} @ {} baud", self.port_name, self.baud_rate)
    }
}
