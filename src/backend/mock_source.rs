//! Mock Line Source for Testing
//!
//! Synthesizes the text a sensor hub would print so the whole pipeline can be
//! exercised without hardware.
//!
//! # Generated Stream
//!
//! Lines cycle through the five record kinds in device order (MQ-2 reading,
//! its two timing reports, Light, DHT). Values follow slow sine waves with a
//! little noise. Every `anomaly_every`-th reading carries the `ANOMALY` marker
//! with a spiked value, and every `malformed_every`-th line is cut short so
//! the error paths stay visible.
//!
//! # Enabling
//!
//! The mock source is only available when the `mock-source` feature is enabled:
//!
//! ```bash
//! cargo run --features mock-source -- --mock
//! ```

use super::source::{LineRead, LineSource};
use crate::error::Result;
use std::time::Duration;

/// Shape of the synthetic stream
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Pause before each line (zero for tests)
    pub line_interval: Duration,
    /// Every n-th sensor reading is anomalous (0 = never)
    pub anomaly_every: u64,
    /// Every n-th line is truncated (0 = never)
    pub malformed_every: u64,
    /// Stop with [`LineRead::Eof`] after this many lines
    pub max_lines: Option<u64>,
    /// PRNG seed
    pub seed: u64,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            line_interval: Duration::from_millis(20),
            anomaly_every: 25,
            malformed_every: 97,
            max_lines: None,
            seed: 12345,
        }
    }
}

/// Line source producing device-like text
pub struct MockLineSource {
    config: MockSourceConfig,
    lines: u64,
    readings: u64,
    step: u64,
    seed: u64,
}

impl Default for MockLineSource {
    fn default() -> Self {
        Self::new(MockSourceConfig::default())
    }
}

impl MockLineSource {
    /// Create a mock source
    pub fn new(config: MockSourceConfig) -> Self {
        let seed = config.seed.max(1);
        Self {
            config,
            lines: 0,
            readings: 0,
            step: 0,
            seed,
        }
    }

    /// Number of lines produced so far
    pub fn lines_emitted(&self) -> u64 {
        self.lines
    }

    fn noise(&mut self) -> f64 {
        let mut s = self.seed;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.seed = s;
        (s as f64) / (u64::MAX as f64) - 0.5
    }

    fn next_reading_is_anomaly(&mut self) -> bool {
        self.readings += 1;
        self.config.anomaly_every > 0 && self.readings % self.config.anomaly_every == 0
    }

    fn generate(&mut self) -> String {
        let t = self.step as f64 / 5.0;
        let line = match self.step % 5 {
            0 => {
                let anomaly = self.next_reading_is_anomaly();
                let spike = if anomaly { 400.0 } else { 0.0 };
                let raw = 150.0 + 40.0 * (t * 0.1).sin() + 10.0 * self.noise() + spike;
                let smoothed = 150.0 + 40.0 * (t * 0.1).sin() + spike * 0.3;
                let rolling = 150.0 + 35.0 * (t * 0.1 - 0.3).sin();
                let mut line = format!(
                    "[MQ-2 Sensor]\tRaw: {:.1}\tSmoothed: {:.1}\tRollingAvg: {:.1}",
                    raw, smoothed, rolling
                );
                if anomaly {
                    line.push_str(" ANOMALY");
                }
                line
            }
            1 => {
                let us = 80.0 + 20.0 * self.noise();
                format!(
                    "[MQ-2 Sensor] Execution time for rolling anomaly check: {} µs",
                    us.round() as u64
                )
            }
            2 => {
                let us = 12.0 + 4.0 * self.noise();
                format!(
                    "[MQ-2 Sensor] Execution time for simple anomaly check: {} µs",
                    us.round() as u64
                )
            }
            3 => {
                let anomaly = self.next_reading_is_anomaly();
                let base = 500.0 + 200.0 * (t * 0.05).sin();
                let level = if anomaly { base * 0.2 } else { base + 15.0 * self.noise() };
                let mut line = format!(
                    "[Light Sensor] Current: {} Rolling Avg: {:.2}",
                    level.max(0.0).round() as u32,
                    base
                );
                if anomaly {
                    line.push_str(" ANOMALY");
                }
                line
            }
            _ => {
                let anomaly = self.next_reading_is_anomaly();
                let temp = 22.0 + 3.0 * (t * 0.02).sin() + if anomaly { 15.0 } else { 0.0 };
                let humidity = 45.0 + 10.0 * (t * 0.03).cos() + 2.0 * self.noise();
                let mut line = format!(
                    "[DHT Sensor] Temperature: {:.1} (°C) Humidity: {:.1}",
                    temp, humidity
                );
                if anomaly {
                    line.push_str(" ANOMALY");
                }
                line
            }
        };
        self.step += 1;
        line
    }
}

impl LineSource for MockLineSource {
    fn read_line(&mut self) -> Result<LineRead> {
        if self.config.max_lines.is_some_and(|max| self.lines >= max) {
            return Ok(LineRead::Eof);
        }
        if !self.config.line_interval.is_zero() {
            std::thread::sleep(self.config.line_interval);
        }

        self.lines += 1;
        let mut line = self.generate();
        if self.config.malformed_every > 0 && self.lines % self.config.malformed_every == 0 {
            let cut = line
                .char_indices()
                .nth(line.chars().count() / 2)
                .map(|(i, _)| i)
                .unwrap_or(line.len());
            line.truncate(cut);
        }
        Ok(LineRead::Line(line))
    }

    fn describe(&self) -> String {
        "mock sensor hub".to_string()
    }
}
