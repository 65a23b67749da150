//! Runtime settings that can be modified during application execution
//!
//! These are separate from the persistent [`AppConfig`](super::AppConfig):
//! they live only as long as the window and control what the plots show,
//! never what the ingestion worker stores.
//!
//! # Main Types
//!
//! - [`RuntimeSettings`] - Display state (paused, anomaly markers, visible window)
//!
//! # Visible Window
//!
//! With `follow_latest` on, each sensor panel shows the last
//! `visible_samples` samples and scrolls as new ones arrive. A window of zero
//! shows the whole history, which is what the device's own plot did.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Choices offered in the window size selector
pub const VISIBLE_SAMPLE_PRESETS: [usize; 5] = [0, 100, 250, 500, 1000];

/// Runtime settings for the application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeSettings {
    /// Whether the display is frozen (ingestion continues underneath)
    pub paused: bool,

    /// Whether anomaly markers are drawn
    pub show_anomalies: bool,

    /// Whether the timing panel draws point markers on its lines
    pub show_timing_points: bool,

    /// Whether to follow the latest data (auto-scroll)
    pub follow_latest: bool,

    /// Number of trailing samples shown while following (0 = all)
    pub visible_samples: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            paused: false,
            show_anomalies: true,
            show_timing_points: true,
            follow_latest: true,
            visible_samples: 0,
        }
    }
}

impl RuntimeSettings {
    /// Create new runtime settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Toggle anomaly markers
    pub fn toggle_anomalies(&mut self) {
        self.show_anomalies = !self.show_anomalies;
    }

    /// Toggle following the latest data
    pub fn toggle_follow(&mut self) {
        self.follow_latest = !self.follow_latest;
    }

    /// Index range to draw out of a series of `len` samples
    pub fn visible_range(&self, len: usize) -> Range<usize> {
        if !self.follow_latest || self.visible_samples == 0 {
            return 0..len;
        }
        len.saturating_sub(self.visible_samples)..len
    }

    /// X-axis bounds to pin while following, if any
    pub fn x_bounds(&self, len: usize) -> Option<(f64, f64)> {
        if !self.follow_latest || self.visible_samples == 0 {
            return None;
        }
        let end = len.max(self.visible_samples) as f64;
        Some((end - self.visible_samples as f64, end))
    }
}
