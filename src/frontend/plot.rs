//! Plot rendering module using egui_plot
//!
//! Five stacked panels share the window width:
//!
//! 1. MQ-2 raw, smoothed and rolling average, with anomaly markers
//! 2. Light level and rolling average, with anomaly markers
//! 3. DHT temperature and humidity, with anomaly markers
//! 4. Rolling vs. simple anomaly-check time reported by the device
//! 5. Host processing latency per sensor
//!
//! Every panel uses the sample index as its x-axis. The timing and latency
//! panels count their own entries, independent of the sensor histories.
//!
//! # Main Types
//!
//! - [`PanelView`] - Shared plot styling and per-panel rendering

use crate::config::settings::RuntimeSettings;
use crate::config::UiConfig;
use crate::store::{ProcessingSnapshot, SensorSnapshot, TimingSnapshot};
use crate::types::{SensorKind, TimingCategory};
use egui::{Color32, Ui};
use egui_plot::{Corner, Legend, Line, MarkerShape, Plot, PlotBounds, PlotPoints, Points};
use std::ops::Range;

/// Line colors, by channel position
const CHANNEL_COLORS: [Color32; 3] = [
    Color32::from_rgb(100, 149, 237),
    Color32::from_rgb(60, 179, 113),
    Color32::from_rgb(255, 165, 0),
];

/// Anomaly marker color
const ANOMALY_COLOR: Color32 = Color32::RED;

/// Timing panel colors (rolling, simple)
const TIMING_COLORS: [Color32; 2] = [
    Color32::from_rgb(186, 85, 211),
    Color32::from_rgb(0, 206, 209),
];

/// Smallest height a panel shrinks to
pub const MIN_PANEL_HEIGHT: f32 = 120.0;

/// Number of stacked panels
pub const PANEL_COUNT: usize = 5;

/// Plot styling shared by all panels
#[derive(Debug, Clone)]
pub struct PanelView {
    /// Whether to show the legend
    pub show_legend: bool,
    /// Line width for all plots
    pub line_width: f32,
    /// Anomaly marker radius
    pub marker_radius: f32,
}

impl Default for PanelView {
    fn default() -> Self {
        Self::from_config(&UiConfig::default())
    }
}

impl PanelView {
    /// Create a PanelView from UI configuration
    pub fn from_config(config: &UiConfig) -> Self {
        Self {
            show_legend: config.show_legend,
            line_width: config.line_width,
            marker_radius: config.anomaly_marker_radius,
        }
    }

    fn plot(&self, id: &str, height: f32, y_label: &str) -> Plot<'static> {
        let mut plot = Plot::new(id.to_string())
            .height(height.max(MIN_PANEL_HEIGHT))
            .x_axis_label("Sample")
            .y_axis_label(y_label.to_string())
            .allow_scroll(false);
        if self.show_legend {
            plot = plot.legend(
                Legend::default()
                    .position(Corner::LeftTop)
                    .background_alpha(0.8),
            );
        }
        plot
    }

    /// Render one sensor panel
    pub fn render_sensor(
        &self,
        ui: &mut Ui,
        snapshot: &SensorSnapshot,
        settings: &RuntimeSettings,
        height: f32,
    ) {
        let sensor = snapshot.sensor;
        let range = settings.visible_range(snapshot.len());
        let x_bounds = settings.x_bounds(snapshot.len());
        let channels: Vec<&[f64]> = (0..sensor.channel_count())
            .map(|c| snapshot.channel(c))
            .collect();
        let y_bounds = y_bounds_for_range(&channels, range.clone());

        let plot = self
            .plot(sensor.display_name(), height, sensor.unit_label())
            .auto_bounds([x_bounds.is_none(), true]);

        plot.show(ui, |plot_ui| {
            if let (Some((x_min, x_max)), Some((y_min, y_max))) = (x_bounds, y_bounds) {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([x_min, y_min], [x_max, y_max]));
            }

            for (i, name) in sensor.channel_names().iter().enumerate() {
                let points = series_points(snapshot.channel(i), range.clone());
                plot_ui.line(
                    Line::new(*name, PlotPoints::from(points))
                        .color(CHANNEL_COLORS[i % CHANNEL_COLORS.len()])
                        .width(self.line_width),
                );
            }

            if settings.show_anomalies {
                let markers =
                    anomaly_points_in(snapshot, sensor.marker_channel(), range.clone());
                if !markers.is_empty() {
                    plot_ui.points(
                        Points::new("Anomaly", PlotPoints::from(markers))
                            .color(ANOMALY_COLOR)
                            .shape(MarkerShape::Circle)
                            .filled(true)
                            .radius(self.marker_radius),
                    );
                }
            }
        });
    }

    /// Render the anomaly-check timing comparison panel
    pub fn render_timing(
        &self,
        ui: &mut Ui,
        timings: &TimingSnapshot,
        settings: &RuntimeSettings,
        height: f32,
    ) {
        let plot = self.plot("Anomaly Check Timing", height, "Execution Time (µs)");

        plot.show(ui, |plot_ui| {
            for (i, category) in [TimingCategory::Rolling, TimingCategory::Simple]
                .into_iter()
                .enumerate()
            {
                let name = match category {
                    TimingCategory::Rolling => "Rolling Anomaly Check",
                    TimingCategory::Simple => "Simple Anomaly Check",
                };
                let points = timings.points(category);
                let color = TIMING_COLORS[i];

                if settings.show_timing_points && !points.is_empty() {
                    plot_ui.points(
                        Points::new(name, PlotPoints::from(points.clone()))
                            .color(color)
                            .shape(MarkerShape::Circle)
                            .radius(2.0),
                    );
                }
                plot_ui.line(
                    Line::new(name, PlotPoints::from(points))
                        .color(color)
                        .width(self.line_width),
                );
            }
        });
    }

    /// Render the host processing latency panel
    pub fn render_processing(
        &self,
        ui: &mut Ui,
        processing: &ProcessingSnapshot,
        height: f32,
    ) {
        let plot = self.plot("Host Processing Latency", height, "Processing Time (µs)");

        plot.show(ui, |plot_ui| {
            for sensor in SensorKind::ALL {
                plot_ui.line(
                    Line::new(
                        format!("{} processing", sensor),
                        PlotPoints::from(processing.points(sensor)),
                    )
                    .color(CHANNEL_COLORS[sensor.index()])
                    .width(self.line_width),
                );
            }
        });
    }
}

/// Height of each panel when `available` is split between all of them
pub fn panel_height(available: f32, spacing: f32) -> f32 {
    let gaps = spacing * (PANEL_COUNT as f32 - 1.0);
    ((available - gaps) / PANEL_COUNT as f32).max(MIN_PANEL_HEIGHT)
}

/// `(index, value)` pairs for the given index range
pub fn series_points(values: &[f64], range: Range<usize>) -> Vec<[f64; 2]> {
    let end = range.end.min(values.len());
    let start = range.start.min(end);
    values[start..end]
        .iter()
        .enumerate()
        .map(|(i, v)| [(start + i) as f64, *v])
        .collect()
}

/// Anomaly markers inside the given index range
///
/// An index with no value yet in `channel` is skipped.
pub fn anomaly_points_in(
    snapshot: &SensorSnapshot,
    channel: usize,
    range: Range<usize>,
) -> Vec<[f64; 2]> {
    let values = snapshot.channel(channel);
    snapshot
        .anomalies
        .iter()
        .filter(|&&i| range.contains(&i))
        .filter_map(|&i| values.get(i).map(|v| [i as f64, *v]))
        .collect()
}

/// Y bounds covering every channel over an index range, with a 5% margin
fn y_bounds_for_range(channels: &[&[f64]], range: Range<usize>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for values in channels {
        let end = range.end.min(values.len());
        let start = range.start.min(end);
        for &v in &values[start..end] {
            min = min.min(v);
            max = max.max(v);
        }
    }

    if !min.is_finite() || !max.is_finite() {
        return None;
    }

    let span = max - min;
    let margin = if span > 0.0 { span * 0.05 } else { 1.0 };
    Some((min - margin, max + margin))
}
