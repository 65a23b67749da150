//! Status bar panel: source, ingestion counters and errors along the bottom.

use egui::{Color32, RichText, Ui};

use crate::frontend::topics::Topics;
use crate::types::{ConnectionStatus, SensorKind};

/// Dot color and label for a transport status
pub fn status_style(status: ConnectionStatus) -> (Color32, &'static str) {
    match status {
        ConnectionStatus::Connected => (Color32::GREEN, "Connected"),
        ConnectionStatus::Retrying => (Color32::YELLOW, "Retrying"),
        ConnectionStatus::Disconnected => (Color32::GRAY, "Disconnected"),
        ConnectionStatus::Lost => (Color32::RED, "Lost"),
    }
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, topics: &Topics) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        // === Connection status dot + source ===
        let (status_color, status_text) = status_style(topics.connection_status);
        ui.colored_label(status_color, "●");
        let source_display = if topics.source_description.is_empty() {
            status_text.to_string()
        } else {
            format!("{}: {}", status_text, topics.source_description)
        };
        ui.label(RichText::new(source_display).small());

        ui.separator();

        let stats = &topics.stats;

        ui.label(RichText::new(format!("Lines: {}", stats.lines_received)).small());

        ui.separator();

        // === Per-sensor sample counts ===
        for sensor in SensorKind::ALL {
            ui.label(
                RichText::new(format!("{}: {}", sensor, topics.sensor(sensor).len())).small(),
            );
        }

        ui.separator();

        let anomaly_color = if stats.anomalies > 0 {
            Color32::from_rgb(255, 120, 120)
        } else {
            Color32::GRAY
        };
        ui.colored_label(
            anomaly_color,
            RichText::new(format!("Anomalies: {}", stats.anomalies)).small(),
        );

        ui.separator();

        // === Error counts ===
        let failures = stats.parse_failures();
        let error_color = if failures > 0 || stats.transport_errors > 0 {
            Color32::LIGHT_RED
        } else {
            Color32::GRAY
        };
        ui.colored_label(
            error_color,
            RichText::new(format!(
                "Parse errors: {}  Transport errors: {}",
                failures, stats.transport_errors
            ))
            .small(),
        )
        .on_hover_text(format!(
            "Field count: {}\nPattern mismatch: {}\nNumber format: {}\nUnrecognized: {}",
            stats.field_count_errors,
            stats.pattern_mismatch_errors,
            stats.number_format_errors,
            stats.unrecognized_lines
        ));

        ui.separator();

        // === Avg processing time ===
        ui.label(
            RichText::new(format!(
                "Avg: {:.1} μs (min {:.1}, max {:.1})",
                stats.avg_processing_us, stats.min_processing_us, stats.max_processing_us
            ))
            .small(),
        );

        if let Some(at) = stats.last_line_at {
            ui.separator();
            ui.label(RichText::new(format!("Last line: {}", at.format("%H:%M:%S"))).small());
        }

        // === Error message (right-aligned) ===
        if let Some(error) = topics.last_error.as_deref() {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.colored_label(Color32::RED, RichText::new(error).small());
            });
        }
    });
}
