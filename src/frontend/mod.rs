//! Frontend module for egui UI
//!
//! This module provides the live dashboard using eframe/egui. Sensor data is
//! read straight from the shared store on every frame; the backend channel
//! only carries status, errors and statistics.
//!
//! # Layout
//!
//! - Top bar: transport status and display controls
//! - Central panel: five stacked plots (see [`plot`])
//! - Bottom bar: ingestion counters (see [`status_bar`])
//!
//! # Main Types
//!
//! - [`SensorVisApp`] - Main application state implementing [`eframe::App`]
//! - [`Topics`] - Renderer-owned mirrors of the store plus backend status
//! - [`PanelView`] - Plot styling and per-panel rendering
//!
//! # Keyboard Shortcuts
//!
//! - `P` pause / resume the display
//! - `A` show / hide anomaly markers
//! - `F` follow the latest samples

mod plot;
pub mod status_bar;
pub mod topics;

pub use plot::PanelView;
pub use topics::Topics;

use crate::backend::FrontendReceiver;
use crate::config::settings::{RuntimeSettings, VISIBLE_SAMPLE_PRESETS};
use crate::config::AppConfig;
use crate::store::SharedStore;
use crate::types::{ConnectionStatus, SensorKind};
use egui::Color32;
use std::time::Duration;

/// Main application state
pub struct SensorVisApp {
    /// Channel handles to the ingestion backend
    frontend: FrontendReceiver,
    /// Store the backend writes into
    store: SharedStore,
    /// Application configuration
    config: AppConfig,
    /// Display state
    settings: RuntimeSettings,
    /// Plot styling
    view: PanelView,
    /// Mirrors and backend status
    topics: Topics,
}

impl SensorVisApp {
    /// Create a new application instance
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        frontend: FrontendReceiver,
        store: SharedStore,
        config: AppConfig,
    ) -> Self {
        cc.egui_ctx.set_fonts(egui::FontDefinitions::default());

        let topics = Topics::new(frontend.source_description.clone());
        let view = PanelView::from_config(&config.ui);

        Self {
            frontend,
            store,
            config,
            settings: RuntimeSettings::default(),
            view,
            topics,
        }
    }

    fn process_backend_messages(&mut self) -> bool {
        let messages = self.frontend.drain();
        let had_messages = !messages.is_empty();
        for msg in messages {
            self.topics.apply_message(msg);
        }
        had_messages
    }

    fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.config.ui.refresh_interval_ms.max(1))
    }

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::Key;

        let mut toggle_pause = false;
        let mut toggle_anomalies = false;
        let mut toggle_follow = false;

        ctx.input(|i| {
            if i.key_pressed(Key::P) && !i.modifiers.any() {
                toggle_pause = true;
            }
            if i.key_pressed(Key::A) && !i.modifiers.any() {
                toggle_anomalies = true;
            }
            if i.key_pressed(Key::F) && !i.modifiers.any() {
                toggle_follow = true;
            }
        });

        if toggle_pause {
            self.settings.toggle_pause();
        }
        if toggle_anomalies {
            self.settings.toggle_anomalies();
        }
        if toggle_follow {
            self.settings.toggle_follow();
        }
    }

    fn render_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Sensor Telemetry");
            ui.separator();

            let pause_label = if self.settings.paused { "Resume" } else { "Pause" };
            if ui.button(pause_label).clicked() {
                self.settings.toggle_pause();
            }
            ui.checkbox(&mut self.settings.show_anomalies, "Anomalies");
            ui.checkbox(&mut self.settings.show_timing_points, "Timing points");
            ui.checkbox(&mut self.settings.follow_latest, "Follow");

            let window_label = |n: usize| {
                if n == 0 {
                    "All samples".to_string()
                } else {
                    format!("Last {}", n)
                }
            };
            egui::ComboBox::from_id_salt("visible_samples")
                .selected_text(window_label(self.settings.visible_samples))
                .show_ui(ui, |ui| {
                    for n in VISIBLE_SAMPLE_PRESETS {
                        ui.selectable_value(&mut self.settings.visible_samples, n, window_label(n));
                    }
                });

            if ui.button("Stats").on_hover_text("Request fresh statistics").clicked() {
                self.frontend.request_stats();
            }

            // Right-aligned: transport status
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (status_color, status_text) =
                    status_bar::status_style(self.topics.connection_status);
                ui.colored_label(status_color, status_text);

                if self.settings.paused {
                    ui.colored_label(Color32::YELLOW, "Paused");
                } else if self.topics.connection_status == ConnectionStatus::Connected {
                    ui.colored_label(Color32::GREEN, "Live");
                }
            });
        });
    }
}

impl eframe::App for SensorVisApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_backend_messages();
        self.handle_keyboard_shortcuts(ctx);

        if !self.settings.paused {
            self.topics.refresh(&self.store);
        }

        // Fixed cadence, independent of line arrival
        if !self.topics.backend_stopped {
            ctx.request_repaint_after(self.refresh_interval());
        }

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            self.render_top_bar(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            status_bar::render_status_bar(ui, &self.topics);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let height = plot::panel_height(ui.available_height(), ui.spacing().item_spacing.y);
            egui::ScrollArea::vertical().show(ui, |ui| {
                for sensor in SensorKind::ALL {
                    self.view
                        .render_sensor(ui, self.topics.sensor(sensor), &self.settings, height);
                }
                self.view
                    .render_timing(ui, &self.topics.timings, &self.settings, height);
                self.view
                    .render_processing(ui, &self.topics.processing, height);
            });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.frontend.shutdown();
    }
}
