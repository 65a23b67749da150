//! Sensor Telemetry Visualizer - Main Entry Point
//!
//! Reads the sensor hub's serial stream (or a replay of it) and shows the
//! readings live, or logs ingestion statistics when run headless.

use anyhow::Context;
use clap::Parser;
use sensorvis_rs::{
    backend::{FrontendReceiver, IngestBackend, LineSource, ReaderLineSource, SerialLineSource},
    config::{self, AppConfig},
    frontend::SensorVisApp,
    headless,
    store::SharedStore,
    TelemetryStore,
};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often headless mode logs statistics
const HEADLESS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// How long to wait for the backend thread after the window closes
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Live plots for the MQ-2 / light / DHT sensor hub
#[derive(Parser, Debug)]
#[command(name = "sensorvis-rs", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the platform data directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial port to open
    #[arg(long)]
    port: Option<String>,

    /// Baud rate
    #[arg(long)]
    baud: Option<u32>,

    /// Replay lines from a capture file instead of the serial port
    #[arg(long, conflicts_with = "stdin")]
    replay: Option<PathBuf>,

    /// Read lines from standard input
    #[arg(long)]
    stdin: bool,

    /// Use the synthetic sensor hub
    #[cfg(feature = "mock-source")]
    #[arg(long, conflicts_with_all = ["replay", "stdin"])]
    mock: bool,

    /// Also write daily-rolling log files to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Run without a window and log statistics periodically
    #[arg(long)]
    headless: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The log directory may come from the config file, so peek at it before
    // the subscriber exists; load again afterwards to get its diagnostics
    let config_path = cli.config.clone().or_else(config::default_config_path);
    let mut config = config_path
        .as_deref()
        .and_then(|path| AppConfig::load(path).ok())
        .unwrap_or_default();
    apply_overrides(&mut config, &cli);

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&config)?;

    tracing::info!("Starting Sensor Telemetry Visualizer");
    if let Some(path) = &config_path {
        config = AppConfig::load_or_default(path);
        apply_overrides(&mut config, &cli);
    }

    let source = open_source(&cli, &config)?;
    let store = TelemetryStore::shared();

    let (backend, frontend) = IngestBackend::new(config.clone(), store.clone(), source);
    let stop = backend.stop_handle();
    let backend_handle = std::thread::Builder::new()
        .name("ingest-worker".into())
        .spawn(move || backend.run())
        .context("Failed to spawn ingest worker")?;

    if cli.headless {
        return run_headless(frontend, &store, backend_handle);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.ui.window_width, config.ui.window_height])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Sensor Telemetry Visualizer"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Sensor Telemetry Visualizer",
        native_options,
        Box::new(move |cc| Ok(Box::new(SensorVisApp::new(cc, frontend, store, config)))),
    );

    // Signal backend to stop and wait briefly for it
    tracing::info!("Shutting down...");
    stop.store(false, Ordering::SeqCst);
    let deadline = Instant::now() + SHUTDOWN_GRACE;
    while !backend_handle.is_finished() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    if backend_handle.is_finished() {
        if backend_handle.join().is_err() {
            tracing::error!("Ingest worker panicked");
        }
    } else {
        // A blocking stdin read cannot be interrupted
        tracing::warn!("Ingest worker did not stop within {:?}", SHUTDOWN_GRACE);
    }

    result.map_err(|e| anyhow::anyhow!("UI error: {}", e))
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(port) = &cli.port {
        config.transport.port = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.transport.baud_rate = baud;
    }
    if let Some(dir) = &cli.log_dir {
        config.logging.file_dir = Some(dir.clone());
    }
}

fn init_logging(
    config: &AppConfig,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let (file_layer, guard) = match &config.logging.file_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {:?}", dir))?;
            let appender = tracing_appender::rolling::daily(dir, "sensorvis.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sensorvis_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

fn open_source(cli: &Cli, config: &AppConfig) -> anyhow::Result<Box<dyn LineSource>> {
    #[cfg(feature = "mock-source")]
    {
        use sensorvis_rs::backend::{MockLineSource, MockSourceConfig};
        if cli.mock {
            return Ok(Box::new(MockLineSource::new(MockSourceConfig::default())));
        }
    }

    if let Some(path) = &cli.replay {
        let source = ReaderLineSource::open(path)
            .with_context(|| format!("Cannot replay {:?}", path))?;
        return Ok(Box::new(source));
    }

    if cli.stdin {
        return Ok(Box::new(ReaderLineSource::stdin()));
    }

    let source = SerialLineSource::open(&config.transport).with_context(|| {
        let ports = SerialLineSource::available_ports();
        if ports.is_empty() {
            format!("Cannot open {}; no serial ports found", config.transport.port)
        } else {
            format!(
                "Cannot open {}; available ports: {}",
                config.transport.port,
                ports.join(", ")
            )
        }
    })?;
    Ok(Box::new(source))
}

fn run_headless(
    frontend: FrontendReceiver,
    store: &SharedStore,
    backend_handle: JoinHandle<()>,
) -> anyhow::Result<()> {
    let outcome = headless::monitor(&frontend, store, HEADLESS_LOG_INTERVAL);
    if backend_handle.join().is_err() {
        anyhow::bail!("Ingest worker panicked");
    }
    outcome.context("Headless ingestion stopped")?;
    Ok(())
}
