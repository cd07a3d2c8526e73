//! tidewatch: live terminal dashboard for water-quality telemetry.
//!
//! Polls the telemetry REST API, renders time-series charts for water
//! elevation, temperature, and the conductivity bundle (salinity, TDS,
//! EC), tracks connection health with exponential reconnect backoff,
//! and exports on-screen statistics to CSV.

mod app;
mod charts;
mod config;
mod export;
mod input;
mod messages;
mod ui;
mod worker;

use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tidewatch_core::TelemetryClient;

use crate::app::App;
use crate::config::Config;
use crate::messages::{Command, TelemetryEvent};
use crate::worker::FetchWorker;

#[derive(Parser)]
#[command(name = "tidewatch")]
#[command(author, version, about = "Live terminal dashboard for water-quality telemetry", long_about = None)]
struct Cli {
    /// Base URL of the telemetry API
    #[arg(long)]
    api_url: Option<String>,

    /// Number of history readings to request per channel
    #[arg(long)]
    results: Option<u32>,

    /// Seconds between latest-only refreshes
    #[arg(long)]
    latest_interval_secs: Option<u64>,

    /// Seconds between history/chart refreshes
    #[arg(long)]
    history_interval_secs: Option<u64>,

    /// Directory CSV exports are written to
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Write logs to this file (the dashboard owns the terminal)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(results) = cli.results {
        config.results = results;
    }
    if let Some(secs) = cli.latest_interval_secs {
        config.latest_interval_secs = secs;
    }
    if let Some(secs) = cli.history_interval_secs {
        config.history_interval_secs = secs;
    }
    if let Some(export_dir) = cli.export_dir {
        config.export_dir = Some(export_dir);
    }
    if let Some(log_file) = cli.log_file {
        config.log_file = Some(log_file);
    }

    init_logging(config.log_file.as_deref())?;
    info!(api_url = %config.api_url, results = config.results, "starting tidewatch");

    let client = TelemetryClient::new(&config.api_url)?;

    // Communication channels between the UI loop and the fetch worker
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(32);
    let (event_tx, mut event_rx) = mpsc::channel::<TelemetryEvent>(32);
    let cancel = CancellationToken::new();

    let worker = FetchWorker::new(cmd_rx, event_tx, client, cancel.clone());
    let worker_handle = tokio::spawn(worker.run());

    let mut app = App::new(&config);
    let mut terminal = setup_terminal()?;

    let result = run_event_loop(&mut terminal, &mut app, &cmd_tx, &mut event_rx).await;

    // Shutdown ordering: stop the worker, release chart state, then
    // give the terminal back whatever happened in the loop.
    let _ = cmd_tx.try_send(Command::Shutdown);
    cancel.cancel();
    app.teardown();
    restore_terminal()?;
    let _ = worker_handle.await;

    result
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Main event loop: render, handle input, drain worker events, and let
/// the refresh driver schedule fetches.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    cmd_tx: &mpsc::Sender<Command>,
    event_rx: &mut mpsc::Receiver<TelemetryEvent>,
) -> Result<()> {
    // Initial full-dashboard load
    let _ = cmd_tx.try_send(app.start(Instant::now()));

    while !app.should_quit {
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for keyboard events with a timeout so timers keep ticking
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let action = input::handle_key(key.code);
            if let Some(cmd) = input::apply_action(app, action, Instant::now()) {
                let _ = cmd_tx.try_send(cmd);
            }
        }

        // Non-blocking drain of worker events
        while let Ok(event) = event_rx.try_recv() {
            app.handle_event(event, Instant::now());
        }

        // Due periodic refreshes and reconnect attempts
        if let Some(cmd) = app.tick(Instant::now()) {
            let _ = cmd_tx.try_send(cmd);
        }
    }

    Ok(())
}

/// Initialize tracing to a log file. Without a file, logging stays off:
/// the dashboard owns stdout.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
