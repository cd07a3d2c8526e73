//! Background fetch worker.
//!
//! The worker owns the [`TelemetryClient`] and performs all network I/O
//! off the UI loop, keeping rendering responsive. It communicates with
//! the UI thread via channels:
//!
//! - Receives [`Command`]s describing which fetch to perform
//! - Sends [`TelemetryEvent`]s back with the outcome
//!
//! The worker never decides *when* to fetch; that is the refresh
//! driver's job. Request timeouts are enforced inside the client; the
//! cancellation token only covers shutdown, cancelling whatever is
//! still in flight at teardown.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tidewatch_core::{Fetch, TelemetryClient};
use tidewatch_types::Channel;

use crate::messages::{Command, TelemetryEvent};

/// Background worker that handles telemetry fetches.
pub struct FetchWorker {
    /// Receiver for commands from the UI thread.
    command_rx: mpsc::Receiver<Command>,
    /// Sender for events back to the UI thread.
    event_tx: mpsc::Sender<TelemetryEvent>,
    /// HTTP client for the telemetry API.
    client: TelemetryClient,
    /// Cancelled at teardown; aborts anything still in flight.
    cancel: CancellationToken,
}

impl FetchWorker {
    /// Create a new fetch worker.
    pub fn new(
        command_rx: mpsc::Receiver<Command>,
        event_tx: mpsc::Sender<TelemetryEvent>,
        client: TelemetryClient,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            command_rx,
            event_tx,
            client,
            cancel,
        }
    }

    /// Run the worker's main loop until shutdown.
    pub async fn run(mut self) {
        info!(base_url = self.client.base_url(), "fetch worker started");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("fetch worker cancelled");
                    break;
                }
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(Command::Shutdown) | None => {
                            info!("fetch worker shutting down");
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd).await,
                    }
                }
            }
        }

        info!("fetch worker stopped");
    }

    /// Handle a single command from the UI.
    async fn handle_command(&self, cmd: Command) {
        debug!(?cmd, "handling command");

        match cmd {
            Command::FetchDashboard { results } => {
                let event = match self.client.dashboard(results).await {
                    Ok(data) => TelemetryEvent::DashboardLoaded { data },
                    Err(error) => {
                        warn!(%error, "dashboard fetch failed");
                        TelemetryEvent::FetchFailed {
                            fetch: Fetch::Dashboard,
                            error,
                        }
                    }
                };
                self.send(event).await;
            }
            Command::FetchLatest => {
                let event = match self.client.latest().await {
                    Ok(snapshot) => TelemetryEvent::LatestLoaded { snapshot },
                    Err(error) => {
                        warn!(%error, "latest fetch failed");
                        TelemetryEvent::FetchFailed {
                            fetch: Fetch::Latest,
                            error,
                        }
                    }
                };
                self.send(event).await;
            }
            Command::FetchHistory { results } => {
                // The three channels are independent resources; fetch
                // them concurrently and let each fail on its own.
                let (elevation, temperature, ec) = tokio::join!(
                    self.client.history(Channel::Elevation, results),
                    self.client.history(Channel::Temperature, results),
                    self.client.history(Channel::Conductivity, results),
                );

                let channels = vec![
                    (Channel::Elevation, elevation),
                    (Channel::Temperature, temperature),
                    (Channel::Conductivity, ec),
                ];

                for (channel, result) in &channels {
                    if let Err(error) = result {
                        warn!(%channel, %error, "history fetch failed");
                    }
                }

                self.send(TelemetryEvent::HistoryLoaded { channels }).await;
            }
            Command::CheckHealth => {
                let event = match self.client.health().await {
                    Ok(health) => TelemetryEvent::HealthChecked {
                        healthy: true,
                        detail: health.status.unwrap_or_else(|| "ok".to_string()),
                    },
                    Err(error) => {
                        warn!(%error, "health check failed");
                        TelemetryEvent::HealthChecked {
                            healthy: false,
                            detail: error.to_string(),
                        }
                    }
                };
                self.send(event).await;
            }
            Command::Shutdown => {
                // Handled in run() loop
            }
        }
    }

    async fn send(&self, event: TelemetryEvent) {
        if self.event_tx.send(event).await.is_err() {
            warn!("event channel closed; UI is gone");
        }
    }
}
