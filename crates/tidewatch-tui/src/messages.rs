//! Message types passed between the UI loop and the fetch worker.
//!
//! - [`Command`]: requests sent from the UI thread to the worker
//! - [`TelemetryEvent`]: results sent from the worker back to the UI

use tidewatch_core::{DashboardData, Error, Fetch, LatestSnapshot};
use tidewatch_types::{Channel, Feed};

/// Requests sent from the UI thread to the fetch worker.
#[derive(Debug, Clone)]
pub enum Command {
    /// Fetch the combined dashboard snapshot (latest + history).
    FetchDashboard { results: u32 },
    /// Fetch the latest-only snapshot.
    FetchLatest,
    /// Refresh every channel's history feed.
    FetchHistory { results: u32 },
    /// Probe backend liveness.
    CheckHealth,
    /// Stop the worker.
    Shutdown,
}

/// Results sent from the worker back to the UI thread.
///
/// Every fetch command produces exactly one event, success or failure,
/// so the driver's in-flight guard is always released.
#[derive(Debug)]
pub enum TelemetryEvent {
    /// Combined dashboard snapshot arrived.
    DashboardLoaded { data: DashboardData },
    /// Latest-only snapshot arrived.
    LatestLoaded { snapshot: LatestSnapshot },
    /// Per-channel history results. Channels fail independently; one
    /// bad channel must not block the others.
    HistoryLoaded {
        channels: Vec<(Channel, Result<Feed, Error>)>,
    },
    /// A dashboard or latest fetch failed.
    FetchFailed { fetch: Fetch, error: Error },
    /// Health probe finished.
    HealthChecked { healthy: bool, detail: String },
}
