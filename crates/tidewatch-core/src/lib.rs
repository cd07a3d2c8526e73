//! Core engine for the tidewatch water-quality dashboard.
//!
//! This crate contains everything between the HTTP wire and the
//! terminal: fetching, validation, projection, and refresh scheduling.
//! It performs no rendering; the dashboard binary in `tidewatch-tui`
//! drives it.
//!
//! # Architecture
//!
//! - [`client`]: HTTP client for the telemetry REST API. Validates the
//!   `{success, data, error}` envelope and enforces per-request time
//!   bounds (15 s for dashboard/history, 10 s for latest/health).
//! - [`series`]: projects history feeds into chart-ready series.
//!   Absent or malformed values become explicit gaps, never zeros, and
//!   statistics are computed over present values only.
//! - [`driver`]: the refresh/retry state machine. Owns connection
//!   state, the periodic cadences, the single in-flight guard, and the
//!   reconnect schedule. Deterministic over caller-supplied instants.
//! - [`backoff`]: the capped-doubling reconnect delay sequence.
//!
//! # Quick Start
//!
//! ```no_run
//! use tidewatch_core::{TelemetryClient, project};
//! use tidewatch_types::FieldSlot;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TelemetryClient::new("http://localhost:3000/api")?;
//!
//!     let data = client.dashboard(100).await?;
//!     if let Some(feed) = &data.history.elevation {
//!         let series = project(feed, FieldSlot::Field1);
//!         if let Some(stats) = series.stats() {
//!             println!("elevation avg: {:.2} m over {} readings", stats.avg, stats.count);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod backoff;
pub mod client;
pub mod driver;
pub mod error;
pub mod series;

pub use backoff::{BackoffPolicy, RetryState};
pub use client::{
    DashboardData, HealthStatus, HistorySnapshot, LatestSnapshot, TelemetryClient, DEFAULT_BASE_URL,
    DEFAULT_RESULTS,
};
pub use driver::{ConnectionState, DriverConfig, Fetch, RefreshDriver};
pub use error::{Error, Result};
pub use series::{project, project_conductivity, Series, SeriesStats};
