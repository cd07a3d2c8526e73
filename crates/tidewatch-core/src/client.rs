//! HTTP client for the telemetry REST API.
//!
//! This module provides a client for the water-quality backend. Every
//! response is a JSON envelope `{success, data, error}`; the client
//! enforces the envelope contract and hands typed payloads to callers.
//! Field values stay as decimal strings; numeric coercion is the
//! series projector's job.
//!
//! # Example
//!
//! ```no_run
//! use tidewatch_core::client::TelemetryClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TelemetryClient::new("http://localhost:3000/api")?;
//!
//! // Combined snapshot for the initial load
//! let data = client.dashboard(100).await?;
//! println!("elevation readings: {}", data.history.elevation.map(|f| f.len()).unwrap_or(0));
//!
//! // Lightweight periodic refresh
//! let latest = client.latest().await?;
//! println!("has temperature: {}", latest.temperature.is_some());
//!
//! Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tidewatch_types::{Channel, Feed, Reading};

use crate::error::{Error, Result};

/// Default result-count bound for dashboard and history requests.
pub const DEFAULT_RESULTS: u32 = 100;

/// Base URL used for local development when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Time bound for the combined dashboard and per-channel history requests.
pub const DASHBOARD_TIMEOUT: Duration = Duration::from_secs(15);

/// Time bound for the lightweight latest and health requests.
pub const LATEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the telemetry API.
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    client: Client,
    base_url: String,
}

// ==========================================================================
// Wire types
// ==========================================================================

/// JSON envelope wrapping every API response.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl<T> Envelope<T> {
    /// Enforce the envelope contract: `success == true` and a payload present.
    fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(Error::Protocol {
                message: self
                    .error
                    .unwrap_or_else(|| "backend reported failure".to_string()),
            });
        }
        self.data.ok_or_else(|| Error::Protocol {
            message: "missing data payload".to_string(),
        })
    }
}

/// Latest reading per channel, as served by `/latest` and inside `/dashboard`.
///
/// A channel the backend has no data for is simply absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestSnapshot {
    #[serde(default)]
    pub elevation: Option<Reading>,
    #[serde(default)]
    pub temperature: Option<Reading>,
    #[serde(default)]
    pub ec: Option<Reading>,
}

/// Bounded history per channel inside `/dashboard`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistorySnapshot {
    #[serde(default)]
    pub elevation: Option<Feed>,
    #[serde(default)]
    pub temperature: Option<Feed>,
    #[serde(default)]
    pub ec: Option<Feed>,
}

/// Combined payload of `/dashboard/{count}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub latest: LatestSnapshot,
    #[serde(default)]
    pub history: HistorySnapshot,
}

/// Liveness payload of `/health`. The backend's shape varies between
/// deployments, so every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub uptime: Option<f64>,
}

// ==========================================================================
// TelemetryClient implementation
// ==========================================================================

impl TelemetryClient {
    /// Create a new telemetry client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Absolute base URL of the API (e.g. "http://localhost:3000/api")
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Self::validate_base_url(base_url)?;

        let client = Client::builder().build().map_err(|e| Error::Transport {
            status: None,
            message: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = Self::validate_base_url(base_url)?;
        Ok(Self { client, base_url })
    }

    /// Normalize the base URL (trim trailing slash) and reject anything
    /// that is not absolute http(s). A terminal client has no document
    /// origin to resolve a relative base against.
    fn validate_base_url(base_url: &str) -> Result<String> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        Ok(base_url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Combined snapshot: latest values plus bounded history for every
    /// channel. `results` bounds the per-channel feed length.
    pub async fn dashboard(&self, results: u32) -> Result<DashboardData> {
        let url = format!("{}/dashboard/{}", self.base_url, results);
        self.get(&url, "dashboard", DASHBOARD_TIMEOUT).await
    }

    /// Latest-only snapshot of the three channels.
    pub async fn latest(&self) -> Result<LatestSnapshot> {
        let url = format!("{}/latest", self.base_url);
        self.get(&url, "latest", LATEST_TIMEOUT).await
    }

    /// Bounded history feed for one channel.
    pub async fn history(&self, channel: Channel, results: u32) -> Result<Feed> {
        let url = format!(
            "{}/history/{}/{}",
            self.base_url,
            channel.api_segment(),
            results
        );
        self.get(&url, "history", DASHBOARD_TIMEOUT).await
    }

    /// Backend liveness probe.
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        self.get(&url, "health", LATEST_TIMEOUT).await
    }

    /// Check whether the backend answers its health endpoint.
    pub async fn is_reachable(&self) -> bool {
        self.health().await.is_ok()
    }

    // ======================================================================
    // Internal HTTP helpers
    // ======================================================================

    async fn get<T: serde::de::DeserializeOwned + Default>(
        &self,
        url: &str,
        operation: &str,
        timeout: Duration,
    ) -> Result<T> {
        debug!(url, operation, ?timeout, "GET");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, operation, timeout))?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the body-level error message when the backend sent one.
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());

            return Err(Error::Transport {
                status: Some(status.as_u16()),
                message,
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| Error::from_reqwest(e, operation, timeout))?;

        envelope.into_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_types::FieldSlot;

    #[test]
    fn test_client_creation() {
        let client = TelemetryClient::new("http://localhost:3000/api");
        assert!(client.is_ok());

        let client = client.unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn test_client_normalizes_url() {
        let client = TelemetryClient::new("http://localhost:3000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn test_client_rejects_relative_base() {
        let result = TelemetryClient::new("/api");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));

        let result = TelemetryClient::new("localhost:3000/api");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_envelope_success_with_data() {
        let envelope: Envelope<LatestSnapshot> = serde_json::from_str(
            r#"{"success": true, "data": {"elevation": {"created_at": "2024-03-01T06:30:00Z", "field1": "12.34"}}}"#,
        )
        .unwrap();

        let snapshot = envelope.into_data().unwrap();
        let elevation = snapshot.elevation.unwrap();
        assert_eq!(elevation.field(FieldSlot::Field1), Some("12.34"));
        assert!(snapshot.temperature.is_none());
        assert!(snapshot.ec.is_none());
    }

    #[test]
    fn test_envelope_failure_carries_backend_message() {
        let envelope: Envelope<LatestSnapshot> =
            serde_json::from_str(r#"{"success": false, "error": "sensor offline"}"#).unwrap();

        match envelope.into_data() {
            Err(Error::Protocol { message }) => assert_eq!(message, "sensor offline"),
            other => panic!("expected Protocol error, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope_success_without_data_is_protocol_error() {
        let envelope: Envelope<LatestSnapshot> =
            serde_json::from_str(r#"{"success": true}"#).unwrap();

        assert!(matches!(
            envelope.into_data(),
            Err(Error::Protocol { .. })
        ));
    }

    #[test]
    fn test_dashboard_payload_decodes() {
        let envelope: Envelope<DashboardData> = serde_json::from_str(
            r#"{
                "success": true,
                "data": {
                    "latest": {
                        "elevation": {"created_at": "2024-03-01T06:30:00Z", "field1": "12.34"},
                        "ec": {"created_at": "2024-03-01T06:30:00Z", "field1": "31.2", "field2": "450", "field3": "48.1"}
                    },
                    "history": {
                        "elevation": {"feeds": [
                            {"created_at": "2024-03-01T06:00:00Z", "field1": "12.30"},
                            {"created_at": "2024-03-01T06:30:00Z", "field1": "12.34"}
                        ]}
                    }
                }
            }"#,
        )
        .unwrap();

        let data = envelope.into_data().unwrap();
        assert!(data.latest.elevation.is_some());
        assert!(data.latest.temperature.is_none());
        assert_eq!(data.history.elevation.as_ref().map(Feed::len), Some(2));
        assert!(data.history.ec.is_none());
    }
}
