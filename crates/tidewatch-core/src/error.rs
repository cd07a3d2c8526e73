//! Error types for tidewatch-core.
//!
//! The taxonomy mirrors how failures propagate through the dashboard:
//!
//! | Variant | Meaning | Handling |
//! |---------|---------|----------|
//! | [`Error::Timeout`] | Request exceeded its time bound | Counts as a connection failure; backoff |
//! | [`Error::Transport`] | Network-level failure or non-2xx status | Counts as a connection failure; backoff |
//! | [`Error::Protocol`] | Malformed body, `success == false`, or missing payload | Counts as a connection failure; backoff |
//! | [`Error::Render`] | Chart surface rejected an update | Logged per chart, never fatal |
//! | [`Error::InvalidUrl`] | Bad base URL at construction | Fix configuration and restart |
//!
//! The refresh driver is the sole consumer that turns these into
//! user-visible connection state; everything else only logs.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while fetching or displaying telemetry data.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The request exceeded its time bound and was aborted.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The time bound that was exceeded.
        duration: Duration,
    },

    /// Network-level failure or non-success transport status.
    #[error("Transport error: {message}")]
    Transport {
        /// HTTP status, when the failure happened after a response arrived.
        status: Option<u16>,
        /// Description of the failure.
        message: String,
    },

    /// The body violated the API envelope contract.
    #[error("Protocol error: {message}")]
    Protocol {
        /// The body-level error message, or a description of the violation.
        message: String,
    },

    /// The chart surface rejected an update. Never fatal; one bad chart
    /// must not block the others.
    #[error("Render error on chart '{chart}': {message}")]
    Render { chart: String, message: String },

    /// Base URL is not an absolute http(s) URL.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias using tidewatch-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this failure was the request deadline firing.
    ///
    /// Downstream handling is identical to a network failure; the
    /// distinction only matters for logging.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Classify a reqwest failure for `operation` bounded by `duration`.
    pub(crate) fn from_reqwest(err: reqwest::Error, operation: &str, duration: Duration) -> Self {
        if err.is_timeout() {
            Error::Timeout {
                operation: operation.to_string(),
                duration,
            }
        } else if err.is_decode() {
            Error::Protocol {
                message: err.to_string(),
            }
        } else {
            Error::Transport {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}
