//! Error types for data parsing in tidewatch-types.

use thiserror::Error;

/// Errors that can occur when parsing telemetry identifiers.
///
/// This error type is transport-agnostic and does not include HTTP
/// errors (those belong in tidewatch-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The string does not name a known sensor channel.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),
}

/// Result type alias using tidewatch-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
