//! Shared data model for tidewatch water-quality telemetry.
//!
//! This crate provides the wire-level types served by the telemetry
//! backend: sensor channels, timestamped readings, and history feeds.
//! It contains no I/O; the HTTP client and projection logic live in
//! `tidewatch-core`.
//!
//! # Example
//!
//! ```
//! use tidewatch_types::{Channel, FieldSlot, Reading};
//!
//! let json = r#"{"created_at": "2024-03-01T06:30:00Z", "field1": "12.34"}"#;
//! let reading: Reading = serde_json::from_str(json).unwrap();
//!
//! assert_eq!(reading.field(FieldSlot::Field1), Some("12.34"));
//! assert_eq!(reading.field(FieldSlot::Field2), None);
//! assert_eq!(Channel::Conductivity.api_segment(), "ec");
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{Channel, Feed, FieldSlot, Reading};
