//! Core types for water-quality telemetry data.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;

/// One sensor channel served by the telemetry backend.
///
/// The conductivity channel is a bundle: its readings carry salinity,
/// TDS, and electrical conductivity in field1/field2/field3 of the
/// same record.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new channels
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Channel {
    /// Water surface elevation.
    Elevation,
    /// Water temperature.
    Temperature,
    /// Conductivity bundle (salinity, TDS, EC).
    Conductivity,
}

impl Channel {
    /// All channels, in dashboard order.
    pub const ALL: [Channel; 3] = [
        Channel::Elevation,
        Channel::Temperature,
        Channel::Conductivity,
    ];

    /// Path segment used by the history endpoint.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidewatch_types::Channel;
    ///
    /// assert_eq!(Channel::Elevation.api_segment(), "elevation");
    /// assert_eq!(Channel::Conductivity.api_segment(), "ec");
    /// ```
    #[must_use]
    pub fn api_segment(self) -> &'static str {
        match self {
            Channel::Elevation => "elevation",
            Channel::Temperature => "temperature",
            Channel::Conductivity => "ec",
        }
    }

}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_segment())
    }
}

impl FromStr for Channel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "elevation" => Ok(Channel::Elevation),
            "temperature" => Ok(Channel::Temperature),
            "ec" | "conductivity" => Ok(Channel::Conductivity),
            other => Err(ParseError::UnknownChannel(other.to_string())),
        }
    }
}

/// Which field of a [`Reading`] a projected series draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSlot {
    Field1,
    Field2,
    Field3,
}

/// One timestamped sensor sample as served by the backend.
///
/// Field values stay as decimal strings; numeric coercion happens at
/// projection time, not here. A JSON `null` and a missing key both
/// deserialize to `None`; an absent field is "no value", never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the sample was taken.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub field1: Option<String>,
    #[serde(default)]
    pub field2: Option<String>,
    #[serde(default)]
    pub field3: Option<String>,
}

impl Reading {
    /// Raw decimal value of the given field, if present.
    #[must_use]
    pub fn field(&self, slot: FieldSlot) -> Option<&str> {
        match slot {
            FieldSlot::Field1 => self.field1.as_deref(),
            FieldSlot::Field2 => self.field2.as_deref(),
            FieldSlot::Field3 => self.field3.as_deref(),
        }
    }
}

/// Ordered readings for one channel, timestamp ascending as returned by
/// the backend. The ordering is the backend's contract; feeds are never
/// re-sorted locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    #[serde(default)]
    pub feeds: Vec<Reading>,
}

impl Feed {
    /// Number of readings in the feed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    /// Whether the feed holds no readings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Most recent reading (last in backend order).
    #[must_use]
    pub fn latest(&self) -> Option<&Reading> {
        self.feeds.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_api_segments() {
        assert_eq!(Channel::Elevation.api_segment(), "elevation");
        assert_eq!(Channel::Temperature.api_segment(), "temperature");
        assert_eq!(Channel::Conductivity.api_segment(), "ec");
    }

    #[test]
    fn channel_from_str() {
        assert_eq!("elevation".parse::<Channel>().unwrap(), Channel::Elevation);
        assert_eq!("EC".parse::<Channel>().unwrap(), Channel::Conductivity);
        assert_eq!(
            "conductivity".parse::<Channel>().unwrap(),
            Channel::Conductivity
        );
        assert!(matches!(
            "salinity".parse::<Channel>(),
            Err(ParseError::UnknownChannel(_))
        ));
    }

    #[test]
    fn reading_null_and_missing_fields_are_both_absent() {
        let with_null: Reading = serde_json::from_str(
            r#"{"created_at": "2024-03-01T06:30:00Z", "field1": "12.34", "field2": null}"#,
        )
        .unwrap();

        assert_eq!(with_null.field(FieldSlot::Field1), Some("12.34"));
        assert_eq!(with_null.field(FieldSlot::Field2), None);
        // field3 was missing entirely
        assert_eq!(with_null.field(FieldSlot::Field3), None);
    }

    #[test]
    fn reading_requires_timestamp() {
        let result = serde_json::from_str::<Reading>(r#"{"field1": "1.0"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn feed_preserves_backend_order() {
        let feed: Feed = serde_json::from_str(
            r#"{"feeds": [
                {"created_at": "2024-03-01T06:00:00Z", "field1": "1.0"},
                {"created_at": "2024-03-01T06:10:00Z", "field1": "2.0"},
                {"created_at": "2024-03-01T06:20:00Z", "field1": "3.0"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(feed.len(), 3);
        assert_eq!(feed.feeds[0].field1.as_deref(), Some("1.0"));
        assert_eq!(feed.latest().unwrap().field1.as_deref(), Some("3.0"));
    }

    #[test]
    fn empty_feed() {
        let feed: Feed = serde_json::from_str(r#"{"feeds": []}"#).unwrap();
        assert!(feed.is_empty());
        assert!(feed.latest().is_none());

        // A missing feeds key is an empty feed, not an error.
        let feed: Feed = serde_json::from_str(r#"{}"#).unwrap();
        assert!(feed.is_empty());
    }
}
