//! Series projection and display statistics.
//!
//! Converts history feeds into chart-ready label/value series. A field
//! that is absent or fails numeric parsing becomes an explicit gap
//! (`None`) so charts render a break instead of a false zero.

use time::OffsetDateTime;

use tidewatch_types::{Feed, FieldSlot};

/// Timestamp label format shown on chart axes, e.g. `Mar 01 06:30`.
const LABEL_FORMAT: &str = "[month repr:short] [day] [hour]:[minute]";

/// A chart-ready projection of one feed field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    /// Human-formatted timestamps, one per source reading.
    pub labels: Vec<String>,
    /// Parsed values in source order; `None` marks a gap.
    pub values: Vec<Option<f64>>,
}

impl Series {
    /// Number of points (present values and gaps).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series holds no points at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Statistics over the present values only, in held order.
    ///
    /// Returns `None` for an empty or all-gap series; "no statistics
    /// available" is distinct from a row of zeros.
    #[must_use]
    pub fn stats(&self) -> Option<SeriesStats> {
        let mut count = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut latest = 0.0;

        for value in self.values.iter().flatten() {
            count += 1;
            min = min.min(*value);
            max = max.max(*value);
            sum += *value;
            latest = *value;
        }

        if count == 0 {
            return None;
        }

        Some(SeriesStats {
            count,
            min,
            max,
            avg: sum / count as f64,
            latest,
        })
    }
}

/// Display statistics over the present values of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    /// Number of present (non-gap) values.
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Last present value in held order.
    pub latest: f64,
}

/// Project one field of a feed into a series, preserving input order.
/// The source feed is not modified.
#[must_use]
pub fn project(feed: &Feed, slot: FieldSlot) -> Series {
    let mut labels = Vec::with_capacity(feed.feeds.len());
    let mut values = Vec::with_capacity(feed.feeds.len());

    for reading in &feed.feeds {
        labels.push(format_label(&reading.created_at));
        values.push(parse_value(reading.field(slot)));
    }

    Series { labels, values }
}

/// Fan the combined conductivity feed out into three independent series:
/// salinity (field1), TDS (field2), and conductivity (field3), read from
/// the same records.
#[must_use]
pub fn project_conductivity(feed: &Feed) -> (Series, Series, Series) {
    (
        project(feed, FieldSlot::Field1),
        project(feed, FieldSlot::Field2),
        project(feed, FieldSlot::Field3),
    )
}

/// Parse a decimal field into a value, or a gap when absent or malformed.
fn parse_value(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Format a timestamp for chart axis labels.
fn format_label(timestamp: &OffsetDateTime) -> String {
    let format = time::format_description::parse(LABEL_FORMAT).unwrap();
    timestamp.format(&format).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_types::Reading;

    fn reading(secs: i64, f1: Option<&str>, f2: Option<&str>, f3: Option<&str>) -> Reading {
        Reading {
            created_at: OffsetDateTime::from_unix_timestamp(secs).unwrap(),
            field1: f1.map(String::from),
            field2: f2.map(String::from),
            field3: f3.map(String::from),
        }
    }

    fn feed(readings: Vec<Reading>) -> Feed {
        Feed { feeds: readings }
    }

    #[test]
    fn test_projection_preserves_gaps() {
        let feed = feed(vec![
            reading(0, Some("1.5"), None, None),
            reading(60, None, None, None),
            reading(120, Some("abc"), None, None),
            reading(180, Some("2.5"), None, None),
        ]);

        let series = project(&feed, FieldSlot::Field1);

        assert_eq!(series.len(), 4);
        assert_eq!(
            series.values,
            vec![Some(1.5), None, None, Some(2.5)],
            "absent and malformed fields must project to gaps, not zero"
        );
    }

    #[test]
    fn test_non_finite_values_are_gaps() {
        let feed = feed(vec![
            reading(0, Some("inf"), None, None),
            reading(60, Some("NaN"), None, None),
        ]);

        let series = project(&feed, FieldSlot::Field1);
        assert_eq!(series.values, vec![None, None]);
    }

    #[test]
    fn test_stats_exclude_gaps() {
        let feed = feed(vec![
            reading(0, Some("1.0"), None, None),
            reading(60, None, None, None),
            reading(120, Some("3.0"), None, None),
            reading(180, Some("2.0"), None, None),
        ]);

        let series = project(&feed, FieldSlot::Field1);
        let stats = series.stats().unwrap();

        // count equals the number of non-null original fields
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.avg, 2.0);
        assert_eq!(stats.latest, 2.0);
    }

    #[test]
    fn test_stats_empty_and_all_gap_series() {
        assert!(Series::default().stats().is_none());

        let all_gaps = Series {
            labels: vec!["a".into(), "b".into()],
            values: vec![None, None],
        };
        assert!(all_gaps.stats().is_none());
    }

    #[test]
    fn test_conductivity_fan_out() {
        let feed = feed(vec![
            reading(0, Some("31.2"), Some("450"), Some("48.1")),
            reading(60, Some("31.4"), None, Some("48.3")),
        ]);

        let (salinity, tds, conductivity) = project_conductivity(&feed);

        assert_eq!(salinity.values, vec![Some(31.2), Some(31.4)]);
        assert_eq!(tds.values, vec![Some(450.0), None]);
        assert_eq!(conductivity.values, vec![Some(48.1), Some(48.3)]);

        // Same records, same labels across the bundle.
        assert_eq!(salinity.labels, tds.labels);
        assert_eq!(salinity.labels, conductivity.labels);
    }

    #[test]
    fn test_label_format() {
        let feed = feed(vec![reading(0, Some("1.0"), None, None)]);
        let series = project(&feed, FieldSlot::Field1);
        assert_eq!(series.labels[0], "Jan 01 00:00");
    }

    #[test]
    fn test_projection_does_not_consume_feed() {
        let source = feed(vec![reading(0, Some("1.0"), None, None)]);
        let _ = project(&source, FieldSlot::Field1);
        assert_eq!(source.len(), 1);
    }
}
