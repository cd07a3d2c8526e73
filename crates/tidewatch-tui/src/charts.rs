//! Chart registry for the dashboard.
//!
//! [`ChartTable`] is the render surface: it holds the series each named
//! chart currently displays and answers statistics queries over exactly
//! that data. It is mutated only from the UI loop.

use std::collections::HashMap;

use ratatui::style::Color;

use tidewatch_core::{Error, Series, SeriesStats};

/// Named chart instances on the dashboard.
///
/// The conductivity bundle contributes three charts from one feed;
/// elevation and temperature contribute one each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartId {
    Elevation,
    Temperature,
    Salinity,
    Tds,
    Conductivity,
}

impl ChartId {
    /// All charts, in display and export order.
    pub const ALL: [ChartId; 5] = [
        ChartId::Elevation,
        ChartId::Temperature,
        ChartId::Salinity,
        ChartId::Tds,
        ChartId::Conductivity,
    ];

    /// Chart title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            ChartId::Elevation => "Elevation",
            ChartId::Temperature => "Temperature",
            ChartId::Salinity => "Salinity",
            ChartId::Tds => "TDS",
            ChartId::Conductivity => "Conductivity",
        }
    }

    /// Measurement unit.
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            ChartId::Elevation => "m",
            ChartId::Temperature => "°C",
            ChartId::Salinity => "ppt",
            ChartId::Tds => "ppm",
            ChartId::Conductivity => "µS/cm",
        }
    }

    /// Stable key used in logs and CSV export rows.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            ChartId::Elevation => "elevation",
            ChartId::Temperature => "temperature",
            ChartId::Salinity => "salinity",
            ChartId::Tds => "tds",
            ChartId::Conductivity => "conductivity",
        }
    }

    /// Decimal places for the current-value card.
    #[must_use]
    pub fn precision(self) -> usize {
        match self {
            ChartId::Elevation => 2,
            ChartId::Temperature | ChartId::Salinity | ChartId::Conductivity => 1,
            ChartId::Tds => 0,
        }
    }

    /// Accent color for the chart line and card border.
    #[must_use]
    pub fn color(self) -> Color {
        match self {
            ChartId::Elevation => Color::Blue,
            ChartId::Temperature => Color::Red,
            ChartId::Salinity => Color::Magenta,
            ChartId::Tds => Color::Yellow,
            ChartId::Conductivity => Color::Green,
        }
    }
}

/// Render-surface state: the series each chart currently displays.
#[derive(Debug, Default)]
pub struct ChartTable {
    charts: HashMap<ChartId, Series>,
}

impl ChartTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a chart's series. Labels and values must line up; a
    /// mismatched series is rejected so a broken projection cannot
    /// desynchronize the axis from the data.
    pub fn update(&mut self, id: ChartId, series: Series) -> Result<(), Error> {
        if series.labels.len() != series.values.len() {
            return Err(Error::Render {
                chart: id.key().to_string(),
                message: format!(
                    "{} labels but {} values",
                    series.labels.len(),
                    series.values.len()
                ),
            });
        }
        self.charts.insert(id, series);
        Ok(())
    }

    /// Series currently displayed by a chart.
    #[must_use]
    pub fn series(&self, id: ChartId) -> Option<&Series> {
        self.charts.get(&id)
    }

    /// Statistics over exactly what the chart currently displays.
    #[must_use]
    pub fn stats(&self, id: ChartId) -> Option<SeriesStats> {
        self.charts.get(&id).and_then(Series::stats)
    }

    /// Drop every chart's data (teardown).
    pub fn clear_all(&mut self) {
        self.charts.clear();
    }
}

/// Split a series into contiguous line segments. A gap ends the current
/// segment, so the plot shows a visible break instead of bridging (or
/// zeroing) the missing stretch. X coordinates are source indices.
#[must_use]
pub fn line_segments(series: &Series) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for (i, value) in series.values.iter().enumerate() {
        match value {
            Some(v) => current.push((i as f64, *v)),
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: Vec<Option<f64>>) -> Series {
        Series {
            labels: (0..values.len()).map(|i| format!("t{i}")).collect(),
            values,
        }
    }

    #[test]
    fn test_update_and_stats_roundtrip() {
        let mut table = ChartTable::new();
        table
            .update(ChartId::Elevation, series(vec![Some(1.0), None, Some(3.0)]))
            .unwrap();

        let stats = table.stats(ChartId::Elevation).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.latest, 3.0);

        assert!(table.stats(ChartId::Temperature).is_none());
    }

    #[test]
    fn test_update_rejects_mismatched_series() {
        let mut table = ChartTable::new();
        let bad = Series {
            labels: vec!["a".into()],
            values: vec![Some(1.0), Some(2.0)],
        };

        let result = table.update(ChartId::Tds, bad);
        assert!(matches!(result, Err(Error::Render { .. })));
        assert!(table.series(ChartId::Tds).is_none());
    }

    #[test]
    fn test_stats_of_all_gap_chart_is_none() {
        let mut table = ChartTable::new();
        table
            .update(ChartId::Salinity, series(vec![None, None]))
            .unwrap();
        assert!(table.stats(ChartId::Salinity).is_none());
    }

    #[test]
    fn test_clear_all() {
        let mut table = ChartTable::new();
        table
            .update(ChartId::Elevation, series(vec![Some(1.0)]))
            .unwrap();
        table.clear_all();
        assert!(table.series(ChartId::Elevation).is_none());
    }

    #[test]
    fn test_line_segments_break_at_gaps() {
        let s = series(vec![Some(1.0), Some(2.0), None, Some(4.0), None]);
        let segments = line_segments(&s);

        assert_eq!(
            segments,
            vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(3.0, 4.0)]]
        );
    }

    #[test]
    fn test_line_segments_of_all_gaps_is_empty() {
        assert!(line_segments(&series(vec![None, None])).is_empty());
        assert!(line_segments(&Series::default()).is_empty());
    }
}
