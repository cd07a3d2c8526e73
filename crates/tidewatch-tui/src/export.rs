//! CSV export of currently displayed chart statistics.
//!
//! The export reflects exactly what the charts show: statistics are
//! re-queried from the render surface, so a paused or partially loaded
//! dashboard exports what is on screen, not what the backend holds.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::OffsetDateTime;

use crate::charts::{ChartId, ChartTable};

/// Dashboard name used in export filenames.
pub const DASHBOARD_NAME: &str = "tidewatch";

/// CSV header row.
const HEADER: &str = "Parameter,Count,Min,Max,Average,Latest";

/// Render the statistics table as CSV. Charts without statistics
/// (never loaded, or all gaps) are omitted rather than zero-filled.
#[must_use]
pub fn render_csv(charts: &ChartTable) -> String {
    let mut content = String::from(HEADER);
    content.push('\n');

    for id in ChartId::ALL {
        if let Some(stats) = charts.stats(id) {
            content.push_str(&format!(
                "{},{},{:.2},{:.2},{:.2},{:.2}\n",
                id.key(),
                stats.count,
                stats.min,
                stats.max,
                stats.avg,
                stats.latest
            ));
        }
    }

    content
}

/// Write the statistics CSV into `dir` as
/// `tidewatch-data-<ISO date>.csv`. Returns the path written.
pub fn export_stats(charts: &ChartTable, dir: &Path) -> Result<PathBuf> {
    let content = render_csv(charts);

    let format = time::format_description::parse("[year]-[month]-[day]").unwrap();
    let date = OffsetDateTime::now_utc().format(&format).unwrap_or_default();

    let path = dir.join(format!("{DASHBOARD_NAME}-data-{date}.csv"));
    fs::write(&path, content)
        .with_context(|| format!("failed to write export to {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_core::Series;

    fn table_with(id: ChartId, values: Vec<Option<f64>>) -> ChartTable {
        let mut table = ChartTable::new();
        let series = Series {
            labels: (0..values.len()).map(|i| format!("t{i}")).collect(),
            values,
        };
        table.update(id, series).unwrap();
        table
    }

    #[test]
    fn test_csv_header_and_row_format() {
        let table = table_with(
            ChartId::Elevation,
            vec![Some(1.0), None, Some(3.0), Some(2.0)],
        );

        let csv = render_csv(&table);
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("Parameter,Count,Min,Max,Average,Latest"));
        assert_eq!(lines.next(), Some("elevation,3,1.00,3.00,2.00,2.00"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_csv_omits_charts_without_statistics() {
        let table = table_with(ChartId::Salinity, vec![None, None]);
        let csv = render_csv(&table);
        assert_eq!(csv.lines().count(), 1, "header only");
    }

    #[test]
    fn test_rows_follow_display_order() {
        let mut table = table_with(ChartId::Conductivity, vec![Some(48.0)]);
        let series = Series {
            labels: vec!["t0".to_string()],
            values: vec![Some(12.0)],
        };
        table.update(ChartId::Elevation, series).unwrap();

        let csv = render_csv(&table);
        let keys: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(keys, vec!["elevation", "conductivity"]);
    }

    #[test]
    fn test_export_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let table = table_with(ChartId::Tds, vec![Some(450.0)]);

        let path = export_stats(&table, dir.path()).unwrap();

        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("tidewatch-data-"));
        assert!(name.ends_with(".csv"));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Parameter,Count,Min,Max,Average,Latest\n"));
        assert!(content.contains("tds,1,450.00,450.00,450.00,450.00"));
    }
}
