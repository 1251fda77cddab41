use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::db::models::{ChartRecord, PositionSample};

/// Chart-position history of a track across every year it charted.
///
/// One sample per distinct week, ascending. A week with several rows for the
/// same name (join fan-out upstream) reports the mean of their positions.
/// Rows without a parsable week are left out.
pub fn track_position_series(charts: &[ChartRecord], track_name: &str) -> Vec<PositionSample> {
    let mut weeks: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();

    for r in charts.iter().filter(|r| r.track_name == track_name) {
        if let Some(week) = r.chart_week {
            let acc = weeks.entry(week).or_insert((0.0, 0));
            acc.0 += f64::from(r.list_position);
            acc.1 += 1;
        }
    }

    weeks
        .into_iter()
        .map(|(chart_week, (sum, n))| PositionSample {
            chart_week,
            mean_list_position: sum / n as f64,
        })
        .collect()
}

/// Best (lowest) mean position in a series.
pub fn peak_position(series: &[PositionSample]) -> Option<f64> {
    series
        .iter()
        .map(|s| s.mean_list_position)
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::week::parse_chart_week;

    fn row(name: &str, week: &str, pos: u32) -> ChartRecord {
        ChartRecord {
            track_name: name.to_string(),
            chart_week: parse_chart_week(week),
            list_position: pos,
        }
    }

    #[test]
    fn test_duplicate_week_averaged() {
        let charts = vec![
            row("A", "2020-01-04", 3),
            row("A", "2020-01-04", 5),
            row("B", "2020-01-04", 1),
        ];
        let series = track_position_series(&charts, "A");
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].chart_week, parse_chart_week("2020-01-04").unwrap());
        assert!((series[0].mean_list_position - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_chronological_across_years() {
        let charts = vec![
            row("A", "2021-02-06", 7),
            row("A", "2019-11-30", 40),
            row("A", "2020-06-13", 12),
        ];
        let series = track_position_series(&charts, "A");
        let positions: Vec<f64> = series.iter().map(|s| s.mean_list_position).collect();
        assert_eq!(positions, vec![40.0, 12.0, 7.0]);
        assert!(series.windows(2).all(|w| w[0].chart_week < w[1].chart_week));
    }

    #[test]
    fn test_bad_weeks_skipped() {
        let charts = vec![row("A", "??", 2), row("A", "2020-01-04", 9)];
        let series = track_position_series(&charts, "A");
        assert_eq!(series.len(), 1);
        assert!((series[0].mean_list_position - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_unknown_track_is_empty() {
        let charts = vec![row("A", "2020-01-04", 1)];
        assert!(track_position_series(&charts, "Nope").is_empty());
    }

    #[test]
    fn test_name_match_is_exact() {
        let charts = vec![row("Stay", "2021-08-07", 1), row("Stay With Me", "2021-08-07", 30)];
        let series = track_position_series(&charts, "Stay");
        assert_eq!(series.len(), 1);
        assert!((series[0].mean_list_position - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_peak_position() {
        let charts = vec![
            row("A", "2020-01-04", 10),
            row("A", "2020-01-11", 2),
            row("A", "2020-01-11", 4),
            row("A", "2020-01-18", 8),
        ];
        let series = track_position_series(&charts, "A");
        assert_eq!(peak_position(&series), Some(3.0));
        assert_eq!(peak_position(&[]), None);
    }
}
