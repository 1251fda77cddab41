//! Weekly-appearance rankings.
//!
//! Appearance count = number of chart rows for a track in a year. Duplicate
//! rows for the same week are counted; they are real rank entries in the
//! source. Ties keep the order in which tracks first appear in the rows.

use std::collections::HashMap;

use crate::db::models::{ChartRecord, TopTrackEntry, YearTrackCount};

/// Tracks shown in the top list when no size is given.
pub const DEFAULT_TOP_N: usize = 10;

/// Count rows per key, preserving first-appearance order, then stable-sort by
/// count descending.
fn count_by_first_appearance<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: std::hash::Hash + Eq + Clone,
    I: IntoIterator<Item = K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();

    for key in keys {
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    // sort_by is stable: equal counts keep first-appearance order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Top `n` tracks of `year` by appearance count.
/// Returns fewer than `n` when the year has fewer tracks, and nothing when the
/// year has no rows.
pub fn top_tracks(charts: &[ChartRecord], year: i32, n: usize) -> Vec<TopTrackEntry> {
    let names = charts
        .iter()
        .filter(|r| r.year() == Some(year))
        .map(|r| r.track_name.as_str());

    let mut counts = count_by_first_appearance(names);
    counts.truncate(n);

    log::debug!("top_tracks({year}, {n}): {} entries", counts.len());

    counts
        .into_iter()
        .map(|(name, count)| TopTrackEntry {
            track_name: name.to_string(),
            appearance_count: count,
        })
        .collect()
}

/// Appearance counts for every (year, track) pair, highest count first.
pub fn year_track_counts(charts: &[ChartRecord]) -> Vec<YearTrackCount> {
    let keys = charts
        .iter()
        .filter_map(|r| r.year().map(|y| (y, r.track_name.as_str())));

    count_by_first_appearance(keys)
        .into_iter()
        .map(|((year, name), count)| YearTrackCount {
            year,
            track_name: name.to_string(),
            appearance_count: count,
        })
        .collect()
}

/// First `n` rows of the count table for one year (the sidebar list).
pub fn sidebar_top(counts: &[YearTrackCount], year: i32, n: usize) -> Vec<YearTrackCount> {
    counts
        .iter()
        .filter(|c| c.year == year)
        .take(n)
        .cloned()
        .collect()
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

    fn names(entries: &[TopTrackEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.track_name.as_str()).collect()
    }

    #[test]
    fn test_duplicate_week_rows_counted() {
        let charts = vec![
            row("A", "2020-01-04", 3),
            row("A", "2020-01-04", 5),
            row("B", "2020-01-04", 1),
        ];
        let top = top_tracks(&charts, 2020, 10);
        assert_eq!(
            top,
            vec![
                TopTrackEntry {
                    track_name: "A".into(),
                    appearance_count: 2,
                },
                TopTrackEntry {
                    track_name: "B".into(),
                    appearance_count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_ties_keep_first_appearance_order() {
        let charts = vec![
            row("Zeta", "2021-01-02", 1),
            row("Alpha", "2021-01-02", 2),
            row("Mid", "2021-01-02", 3),
            row("Mid", "2021-01-09", 3),
        ];
        let top = top_tracks(&charts, 2021, 10);
        assert_eq!(names(&top), vec!["Mid", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_truncates_to_n() {
        let charts: Vec<ChartRecord> = (0..15)
            .map(|i| row(&format!("T{i}"), "2022-03-05", i + 1))
            .collect();
        let top = top_tracks(&charts, 2022, 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].track_name, "T0");
    }

    #[test]
    fn test_fewer_than_n() {
        let charts = vec![row("A", "2022-03-05", 1), row("B", "2022-03-05", 2)];
        assert_eq!(top_tracks(&charts, 2022, 10).len(), 2);
    }

    #[test]
    fn test_empty_year() {
        let charts = vec![
            row("A", "2018-03-05", 1),
            row("B", "2024-03-05", 2),
        ];
        assert!(top_tracks(&charts, 1999, 10).is_empty());
    }

    #[test]
    fn test_other_years_and_bad_weeks_ignored() {
        let charts = vec![
            row("A", "2019-12-28", 1),
            row("A", "2020-01-04", 1),
            row("A", "junk", 1),
            row("B", "2020-01-04", 2),
            row("B", "2020-01-11", 2),
        ];
        let top = top_tracks(&charts, 2020, 10);
        assert_eq!(names(&top), vec!["B", "A"]);
        assert_eq!(top[1].appearance_count, 1);
    }

    #[test]
    fn test_counts_sorted_and_positive() {
        let charts = vec![
            row("A", "2020-01-04", 1),
            row("B", "2020-01-04", 2),
            row("B", "2020-01-11", 2),
            row("C", "2020-01-11", 3),
            row("C", "2020-01-18", 3),
            row("C", "2020-01-25", 3),
        ];
        let top = top_tracks(&charts, 2020, 2);
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|e| e.appearance_count >= 1));
        assert!(top.windows(2).all(|w| w[0].appearance_count >= w[1].appearance_count));
        assert_eq!(names(&top), vec!["C", "B"]);
    }

    #[test]
    fn test_year_track_counts() {
        let charts = vec![
            row("A", "2019-06-01", 1),
            row("A", "2020-06-06", 1),
            row("A", "2020-06-13", 1),
            row("B", "2019-06-01", 2),
            row("B", "nope", 2),
        ];
        let counts = year_track_counts(&charts);
        assert_eq!(
            counts,
            vec![
                YearTrackCount {
                    year: 2020,
                    track_name: "A".into(),
                    appearance_count: 2,
                },
                YearTrackCount {
                    year: 2019,
                    track_name: "A".into(),
                    appearance_count: 1,
                },
                YearTrackCount {
                    year: 2019,
                    track_name: "B".into(),
                    appearance_count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_sidebar_matches_top_tracks() {
        let charts = vec![
            row("A", "2019-06-01", 1),
            row("B", "2019-06-01", 2),
            row("B", "2019-06-08", 2),
            row("C", "2020-06-06", 1),
            row("D", "2019-06-08", 3),
        ];
        let counts = year_track_counts(&charts);
        let sidebar = sidebar_top(&counts, 2019, 2);
        let top = top_tracks(&charts, 2019, 2);

        assert_eq!(sidebar.len(), 2);
        for (s, t) in sidebar.iter().zip(&top) {
            assert_eq!(s.track_name, t.track_name);
            assert_eq!(s.appearance_count, t.appearance_count);
        }
    }

    #[test]
    fn test_idempotent() {
        let charts = vec![
            row("A", "2020-01-04", 1),
            row("B", "2020-01-04", 2),
            row("B", "2020-01-11", 2),
        ];
        assert_eq!(top_tracks(&charts, 2020, 10), top_tracks(&charts, 2020, 10));
        assert_eq!(year_track_counts(&charts), year_track_counts(&charts));
    }
}
