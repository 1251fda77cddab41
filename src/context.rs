use crate::audio::{self, AudioFeature};
use crate::db::models::{
    ArtistRow, AudioFeatureRecord, ChartRecord, FeatureSnapshot, LoadReport, PeerPoint,
    PositionSample, TopTrackEntry, YearTrackCount,
};
use crate::loader::{self, DataSource};
use crate::{peers, ranking, series, years};

/// The two source tables, loaded once and never modified.
///
/// Every query is a pure function of the tables and its arguments, so results
/// can be recomputed freely on each selection change.
#[derive(Debug, Clone)]
pub struct ChartContext {
    charts: Vec<ChartRecord>,
    audio: Vec<AudioFeatureRecord>,
    report: LoadReport,
}

impl ChartContext {
    /// Build a context from in-memory tables.
    pub fn from_tables(charts: Vec<ChartRecord>, audio: Vec<AudioFeatureRecord>) -> Self {
        let report = LoadReport {
            chart_rows: charts.len(),
            chart_rows_without_week: charts.iter().filter(|r| r.chart_week.is_none()).count(),
            audio_rows: audio.len(),
            ..LoadReport::default()
        };
        Self { charts, audio, report }
    }

    /// Load both tables. Fails only when a source is absent or unreadable.
    pub fn load(source: &DataSource) -> loader::Result<Self> {
        let (charts, audio) = loader::load_tables(source)?;
        let mut ctx = Self::from_tables(charts.rows, audio.rows);
        ctx.report.chart_rows_skipped = charts.skipped;
        ctx.report.audio_rows_skipped = audio.skipped;

        log::info!(
            "Loaded {} chart rows ({} without a week, {} skipped), {} audio rows ({} skipped)",
            ctx.report.chart_rows,
            ctx.report.chart_rows_without_week,
            ctx.report.chart_rows_skipped,
            ctx.report.audio_rows,
            ctx.report.audio_rows_skipped,
        );
        Ok(ctx)
    }

    pub fn charts(&self) -> &[ChartRecord] {
        &self.charts
    }

    pub fn audio(&self) -> &[AudioFeatureRecord] {
        &self.audio
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn available_years(&self) -> Vec<i32> {
        years::available_years(&self.charts)
    }

    pub fn latest_year(&self) -> Option<i32> {
        years::latest_year(&self.charts)
    }

    pub fn top_tracks(&self, year: i32, n: usize) -> Vec<TopTrackEntry> {
        ranking::top_tracks(&self.charts, year, n)
    }

    pub fn year_track_counts(&self) -> Vec<YearTrackCount> {
        ranking::year_track_counts(&self.charts)
    }

    pub fn track_position_series(&self, track_name: &str) -> Vec<PositionSample> {
        series::track_position_series(&self.charts, track_name)
    }

    pub fn track_artists(&self, track_name: &str) -> Vec<ArtistRow> {
        audio::track_artists(&self.audio, track_name)
    }

    pub fn track_feature_snapshot(&self, track_name: &str) -> Option<FeatureSnapshot> {
        audio::track_feature_snapshot(&self.audio, track_name)
    }

    pub fn peer_comparison(
        &self,
        year: i32,
        feature: AudioFeature,
        selected_track: &str,
    ) -> Vec<PeerPoint> {
        peers::peer_comparison(&self.charts, &self.audio, year, feature, selected_track)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::week::parse_chart_week;

    fn chart(name: &str, week: &str, pos: u32) -> ChartRecord {
        ChartRecord {
            track_name: name.to_string(),
            chart_week: parse_chart_week(week),
            list_position: pos,
        }
    }

    #[test]
    fn test_report_counts() {
        let ctx = ChartContext::from_tables(
            vec![chart("A", "2020-01-04", 1), chart("B", "bad", 2)],
            Vec::new(),
        );
        assert_eq!(ctx.report().chart_rows, 2);
        assert_eq!(ctx.report().chart_rows_without_week, 1);
        assert_eq!(ctx.report().audio_rows, 0);
    }

    #[test]
    fn test_queries_leave_tables_untouched() {
        let charts = vec![
            chart("A", "2020-01-04", 3),
            chart("A", "2020-01-04", 5),
            chart("B", "2020-01-04", 1),
        ];
        let ctx = ChartContext::from_tables(charts.clone(), Vec::new());

        assert_eq!(ctx.available_years(), vec![2020]);
        assert_eq!(ctx.top_tracks(2020, 10)[0].track_name, "A");
        assert_eq!(ctx.track_position_series("A").len(), 1);
        assert_eq!(ctx.peer_comparison(2020, AudioFeature::Tempo, "A").len(), 2);
        assert_eq!(ctx.charts(), charts.as_slice());
    }

    #[test]
    fn test_context_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChartContext>();
    }

    #[test]
    fn test_load_from_sqlite_file() {
        let dir = std::env::temp_dir().join(format!("chartscope-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("charts.db");
        let _ = std::fs::remove_file(&path);

        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute_batch(
                "
                CREATE TABLE chart_facts (track_name TEXT, chart_week TEXT, list_position INTEGER);
                CREATE TABLE audio_facts (
                    track_name TEXT, artist_name TEXT, popularity REAL, followers REAL,
                    danceability REAL, tempo REAL, energy REAL, valence REAL,
                    loudness REAL, speechiness REAL
                );
                INSERT INTO chart_facts VALUES ('As It Was', '2022-04-16', 1);
                INSERT INTO chart_facts VALUES ('As It Was', '2022-04-23', 2);
                INSERT INTO chart_facts VALUES (NULL, '2022-01-08', 2);
                INSERT INTO audio_facts VALUES
                    ('As It Was', 'Harry Styles', 91, 40000000,
                     0.52, 173.9, 0.73, 0.66, -5.3, 0.06);
                INSERT INTO audio_facts (track_name, artist_name, tempo)
                    VALUES ('As It Was', NULL, 174.0);
                ",
            )
            .unwrap();
        }

        let ctx = ChartContext::load(&DataSource::Sqlite(path.clone())).unwrap();
        assert_eq!(ctx.report().chart_rows_skipped, 1);
        assert_eq!(ctx.report().audio_rows_skipped, 1);
        assert_eq!(ctx.available_years(), vec![2022]);
        assert_eq!(ctx.top_tracks(2022, 10)[0].appearance_count, 2);
        assert_eq!(ctx.track_artists("As It Was")[0].artist_name, "Harry Styles");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_rejects_database_without_tables() {
        let name = format!("chartscope-empty-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("empty.db");
        let _ = std::fs::remove_file(&path);
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE unrelated (x INTEGER);")
            .unwrap();

        let err = ChartContext::load(&DataSource::Sqlite(path)).unwrap_err();
        assert!(err.to_string().contains("chart_facts"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
