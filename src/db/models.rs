use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;

/// One weekly chart appearance.
///
/// `chart_week` is `None` when the source timestamp could not be parsed; such
/// rows stay in the table but carry no year.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRecord {
    pub track_name: String,
    pub chart_week: Option<NaiveDateTime>,
    pub list_position: u32,
}

impl ChartRecord {
    /// Calendar year of the chart week, if the week parsed.
    pub fn year(&self) -> Option<i32> {
        self.chart_week.map(|w| w.year())
    }
}

/// Audio features and artist metadata for one (track, artist) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFeatureRecord {
    pub track_name: String,
    pub artist_name: String,
    pub popularity: f64,
    pub followers: f64,
    pub danceability: f64,
    pub tempo: f64,
    pub energy: f64,
    pub valence: f64,
    pub loudness: f64,
    pub speechiness: f64,
}

/// A track's appearance count within one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopTrackEntry {
    pub track_name: String,
    pub appearance_count: usize,
}

/// A row of the (year, track) appearance table behind the sidebar list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearTrackCount {
    pub year: i32,
    pub track_name: String,
    pub appearance_count: usize,
}

/// Mean chart position of a track for one chart week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionSample {
    pub chart_week: NaiveDateTime,
    pub mean_list_position: f64,
}

/// Artist credited on a track, with popularity metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistRow {
    pub artist_name: String,
    pub popularity: f64,
    pub followers: f64,
}

/// The six audio-feature KPIs shown for a single track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSnapshot {
    pub danceability: f64,
    pub tempo: f64,
    pub energy: f64,
    pub valence: f64,
    pub loudness: f64,
    pub speechiness: f64,
}

impl FeatureSnapshot {
    /// (label, value) pairs in display order.
    pub fn kpis(&self) -> [(&'static str, f64); 6] {
        [
            ("Danceability", self.danceability),
            ("Tempo", self.tempo),
            ("Energy", self.energy),
            ("Valence", self.valence),
            ("Loudness", self.loudness),
            ("Speechiness", self.speechiness),
        ]
    }
}

impl From<&AudioFeatureRecord> for FeatureSnapshot {
    fn from(r: &AudioFeatureRecord) -> Self {
        Self {
            danceability: r.danceability,
            tempo: r.tempo,
            energy: r.energy,
            valence: r.valence,
            loudness: r.loudness,
            speechiness: r.speechiness,
        }
    }
}

/// Per-track aggregate for the peer comparison scatter.
///
/// `mean_feature_value` is `None` when the track has no audio-feature rows.
/// `marker_size` grows as the mean position gets better (numerically lower).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerPoint {
    pub track_name: String,
    pub year: i32,
    pub mean_feature_value: Option<f64>,
    pub mean_list_position: f64,
    pub is_selected: bool,
    pub marker_size: f64,
}

/// Row counts of a loaded context.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub chart_rows: usize,
    pub chart_rows_skipped: usize,
    pub chart_rows_without_week: usize,
    pub audio_rows: usize,
    pub audio_rows_skipped: usize,
}
