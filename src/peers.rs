//! Peer comparison: every track charting in a year, placed by one audio
//! feature against its mean chart position.
//!
//! Chart rows and audio rows are joined on track name only. Names are not
//! globally unique, so two different songs sharing a title merge into one
//! point; there is no stronger key in the source data.

use std::collections::{BTreeMap, HashMap};

use crate::audio::AudioFeature;
use crate::db::models::{AudioFeatureRecord, ChartRecord, PeerPoint};

#[derive(Default)]
struct PeerAccumulator {
    position_sum: f64,
    position_rows: usize,
    feature_sum: f64,
    feature_rows: usize,
}

/// Per-track means of `feature` and chart position over the rows of `year`.
///
/// Every chart row is joined to all audio rows with the same name, and the
/// feature mean is taken over those joined rows, ignoring blank (NaN) values.
/// A charting track with no usable audio value is still returned, with `mean_feature_value: None`, so the selected
/// track can't silently drop out of the scatter. Points come back ordered by
/// track name.
pub fn peer_comparison(
    charts: &[ChartRecord],
    audio: &[AudioFeatureRecord],
    year: i32,
    feature: AudioFeature,
    selected_track: &str,
) -> Vec<PeerPoint> {
    let mut features_by_name: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in audio {
        let value = feature.value(r);
        if value.is_nan() {
            continue;
        }
        features_by_name
            .entry(r.track_name.as_str())
            .or_default()
            .push(value);
    }

    let mut groups: BTreeMap<&str, PeerAccumulator> = BTreeMap::new();
    for r in charts.iter().filter(|r| r.year() == Some(year)) {
        let acc = groups.entry(r.track_name.as_str()).or_default();
        acc.position_sum += f64::from(r.list_position);
        acc.position_rows += 1;
        if let Some(values) = features_by_name.get(r.track_name.as_str()) {
            acc.feature_sum += values.iter().sum::<f64>();
            acc.feature_rows += values.len();
        }
    }

    let mut points: Vec<PeerPoint> = groups
        .into_iter()
        .map(|(name, acc)| PeerPoint {
            track_name: name.to_string(),
            year,
            mean_feature_value: (acc.feature_rows > 0)
                .then(|| acc.feature_sum / acc.feature_rows as f64),
            mean_list_position: acc.position_sum / acc.position_rows as f64,
            is_selected: name == selected_track,
            marker_size: 0.0,
        })
        .collect();

    let worst = points
        .iter()
        .map(|p| p.mean_list_position)
        .fold(f64::NEG_INFINITY, f64::max);
    for p in &mut points {
        p.marker_size = worst - p.mean_list_position + 1.0;
    }

    log::debug!(
        "peer_comparison({year}, {feature}): {} points, selected {:?} present: {}",
        points.len(),
        selected_track,
        points.iter().any(|p| p.is_selected)
    );

    points
}

/// The highlighted point, drawn on top of the others.
pub fn selected_point(points: &[PeerPoint]) -> Option<&PeerPoint> {
    points.iter().find(|p| p.is_selected)
}
