//! One full recomputation of every view for a (year, track, feature) selection.

use serde::Serialize;

use crate::audio::AudioFeature;
use crate::context::ChartContext;
use crate::db::models::{
    ArtistRow, FeatureSnapshot, PeerPoint, PositionSample, TopTrackEntry, YearTrackCount,
};
use crate::ranking;

/// What the user asked for. `None` means "use the default".
#[derive(Debug, Clone, Default)]
pub struct SelectionRequest {
    pub year: Option<i32>,
    pub track: Option<String>,
    pub feature: Option<AudioFeature>,
}

/// A resolved selection.
///
/// `year` is `None` only when the chart table has no dated rows; `track` is
/// `None` when the year has no tracks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub year: Option<i32>,
    pub track: Option<String>,
    pub feature: AudioFeature,
}

impl Selection {
    /// Fill in defaults: latest year, the year's top track, then `default_feature`.
    pub fn resolve(
        ctx: &ChartContext,
        request: &SelectionRequest,
        default_feature: AudioFeature,
    ) -> Self {
        let year = request.year.or_else(|| ctx.latest_year());
        let track = match (&request.track, year) {
            (Some(t), _) => Some(t.clone()),
            (None, Some(y)) => ctx.top_tracks(y, 1).into_iter().next().map(|e| e.track_name),
            (None, None) => None,
        };
        Self {
            year,
            track,
            feature: request.feature.unwrap_or(default_feature),
        }
    }
}

/// Everything the dashboard renders for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub selection: Selection,
    pub available_years: Vec<i32>,
    pub top_tracks: Vec<TopTrackEntry>,
    pub sidebar_top: Vec<YearTrackCount>,
    pub artists: Vec<ArtistRow>,
    pub features: Option<FeatureSnapshot>,
    pub position_series: Vec<PositionSample>,
    pub peers: Vec<PeerPoint>,
}

/// Recompute every view for `selection`. Empty pieces stay empty; the caller
/// decides how to render "no data".
pub fn build_dashboard(
    ctx: &ChartContext,
    selection: Selection,
    top_n: usize,
) -> DashboardView {
    let (top_tracks, sidebar_top) = match selection.year {
        Some(year) => {
            let counts = ctx.year_track_counts();
            (ctx.top_tracks(year, top_n), ranking::sidebar_top(&counts, year, top_n))
        }
        None => (Vec::new(), Vec::new()),
    };

    let (artists, features, position_series) = match selection.track.as_deref() {
        Some(track) => (
            ctx.track_artists(track),
            ctx.track_feature_snapshot(track),
            ctx.track_position_series(track),
        ),
        None => (Vec::new(), None, Vec::new()),
    };

    let peers = match selection.year {
        Some(year) => ctx.peer_comparison(
            year,
            selection.feature,
            selection.track.as_deref().unwrap_or_default(),
        ),
        None => Vec::new(),
    };

    DashboardView {
        available_years: ctx.available_years(),
        selection,
        top_tracks,
        sidebar_top,
        artists,
        features,
        position_series,
        peers,
    }
}

/// Resolve defaults and build the view in one step.
pub fn dashboard_for(
    ctx: &ChartContext,
    request: &SelectionRequest,
    default_feature: AudioFeature,
    top_n: usize,
) -> DashboardView {
    let selection = Selection::resolve(ctx, request, default_feature);
    build_dashboard(ctx, selection, top_n)
}
