//! Track → artist / audio-feature lookups.
//!
//! Tracks are matched by exact name. A name can map to several artist rows
//! (collaborations); the snapshot takes the first row as-is rather than
//! averaging across collaborators.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::db::models::{ArtistRow, AudioFeatureRecord, FeatureSnapshot};

/// Audio feature selectable for the peer comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFeature {
    #[default]
    Tempo,
    Danceability,
    Energy,
    Valence,
    Loudness,
    Speechiness,
}

impl AudioFeature {
    pub const ALL: [AudioFeature; 6] = [
        Self::Tempo,
        Self::Danceability,
        Self::Energy,
        Self::Valence,
        Self::Loudness,
        Self::Speechiness,
    ];

    /// Column name in the source tables.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Tempo => "tempo",
            Self::Danceability => "danceability",
            Self::Energy => "energy",
            Self::Valence => "valence",
            Self::Loudness => "loudness",
            Self::Speechiness => "speechiness",
        }
    }

    /// Capitalised axis label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tempo => "Tempo",
            Self::Danceability => "Danceability",
            Self::Energy => "Energy",
            Self::Valence => "Valence",
            Self::Loudness => "Loudness",
            Self::Speechiness => "Speechiness",
        }
    }

    pub fn value(&self, r: &AudioFeatureRecord) -> f64 {
        match self {
            Self::Tempo => r.tempo,
            Self::Danceability => r.danceability,
            Self::Energy => r.energy,
            Self::Valence => r.valence,
            Self::Loudness => r.loudness,
            Self::Speechiness => r.speechiness,
        }
    }
}

impl fmt::Display for AudioFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, thiserror::Error)]
#[error(
    "unknown audio feature \"{0}\" \
     (expected one of tempo, danceability, energy, valence, loudness, speechiness)"
)]
pub struct UnknownFeature(pub String);

impl FromStr for AudioFeature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.column() == wanted)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

/// Bitwise row equality, so two NaN cells count as the same value.
fn same_artist_row(a: &ArtistRow, b: &ArtistRow) -> bool {
    a.artist_name == b.artist_name
        && a.popularity.to_bits() == b.popularity.to_bits()
        && a.followers.to_bits() == b.followers.to_bits()
}

/// Artists credited on a track. Exact duplicate rows collapse to one; order of
/// first occurrence is kept.
pub fn track_artists(audio: &[AudioFeatureRecord], track_name: &str) -> Vec<ArtistRow> {
    let mut rows: Vec<ArtistRow> = Vec::new();
    for r in audio.iter().filter(|r| r.track_name == track_name) {
        let row = ArtistRow {
            artist_name: r.artist_name.clone(),
            popularity: r.popularity,
            followers: r.followers,
        };
        if !rows.iter().any(|seen| same_artist_row(seen, &row)) {
            rows.push(row);
        }
    }
    rows
}

/// Feature values of the first audio row matching the track.
pub fn track_feature_snapshot(
    audio: &[AudioFeatureRecord],
    track_name: &str,
) -> Option<FeatureSnapshot> {
    let mut matches = audio.iter().filter(|r| r.track_name == track_name);
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        log::debug!("{track_name}: {} artist rows, snapshot uses the first", extra + 1);
    }
    Some(FeatureSnapshot::from(first))
}
