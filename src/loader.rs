//! Loading the chart and audio-feature tables from CSV exports or a SQLite
//! database.
//!
//! Sparse or messy rows never abort a load: bad weeks become `None`, blank or
//! non-numeric audio features become NaN, and rows without a name or with an
//! unusable position are skipped and counted. Only a missing source (file,
//! table, or required column) is fatal.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::db::models::{AudioFeatureRecord, ChartRecord};
use crate::db::queries::TableRows;
use crate::db::{Database, DbError};
use crate::week::parse_chart_week;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{table} source not found: {}", .path.display())]
    MissingSource { table: &'static str, path: PathBuf },
    #[error("{table} table has no `{column}` column")]
    MissingColumn { table: &'static str, column: &'static str },
    #[error("failed to read {table} CSV: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("database error: {0}")]
    Db(#[from] DbError),
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// Where the two source tables come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Csv { chart: PathBuf, audio: PathBuf },
    Sqlite(PathBuf),
}

/// Parse a list position. Accepts integers and integral floats ("3.0") >= 1.
pub fn parse_position(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if let Ok(n) = s.parse::<u32>() {
        return (n >= 1).then_some(n);
    }
    let f: f64 = s.parse().ok()?;
    if f >= 1.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) {
        Some(f as u32)
    } else {
        None
    }
}

#[derive(Debug, Deserialize)]
struct RawChartRow {
    #[serde(rename = "name", alias = "track_name")]
    track_name: Option<String>,
    #[serde(alias = "week")]
    chart_week: Option<String>,
    #[serde(alias = "position")]
    list_position: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAudioRow {
    #[serde(rename = "name_x", alias = "track_name")]
    track_name: Option<String>,
    #[serde(rename = "name_y", alias = "artist_name")]
    artist_name: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    popularity: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    followers: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    danceability: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    tempo: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    energy: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    valence: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    loudness: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    speechiness: Option<f64>,
}

impl RawAudioRow {
    /// `None` when either name is blank. Missing numbers become NaN.
    fn into_record(self) -> Option<AudioFeatureRecord> {
        let num = |v: Option<f64>| v.unwrap_or(f64::NAN);
        Some(AudioFeatureRecord {
            track_name: self.track_name?,
            artist_name: self.artist_name?,
            popularity: num(self.popularity),
            followers: num(self.followers),
            danceability: num(self.danceability),
            tempo: num(self.tempo),
            energy: num(self.energy),
            valence: num(self.valence),
            loudness: num(self.loudness),
            speechiness: num(self.speechiness),
        })
    }
}

const CHART_COLUMNS: &[(&str, &[&str])] = &[
    ("name", &["name", "track_name"]),
    ("chart_week", &["chart_week", "week"]),
    ("list_position", &["list_position", "position"]),
];

const AUDIO_COLUMNS: &[(&str, &[&str])] = &[
    ("name_x", &["name_x", "track_name"]),
    ("name_y", &["name_y", "artist_name"]),
    ("popularity", &["popularity"]),
    ("followers", &["followers"]),
    ("danceability", &["danceability"]),
    ("tempo", &["tempo"]),
    ("energy", &["energy"]),
    ("valence", &["valence"]),
    ("loudness", &["loudness"]),
    ("speechiness", &["speechiness"]),
];

fn require_columns<R: io::Read>(
    reader: &mut csv::Reader<R>,
    table: &'static str,
    required: &[(&'static str, &[&str])],
) -> Result<()> {
    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv { table, source })?;
    for &(column, accepted) in required {
        if !headers.iter().any(|h| accepted.contains(&h.trim())) {
            return Err(LoadError::MissingColumn { table, column });
        }
    }
    Ok(())
}

/// Read chart rows from CSV. Rows keep their file order.
pub fn read_chart_csv<R: io::Read>(input: R) -> Result<TableRows<ChartRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(input);
    require_columns(&mut reader, "chart", CHART_COLUMNS)?;

    let mut out = TableRows {
        rows: Vec::new(),
        skipped: 0,
    };
    for (i, result) in reader.deserialize::<RawChartRow>().enumerate() {
        let line = i + 2;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("chart CSV line {line}: {e}");
                out.skipped += 1;
                continue;
            }
        };
        let Some(track_name) = raw.track_name else {
            log::warn!("chart CSV line {line}: skipping row without a track name");
            out.skipped += 1;
            continue;
        };
        let Some(list_position) = raw.list_position.as_deref().and_then(parse_position) else {
            log::warn!(
                "chart CSV line {line}: skipping \"{track_name}\" with invalid list_position {:?}",
                raw.list_position
            );
            out.skipped += 1;
            continue;
        };
        out.rows.push(ChartRecord {
            track_name,
            chart_week: raw.chart_week.as_deref().and_then(parse_chart_week),
            list_position,
        });
    }
    Ok(out)
}

/// Read audio-feature rows from CSV. Rows keep their file order.
pub fn read_audio_csv<R: io::Read>(input: R) -> Result<TableRows<AudioFeatureRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(input);
    require_columns(&mut reader, "audio", AUDIO_COLUMNS)?;

    let mut out = TableRows {
        rows: Vec::new(),
        skipped: 0,
    };
    for (i, result) in reader.deserialize::<RawAudioRow>().enumerate() {
        let line = i + 2;
        match result.map(RawAudioRow::into_record) {
            Ok(Some(record)) => out.rows.push(record),
            Ok(None) => {
                log::warn!("audio CSV line {line}: skipping row without track or artist name");
                out.skipped += 1;
            }
            Err(e) => {
                log::warn!("audio CSV line {line}: {e}");
                out.skipped += 1;
            }
        }
    }
    Ok(out)
}

fn open_csv(table: &'static str, path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| {
        log::error!("Cannot open {table} CSV {}: {e}", path.display());
        LoadError::MissingSource {
            table,
            path: path.to_path_buf(),
        }
    })
}

/// Load both tables from a source.
pub fn load_tables(
    source: &DataSource,
) -> Result<(TableRows<ChartRecord>, TableRows<AudioFeatureRecord>)> {
    match source {
        DataSource::Csv { chart, audio } => {
            let charts = read_chart_csv(io::BufReader::new(open_csv("chart", chart)?))?;
            let audio = read_audio_csv(io::BufReader::new(open_csv("audio", audio)?))?;
            Ok((charts, audio))
        }
        DataSource::Sqlite(path) => {
            if !path.exists() {
                return Err(LoadError::MissingSource {
                    table: "chart database",
                    path: path.clone(),
                });
            }
            let db = Database::open(path)?;
            Ok((db.chart_facts()?, db.audio_facts()?))
        }
    }
}
