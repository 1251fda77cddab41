use super::models::{AudioFeatureRecord, ChartRecord};
use super::{Database, Result};
use crate::week::parse_chart_week;
use rusqlite::types::ValueRef;

/// Rows loaded from a table plus the number rejected as unusable.
pub struct TableRows<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

/// Interpret a stored list position. Integers and integral reals >= 1 are accepted.
fn position_from_sql(v: ValueRef<'_>) -> Option<u32> {
    match v {
        ValueRef::Integer(i) if i >= 1 => u32::try_from(i).ok(),
        ValueRef::Real(f) if f >= 1.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => {
            Some(f as u32)
        }
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(crate::loader::parse_position),
        _ => None,
    }
}

fn real_from_sql(v: ValueRef<'_>) -> Option<f64> {
    match v {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(|s| s.trim().parse().ok()),
        _ => None,
    }
}

/// A name column. NULL, blobs and non-UTF-8 text yield `None`.
fn text_from_sql(v: ValueRef<'_>) -> Option<String> {
    match v {
        ValueRef::Text(t) => std::str::from_utf8(t).ok().map(str::to_owned),
        _ => None,
    }
}

impl Database {
    /// All chart rows in table order. Weeks that don't parse are kept as `None`.
    pub fn chart_facts(&self) -> Result<TableRows<ChartRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT track_name, chart_week, list_position FROM chart_facts ORDER BY rowid",
        )?;
        let mut rows = stmt.query([])?;

        let mut out = TableRows {
        rows: Vec::new(),
        skipped: 0,
    };
        while let Some(row) = rows.next()? {
            let Some(track_name) = text_from_sql(row.get_ref(0)?) else {
                log::warn!("chart_facts: skipping row without a track_name");
                out.skipped += 1;
                continue;
            };
            let chart_week = match row.get_ref(1)? {
                ValueRef::Text(t) => std::str::from_utf8(t).ok().and_then(parse_chart_week),
                _ => None,
            };
            match position_from_sql(row.get_ref(2)?) {
                Some(list_position) => out.rows.push(ChartRecord {
                    track_name,
                    chart_week,
                    list_position,
                }),
                None => {
                    log::warn!(
                        "chart_facts: skipping \"{track_name}\" with invalid list_position"
                    );
                    out.skipped += 1;
                }
            }
        }
        Ok(out)
    }

    /// All audio-feature rows in table order. A NULL or non-numeric value loads
    /// as NaN; rows missing either name are skipped.
    pub fn audio_facts(&self) -> Result<TableRows<AudioFeatureRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT track_name, artist_name, popularity, followers,
                    danceability, tempo, energy, valence, loudness, speechiness
             FROM audio_facts
             ORDER BY rowid",
        )?;
        let mut rows = stmt.query([])?;

        let mut out = TableRows {
        rows: Vec::new(),
        skipped: 0,
    };
        while let Some(row) = rows.next()? {
            let names = (text_from_sql(row.get_ref(0)?), text_from_sql(row.get_ref(1)?));
            let (Some(track_name), Some(artist_name)) = names else {
                log::warn!("audio_facts: skipping row without a track_name or artist_name");
                out.skipped += 1;
                continue;
            };
            let mut nums = [f64::NAN; 8];
            for (i, slot) in nums.iter_mut().enumerate() {
                if let Some(v) = real_from_sql(row.get_ref(i + 2)?) {
                    *slot = v;
                }
            }
            let [
                popularity,
                followers,
                danceability,
                tempo,
                energy,
                valence,
                loudness,
                speechiness,
            ] = nums;
            out.rows.push(AudioFeatureRecord {
                track_name,
                artist_name,
                popularity,
                followers,
                danceability,
                tempo,
                energy,
                valence,
                loudness,
                speechiness,
            });
        }
        Ok(out)
    }
}
