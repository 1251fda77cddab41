pub mod models;
pub mod queries;

use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use thiserror::Error;

/// Tables a chart database must provide.
pub const CHART_TABLE: &str = "chart_facts";
pub const AUDIO_TABLE: &str = "audio_facts";

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Required table `{0}` is missing")]
    MissingTable(&'static str),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Read-only handle on a SQLite chart database.
pub struct Database {
    pub conn: Connection,
}

impl Database {
    /// Open an existing database without write access. Fails if either source
    /// table is absent.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let db = Self { conn };
        db.require_tables()?;
        Ok(db)
    }

    fn require_tables(&self) -> Result<()> {
        for table in [CHART_TABLE, AUDIO_TABLE] {
            let found: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
                [table],
                |row| row.get(0),
            )?;
            if found == 0 {
                return Err(DbError::MissingTable(table));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
impl Database {
    /// Empty in-memory database with both tables created. Name columns are
    /// nullable, as they may be in a hand-built database.
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.create_schema()?;
        Ok(db)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS chart_facts (
                track_name      TEXT,
                chart_week      TEXT,
                list_position   INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_chart_track ON chart_facts(track_name);

            CREATE TABLE IF NOT EXISTS audio_facts (
                track_name      TEXT,
                artist_name     TEXT,
                popularity      REAL,
                followers       REAL,
                danceability    REAL,
                tempo           REAL,
                energy          REAL,
                valence         REAL,
                loudness        REAL,
                speechiness     REAL
            );

            CREATE INDEX IF NOT EXISTS idx_audio_track ON audio_facts(track_name);
            ",
        )?;
        Ok(())
    }
}
