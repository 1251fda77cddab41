use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::audio::AudioFeature;
use crate::loader::DataSource;
use crate::ranking::DEFAULT_TOP_N;

/// Application configuration loaded from TOML config file.
/// Every field has a default, so the file is optional.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Weekly chart CSV (`name`, `chart_week`, `list_position`).
    pub chart_csv: Option<PathBuf>,
    /// Track/artist audio-feature CSV (`name_x`, `name_y`, ...).
    pub audio_csv: Option<PathBuf>,
    /// SQLite database with `chart_facts` and `audio_facts` tables.
    /// Used when no CSV pair is configured.
    pub db_path: Option<PathBuf>,
    /// Feature used for the peer comparison when none is selected.
    pub default_feature: AudioFeature,
    /// Length of the top-tracks list.
    pub top_n: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chart_csv: None,
            audio_csv: None,
            db_path: None,
            default_feature: AudioFeature::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/chartscope/config.toml`.
    /// Returns default config if file doesn't exist.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                return Self::default();
            }
        };
        match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    /// Pick the data source: CSV pair first, then the database.
    /// CLI arguments override their config counterparts.
    pub fn resolve_source(
        &self,
        chart_csv: Option<PathBuf>,
        audio_csv: Option<PathBuf>,
        db_path: Option<PathBuf>,
    ) -> Option<DataSource> {
        let chart = chart_csv.or_else(|| self.chart_csv.clone());
        let audio = audio_csv.or_else(|| self.audio_csv.clone());
        if let (Some(chart), Some(audio)) = (chart, audio) {
            return Some(DataSource::Csv { chart, audio });
        }
        db_path
            .or_else(|| self.db_path.clone())
            .map(DataSource::Sqlite)
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
