pub mod audio;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod db;
pub mod loader;
pub mod peers;
pub mod ranking;
pub mod series;
pub mod week;
pub mod years;

pub use audio::AudioFeature;
pub use context::ChartContext;
pub use loader::DataSource;

/// Application name for XDG paths
pub const APP_NAME: &str = "chartscope";
