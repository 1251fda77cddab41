use anyhow::{Context, Result};
use chartscope::dashboard::{self, Selection, SelectionRequest};
use chartscope::db::models::{
    ArtistRow, FeatureSnapshot, PeerPoint, PositionSample, TopTrackEntry, YearTrackCount,
};
use chartscope::{AudioFeature, ChartContext};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chartscope", version, about = "Weekly chart explorer")]
struct Cli {
    /// Weekly chart CSV (name, chart_week, list_position)
    #[arg(long, global = true)]
    chart: Option<PathBuf>,

    /// Track/artist audio-feature CSV (name_x, name_y, popularity, ...)
    #[arg(long, global = true)]
    audio: Option<PathBuf>,

    /// SQLite database with chart_facts and audio_facts tables
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List years with chart data
    Years,

    /// Show the tracks with the most chart weeks in a year
    Top {
        /// Chart year (defaults to the most recent)
        #[arg(short, long)]
        year: Option<i32>,

        /// Number of results (defaults to config top_n)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show a track's chart-position history
    Series {
        /// Exact track name
        track: String,
    },

    /// Show a track's artists and audio features
    Track {
        /// Exact track name
        track: String,
    },

    /// Compare every track of a year along one audio feature
    Peers {
        /// Chart year (defaults to the most recent)
        #[arg(short, long)]
        year: Option<i32>,

        /// Audio feature to compare (defaults to config default_feature)
        #[arg(short, long, value_enum)]
        feature: Option<AudioFeature>,

        /// Track to highlight (defaults to the year's top track)
        #[arg(short, long)]
        track: Option<String>,
    },

    /// Print every view for one selection
    Dashboard {
        /// Chart year (defaults to the most recent)
        #[arg(short, long)]
        year: Option<i32>,

        /// Selected track (defaults to the year's top track)
        #[arg(short, long)]
        track: Option<String>,

        /// Peer comparison feature
        #[arg(short, long, value_enum)]
        feature: Option<AudioFeature>,

        /// Emit JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Show row counts of the loaded tables
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = chartscope::config::AppConfig::load();

    // Resolve data source: CLI > config
    let source = config
        .resolve_source(cli.chart, cli.audio, cli.db_path)
        .context("No data source. Pass --chart and --audio, or --db-path, or set them in config.")?;
    log::info!("Source: {:?}", source);

    let ctx = ChartContext::load(&source).context("Failed to load chart data")?;

    match cli.command {
        Commands::Years => {
            let years = ctx.available_years();
            if years.is_empty() {
                println!("No dated chart rows.");
                return Ok(());
            }
            for y in years {
                println!("{y}");
            }
        }

        Commands::Top { year, limit } => {
            let Some(year) = year.or_else(|| ctx.latest_year()) else {
                println!("No dated chart rows.");
                return Ok(());
            };
            let results = ctx.top_tracks(year, limit.unwrap_or(config.top_n));
            if results.is_empty() {
                println!("No tracks charted in {year}.");
                return Ok(());
            }
            println!("Top {} tracks for {}:", results.len(), year);
            println!();
            print_top_table(&results);
        }

        Commands::Series { track } => {
            let series = ctx.track_position_series(&track);
            if series.is_empty() {
                println!("No chart weeks for \"{track}\".");
                return Ok(());
            }
            println!("Performance of \"{track}\":");
            println!();
            print_series_table(&series);
        }

        Commands::Track { track } => {
            let artists = ctx.track_artists(&track);
            if artists.is_empty() {
                println!("No artist or audio data for \"{track}\".");
                return Ok(());
            }
            println!("Track info: \"{track}\"");
            println!();
            print_artist_table(&artists);
            if let Some(snapshot) = ctx.track_feature_snapshot(&track) {
                println!();
                print_kpis(&snapshot);
            }
        }

        Commands::Peers { year, feature, track } => {
            let request = SelectionRequest { year, track, feature };
            let sel = Selection::resolve(&ctx, &request, config.default_feature);
            let Some(year) = sel.year else {
                println!("No dated chart rows.");
                return Ok(());
            };
            let selected = sel.track.as_deref().unwrap_or_default();
            let points = ctx.peer_comparison(year, sel.feature, selected);
            if points.is_empty() {
                println!("No tracks charted in {year}.");
                return Ok(());
            }
            println!("{} distribution for tracks in {}:", sel.feature.label(), year);
            println!();
            print_peer_table(&points, sel.feature);
        }

        Commands::Dashboard { year, track, feature, json } => {
            let request = SelectionRequest { year, track, feature };
            let view =
                dashboard::dashboard_for(&ctx, &request, config.default_feature, config.top_n);

            if json {
                let out =
                    serde_json::to_string_pretty(&view).context("Failed to encode view")?;
                println!("{out}");
                return Ok(());
            }

            let Some(year) = view.selection.year else {
                println!("No dated chart rows.");
                return Ok(());
            };
            println!("Top {} tracks for {}:", view.top_tracks.len(), year);
            println!();
            if view.top_tracks.is_empty() {
                println!("No tracks charted in {year}.");
                return Ok(());
            }
            print_top_table(&view.top_tracks);
            println!();
            println!("Top {} Tracks for {}", view.sidebar_top.len(), year);
            println!();
            print_sidebar_table(&view.sidebar_top);

            let Some(track) = view.selection.track.as_deref() else {
                return Ok(());
            };
            println!();
            println!("Track info: \"{track}\"");
            println!();
            if view.artists.is_empty() {
                println!("No artist data.");
            } else {
                print_artist_table(&view.artists);
            }
            println!();
            println!("Performance of \"{track}\":");
            println!();
            if view.position_series.is_empty() {
                println!("No chart weeks.");
            } else {
                print_series_table(&view.position_series);
            }
            if let Some(snapshot) = &view.features {
                println!();
                print_kpis(snapshot);
            }
            println!();
            let label = view.selection.feature.label();
            println!("{label} distribution for tracks in {year}:");
            println!();
            print_peer_table(&view.peers, view.selection.feature);
        }

        Commands::Stats => {
            let report = ctx.report();
            println!("Chart Data");
            println!("==========");
            println!("Chart rows:         {}", report.chart_rows);
            println!("  without a week:   {}", report.chart_rows_without_week);
            println!("  skipped on load:  {}", report.chart_rows_skipped);
            println!("Audio rows:         {}", report.audio_rows);
            println!("  skipped on load:  {}", report.audio_rows_skipped);

            let years = ctx.available_years();
            if let (Some(first), Some(last)) = (years.first(), years.last()) {
                println!("Years:              {first}-{last} ({} years)", years.len());
            }
        }
    }

    Ok(())
}

/// Truncate long titles to fit a column.
fn fit(title: &str, width: usize) -> String {
    if title.chars().count() > width {
        let cut: String = title.chars().take(width - 3).collect();
        format!("{cut}...")
    } else {
        title.to_string()
    }
}

fn print_top_table(entries: &[TopTrackEntry]) {
    println!("{:>3}  {:<40} {:>10}", "#", "Track", "# of Weeks");
    println!("{}", "-".repeat(55));
    for (i, e) in entries.iter().enumerate() {
        println!("{:>3}  {:<40} {:>10}", i + 1, fit(&e.track_name, 40), e.appearance_count);
    }
}

fn print_sidebar_table(counts: &[YearTrackCount]) {
    println!("{:<6} {:<40} {:>10}", "Year", "Track", "# of Weeks");
    println!("{}", "-".repeat(58));
    for c in counts {
        println!("{:<6} {:<40} {:>10}", c.year, fit(&c.track_name, 40), c.appearance_count);
    }
}

fn print_series_table(series: &[PositionSample]) {
    println!("{:<12} {:>13}", "Chart Week", "List Position");
    println!("{}", "-".repeat(26));
    for s in series {
        let week = s.chart_week.format("%Y-%m-%d").to_string();
        println!("{:<12} {:>13.1}", week, s.mean_list_position);
    }
    if let Some(peak) = chartscope::series::peak_position(series) {
        println!();
        println!("{} weeks charted, peak position {:.1}", series.len(), peak);
    }
}

fn print_artist_table(artists: &[ArtistRow]) {
    println!("{:<30} {:>10} {:>14}", "Artist", "Popularity", "Followers");
    println!("{}", "-".repeat(56));
    for a in artists {
        println!(
            "{:<30} {:>10.0} {:>14.0}",
            fit(&a.artist_name, 30),
            a.popularity,
            a.followers
        );
    }
}

fn print_kpis(snapshot: &FeatureSnapshot) {
    let kpis = snapshot.kpis();
    let header: Vec<String> = kpis.iter().map(|(label, _)| format!("{label:>12}")).collect();
    let values: Vec<String> = kpis.iter().map(|(_, v)| format!("{v:>12.2}")).collect();
    println!("{}", header.join(" "));
    println!("{}", values.join(" "));
}

fn print_peer_table(points: &[PeerPoint], feature: AudioFeature) {
    println!(
        "{:<3}{:<40} {:>12} {:>10} {:>6}",
        "",
        "Track",
        feature.label(),
        "Mean Pos",
        "Size"
    );
    println!("{}", "-".repeat(75));
    for p in points {
        let marker = if p.is_selected { "*" } else { "" };
        let value = match p.mean_feature_value {
            Some(v) => format!("{v:.2}"),
            None => "-".to_string(),
        };
        println!(
            "{:<3}{:<40} {:>12} {:>10.2} {:>6.1}",
            marker,
            fit(&p.track_name, 40),
            value,
            p.mean_list_position,
            p.marker_size,
        );
    }

    println!();
    match chartscope::peers::selected_point(points) {
        Some(p) => println!("* = {} (selected)", p.track_name),
        None => println!("Selected track did not chart this year."),
    }
}
