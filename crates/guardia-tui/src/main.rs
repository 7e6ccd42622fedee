mod action;
mod app;
mod app_state;
mod component;
mod components;
mod logging;
mod mpv;
mod theme;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use guardia_core::catalog::{format_duration, format_file_size, load_catalog, CatalogSource, Stats};
use guardia_core::config::Config;
use guardia_core::platform;
use guardia_core::prefs::PreferenceStore;
use guardia_core::storage::JsonFileStore;
use tokio::sync::mpsc;

use crate::mpv::{MpvDriver, MpvSession};

#[derive(Parser, Debug)]
#[command(name = "enguardia", version, about = "Browse and play En Guàrdia episodes")]
struct Cli {
    /// Catalog location: an http(s) base URL or a local directory.
    #[arg(long)]
    catalog: Option<String>,

    /// Config file to use instead of the default.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Print catalog statistics and exit.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("enguardia.log");

    let (status_tx, status_rx) = mpsc::unbounded_channel();
    logging::init(&log_path, status_tx)?;
    eprintln!("enguardia log: {}", log_path.display());
    tracing::info!("enguardia starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("config load failed, using defaults: {}", e);
            Config::default()
        }),
    };
    let source = CatalogSource::parse(cli.catalog.as_deref().unwrap_or(&config.catalog.source));

    if let Some(CliCommand::Stats) = cli.command {
        let catalog = load_catalog(&source).await?;
        print_stats(&catalog.config.title, &catalog.stats);
        return Ok(());
    }

    // ── Media backend ────────────────────────────────────────────────────────
    let mut driver = MpvDriver::new(Some(config.player.mpv_socket.as_str()), config.player.default_volume);
    let media = match MpvSession::start(&mut driver).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("mpv unavailable, playback disabled: {}", e);
            MpvSession::disconnected()
        }
    };

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let prefs = PreferenceStore::load(JsonFileStore::open(config.storage.prefs_file.clone()));
    let mut app = app::App::new(
        prefs,
        media,
        source,
        Duration::from_millis(config.ui.search_debounce_ms),
    );
    app.player_mut().set_volume(config.player.default_volume as f64);

    let result = app.run(status_rx).await;
    driver.kill().await;
    tracing::info!("enguardia exiting");
    result
}

fn print_stats(title: &str, stats: &Stats) {
    println!("{}", title);
    println!("  episodes:    {} ({} available)", stats.total_episodes, stats.available_count);
    println!(
        "  duration:    {} ({})",
        format_duration(stats.total_seconds),
        stats.total_duration
    );
    println!("  dates:       {} → {}", stats.date_range.earliest, stats.date_range.latest);
    if !stats.categories.is_empty() {
        println!("  categories:  {}", stats.categories.join(", "));
    }
    if !stats.audio_formats.is_empty() {
        println!("  formats:     {}", stats.audio_formats.join(", "));
    }
    println!("  media size:  {}", format_file_size(stats.total_file_size));
    if !stats.last_updated.is_empty() {
        println!("  updated:     {}", stats.last_updated);
    }
}
