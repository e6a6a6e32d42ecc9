//! Command handlers for yt-grabber CLI
//!
//! This module implements the command handlers that combine CLI arguments
//! with the loaded configuration and drive the core application components.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::app::{
    create_shutdown_channel, ensure_download_dir, CollectionExpander, Downloader, PlaylistFile,
    SignalHandler, YtDlpProvider,
};
use crate::cli::progress::{enumeration_spinner, format_elapsed};
use crate::cli::{
    ConfigAction, ConfigArgs, DownloadArgs, ExtractArgs, ProgressConfig, ProgressDisplay,
    StatusArgs,
};
use crate::config::{AppConfig, DownloadConfig};
use crate::errors::{AppError, Result};

/// Handle the download command
///
/// Resolves settings (config file, environment, then flags), makes sure the
/// download directory exists, and works through the playlist until it is
/// empty, a download fails, or the user interrupts.
pub async fn handle_download(args: DownloadArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let settings = resolve_download_settings(&config.download, &args);
    let pacing = settings.delay_range()?;
    let playlist = PlaylistFile::new(&settings.playlist_file);

    debug!("Resolved download settings: {:?}", settings);
    ensure_download_dir(&settings.download_dir).await?;

    let provider = Arc::new(
        YtDlpProvider::new(&settings.download_dir, settings.video_quality)
            .with_program(&settings.ytdlp_path),
    );

    if !quiet {
        println!(
            "🚀 Downloading {} into {} (max {})",
            playlist.path().display(),
            settings.download_dir.display(),
            settings.video_quality
        );
        if pacing.is_disabled() {
            println!("   Pacing disabled");
        } else {
            println!(
                "   Pausing {:.1}-{:.1}s between videos",
                pacing.min().as_secs_f64(),
                pacing.max().as_secs_f64()
            );
        }
    }

    // Setup signal handling for graceful shutdown
    let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
    let signal_task = SignalHandler::new(shutdown_tx).setup();

    let mut downloader = Downloader::new(provider, pacing).with_shutdown(shutdown_rx);

    let mut display = (!quiet).then(|| {
        ProgressDisplay::new(ProgressConfig {
            enable_progress_bars: !args.no_progress,
            ..Default::default()
        })
    });
    if let Some(display) = display.as_mut() {
        downloader = downloader.with_events(display.start());
    }

    let result = downloader.run(&playlist).await;

    // Drop the event sender so the display can drain
    drop(downloader);
    if let Some(display) = display.as_mut() {
        display.finish().await;
    }
    signal_task.abort();

    let summary = result?;

    if !quiet {
        if summary.total == 0 {
            println!("ℹ️  No pending videos in {}", playlist.path().display());
        } else {
            println!("\n📊 Download Summary:");
            println!("  Videos downloaded: {}", summary.completed);
            println!("  Time spent waiting: {}", format_elapsed(summary.total_delay()));
            println!("  Total time: {}", format_elapsed(summary.elapsed));
        }
    }

    Ok(())
}

/// Handle the extract command
///
/// Enumerates a playlist or channel and replaces the output file with one
/// watch URL per video.
pub async fn handle_extract(args: ExtractArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    let settings = &config.download;
    let provider = YtDlpProvider::new(&settings.download_dir, settings.video_quality)
        .with_program(&settings.ytdlp_path);

    let expander =
        CollectionExpander::new(&provider, args.kind()).with_transform(args.transform());
    info!(
        "Extracting {} '{}' with {:?} ordering",
        expander.kind(),
        args.reference,
        expander.transform()
    );

    let spinner = (!quiet).then(|| {
        enumeration_spinner(format!("Fetching {} '{}'...", args.kind(), args.reference))
    });
    let result = expander.expand(&args.reference, &args.output).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let summary = result?;

    if !quiet {
        println!("✅ Extraction completed");
        println!("  Source: {}", summary.collection_url);
        println!("  Videos found: {}", summary.written);
        if summary.skipped > 0 {
            println!("  Skipped (no id): {}", summary.skipped);
        }
        println!("  Saved to: {}", summary.output_path.display());
    }

    Ok(())
}

/// Handle the status command
pub async fn handle_status(args: StatusArgs, config: &AppConfig) -> Result<()> {
    let path = args
        .playlist_file
        .clone()
        .unwrap_or_else(|| config.download.playlist_file.clone());
    let playlist = PlaylistFile::new(&path);

    let summary = playlist.summary().await?;
    let header = playlist.header().await?;

    println!("📋 Playlist: {}", path.display());
    if !header.is_empty() {
        for (key, value) in header.iter() {
            println!("  {}: {}", key, value);
        }
    }
    println!("  Pending: {}", summary.pending);
    println!("  Downloaded: {}", summary.downloaded);
    println!(
        "  Completion: {:.1}% of {}",
        summary.completion_percent(),
        summary.total()
    );

    if args.list {
        let pending = playlist.read_pending().await?;
        if !pending.is_empty() {
            println!();
            for (index, url) in pending.iter().enumerate() {
                println!("  {}. {}", index + 1, url);
            }
        }
    }

    Ok(())
}

/// Handle configuration management
pub async fn handle_config(args: ConfigArgs, config_override: Option<PathBuf>) -> Result<()> {
    match args.action {
        ConfigAction::Init { path, force } => match AppConfig::initialize(path, force).await? {
            Some(written) => {
                println!("✅ Wrote configuration to {}", written.display());
            }
            None => {
                println!("ℹ️  Configuration file already exists. Use --force to overwrite.");
            }
        },
        ConfigAction::Show => {
            let config = AppConfig::load(config_override).await?;
            print!("{}", config.to_toml()?);
        }
    }
    Ok(())
}

/// Apply command-line flags on top of the configured download settings
pub fn resolve_download_settings(base: &DownloadConfig, args: &DownloadArgs) -> DownloadConfig {
    let mut settings = base.clone();

    if let Some(path) = &args.playlist_file {
        settings.playlist_file = path.clone();
    }
    if let Some(dir) = &args.download_dir {
        settings.download_dir = dir.clone();
    }
    if let Some(quality) = args.quality {
        settings.video_quality = quality;
    }
    if let Some(seconds) = args.min_delay {
        settings.min_delay = seconds_to_duration(seconds);
    }
    if let Some(seconds) = args.max_delay {
        settings.max_delay = seconds_to_duration(seconds);
    }

    settings
}

fn seconds_to_duration(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}
