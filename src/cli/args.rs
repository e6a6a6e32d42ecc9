//! Command-line argument parsing for yt-grabber
//!
//! This module defines the CLI structure using clap derive macros: working
//! through a playlist file, expanding playlists and channels into playlist
//! files, inspecting queue status, and managing the configuration file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::{CollectionKind, UrlTransform, VideoQuality};

/// yt-grabber - Work through a queue of video URLs with yt-dlp
#[derive(Parser, Debug)]
#[command(
    name = "yt-grabber",
    version,
    about = "Download videos listed in a playlist file, one at a time",
    long_about = "Downloads the videos listed in a plain-text playlist file with yt-dlp.
Each entry is marked with '#' as soon as it is saved, so an interrupted run resumes where it stopped.
Playlists and channels can be expanded into a playlist file with the extract command."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every pending video in a playlist file
    Download(DownloadArgs),

    /// Write the videos of a playlist or channel to a playlist file
    Extract(ExtractArgs),

    /// Show pending and downloaded counts for a playlist file
    Status(StatusArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the download command
#[derive(Args, Debug, Clone, Default)]
pub struct DownloadArgs {
    /// Playlist file to work through (defaults to the configured playlist)
    #[arg(value_name = "PLAYLIST_FILE")]
    pub playlist_file: Option<PathBuf>,

    /// Minimum pause between downloads, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub min_delay: Option<f64>,

    /// Maximum pause between downloads, in seconds (0 disables pacing)
    #[arg(long, value_name = "SECONDS")]
    pub max_delay: Option<f64>,

    /// Maximum video quality: 720 or 1080
    #[arg(long, value_name = "QUALITY")]
    pub quality: Option<VideoQuality>,

    /// Directory videos are saved to
    #[arg(short, long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the extract command
#[derive(Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// Playlist or channel URL, or a bare playlist id, channel id or @handle
    #[arg(value_name = "REFERENCE")]
    pub reference: String,

    /// Playlist file to write (replaced if it exists)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Treat the reference as a channel instead of a playlist
    #[arg(long)]
    pub channel: bool,

    /// Write videos in reverse listing order
    #[arg(long, conflicts_with = "keep_order")]
    pub reverse: bool,

    /// Write videos in listing order, even for channels
    #[arg(long)]
    pub keep_order: bool,
}

/// Arguments for the status command
#[derive(Args, Debug, Clone, Default)]
pub struct StatusArgs {
    /// Playlist file to inspect (defaults to the configured playlist)
    #[arg(value_name = "PLAYLIST_FILE")]
    pub playlist_file: Option<PathBuf>,

    /// List the pending URLs
    #[arg(short, long)]
    pub list: bool,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a commented default configuration file
    Init {
        /// Where to write the file (defaults to the user config directory)
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level requested by global flags, if any
    ///
    /// `None` means the configured level applies.
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

impl DownloadArgs {
    /// Check delay flags for obviously invalid values
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("--min-delay", self.min_delay), ("--max-delay", self.max_delay)] {
            if let Some(seconds) = value {
                if !seconds.is_finite() || seconds < 0.0 {
                    return Err(format!("{} must be zero or a positive number", name));
                }
            }
        }

        if let (Some(min), Some(max)) = (self.min_delay, self.max_delay) {
            if max > 0.0 && min > max {
                return Err(format!(
                    "--min-delay ({}) cannot exceed --max-delay ({})",
                    min, max
                ));
            }
        }

        Ok(())
    }
}

impl ExtractArgs {
    /// Collection kind selected by `--channel`
    pub fn kind(&self) -> CollectionKind {
        if self.channel {
            CollectionKind::Channel
        } else {
            CollectionKind::Playlist
        }
    }

    /// Ordering selected by `--reverse`/`--keep-order`, else the kind's default
    pub fn transform(&self) -> UrlTransform {
        if self.reverse {
            UrlTransform::Reverse
        } else if self.keep_order {
            UrlTransform::Identity
        } else {
            self.kind().default_transform()
        }
    }
}
