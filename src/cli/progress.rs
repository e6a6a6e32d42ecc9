//! Progress display for download runs
//!
//! Consumes the [`DownloadEvent`]s emitted by the download loop and renders
//! them with indicatif. When stderr is not a terminal, or bars are disabled,
//! a plain line per event is written instead.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use yt_grabber::app::{DelayRange, Downloader, PlaylistFile, VideoQuality, YtDlpProvider};
//! use yt_grabber::cli::{ProgressConfig, ProgressDisplay};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut display = ProgressDisplay::new(ProgressConfig::default());
//! let events = display.start();
//!
//! let provider = Arc::new(YtDlpProvider::new("downloads", VideoQuality::P720));
//! let mut downloader = Downloader::new(provider, DelayRange::default()).with_events(events);
//! let result = downloader.run(&PlaylistFile::new("playlist.txt")).await;
//!
//! // The display stops once every event sender is gone
//! drop(downloader);
//! display.finish().await;
//! # result?;
//! # Ok(())
//! # }
//! ```

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::DownloadEvent;

/// Configuration for progress display
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Enable visual progress bars
    pub enable_progress_bars: bool,
    /// Maximum width for URLs in the bar message
    pub max_url_width: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enable_progress_bars: true,
            max_url_width: 48,
        }
    }
}

/// Renders download events until the event channel closes
pub struct ProgressDisplay {
    config: ProgressConfig,
    update_task: Option<JoinHandle<()>>,
    is_terminal: bool,
}

impl ProgressDisplay {
    /// Create a new progress display with the given configuration
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            config,
            update_task: None,
            is_terminal: std::io::stderr().is_terminal(),
        }
    }

    /// Whether bars (rather than text lines) will be drawn
    pub fn uses_bars(&self) -> bool {
        self.config.enable_progress_bars && self.is_terminal
    }

    /// Start rendering and return the sender to hand to the downloader
    pub fn start(&mut self) -> mpsc::UnboundedSender<DownloadEvent> {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let config = self.config.clone();
        let use_bars = self.uses_bars();

        let update_task = tokio::spawn(async move {
            let mut bar: Option<ProgressBar> = None;
            while let Some(event) = event_rx.recv().await {
                if use_bars {
                    handle_bar_event(&event, &mut bar, &config);
                } else if let Some(line) = describe_event(&event, &config) {
                    eprintln!("{}", line);
                }
            }
            if let Some(bar) = bar {
                if !bar.is_finished() {
                    bar.abandon();
                }
            }
        });

        self.update_task = Some(update_task);
        debug!("Progress display started (bars: {})", use_bars);
        event_tx
    }

    /// Wait for the display to drain its events
    ///
    /// Every sender returned by [`start`](Self::start) must be dropped first.
    pub async fn finish(&mut self) {
        if let Some(task) = self.update_task.take() {
            let _ = task.await;
        }
    }
}

/// Spinner shown while a collection is being enumerated
pub fn enumeration_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

fn handle_bar_event(event: &DownloadEvent, bar: &mut Option<ProgressBar>, config: &ProgressConfig) {
    match event {
        DownloadEvent::RunStarted { total } => {
            let pb = ProgressBar::new(*total as u64);
            pb.set_style(bar_style());
            pb.enable_steady_tick(Duration::from_millis(120));
            *bar = Some(pb);
        }
        DownloadEvent::ItemStarted { url, .. } => {
            if let Some(pb) = bar {
                pb.set_message(format!("📥 {}", truncate_url(url, config.max_url_width)));
            }
        }
        DownloadEvent::ItemCompleted { video, .. } => {
            if let Some(pb) = bar {
                pb.inc(1);
                pb.println(format!("✅ {}", video.title));
            }
        }
        DownloadEvent::Waiting { delay } => {
            if let Some(pb) = bar {
                pb.set_message(format!("⏳ waiting {:.1}s", delay.as_secs_f64()));
            }
        }
        DownloadEvent::RunFinished { completed, elapsed } => {
            if let Some(pb) = bar {
                pb.finish_with_message(format!(
                    "✅ {} videos in {}",
                    completed,
                    format_elapsed(*elapsed)
                ));
            }
        }
    }
}

/// Text line for an event in non-terminal mode
fn describe_event(event: &DownloadEvent, config: &ProgressConfig) -> Option<String> {
    match event {
        DownloadEvent::RunStarted { total } => {
            Some(format!("Starting download of {} videos...", total))
        }
        DownloadEvent::ItemStarted {
            position,
            total,
            url,
        } => Some(format!(
            "[{}/{}] {}",
            position,
            total,
            truncate_url(url, config.max_url_width)
        )),
        DownloadEvent::ItemCompleted {
            video, elapsed, ..
        } => Some(format!(
            "    saved {} ({:.1}s)",
            video.local_filename.display(),
            elapsed.as_secs_f64()
        )),
        DownloadEvent::Waiting { .. } => None,
        DownloadEvent::RunFinished { completed, elapsed } => Some(format!(
            "Download completed: {} videos in {}",
            completed,
            format_elapsed(*elapsed)
        )),
    }
}

/// Shorten a URL to `max_width` characters, keeping its tail
fn truncate_url(url: &str, max_width: usize) -> String {
    let length = url.chars().count();
    if length <= max_width || max_width <= 3 {
        return url.to_string();
    }
    let tail: String = url.chars().skip(length - (max_width - 3)).collect();
    format!("...{}", tail)
}

/// Human-readable `1h 02m 03s` style duration
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}
