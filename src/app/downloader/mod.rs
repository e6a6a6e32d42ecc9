//! Sequential download loop
//!
//! The [`Downloader`] walks the pending entries of a playlist file in order,
//! hands each URL to a [`FetchProvider`], and marks the entry as downloaded
//! immediately after a successful fetch. Between downloads it pauses for a
//! random duration drawn from a [`DelayRange`].
//!
//! # Failure semantics
//!
//! - **Fail-fast**: the first failed fetch aborts the whole run; later entries
//!   are not attempted and the failed entry stays pending
//! - **Durable progress**: every completed entry is written to the playlist
//!   before the next one starts
//! - **Interruptible**: a shutdown signal stops the run during a fetch or a
//!   pause, leaving already-marked entries intact
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use yt_grabber::app::downloader::{DelayRange, Downloader};
//! use yt_grabber::app::fetcher::{VideoQuality, YtDlpProvider};
//! use yt_grabber::app::playlist::PlaylistFile;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(YtDlpProvider::new("downloads", VideoQuality::P720));
//! let pacing = DelayRange::from_secs_f64(2.0, 5.0)?;
//! let mut downloader = Downloader::new(provider, pacing);
//!
//! let summary = downloader.run(&PlaylistFile::new("playlist.txt")).await?;
//! println!("Downloaded {} videos", summary.completed);
//! # Ok(())
//! # }
//! ```

pub mod pacing;
pub mod signals;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::app::fetcher::{FetchProvider, FetchedVideo};
use crate::app::playlist::PlaylistFile;
use crate::errors::{DownloadError, DownloadResult};

pub use pacing::DelayRange;
pub use signals::{create_shutdown_channel, shutdown_requested, SignalHandler};

/// Progress notifications emitted during a run
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    /// Pending entries were read; `total` will be attempted
    RunStarted { total: usize },
    /// A fetch is starting
    ItemStarted {
        position: usize,
        total: usize,
        url: String,
    },
    /// A fetch succeeded and the entry was marked in the playlist
    ItemCompleted {
        position: usize,
        total: usize,
        url: String,
        video: FetchedVideo,
        elapsed: Duration,
    },
    /// Pausing before the next fetch
    Waiting { delay: Duration },
    /// Every entry completed
    RunFinished { completed: usize, elapsed: Duration },
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Pending entries found at the start of the run
    pub total: usize,
    /// Entries downloaded and marked
    pub completed: usize,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Pauses taken between downloads, in order
    pub delays: Vec<Duration>,
}

impl RunSummary {
    /// Sum of all pauses
    pub fn total_delay(&self) -> Duration {
        self.delays.iter().sum()
    }
}

/// Drives a playlist through a fetch provider, one entry at a time
pub struct Downloader {
    provider: Arc<dyn FetchProvider>,
    pacing: DelayRange,
    rng: StdRng,
    events: Option<mpsc::UnboundedSender<DownloadEvent>>,
    shutdown: Option<broadcast::Receiver<()>>,
}

impl Downloader {
    /// Create a downloader with an entropy-seeded random source
    pub fn new(provider: Arc<dyn FetchProvider>, pacing: DelayRange) -> Self {
        Self {
            provider,
            pacing,
            rng: StdRng::from_entropy(),
            events: None,
            shutdown: None,
        }
    }

    /// Replace the random source used for pacing
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Send progress events to `events`
    pub fn with_events(mut self, events: mpsc::UnboundedSender<DownloadEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Stop the run when `shutdown` fires
    pub fn with_shutdown(mut self, shutdown: broadcast::Receiver<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn pacing(&self) -> DelayRange {
        self.pacing
    }

    /// Download every pending entry of `playlist`
    ///
    /// An empty playlist is not an error: the run completes with zero work.
    ///
    /// # Errors
    ///
    /// * `DownloadError::Playlist` if the playlist is missing or cannot be updated
    /// * `DownloadError::Fetch` for the first entry that fails, naming its position
    /// * `DownloadError::Interrupted` if shutdown was requested
    pub async fn run(&mut self, playlist: &PlaylistFile) -> DownloadResult<RunSummary> {
        let start_time = Instant::now();
        let urls = playlist.read_pending().await?;
        let total = urls.len();

        let mut summary = RunSummary {
            total,
            ..RunSummary::default()
        };

        if urls.is_empty() {
            warn!("No URLs to download");
            summary.elapsed = start_time.elapsed();
            return Ok(summary);
        }

        info!("Starting download of {} videos", total);
        self.emit(DownloadEvent::RunStarted { total });

        for (index, url) in urls.iter().enumerate() {
            let position = index + 1;
            info!("Progress: {}/{}", position, total);
            self.emit(DownloadEvent::ItemStarted {
                position,
                total,
                url: url.clone(),
            });

            let item_start = Instant::now();
            let fetched = until_shutdown(self.shutdown.as_mut(), self.provider.fetch(url))
                .await
                .ok_or(DownloadError::Interrupted { position, total })?;

            let video = match fetched {
                Ok(video) => video,
                Err(source) => {
                    error!("Error downloading video {}/{}: {}", position, total, source);
                    error!("Stopping download process due to error");
                    return Err(DownloadError::Fetch {
                        url: url.clone(),
                        position,
                        total,
                        source,
                    });
                }
            };

            playlist.mark_done(url).await?;
            summary.completed += 1;
            self.emit(DownloadEvent::ItemCompleted {
                position,
                total,
                url: url.clone(),
                video,
                elapsed: item_start.elapsed(),
            });

            if position < total {
                if let Some(delay) = self.pacing.sample(&mut self.rng) {
                    info!(
                        "Waiting {:.2} seconds before next download...",
                        delay.as_secs_f64()
                    );
                    self.emit(DownloadEvent::Waiting { delay });
                    until_shutdown(self.shutdown.as_mut(), tokio::time::sleep(delay))
                        .await
                        .ok_or(DownloadError::Interrupted {
                            position: position + 1,
                            total,
                        })?;
                    summary.delays.push(delay);
                }
            }
        }

        summary.elapsed = start_time.elapsed();
        info!("All {} videos downloaded successfully!", total);
        self.emit(DownloadEvent::RunFinished {
            completed: summary.completed,
            elapsed: summary.elapsed,
        });
        Ok(summary)
    }

    fn emit(&self, event: DownloadEvent) {
        if let Some(events) = &self.events {
            // A dropped receiver only means nobody is watching.
            let _ = events.send(event);
        }
    }
}

/// Await `future` unless shutdown is requested first
async fn until_shutdown<F: Future>(
    shutdown: Option<&mut broadcast::Receiver<()>>,
    future: F,
) -> Option<F::Output> {
    match shutdown {
        Some(shutdown_rx) => tokio::select! {
            biased;
            output = future => Some(output),
            _ = shutdown_requested(shutdown_rx) => None,
        },
        None => Some(future.await),
    }
}

/// Create the download directory (and parents) if it does not exist
pub async fn ensure_download_dir(path: &Path) -> DownloadResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| DownloadError::DownloadDir {
            path: path.to_path_buf(),
            source,
        })
}
