//! Core application logic for yt-grabber
//!
//! This module contains the playlist file store, the fetch provider
//! abstraction with its yt-dlp adapter, the sequential download loop and the
//! collection extractor.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use yt_grabber::app::{
//!     CollectionExpander, CollectionKind, DelayRange, Downloader, PlaylistFile, VideoQuality,
//!     YtDlpProvider,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(YtDlpProvider::new("downloads", VideoQuality::P1080));
//!
//! // Turn a playlist into a queue file
//! let expander = CollectionExpander::new(provider.as_ref(), CollectionKind::Playlist);
//! expander.expand("PLxxxxxxxx", Path::new("playlist.txt")).await?;
//!
//! // Work through it
//! let mut downloader = Downloader::new(provider, DelayRange::default());
//! downloader.run(&PlaylistFile::new("playlist.txt")).await?;
//! # Ok(())
//! # }
//! ```

pub mod downloader;
pub mod extractor;
pub mod fetcher;
pub mod playlist;

// Re-export main public API
pub use downloader::{
    create_shutdown_channel, ensure_download_dir, DelayRange, DownloadEvent, Downloader,
    RunSummary, SignalHandler,
};
pub use extractor::{
    watch_url, CollectionExpander, CollectionKind, ExpansionSummary, UrlTransform,
};
pub use fetcher::{FetchProvider, FetchedVideo, FlatEntry, FlatListing, VideoQuality, YtDlpProvider};
pub use playlist::{LineKind, PlaylistFile, PlaylistHeader, PlaylistSummary, QueueEntry};
