//! Prelude module for yt-grabber Library
//!
//! Re-exports the items most integrations need, so a single
//! `use yt_grabber::prelude::*;` is enough for typical usage.
//!
//! # Usage
//!
//! ```rust,no_run
//! use yt_grabber::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let provider = Arc::new(YtDlpProvider::new("downloads", VideoQuality::P720));
//!     let mut downloader = Downloader::new(provider, DelayRange::default());
//!     downloader.run(&PlaylistFile::new("playlist.txt")).await?;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential app components
pub use crate::app::{
    CollectionExpander, CollectionKind, DelayRange, DownloadEvent, Downloader, FetchProvider,
    FetchedVideo, FlatListing, PlaylistFile, PlaylistSummary, RunSummary, UrlTransform,
    VideoQuality, YtDlpProvider,
};

// Configuration
pub use crate::config::AppConfig;

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

pub use tokio;
