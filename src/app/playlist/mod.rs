//! Playlist file: the durable download queue
//!
//! A playlist file is plain text, one entry per line:
//!
//! ```text
//! : title=Conference talks                      (header, ignored by downloads)
//! https://www.youtube.com/watch?v=aaaaaaaaaaa   (pending)
//! # https://www.youtube.com/watch?v=bbbbbbbbbbb (downloaded)
//! ```
//!
//! Downloads consume pending lines in order and prefix each one with `# ` as
//! soon as it completes, so the file always reflects durable progress.
//!
//! # Example
//!
//! ```rust,no_run
//! use yt_grabber::app::playlist::PlaylistFile;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let playlist = PlaylistFile::new("playlist.txt");
//! for url in playlist.read_pending().await? {
//!     // ... fetch the video ...
//!     playlist.mark_done(&url).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod store;
pub mod types;

pub use store::{write_atomic, PlaylistFile};
pub use types::{LineKind, PlaylistHeader, PlaylistSummary, QueueEntry};
