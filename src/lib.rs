//! yt-grabber Library
//!
//! Maintains a plain-text queue of video URLs and works through it with
//! yt-dlp, one video at a time, marking each entry as soon as it is saved.
//! Playlists and channels can be expanded into a fresh queue file.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
