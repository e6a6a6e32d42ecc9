//! Application constants for yt-grabber
//!
//! This module centralizes the constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names for settings overrides
pub mod env {
    /// Directory downloaded videos are written to
    pub const DOWNLOAD_DIR: &str = "DOWNLOAD_DIR";

    /// Default playlist file used when none is given on the command line
    pub const PLAYLIST_FILE: &str = "PLAYLIST_FILE";

    /// Video quality ("720" or "1080")
    pub const VIDEO_QUALITY: &str = "VIDEO_QUALITY";

    /// Minimum pause between downloads, in seconds
    pub const MIN_DELAY: &str = "MIN_DELAY";

    /// Maximum pause between downloads, in seconds
    pub const MAX_DELAY: &str = "MAX_DELAY";

    /// Path of the yt-dlp executable
    pub const YTDLP_PATH: &str = "YTDLP_PATH";
}

/// Playlist file format markers
pub mod playlist {
    /// Prefix marking a line as downloaded
    pub const DONE_MARKER: char = '#';

    /// Prefix marking a header (metadata) line
    pub const HEADER_MARKER: char = ':';

    /// Separator between a header key and its value
    pub const HEADER_SEPARATOR: char = '=';

    /// Default playlist file name
    pub const DEFAULT_PLAYLIST_FILE: &str = "playlist.txt";
}

/// YouTube URL templates
pub mod youtube {
    /// Watch URL prefix; the video id is appended
    pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

    /// Playlist URL prefix; the playlist id is appended
    pub const PLAYLIST_URL_PREFIX: &str = "https://www.youtube.com/playlist?list=";

    /// Site root used to build channel URLs
    pub const SITE_ROOT: &str = "https://www.youtube.com";

    /// Prefix shared by canonical channel ids
    pub const CHANNEL_ID_PREFIX: &str = "UC";

    /// Length of a canonical channel id, prefix included
    pub const CHANNEL_ID_LEN: usize = 24;

    /// Channel tab listing uploads
    pub const CHANNEL_VIDEOS_TAB: &str = "videos";
}

/// External fetch program settings
pub mod ytdlp {
    /// Default executable name, resolved through PATH
    pub const DEFAULT_PROGRAM: &str = "yt-dlp";

    /// Output filename template inside the download directory
    pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

    /// Container used when merging separate video and audio streams
    pub const MERGE_OUTPUT_FORMAT: &str = "mp4";

    /// Printed after the file is moved into place: id, title, final path
    pub const FETCH_PRINT_TEMPLATE: &str = "after_move:%(id)s\t%(title)s\t%(filepath)s";

    /// Field separator used in [`FETCH_PRINT_TEMPLATE`]
    pub const FETCH_PRINT_SEPARATOR: char = '\t';
}

/// Download pacing defaults
pub mod pacing {
    use super::Duration;

    /// Default minimum pause between downloads
    pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(2);

    /// Default maximum pause between downloads
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Fresh temp names tried before giving up on an atomic write
    pub const TEMP_FILE_ATTEMPTS: usize = 16;

    /// Default download directory
    pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "yt-grabber.toml";

    /// Directory name under the user config directory
    pub const CONFIG_DIR_NAME: &str = "yt-grabber";

    /// Configuration file name under [`CONFIG_DIR_NAME`]
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

// Re-export commonly used constants for convenience
pub use files::TEMP_FILE_SUFFIX;
pub use playlist::{DONE_MARKER, HEADER_MARKER};
