//! Error types for yt-grabber
//!
//! This module defines the error types for every component of the application.
//! Each domain (playlist file, fetch provider, download run, collection
//! extraction, configuration) has its own enum, and [`AppError`] wraps them for
//! the command-line layer.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Playlist file (queue store) errors
#[derive(Error, Debug)]
pub enum PlaylistError {
    /// Playlist file does not exist
    #[error("Playlist file not found: {path}")]
    NotFound { path: PathBuf },

    /// No pending line matches the URL being marked
    #[error("URL not found in playlist {path}: {url}")]
    EntryNotFound { url: String, path: PathBuf },

    /// I/O error while reading the playlist
    #[error("Failed to read playlist file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while writing the playlist back to disk
    #[error("Failed to write playlist file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Content-fetch provider errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// The external fetch program could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external fetch program exited unsuccessfully
    #[error("{program} failed for {url} (exit status {status:?}): {stderr}")]
    CommandFailed {
        program: String,
        url: String,
        status: Option<i32>,
        stderr: String,
    },

    /// The external fetch program produced output we could not interpret
    #[error("Unexpected output for {url}: {reason}")]
    InvalidOutput { url: String, reason: String },

    /// Generic provider failure
    #[error("{0}")]
    Other(String),
}

/// Retrieval run errors
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The playlist could not be read or updated
    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    /// A single item failed; the run stopped at this position
    #[error("Failed to download video {position}/{total} ({url})")]
    Fetch {
        url: String,
        position: usize,
        total: usize,
        #[source]
        source: FetchError,
    },

    /// The run was stopped by a shutdown signal
    #[error("Download interrupted at video {position}/{total}")]
    Interrupted { position: usize, total: usize },

    /// Pacing bounds are inconsistent
    #[error("Invalid delay range: minimum {min:?} exceeds maximum {max:?}")]
    InvalidDelayRange { min: Duration, max: Duration },

    /// Download directory could not be prepared
    #[error("Cannot use download directory {path}")]
    DownloadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Collection (playlist/channel) extraction errors
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The collection listing had no usable members
    #[error("No videos found in collection: {url}")]
    EmptyCollection { url: String },

    /// The reference string is empty or unusable
    #[error("Invalid collection reference: {reference:?}")]
    InvalidReference { reference: String },

    /// Enumeration through the fetch provider failed
    #[error("Failed to enumerate collection")]
    Fetch(#[from] FetchError),

    /// Output file could not be written
    #[error("Failed to write URL list to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format in {path}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Configuration could not be serialized
    #[error("Failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),

    /// User configuration directory unknown on this platform
    #[error("Could not determine user config directory")]
    NoConfigDir,

    /// I/O error reading or writing configuration
    #[error("Configuration file I/O error: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Playlist file error
    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    /// Fetch provider error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Download run error
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Extraction error
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Whether the error was caused by a user interrupt
    pub fn is_interrupted(&self) -> bool {
        matches!(self, AppError::Download(DownloadError::Interrupted { .. }))
    }

    /// Process exit code for this error (130 mirrors SIGINT)
    pub fn exit_code(&self) -> i32 {
        if self.is_interrupted() {
            130
        } else {
            1
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Playlist(_) => "playlist",
            AppError::Fetch(_) => "fetch",
            AppError::Download(DownloadError::Playlist(_)) => "playlist",
            AppError::Download(_) => "download",
            AppError::Extract(_) => "extract",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Playlist result type alias
pub type PlaylistResult<T> = std::result::Result<T, PlaylistError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Download result type alias
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

/// Extraction result type alias
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
