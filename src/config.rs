//! Configuration management for yt-grabber
//!
//! Settings are resolved with the following precedence (later wins):
//!
//! 1. Built-in defaults
//! 2. Config file (`--config`, `./yt-grabber.toml`, or the user config directory)
//! 3. Environment variables (a `.env` file is loaded by `main` before this runs)
//! 4. Command-line flags (applied by the command handlers)

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{DelayRange, VideoQuality};
use crate::constants::{env, files, logging, pacing, playlist, ytdlp};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Download settings
    pub download: DownloadConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Download loop and fetch provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory videos are written to
    pub download_dir: PathBuf,
    /// Playlist file used when none is given on the command line
    pub playlist_file: PathBuf,
    /// Maximum video quality
    pub video_quality: VideoQuality,
    /// Minimum pause between downloads
    #[serde(with = "humantime_serde")]
    pub min_delay: Duration,
    /// Maximum pause between downloads (0 disables pacing)
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    /// yt-dlp executable
    pub ytdlp_path: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from(files::DEFAULT_DOWNLOAD_DIR),
            playlist_file: PathBuf::from(playlist::DEFAULT_PLAYLIST_FILE),
            video_quality: VideoQuality::default(),
            min_delay: pacing::DEFAULT_MIN_DELAY,
            max_delay: pacing::DEFAULT_MAX_DELAY,
            ytdlp_path: PathBuf::from(ytdlp::DEFAULT_PROGRAM),
        }
    }
}

impl DownloadConfig {
    /// Pacing range described by `min_delay`/`max_delay`
    pub fn delay_range(&self) -> ConfigResult<DelayRange> {
        DelayRange::new(self.min_delay, self.max_delay).map_err(|e| ConfigError::InvalidValue {
            field: "download.min_delay".to_string(),
            value: format!("{:?}", self.min_delay),
            reason: e.to_string(),
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicitly requested file must exist; the default locations are
    /// optional.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        let mut config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let download = &mut self.download;

        if let Some(value) = lookup(env::DOWNLOAD_DIR) {
            download.download_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(env::PLAYLIST_FILE) {
            download.playlist_file = PathBuf::from(value);
        }
        if let Some(value) = lookup(env::VIDEO_QUALITY) {
            download.video_quality =
                value
                    .parse::<VideoQuality>()
                    .map_err(|reason| ConfigError::InvalidValue {
                        field: env::VIDEO_QUALITY.to_string(),
                        value: value.clone(),
                        reason,
                    })?;
        }
        if let Some(value) = lookup(env::MIN_DELAY) {
            download.min_delay = parse_seconds(env::MIN_DELAY, &value)?;
        }
        if let Some(value) = lookup(env::MAX_DELAY) {
            download.max_delay = parse_seconds(env::MAX_DELAY, &value)?;
        }
        if let Some(value) = lookup(env::YTDLP_PATH) {
            download.ytdlp_path = PathBuf::from(value);
        }

        Ok(())
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> ConfigResult<()> {
        self.download.delay_range()?;
        Ok(())
    }

    /// Write a commented default configuration file
    ///
    /// Returns the path written, or `None` if a file already exists there and
    /// `force` is false.
    pub async fn initialize(path: Option<PathBuf>, force: bool) -> ConfigResult<Option<PathBuf>> {
        let config_path = match path {
            Some(path) => path,
            None => Self::default_config_path()?,
        };

        if config_path.exists() && !force {
            debug!("Config file already exists: {}", config_path.display());
            return Ok(None);
        }

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| ConfigError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        tokio::fs::write(&config_path, Self::generate_default_config_content())
            .await
            .map_err(|source| ConfigError::Io {
                path: config_path.clone(),
                source,
            })?;

        info!("Created configuration file: {}", config_path.display());
        Ok(Some(config_path))
    }

    /// Render this configuration as TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir
            .join(files::CONFIG_DIR_NAME)
            .join(files::CONFIG_FILE_NAME))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(files::LOCAL_CONFIG_FILE)];
        if let Ok(user_path) = Self::default_config_path() {
            search_paths.push(user_path);
        }

        let found = search_paths.into_iter().find(|path| path.exists());
        match &found {
            Some(path) => debug!("Found config file: {}", path.display()),
            None => debug!("No config file found in standard locations"),
        }
        found
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig =
            toml::from_str(&content).map_err(|source| ConfigError::InvalidFormat {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    fn generate_default_config_content() -> String {
        let defaults = DownloadConfig::default();

        format!(
            r#"# yt-grabber configuration
# Environment variables ({download_dir_env}, {playlist_env}, {quality_env},
# {min_env}, {max_env}, {ytdlp_env}) override these values, and command-line
# flags override both.

[download]
# Where downloaded videos are stored
download_dir = "{download_dir}"

# Playlist used when none is given on the command line
playlist_file = "{playlist_file}"

# Maximum video quality: "720" or "1080"
video_quality = "720"

# Random pause between downloads, drawn from [min_delay, max_delay]
# Set max_delay = "0s" to disable pacing
min_delay = "{min_delay}"
max_delay = "{max_delay}"

# yt-dlp executable (name on PATH or absolute path)
ytdlp_path = "{ytdlp_path}"

[logging]
level = "{level}"  # error, warn, info, debug, trace
"#,
            download_dir_env = env::DOWNLOAD_DIR,
            playlist_env = env::PLAYLIST_FILE,
            quality_env = env::VIDEO_QUALITY,
            min_env = env::MIN_DELAY,
            max_env = env::MAX_DELAY,
            ytdlp_env = env::YTDLP_PATH,
            download_dir = defaults.download_dir.display(),
            playlist_file = defaults.playlist_file.display(),
            min_delay = format!("{}s", defaults.min_delay.as_secs()),
            max_delay = format!("{}s", defaults.max_delay.as_secs()),
            ytdlp_path = defaults.ytdlp_path.display(),
            level = logging::DEFAULT_LOG_LEVEL,
        )
    }
}

/// Parse a non-negative number of seconds (fractions allowed)
fn parse_seconds(field: &str, value: &str) -> ConfigResult<Duration> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| invalid("Expected a number of seconds"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid("Delay must be zero or positive"));
    }
    Ok(Duration::from_secs_f64(seconds))
}
