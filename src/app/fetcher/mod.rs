//! Content-fetch provider abstraction
//!
//! Actual media retrieval and collection enumeration are delegated to a
//! [`FetchProvider`]. The download loop and the collection extractor only see
//! this trait; [`YtDlpProvider`] is the production implementation and tests
//! substitute scripted providers.

pub mod ytdlp;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::FetchResult;

pub use ytdlp::YtDlpProvider;

/// Capability to retrieve single items and enumerate collections
#[async_trait]
pub trait FetchProvider: Send + Sync {
    /// Retrieve the resource behind `url` and report what was fetched
    async fn fetch(&self, url: &str) -> FetchResult<FetchedVideo>;

    /// List the members of a collection without retrieving any media
    async fn enumerate_flat(&self, collection_url: &str) -> FetchResult<FlatListing>;
}

/// Identifying metadata reported after a successful fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedVideo {
    /// Provider-specific video id
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Where the media ended up on disk
    pub local_filename: PathBuf,
}

/// Result of a flat (metadata only) collection enumeration
///
/// `entries` is `None` when the provider reports no member list at all.
/// Individual members may be null or lack an id; those are unusable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatListing {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub entries: Option<Vec<Option<FlatEntry>>>,
}

impl FlatListing {
    /// Build a listing from member ids
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: None,
            entries: Some(
                ids.into_iter()
                    .map(|id| {
                        Some(FlatEntry {
                            id: Some(id.into()),
                            title: None,
                        })
                    })
                    .collect(),
            ),
        }
    }

    /// Usable member ids in listing order, plus the count of skipped members
    ///
    /// Returns `None` if the listing has no member list.
    pub fn usable_ids(&self) -> Option<(Vec<String>, usize)> {
        let entries = self.entries.as_ref()?;
        let ids: Vec<String> = entries
            .iter()
            .flatten()
            .filter_map(|entry| entry.id.as_deref())
            .filter(|id| !id.trim().is_empty())
            .map(|id| id.trim().to_string())
            .collect();
        let skipped = entries.len() - ids.len();
        Some((ids, skipped))
    }
}

/// A single member of a flat listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Maximum video height to request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoQuality {
    /// Up to 720p
    #[default]
    #[serde(rename = "720")]
    P720,
    /// Up to 1080p
    #[serde(rename = "1080")]
    P1080,
}

impl VideoQuality {
    /// Maximum frame height in pixels
    pub fn max_height(&self) -> u32 {
        match self {
            Self::P720 => 720,
            Self::P1080 => 1080,
        }
    }

    /// yt-dlp format selector preferring separate best streams under the cap
    pub fn format_selector(&self) -> String {
        let height = self.max_height();
        format!("bestvideo[height<={height}]+bestaudio/best[height<={height}]")
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.max_height())
    }
}

impl FromStr for VideoQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('p') {
            "720" => Ok(Self::P720),
            "1080" => Ok(Self::P1080),
            other => Err(format!(
                "unsupported video quality '{}', expected 720 or 1080",
                other
            )),
        }
    }
}
