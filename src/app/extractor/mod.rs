//! Collection expansion into playlist files
//!
//! A [`CollectionExpander`] turns a single collection reference (a playlist
//! or channel, given as a URL or a bare identifier) into a fresh playlist file
//! listing one watch URL per member video.
//!
//! The member list is passed through a [`UrlTransform`] before being written.
//! Playlists keep their order by default; channels are reversed so the oldest
//! upload comes first.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use url::Url;

use crate::app::fetcher::FetchProvider;
use crate::app::playlist::write_atomic;
use crate::constants::youtube::{
    CHANNEL_ID_LEN, CHANNEL_ID_PREFIX, CHANNEL_VIDEOS_TAB, PLAYLIST_URL_PREFIX, SITE_ROOT, WATCH_URL_PREFIX,
};
use crate::errors::{ExtractError, ExtractResult};

/// Kind of collection a reference denotes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectionKind {
    /// A playlist, referenced by URL or `list=` id
    #[default]
    Playlist,
    /// A channel, referenced by URL, `@handle` or `UC…` id
    Channel,
}

impl CollectionKind {
    /// Turn a reference into a full collection URL
    ///
    /// References that already parse as `http`/`https` URLs are returned
    /// unchanged.
    pub fn normalize(&self, reference: &str) -> ExtractResult<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ExtractError::InvalidReference {
                reference: reference.to_string(),
            });
        }

        if has_web_scheme(reference) {
            return Ok(reference.to_string());
        }

        let url = match self {
            CollectionKind::Playlist => format!("{}{}", PLAYLIST_URL_PREFIX, reference),
            CollectionKind::Channel => channel_url(reference),
        };
        Ok(url)
    }

    /// Transform applied when the caller does not choose one
    pub fn default_transform(&self) -> UrlTransform {
        match self {
            CollectionKind::Playlist => UrlTransform::Identity,
            CollectionKind::Channel => UrlTransform::Reverse,
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionKind::Playlist => write!(f, "playlist"),
            CollectionKind::Channel => write!(f, "channel"),
        }
    }
}

/// Reordering applied to the full URL list before it is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UrlTransform {
    /// Keep listing order
    #[default]
    Identity,
    /// Reverse listing order
    Reverse,
}

impl UrlTransform {
    pub fn apply(&self, mut urls: Vec<String>) -> Vec<String> {
        match self {
            UrlTransform::Identity => urls,
            UrlTransform::Reverse => {
                urls.reverse();
                urls
            }
        }
    }
}

/// Result of a successful expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionSummary {
    /// Normalized collection URL that was enumerated
    pub collection_url: String,
    /// Number of URLs written
    pub written: usize,
    /// Listing members skipped for lack of an id
    pub skipped: usize,
    /// File the URLs were written to
    pub output_path: PathBuf,
}

/// Expands a collection reference into a playlist file
pub struct CollectionExpander<'a> {
    provider: &'a dyn FetchProvider,
    kind: CollectionKind,
    transform: UrlTransform,
}

impl<'a> CollectionExpander<'a> {
    /// Create an expander for `kind`, using its default transform
    pub fn new(provider: &'a dyn FetchProvider, kind: CollectionKind) -> Self {
        Self {
            provider,
            kind,
            transform: kind.default_transform(),
        }
    }

    /// Override the transform
    pub fn with_transform(mut self, transform: UrlTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn transform(&self) -> UrlTransform {
        self.transform
    }

    /// Enumerate the collection and write its watch URLs to `output_path`
    ///
    /// Any existing file at `output_path` is replaced. Nothing is written if
    /// enumeration fails or finds no usable videos.
    ///
    /// # Errors
    ///
    /// * `ExtractError::InvalidReference` for an empty reference
    /// * `ExtractError::Fetch` if enumeration fails
    /// * `ExtractError::EmptyCollection` if no member has a usable id
    /// * `ExtractError::Write` if the output file cannot be written
    pub async fn expand(
        &self,
        reference: &str,
        output_path: &Path,
    ) -> ExtractResult<ExpansionSummary> {
        let collection_url = self.kind.normalize(reference)?;
        info!("Extracting URLs from {}: {}", self.kind, collection_url);

        let listing = self.provider.enumerate_flat(&collection_url).await?;
        let (ids, skipped) = listing
            .usable_ids()
            .ok_or_else(|| ExtractError::EmptyCollection {
                url: collection_url.clone(),
            })?;
        if ids.is_empty() {
            return Err(ExtractError::EmptyCollection {
                url: collection_url,
            });
        }
        if skipped > 0 {
            debug!("Skipped {} entries without a video id", skipped);
        }

        let urls = self
            .transform
            .apply(ids.iter().map(|id| watch_url(id)).collect());

        let content: String = urls.iter().map(|url| format!("{}\n", url)).collect();
        write_atomic(output_path, &content)
            .await
            .map_err(|source| ExtractError::Write {
                path: output_path.to_path_buf(),
                source,
            })?;

        info!("Extraction completed");
        info!("Statistics:");
        info!("  Videos found: {}", urls.len());
        info!("  Saved to: {}", output_path.display());

        Ok(ExpansionSummary {
            collection_url,
            written: urls.len(),
            skipped,
            output_path: output_path.to_path_buf(),
        })
    }
}

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL_PREFIX, video_id)
}

fn has_web_scheme(reference: &str) -> bool {
    Url::parse(reference)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn channel_url(reference: &str) -> String {
    if reference.starts_with('@') {
        format!("{}/{}/{}", SITE_ROOT, reference, CHANNEL_VIDEOS_TAB)
    } else if is_channel_id(reference) {
        format!(
            "{}/channel/{}/{}",
            SITE_ROOT, reference, CHANNEL_VIDEOS_TAB
        )
    } else {
        format!("{}/@{}/{}", SITE_ROOT, reference, CHANNEL_VIDEOS_TAB)
    }
}

/// `UC` followed by 22 url-safe base64 characters
fn is_channel_id(reference: &str) -> bool {
    reference.len() == CHANNEL_ID_LEN
        && reference.starts_with(CHANNEL_ID_PREFIX)
        && reference
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_normalization() {
        let kind = CollectionKind::Playlist;
        assert_eq!(
            kind.normalize("PL123").unwrap(),
            "https://www.youtube.com/playlist?list=PL123"
        );
        assert_eq!(
            kind.normalize("  PL123 \n").unwrap(),
            "https://www.youtube.com/playlist?list=PL123"
        );
        let full = "https://www.youtube.com/playlist?list=PLabc";
        assert_eq!(kind.normalize(full).unwrap(), full);
        let plain_http = "http://youtube.com/playlist?list=PLabc";
        assert_eq!(kind.normalize(plain_http).unwrap(), plain_http);
    }

    #[test]
    fn test_non_web_scheme_treated_as_identifier() {
        assert_eq!(
            CollectionKind::Playlist.normalize("list:PL1").unwrap(),
            "https://www.youtube.com/playlist?list=list:PL1"
        );
    }

    #[test]
    fn test_channel_normalization() {
        let kind = CollectionKind::Channel;
        assert_eq!(
            kind.normalize("@rustlang").unwrap(),
            "https://www.youtube.com/@rustlang/videos"
        );
        assert_eq!(
            kind.normalize("UCaYhcUwRBNscFNUKTjgPFiA").unwrap(),
            "https://www.youtube.com/channel/UCaYhcUwRBNscFNUKTjgPFiA/videos"
        );
        assert_eq!(
            kind.normalize("rustlang").unwrap(),
            "https://www.youtube.com/@rustlang/videos"
        );
        // Handles that merely start with "UC" stay handles
        assert_eq!(
            kind.normalize("UCLA").unwrap(),
            "https://www.youtube.com/@UCLA/videos"
        );
        assert_eq!(
            kind.normalize("UCaYhcUwRBNscFNUKTjgPFi!").unwrap(),
            "https://www.youtube.com/@UCaYhcUwRBNscFNUKTjgPFi!/videos"
        );
        let full = "https://www.youtube.com/@rustlang/streams";
        assert_eq!(kind.normalize(full).unwrap(), full);
    }

    #[test]
    fn test_empty_reference_rejected() {
        assert!(matches!(
            CollectionKind::Playlist.normalize("   "),
            Err(ExtractError::InvalidReference { .. })
        ));
    }

    #[test]
    fn test_transforms() {
        let urls = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(UrlTransform::Identity.apply(urls.clone()), urls);
        assert_eq!(
            UrlTransform::Reverse.apply(urls),
            vec!["c".to_string(), "b".to_string(), "a".to_string()]
        );
        assert_eq!(
            CollectionKind::Playlist.default_transform(),
            UrlTransform::Identity
        );
        assert_eq!(
            CollectionKind::Channel.default_transform(),
            UrlTransform::Reverse
        );
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
