//! Shared fixtures for integration tests
//!
//! [`ScriptedProvider`] stands in for yt-dlp: it records every call, fails
//! at chosen URLs, and serves canned collection listings.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use yt_grabber::app::{FetchProvider, FetchedVideo, FlatListing};
use yt_grabber::errors::{FetchError, FetchResult};

/// In-memory fetch provider with scripted outcomes
#[derive(Default)]
pub struct ScriptedProvider {
    failures: HashSet<String>,
    listings: HashMap<String, FetchResult<FlatListing>>,
    fetch_delay: Option<Duration>,
    fetched: Mutex<Vec<String>>,
    enumerated: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `fetch` fail for `url`
    pub fn failing_at(mut self, url: &str) -> Self {
        self.failures.insert(url.to_string());
        self
    }

    /// Serve `listing` when `collection_url` is enumerated
    pub fn with_listing(mut self, collection_url: &str, listing: FlatListing) -> Self {
        self.listings
            .insert(collection_url.to_string(), Ok(listing));
        self
    }

    /// Fail enumeration of `collection_url`
    pub fn with_listing_error(mut self, collection_url: &str, message: &str) -> Self {
        self.listings.insert(
            collection_url.to_string(),
            Err(FetchError::Other(message.to_string())),
        );
        self
    }

    /// Make every fetch take `delay` (observable with paused time)
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// URLs passed to `fetch`, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    /// URLs passed to `enumerate_flat`, in call order
    pub fn enumerated(&self) -> Vec<String> {
        self.enumerated.lock().unwrap().clone()
    }
}

#[async_trait]
impl FetchProvider for ScriptedProvider {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedVideo> {
        self.fetched.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }

        if self.failures.contains(url) {
            return Err(FetchError::CommandFailed {
                program: "scripted".to_string(),
                url: url.to_string(),
                status: Some(1),
                stderr: "ERROR: Video unavailable".to_string(),
            });
        }

        let id = url.rsplit('=').next().unwrap_or(url).to_string();
        Ok(FetchedVideo {
            title: format!("Video {}", id),
            local_filename: PathBuf::from(format!("downloads/{}.mp4", id)),
            id,
        })
    }

    async fn enumerate_flat(&self, collection_url: &str) -> FetchResult<FlatListing> {
        self.enumerated
            .lock()
            .unwrap()
            .push(collection_url.to_string());

        match self.listings.get(collection_url) {
            Some(Ok(listing)) => Ok(listing.clone()),
            Some(Err(e)) => Err(FetchError::Other(e.to_string())),
            None => Ok(FlatListing::default()),
        }
    }
}

/// Write `content` to a playlist file in `dir`
pub async fn write_playlist(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    tokio::fs::write(&path, content).await.unwrap();
    path
}

pub async fn read_file(path: &Path) -> String {
    tokio::fs::read_to_string(path).await.unwrap()
}

/// Watch URL for a short test id
pub fn video(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}
