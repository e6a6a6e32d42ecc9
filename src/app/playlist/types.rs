//! Playlist line model
//!
//! Every line of a playlist file is classified into exactly one [`LineKind`].
//! Classification works on the whitespace-stripped line text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::playlist::{DONE_MARKER, HEADER_MARKER, HEADER_SEPARATOR};

/// Classification of a single playlist line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or whitespace-only line
    Blank,
    /// Metadata line starting with `:`; carries the text after the marker
    Header(String),
    /// Downloaded entry starting with `#`; carries the original entry text
    Done(String),
    /// Pending entry; carries the URL
    Pending(String),
}

impl LineKind {
    /// Classify a raw line (terminator may or may not be present)
    pub fn classify(line: &str) -> Self {
        let stripped = line.trim();

        if stripped.is_empty() {
            LineKind::Blank
        } else if let Some(rest) = stripped.strip_prefix(HEADER_MARKER) {
            LineKind::Header(rest.trim().to_string())
        } else if let Some(rest) = stripped.strip_prefix(DONE_MARKER) {
            LineKind::Done(rest.trim().to_string())
        } else {
            LineKind::Pending(stripped.to_string())
        }
    }

    /// Whether this line is a pending entry matching `url` exactly
    pub fn is_pending_url(&self, url: &str) -> bool {
        matches!(self, LineKind::Pending(pending) if pending == url)
    }

    /// Convert to a queue entry, if the line carries one
    pub fn into_entry(self) -> Option<QueueEntry> {
        match self {
            LineKind::Pending(url) => Some(QueueEntry {
                url,
                downloaded: false,
            }),
            LineKind::Done(url) => Some(QueueEntry {
                url,
                downloaded: true,
            }),
            LineKind::Blank | LineKind::Header(_) => None,
        }
    }
}

/// One logical item in a playlist file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Canonical item URL, exactly as written in the file
    pub url: String,
    /// Whether the item has been downloaded
    pub downloaded: bool,
}

/// Metadata collected from `: key=value` header lines
///
/// Header lines are informational only; the download loop never reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistHeader {
    fields: BTreeMap<String, String>,
}

impl PlaylistHeader {
    /// Add a header line body (text after the `:` marker)
    ///
    /// A body without `=` is stored as a key with an empty value. Later
    /// occurrences of a key overwrite earlier ones.
    pub fn insert_line(&mut self, body: &str) {
        let (key, value) = match body.split_once(HEADER_SEPARATOR) {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (body.trim(), ""),
        };
        if key.is_empty() {
            return;
        }
        self.fields.insert(key.to_string(), value.to_string());
    }

    /// Look up a header value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Counts describing the state of a playlist file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    /// Entries not yet downloaded
    pub pending: usize,
    /// Entries marked as downloaded
    pub downloaded: usize,
    /// Header (metadata) lines
    pub header_lines: usize,
}

impl PlaylistSummary {
    /// Total number of entries (pending + downloaded)
    pub fn total(&self) -> usize {
        self.pending + self.downloaded
    }

    /// Percentage of entries downloaded, 0.0 for an empty playlist
    pub fn completion_percent(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            (self.downloaded as f64 / self.total() as f64) * 100.0
        }
    }
}
