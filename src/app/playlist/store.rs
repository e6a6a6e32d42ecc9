//! Playlist file reading and done-marker rewriting
//!
//! The playlist file is the durable record of what is left to download. It is
//! re-read from disk on every call so that edits made between runs (or
//! between calls) are always observed.
//!
//! Marking an entry rewrites the whole file using the atomic temp file +
//! rename pattern, so an interrupted write leaves either the previous or the
//! updated content on disk, never a truncated file.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::types::{LineKind, PlaylistHeader, PlaylistSummary, QueueEntry};
use crate::constants::files::TEMP_FILE_ATTEMPTS;
use crate::constants::{DONE_MARKER, TEMP_FILE_SUFFIX};
use crate::errors::{PlaylistError, PlaylistResult};

/// Handle on a playlist file on disk
///
/// The handle holds only the path; all state lives in the file itself.
#[derive(Debug, Clone)]
pub struct PlaylistFile {
    path: PathBuf,
}

impl PlaylistFile {
    /// Create a handle for the playlist at `path` (the file need not exist yet)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the URLs that have not been downloaded yet, in file order
    ///
    /// Blank lines, header lines (`:`) and done lines (`#`) are skipped.
    ///
    /// # Errors
    ///
    /// Returns `PlaylistError::NotFound` if the file does not exist
    pub async fn read_pending(&self) -> PlaylistResult<Vec<String>> {
        let content = self.read_content().await?;

        let mut urls = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line_num = index + 1;
            match LineKind::classify(line) {
                LineKind::Blank => {}
                LineKind::Header(_) => debug!("Line {}: header line, skipping", line_num),
                LineKind::Done(_) => debug!("Line {}: already downloaded, skipping", line_num),
                LineKind::Pending(url) => {
                    debug!("Line {}: added URL to queue", line_num);
                    urls.push(url);
                }
            }
        }

        info!("Found {} URLs to download", urls.len());
        Ok(urls)
    }

    /// Mark the first pending line matching `url` as downloaded
    ///
    /// The line is rewritten as `"# " + original line`, keeping its leading
    /// whitespace and line terminator untouched. Every other byte of the file
    /// is preserved.
    ///
    /// # Errors
    ///
    /// * `PlaylistError::NotFound` if the file does not exist
    /// * `PlaylistError::EntryNotFound` if no pending line matches; the file
    ///   is not modified in that case
    pub async fn mark_done(&self, url: &str) -> PlaylistResult<()> {
        let content = self.read_content().await?;

        let mut lines: Vec<&str> = content.split_inclusive('\n').collect();
        let index = lines
            .iter()
            .position(|line| LineKind::classify(line).is_pending_url(url))
            .ok_or_else(|| PlaylistError::EntryNotFound {
                url: url.to_string(),
                path: self.path.clone(),
            })?;

        let marked = format!("{} {}", DONE_MARKER, lines[index]);
        lines[index] = &marked;
        debug!("Marked URL as downloaded at line {}", index + 1);

        self.write_content(&lines.concat()).await?;
        info!("Updated playlist file: {}", self.path.display());
        Ok(())
    }

    /// Read every entry (pending and downloaded) in file order
    pub async fn entries(&self) -> PlaylistResult<Vec<QueueEntry>> {
        let content = self.read_content().await?;
        Ok(content
            .lines()
            .filter_map(|line| LineKind::classify(line).into_entry())
            .collect())
    }

    /// Parse the `: key=value` header lines
    pub async fn header(&self) -> PlaylistResult<PlaylistHeader> {
        let content = self.read_content().await?;
        let mut header = PlaylistHeader::default();
        for line in content.lines() {
            if let LineKind::Header(body) = LineKind::classify(line) {
                header.insert_line(&body);
            }
        }
        Ok(header)
    }

    /// Count pending, downloaded and header lines
    pub async fn summary(&self) -> PlaylistResult<PlaylistSummary> {
        let content = self.read_content().await?;
        let mut summary = PlaylistSummary::default();
        for line in content.lines() {
            match LineKind::classify(line) {
                LineKind::Blank => {}
                LineKind::Header(_) => summary.header_lines += 1,
                LineKind::Done(_) => summary.downloaded += 1,
                LineKind::Pending(_) => summary.pending += 1,
            }
        }
        Ok(summary)
    }

    async fn read_content(&self) -> PlaylistResult<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => PlaylistError::NotFound {
                    path: self.path.clone(),
                },
                _ => PlaylistError::Read {
                    path: self.path.clone(),
                    source,
                },
            })
    }

    async fn write_content(&self, content: &str) -> PlaylistResult<()> {
        write_atomic(&self.path, content)
            .await
            .map_err(|source| PlaylistError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

/// Write `content` to `path` through a sibling temp file and a rename
///
/// Symlinks are followed: the temp file is created next to the resolved
/// target and renamed onto it, so the link itself is kept. An existing
/// target's permissions are copied onto the replacement. The temp file is
/// synced before the rename; on failure it is removed and the target is left
/// as it was.
pub async fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let target = resolve_target(path).await?;
    let permissions = match tokio::fs::metadata(&target).await {
        Ok(metadata) => Some(metadata.permissions()),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };

    let (mut file, temp_path) = create_temp_beside(&target).await?;

    let result = async {
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        if let Some(permissions) = permissions {
            file.set_permissions(permissions).await?;
        }
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&temp_path, &target).await
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&temp_path).await;
    }
    result
}

/// Resolve symlinks in `path`; a path that does not exist yet is used as is
async fn resolve_target(path: &Path) -> std::io::Result<PathBuf> {
    match tokio::fs::canonicalize(path).await {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e),
    }
}

/// Create a fresh temp file next to `target`, never reusing an existing name
async fn create_temp_beside(target: &Path) -> std::io::Result<(tokio::fs::File, PathBuf)> {
    let mut last_error = None;
    for _ in 0..TEMP_FILE_ATTEMPTS {
        let candidate = temp_path_for(target);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => return Ok((file, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => last_error = Some(e),
            Err(e) => return Err(e),
        }
    }
    Err(last_error.unwrap_or_else(|| ErrorKind::AlreadyExists.into()))
}

/// `.<name>.<pid>.<counter>.tmp` in the same directory as `path`
fn temp_path_for(path: &Path) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let mut name = OsString::from(".");
    if let Some(file_name) = path.file_name() {
        name.push(file_name);
    }
    name.push(format!(
        ".{}.{}{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed),
        TEMP_FILE_SUFFIX
    ));
    path.with_file_name(name)
}
