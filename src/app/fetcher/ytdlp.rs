//! yt-dlp subprocess adapter
//!
//! Drives the external `yt-dlp` executable. Downloads print a single
//! tab-separated line (`id`, `title`, final file path) once the file has been
//! moved into place; flat enumeration dumps the collection as one JSON
//! document which is deserialized into a [`FlatListing`].

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{FetchProvider, FetchedVideo, FlatListing, VideoQuality};
use crate::constants::ytdlp::{
    DEFAULT_PROGRAM, FETCH_PRINT_SEPARATOR, FETCH_PRINT_TEMPLATE, MERGE_OUTPUT_FORMAT,
    OUTPUT_TEMPLATE,
};
use crate::errors::{FetchError, FetchResult};

/// Fetch provider backed by the `yt-dlp` command-line tool
#[derive(Debug, Clone)]
pub struct YtDlpProvider {
    program: PathBuf,
    download_dir: PathBuf,
    quality: VideoQuality,
}

impl YtDlpProvider {
    /// Create a provider writing into `download_dir`, resolving `yt-dlp` via PATH
    pub fn new(download_dir: impl Into<PathBuf>, quality: VideoQuality) -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            download_dir: download_dir.into(),
            quality,
        }
    }

    /// Use a specific yt-dlp executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn quality(&self) -> VideoQuality {
        self.quality
    }

    /// Arguments for downloading a single video
    pub fn fetch_args(&self, url: &str) -> Vec<String> {
        let output_template = self.download_dir.join(OUTPUT_TEMPLATE);
        vec![
            "--no-simulate".to_string(),
            "--no-warnings".to_string(),
            "--no-progress".to_string(),
            "--no-playlist".to_string(),
            "-f".to_string(),
            self.quality.format_selector(),
            "--merge-output-format".to_string(),
            MERGE_OUTPUT_FORMAT.to_string(),
            "-o".to_string(),
            output_template.to_string_lossy().into_owned(),
            "--print".to_string(),
            FETCH_PRINT_TEMPLATE.to_string(),
            url.to_string(),
        ]
    }

    /// Arguments for a metadata-only collection listing
    pub fn enumerate_args(&self, collection_url: &str) -> Vec<String> {
        vec![
            "--flat-playlist".to_string(),
            "--dump-single-json".to_string(),
            "--no-warnings".to_string(),
            collection_url.to_string(),
        ]
    }

    async fn run(&self, url: &str, args: Vec<String>) -> FetchResult<Output> {
        let program = self.program.to_string_lossy().into_owned();
        debug!("Running {} {}", program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| FetchError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(FetchError::CommandFailed {
                program,
                url: url.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl FetchProvider for YtDlpProvider {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedVideo> {
        info!("Starting download: {}", url);
        let start_time = Instant::now();

        let output = self.run(url, self.fetch_args(url)).await?;
        let video = parse_fetch_output(url, &String::from_utf8_lossy(&output.stdout))?;

        info!("Downloaded: {}", video.title);
        info!("Statistics:");
        info!("  Video ID: {}", video.id);
        info!(
            "  File: {}",
            video
                .local_filename
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| video.local_filename.display().to_string())
        );
        info!("  Download time: {:.2}s", start_time.elapsed().as_secs_f64());

        Ok(video)
    }

    async fn enumerate_flat(&self, collection_url: &str) -> FetchResult<FlatListing> {
        info!("Extracting URLs from: {}", collection_url);
        let output = self
            .run(collection_url, self.enumerate_args(collection_url))
            .await?;
        parse_flat_listing(collection_url, &String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the `id<TAB>title<TAB>path` line printed after a download
///
/// The last non-empty line wins; titles may themselves contain tabs, so the
/// id is taken from the front and the path from the back.
pub fn parse_fetch_output(url: &str, stdout: &str) -> FetchResult<FetchedVideo> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim_end)
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| FetchError::InvalidOutput {
            url: url.to_string(),
            reason: "no output from downloader".to_string(),
        })?;

    let (id, rest) = line
        .split_once(FETCH_PRINT_SEPARATOR)
        .ok_or_else(|| invalid_line(url, line))?;
    let (title, path) = rest
        .rsplit_once(FETCH_PRINT_SEPARATOR)
        .ok_or_else(|| invalid_line(url, line))?;

    if id.is_empty() || path.is_empty() {
        return Err(invalid_line(url, line));
    }

    Ok(FetchedVideo {
        id: id.to_string(),
        title: title.to_string(),
        local_filename: PathBuf::from(path),
    })
}

/// Parse the JSON document produced by a flat collection dump
pub fn parse_flat_listing(url: &str, stdout: &str) -> FetchResult<FlatListing> {
    serde_json::from_str(stdout.trim()).map_err(|e| FetchError::InvalidOutput {
        url: url.to_string(),
        reason: format!("failed to parse collection listing: {}", e),
    })
}

fn invalid_line(url: &str, line: &str) -> FetchError {
    FetchError::InvalidOutput {
        url: url.to_string(),
        reason: format!("unrecognized download summary: {:?}", line),
    }
}
