//! HTTP client for fetching the model artifact
//!
//! The artifact lives in object storage. It is streamed to a `.part` file
//! next to the destination and renamed into place once complete, so an
//! interrupted download never leaves a truncated model behind.

use crate::errors::{Result, SalesError};
use futures_util::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Default artifact location
pub const DEFAULT_MODEL_URL: &str =
    "https://storage.googleapis.com/sales_prediction_bucket/model.json";

/// Progress update while streaming the artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub total: Option<u64>,
}

pub type ProgressCallback = Box<dyn FnMut(&DownloadProgress) + Send>;

/// What `download_if_needed` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    AlreadyPresent,
    Downloaded { bytes: u64 },
}

/// HTTP client for the model bucket
#[derive(Debug, Clone)]
pub struct ModelFetcher {
    client: Client,
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

impl ModelFetcher {
    /// Create a fetcher with an overall request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SalesError::HttpError)?;
        Ok(Self { client })
    }

    /// Download `url` to `path` unless the file already exists
    pub async fn download_if_needed(
        &self,
        url: &str,
        path: &Path,
        force: bool,
        progress: Option<ProgressCallback>,
    ) -> Result<FetchOutcome> {
        if !force && tokio::fs::try_exists(path).await.unwrap_or(false) {
            log::debug!("Model file {} already present, skipping download", path.display());
            return Ok(FetchOutcome::AlreadyPresent);
        }

        log::info!("Downloading model file from {}", url);
        let bytes = self.download(url, path, progress).await?;
        log::info!("Model file downloaded successfully ({} bytes)", bytes);
        Ok(FetchOutcome::Downloaded { bytes })
    }

    /// Stream `url` into `path`, replacing any existing file
    pub async fn download(
        &self,
        url: &str,
        path: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<u64> {
        let part = partial_path(path);
        let result = self.stream_to(url, &part, progress).await;

        match result {
            Ok(bytes) => {
                tokio::fs::rename(&part, path).await?;
                Ok(bytes)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                log::error!("Failed to download model: {}", e);
                Err(e)
            }
        }
    }

    async fn stream_to(
        &self,
        url: &str,
        part: &Path,
        mut progress: Option<ProgressCallback>,
    ) -> Result<u64> {
        let failed = |reason: String| SalesError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        if let Some(parent) = part.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let total = response.content_length();
        let mut file = tokio::fs::File::create(part).await?;
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes = chunk.map_err(|e| failed(format!("stream interrupted: {}", e)))?;
            if chunk.is_empty() {
                continue;
            }
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(ref mut callback) = progress {
                callback(&DownloadProgress { downloaded, total });
            }
        }

        file.flush().await?;
        Ok(downloaded)
    }

    /// Whether the artifact URL answers at all
    pub async fn is_reachable(&self, url: &str) -> bool {
        match self
            .client
            .head(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
