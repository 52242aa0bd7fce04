//! Reading the dataset from a local file or a remote URL.

use crate::error::IngestError;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Where the CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Local(PathBuf),
    Remote(String),
}

impl Source {
    /// `http://` and `https://` strings are remote; anything else is a path.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Remote(trimmed.to_string())
        } else {
            Source::Local(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Local(path) => write!(f, "{}", path.display()),
            Source::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Options for loading a source.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Request timeout for remote sources.
    pub timeout_seconds: u64,
    /// Whether to show a spinner while downloading.
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            show_progress: true,
        }
    }
}

/// Read the whole dataset into memory.
pub async fn load_source(source: &Source, options: &LoadOptions) -> Result<Vec<u8>, IngestError> {
    match source {
        Source::Local(path) => {
            debug!("Reading local dataset: {}", path.display());
            tokio::fs::read(path)
                .await
                .map_err(|source| IngestError::FileRead {
                    path: path.clone(),
                    source,
                })
        }
        Source::Remote(url) => fetch(url, options).await,
    }
}

async fn fetch(url: &str, options: &LoadOptions) -> Result<Vec<u8>, IngestError> {
    info!("Downloading dataset: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(options.timeout_seconds))
        .build()
        .map_err(|e| fetch_error(url, format!("Failed to create HTTP client: {}", e)))?;

    let spinner = options.show_progress.then(|| {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(format!("Downloading {}", url));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = download(&client, url, options.timeout_seconds).await;

    if let Some(pb) = spinner {
        match &result {
            Ok(bytes) => pb.finish_with_message(format!("Downloaded {} bytes", bytes.len())),
            Err(_) => pb.abandon_with_message("Download failed"),
        }
    }

    result
}

async fn download(
    client: &reqwest::Client,
    url: &str,
    timeout_seconds: u64,
) -> Result<Vec<u8>, IngestError> {
    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            fetch_error(url, format!("Request timed out after {}s", timeout_seconds))
        } else if e.is_connect() {
            fetch_error(url, "Cannot connect to host".to_string())
        } else {
            fetch_error(url, format!("Failed to send request: {}", e))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(fetch_error(url, format!("HTTP status {}", status)));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| fetch_error(url, format!("Failed to read response body: {}", e)))?;
    debug!("Received {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

fn fetch_error(url: &str, message: String) -> IngestError {
    IngestError::Fetch {
        url: url.to_string(),
        message,
    }
}
