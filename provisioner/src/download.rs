//! Streaming asset download.
//!
//! Provides a trait-based abstraction for transferring a release asset into
//! transient storage, enabling dependency injection for testing. The HTTP
//! implementation streams the body in fixed-size chunks so memory use stays
//! bounded on large archives.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::time::Duration;

use log::debug;

use crate::config::ProvisionConfig;

/// Trait for downloading a release asset to a local file.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
///
/// # Examples
///
/// ```
/// use trimarr_provisioner::config::ProvisionConfig;
/// use trimarr_provisioner::download::HttpDownloader;
///
/// let downloader = HttpDownloader::new(&ProvisionConfig::default());
/// // Use downloader.download(url, dest) in production
/// # let _ = downloader;
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait AssetDownloader {
    /// Download the resource at `url` into `dest`, returning the number of
    /// bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-success status, a broken stream, or a
    /// failed write to `dest`.
    fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError>;
}

/// Errors arising from asset download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested asset was not found (HTTP 404).
    #[error("asset not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The body stream broke off before completion.
    #[error("download of {url} interrupted: {reason}")]
    Interrupted {
        /// The URL being streamed.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    agent: ureq::Agent,
    user_agent: String,
    chunk_size: usize,
}

impl HttpDownloader {
    /// Build a downloader bounded by the configured download timeout.
    #[must_use]
    pub fn new(config: &ProvisionConfig) -> Self {
        Self {
            agent: http_agent(config.download_timeout),
            user_agent: config.user_agent.clone(),
            chunk_size: config.chunk_size,
        }
    }
}

impl AssetDownloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        debug!("downloading {url} to {}", dest.display());
        let response = self
            .agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut body = response.into_body().into_reader();
        let mut file = File::create(dest)?;
        let written = stream_in_chunks(&mut body, &mut file, self.chunk_size, url)?;
        debug!("downloaded {written} bytes from {url}");
        Ok(written)
    }
}

/// Copy `reader` into `file` one chunk at a time.
///
/// Read failures are reported as [`DownloadError::Interrupted`]; write
/// failures as [`DownloadError::Io`].
pub(crate) fn stream_in_chunks(
    reader: &mut dyn Read,
    file: &mut File,
    chunk_size: usize,
    url: &str,
) -> Result<u64, DownloadError> {
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut written: u64 = 0;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(DownloadError::Interrupted {
                    url: url.to_owned(),
                    reason: e.to_string(),
                });
            }
        };
        file.write_all(&buffer[..read])?;
        written += read as u64;
    }
    file.flush()?;
    Ok(written)
}

/// Build a `ureq` agent whose requests are bounded by `timeout`.
pub(crate) fn http_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    ureq::Agent::new_with_config(config)
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
