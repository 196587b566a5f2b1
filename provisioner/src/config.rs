//! Network configuration for the provisioning pipeline.
//!
//! A [`ProvisionConfig`] is constructed once by the caller and passed into the
//! HTTP implementations; nothing in the pipeline reads ambient state.

use std::time::Duration;

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Timeout for the release-metadata request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the whole asset download.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Size of the buffer used when streaming an asset to disk.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Settings shared by the release index client and the asset downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    /// Base URL of the release index, without a trailing slash.
    pub api_base: String,
    /// Upper bound for the release-metadata request.
    pub request_timeout: Duration,
    /// Upper bound for the asset transfer.
    pub download_timeout: Duration,
    /// Chunk size for streaming downloads.
    pub chunk_size: usize,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl ProvisionConfig {
    /// Return a copy pointing at a different release index.
    ///
    /// Trailing slashes are stripped so URL construction stays uniform.
    ///
    /// # Examples
    ///
    /// ```
    /// use trimarr_provisioner::config::ProvisionConfig;
    ///
    /// let config = ProvisionConfig::default().with_api_base("http://127.0.0.1:8080/");
    /// assert_eq!(config.api_base, "http://127.0.0.1:8080");
    /// ```
    #[must_use]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_owned();
        self
    }
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            user_agent: concat!("trimarr/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ProvisionConfig::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.download_timeout, Duration::from_secs(120));
        assert_eq!(config.chunk_size, 8192);
        assert!(config.user_agent.starts_with("trimarr/"));
    }

    #[test]
    fn with_api_base_strips_trailing_slashes() {
        let config = ProvisionConfig::default().with_api_base("https://ghe.example.com/api/v3//");
        assert_eq!(config.api_base, "https://ghe.example.com/api/v3");
    }
}
