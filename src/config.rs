//! Configuration for the resource pool.

use std::path::PathBuf;
use std::time::Duration;

/// Default remote proxy list.
pub const DEFAULT_SOURCE_URL: &str = "https://free-proxy-list.net/";

/// Where endpoints saved during a low-watermark refresh are put back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreservePlacement {
    /// On top of the fresh batch, so they are served next.
    Top,
    /// Under the fresh batch, so they are served last.
    Bottom,
}

/// Configuration for the resource pool.
#[derive(Debug, Clone)]
pub struct ResourcePoolConfig {
    /// URL of the HTML proxy list.
    pub source_url: String,
    /// Directory holding the user-agent files.
    pub identity_dir: PathBuf,
    /// Load the extended user-agent list instead of the curated one.
    pub full_identities: bool,
    /// Stack depth at or below which `acquire_proxy` refreshes.
    pub refresh_threshold: usize,
    /// Placement of preserved endpoints after a refresh.
    pub preserve_placement: PreservePlacement,
    /// Timeout for fetching the proxy list.
    pub fetch_timeout: Duration,
    /// Timeout for requests sent through a pooled proxy.
    pub request_timeout: Duration,
    /// Number of times the middleware retries a request with another proxy.
    pub retry_count: usize,
}

impl ResourcePoolConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ResourcePoolConfigBuilder {
        ResourcePoolConfigBuilder::new()
    }
}

impl Default for ResourcePoolConfig {
    fn default() -> Self {
        ResourcePoolConfigBuilder::new().build()
    }
}

/// Builder for `ResourcePoolConfig`.
pub struct ResourcePoolConfigBuilder {
    source_url: Option<String>,
    identity_dir: Option<PathBuf>,
    full_identities: bool,
    refresh_threshold: Option<usize>,
    preserve_placement: Option<PreservePlacement>,
    fetch_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    retry_count: Option<usize>,
}

impl ResourcePoolConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            source_url: None,
            identity_dir: None,
            full_identities: false,
            refresh_threshold: None,
            preserve_placement: None,
            fetch_timeout: None,
            request_timeout: None,
            retry_count: None,
        }
    }

    /// Set the URL of the proxy list.
    pub fn source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Set the directory holding the user-agent files.
    pub fn identity_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.identity_dir = Some(dir.into());
        self
    }

    /// Load the extended user-agent list.
    pub fn full_identities(mut self, full: bool) -> Self {
        self.full_identities = full;
        self
    }

    /// Set the low-watermark that triggers a refresh.
    pub fn refresh_threshold(mut self, threshold: usize) -> Self {
        self.refresh_threshold = Some(threshold);
        self
    }

    /// Set where preserved endpoints go after a refresh.
    pub fn preserve_placement(mut self, placement: PreservePlacement) -> Self {
        self.preserve_placement = Some(placement);
        self
    }

    /// Set the timeout for fetching the proxy list.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Set the timeout for proxied requests.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the number of times to retry a request with different proxies.
    pub fn retry_count(mut self, count: usize) -> Self {
        self.retry_count = Some(count);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ResourcePoolConfig {
        ResourcePoolConfig {
            source_url: self.source_url.unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            identity_dir: self
                .identity_dir
                .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))),
            full_identities: self.full_identities,
            refresh_threshold: self.refresh_threshold.unwrap_or(2),
            preserve_placement: self.preserve_placement.unwrap_or(PreservePlacement::Top),
            fetch_timeout: self.fetch_timeout.unwrap_or(Duration::from_secs(30)),
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(10)),
            retry_count: self.retry_count.unwrap_or(3),
        }
    }
}

impl Default for ResourcePoolConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_free_proxy_list_behaviour() {
        let config = ResourcePoolConfig::default();
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.refresh_threshold, 2);
        assert_eq!(config.preserve_placement, PreservePlacement::Top);
        assert!(!config.full_identities);
        assert!(config.identity_dir.ends_with("data"));
    }

    #[test]
    fn builder_overrides() {
        let config = ResourcePoolConfig::builder()
            .source_url("http://127.0.0.1:9/list")
            .refresh_threshold(5)
            .preserve_placement(PreservePlacement::Bottom)
            .full_identities(true)
            .retry_count(0)
            .build();
        assert_eq!(config.source_url, "http://127.0.0.1:9/list");
        assert_eq!(config.refresh_threshold, 5);
        assert_eq!(config.preserve_placement, PreservePlacement::Bottom);
        assert!(config.full_identities);
        assert_eq!(config.retry_count, 0);
    }
}
