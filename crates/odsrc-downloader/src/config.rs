//! Configuration types for the downloader.

use std::time::Duration;

/// Download configuration.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Connection timeout for the initial TCP connection.
    pub connect_timeout: Duration,
    /// Total request timeout. `None` leaves the read unbounded: archives are
    /// large, the CDN has no SLA, and byte progress is the liveness signal.
    pub total_timeout: Option<Duration>,
    /// Maximum redirects to follow.
    pub max_redirects: usize,
    /// User agent string.
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            total_timeout: None,
            max_redirects: 10,
            user_agent: format!("odsrc/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl DownloadConfig {
    /// Create a new config builder.
    #[must_use]
    pub fn builder() -> DownloadConfigBuilder {
        DownloadConfigBuilder::default()
    }
}

/// Builder for `DownloadConfig`.
#[derive(Debug, Default)]
pub struct DownloadConfigBuilder {
    config: DownloadConfig,
}

impl DownloadConfigBuilder {
    /// Set connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set total request timeout.
    #[must_use]
    pub const fn total_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.total_timeout = timeout;
        self
    }

    /// Set maximum redirects.
    #[must_use]
    pub const fn max_redirects(mut self, redirects: usize) -> Self {
        self.config.max_redirects = redirects;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> DownloadConfig {
        self.config
    }
}
