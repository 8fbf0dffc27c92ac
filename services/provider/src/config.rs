//! Configuration for the machine provider.

use std::time::Duration;

use ionos_mcm_reconcile::{PollConfig, DEFAULT_MAX_RETRIES, DEFAULT_POLL_INTERVAL};

/// Default cloud API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.ionos.com/cloudapi/v5";

/// Machine provider configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Cloud API base URL.
    pub api_url: String,

    /// Settlement polling used by every wait.
    pub poll: PollConfig,

    /// Timeout of a single HTTP request.
    pub http_timeout: Duration,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll: PollConfig::default(),
            http_timeout: Duration::from_secs(30),
            log_level: "info".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Unset or unparsable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("IONOS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let interval = lookup("IONOS_POLL_INTERVAL_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let max_retries = lookup("IONOS_POLL_MAX_RETRIES")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_RETRIES);

        let http_timeout = lookup("IONOS_HTTP_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let log_level = lookup("IONOS_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Self {
            api_url,
            poll: PollConfig {
                interval,
                max_retries,
            },
            http_timeout,
            log_level,
        }
    }
}
