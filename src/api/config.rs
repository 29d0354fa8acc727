//! Client configuration.
//!
//! Read from the environment; every setting has a default so a bare
//! environment talks to a local backend.

use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8042";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid OSTRICHDB_API_URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("Invalid OSTRICHDB_TIMEOUT_SECS '{0}': expected a whole number of seconds")]
    InvalidTimeout(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
    /// `None` disables the per-request timeout.
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            user_agent: format!("ostrichdb-dashboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("OSTRICHDB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = Url::parse(raw_url.trim()).map_err(|e| ConfigError::InvalidUrl {
            value: raw_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                value: raw_url,
                reason: "scheme must be http or https".to_string(),
            });
        }

        let mut config = Self::new(base_url);

        if let Some(raw_timeout) = lookup("OSTRICHDB_TIMEOUT_SECS") {
            let secs: u64 = raw_timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw_timeout.clone()))?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn api_root(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_API_URL).expect("default API URL is valid"))
    }
}
