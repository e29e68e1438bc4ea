//! Client configuration

use serde::{Deserialize, Serialize};
use singularity_core::CoreError;
use singularity_core::session::DEFAULT_TOKEN_LIFETIME_SECS;
use std::time::Duration;

/// Backend used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Upper bound on every outgoing request
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Longest accepted access token lifetime (one year)
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// Where the UI should send the user once the session is gone
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Settings for talking to the Singularity backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root, including the `/api` prefix
    pub base_url: String,

    /// Request timeout in seconds (native targets only)
    pub timeout_secs: u64,

    /// Assumed access token lifetime in seconds
    pub token_lifetime_secs: u64,

    /// Login entry point of the UI
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS.unsigned_abs(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    /// Default settings pointed at another backend
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn token_lifetime(&self) -> chrono::Duration {
        let secs = i64::try_from(self.token_lifetime_secs.min(MAX_TOKEN_LIFETIME_SECS))
            .unwrap_or(i64::MAX / 1000);
        chrono::Duration::seconds(secs)
    }

    /// Check the settings for values the client cannot work with
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.base_url.trim().is_empty() {
            return Err(CoreError::invalid_config("base_url must not be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(CoreError::invalid_config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::invalid_config("timeout_secs must be greater than 0"));
        }
        if self.token_lifetime_secs == 0 {
            return Err(CoreError::invalid_config(
                "token_lifetime_secs must be greater than 0",
            ));
        }
        if self.token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS {
            return Err(CoreError::invalid_config(format!(
                "token_lifetime_secs must be at most {MAX_TOKEN_LIFETIME_SECS}"
            )));
        }
        Ok(())
    }
}
