use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{ClientError, ClientResult};

/// Default endpoint of the medical-records API.
pub const DEFAULT_BASE_URL: &str = "https://ca2-med-api.vercel.app";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const ENV_BASE_URL: &str = "MEDREC_API_URL";
const ENV_TIMEOUT_SECS: &str = "MEDREC_API_TIMEOUT_SECS";

/// Configuration of the [`crate::prelude::HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base endpoint of the API.
    pub base_url: String,
    /// Request timeout, in milliseconds. Must not be zero.
    pub timeout_ms: u64,
    /// Value of the `User-Agent` header, if any.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from `MEDREC_API_URL` and `MEDREC_API_TIMEOUT_SECS`,
    /// falling back to the defaults for unset variables.
    ///
    /// The timeout variable is in whole seconds.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = timeout.trim().parse().map_err(|_| {
                ClientError::InvalidConfig(format!("{ENV_TIMEOUT_SECS}: not a number: {timeout}"))
            })?;
            config.timeout_ms = secs.saturating_mul(1_000);
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration can build a client.
    ///
    /// Fails with [`ClientError::InvalidConfig`] if the timeout is zero.
    pub fn validate(&self) -> ClientResult<()> {
        if self.timeout_ms == 0 {
            return Err(ClientError::InvalidConfig(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the base endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the timeout duration for requests made by the client.
    ///
    /// The timeout is kept in milliseconds; a sub-millisecond remainder rounds up.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
