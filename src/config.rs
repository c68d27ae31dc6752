use std::env;
use std::time::Duration;

use crate::error::{Result, RunpodError};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "RUNPOD_API_KEY";
/// Environment variable holding the serverless endpoint id.
pub const ENDPOINT_ID_VAR: &str = "RUNPOD_ENDPOINT_ID";

const DEFAULT_BASE_URL: &str = "https://api.runpod.ai/v2";

/// Configuration for the RunPod client and generation session.
///
/// Built explicitly and passed in, never read from ambient globals, so
/// sessions stay testable with fakes. [`RunpodConfig::from_env()`] is the
/// production path.
#[derive(Debug, Clone)]
pub struct RunpodConfig {
    /// API key, sent as a bearer token on every request.
    pub api_key: String,
    /// Serverless endpoint id, used to build both request URLs.
    pub endpoint_id: String,
    /// Base API URL (default: `https://api.runpod.ai/v2`).
    pub base_url: String,
    /// Delay between status checks (default: 2s).
    pub poll_interval: Duration,
    /// Maximum number of status checks before giving up (default: 60).
    pub max_polls: u32,
    /// Per-request timeout (default: 30s).
    pub request_timeout: Duration,
}

impl RunpodConfig {
    /// Create a config with the given credentials and default tuning.
    pub fn new(api_key: impl Into<String>, endpoint_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint_id: endpoint_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(2),
            max_polls: 60,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Read credentials from `RUNPOD_API_KEY` and `RUNPOD_ENDPOINT_ID`.
    ///
    /// Fails with [`RunpodError::Config`] if either is missing or empty.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var(API_KEY_VAR).unwrap_or_default();
        let endpoint_id = env::var(ENDPOINT_ID_VAR).unwrap_or_default();
        let config = Self::new(api_key, endpoint_id);
        config.validate()?;
        Ok(config)
    }

    /// Check that both credentials are present. Called before any network
    /// operation is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(RunpodError::Config(format!("{} is not set", API_KEY_VAR)));
        }
        if self.endpoint_id.trim().is_empty() {
            return Err(RunpodError::Config(format!("{} is not set", ENDPOINT_ID_VAR)));
        }
        Ok(())
    }

    /// Override the base API URL (tests, self-hosted gateways).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the delay between status checks.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the maximum number of status checks.
    pub fn max_polls(mut self, max: u32) -> Self {
        self.max_polls = max;
        self
    }

    /// Set the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
