//! fal client configuration.

use std::time::Duration;

use crate::error::{FalError, FalResult};

pub const DEFAULT_QUEUE_URL: &str = "https://queue.fal.run";
pub const DEFAULT_STORAGE_URL: &str = "https://rest.alpha.fal.ai";
pub const DEFAULT_MODEL: &str = "fal-ai/sora-2/image-to-video";

/// Configuration for [`crate::FalClient`].
#[derive(Clone)]
pub struct FalConfig {
    /// API key sent as `Authorization: Key <api_key>`
    pub api_key: String,
    /// Queue API base URL
    pub queue_url: String,
    /// Storage API base URL
    pub storage_url: String,
    /// Model id, e.g. `fal-ai/sora-2/image-to-video`
    pub model: String,
    /// Timeout for each upload request
    pub upload_timeout: Duration,
    /// Timeout for every other request
    pub request_timeout: Duration,
    /// Delay between status polls
    pub poll_interval: Duration,
    /// Retries of a single HTTP call on transport failures
    pub max_retries: u32,
}

impl std::fmt::Debug for FalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FalConfig")
            .field("api_key", &"<redacted>")
            .field("queue_url", &self.queue_url)
            .field("storage_url", &self.storage_url)
            .field("model", &self.model)
            .field("upload_timeout", &self.upload_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl FalConfig {
    /// Config with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            queue_url: DEFAULT_QUEUE_URL.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            upload_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(2),
            max_retries: 2,
        }
    }

    /// Create config from environment variables.
    ///
    /// Only reads the environment; the key is never written back.
    pub fn from_env() -> FalResult<Self> {
        let api_key = std::env::var("FAL_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| FalError::Config("FAL_KEY is not set".to_string()))?;

        let defaults = Self::new(api_key);
        Ok(Self {
            queue_url: std::env::var("FAL_QUEUE_URL").unwrap_or(defaults.queue_url.clone()),
            storage_url: std::env::var("FAL_STORAGE_URL").unwrap_or(defaults.storage_url.clone()),
            model: std::env::var("FAL_MODEL").unwrap_or(defaults.model.clone()),
            upload_timeout: std::env::var("FAL_UPLOAD_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.upload_timeout),
            poll_interval: std::env::var("FAL_POLL_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            ..defaults
        })
    }

    pub fn with_base_urls(mut self, queue_url: impl Into<String>, storage_url: impl Into<String>) -> Self {
        self.queue_url = queue_url.into();
        self.storage_url = storage_url.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}
