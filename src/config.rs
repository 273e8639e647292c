use std::env;
use std::time::Duration;

use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const CHAT_PATH: &str = "/api/chat";

/// Trait for settings that are read from environment variables
pub trait EnvVar {
    /// The environment variable name for this setting
    const NAME: &'static str;

    /// Find the value by loading .env first, then checking the environment.
    /// Blank values count as unset.
    fn find() -> Option<String> {
        // Silently ignore a missing .env file
        let _ = dotenvy::dotenv();

        env::var(Self::NAME)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

pub struct UseBackendVar;
impl EnvVar for UseBackendVar {
    const NAME: &'static str = "QUIZ_ASSISTANT_USE_BACKEND";
}

pub struct BaseUrlVar;
impl EnvVar for BaseUrlVar {
    const NAME: &'static str = "QUIZ_ASSISTANT_BASE_URL";
}

pub struct TimeoutVar;
impl EnvVar for TimeoutVar {
    const NAME: &'static str = "QUIZ_ASSISTANT_TIMEOUT_SECS";
}

/// Assistant configuration. The default is fully offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    /// Delegate replies to the remote chat endpoint before using local hints
    pub use_backend: bool,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            use_backend: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AssistantConfig {
    /// Build the configuration from the environment (and `.env`), keeping
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = UseBackendVar::find() {
            config.use_backend = parse_flag(UseBackendVar::NAME, &raw)?;
        }
        if let Some(url) = BaseUrlVar::find() {
            config.base_url = url;
        }
        if let Some(raw) = TimeoutVar::find() {
            config.timeout = parse_timeout(TimeoutVar::NAME, &raw)?;
        }

        debug!(use_backend = config.use_backend, base_url = %config.base_url, "Loaded assistant config");
        Ok(config)
    }

    #[must_use]
    pub const fn with_backend(mut self, use_backend: bool) -> Self {
        self.use_backend = use_backend;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the chat endpoint
    #[must_use]
    pub fn chat_endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CHAT_PATH)
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value: raw.to_string() }),
    }
}

fn parse_timeout(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout { name, value: raw.to_string() }),
    }
}
