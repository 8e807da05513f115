//! Configuration for the Confluence document store

use breakdown_domain::ConfigError;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default request timeout (30 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Confluence Cloud connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ConfluenceConfig {
    /// Site base URL (e.g., "https://your-site.atlassian.net")
    #[serde(default)]
    pub base_url: String,

    /// Account email used for basic auth
    #[serde(default)]
    pub email: String,

    /// API token used for basic auth
    #[serde(default = "empty_secret")]
    pub api_token: Secret<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for ConfluenceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            email: String::new(),
            api_token: empty_secret(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ConfluenceConfig {
    /// Create a configuration
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            email: email.into(),
            api_token: Secret::new(api_token.into()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub(crate) fn api_token(&self) -> &str {
        self.api_token.expose_secret()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("store.base_url".to_string()));
        }
        if self.email.trim().is_empty() {
            return Err(ConfigError::MissingField("store.email".to_string()));
        }
        if self.api_token().is_empty() {
            return Err(ConfigError::MissingField("store.api_token".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Overlay `BREAKDOWN_STORE_*` variables from the process environment
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay `BREAKDOWN_STORE_*` variables from an arbitrary lookup
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BREAKDOWN_STORE_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("BREAKDOWN_STORE_EMAIL") {
            self.email = v;
        }
        if let Some(v) = lookup("BREAKDOWN_STORE_API_TOKEN") {
            self.api_token = Secret::new(v);
        }
        if let Some(v) = lookup("BREAKDOWN_STORE_TIMEOUT_MS") {
            self.timeout_ms = v.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "BREAKDOWN_STORE_TIMEOUT_MS".to_string(),
                value: v,
            })?;
        }
        Ok(self)
    }
}
