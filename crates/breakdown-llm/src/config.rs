//! Configuration for the completion client
//!
//! Loaded from TOML, then optionally overlaid with `BREAKDOWN_LLM_*`
//! environment variables. The API key is held as a [`Secret`] so it never
//! shows up in `Debug` output or logs.

use breakdown_domain::{ConfigError, ModelParameters};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default API version for Azure OpenAI chat completions
pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

/// Default deployment name
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";

/// Default request timeout (60 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Completion client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    /// Service endpoint (e.g., "https://my-resource.openai.azure.com/")
    #[serde(default)]
    pub endpoint: String,

    /// API key sent in the `api-key` header
    #[serde(default = "empty_secret")]
    pub api_key: Secret<String>,

    /// Deployment (model) identifier
    #[serde(default = "default_deployment")]
    pub deployment: String,

    /// API version query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Nucleus sampling mass
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_deployment() -> String {
    DEFAULT_DEPLOYMENT.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_temperature() -> f32 {
    ModelParameters::default().temperature
}

fn default_max_tokens() -> u32 {
    ModelParameters::default().max_tokens
}

fn default_top_p() -> f32 {
    ModelParameters::default().top_p
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: empty_secret(),
            deployment: default_deployment(),
            api_version: default_api_version(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl CompletionConfig {
    /// Create a configuration for an endpoint and key, other fields defaulted
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: Secret::new(api_key.into()),
            ..Self::default()
        }
    }

    /// Set the deployment
    pub fn with_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = deployment.into();
        self
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

    /// Sampling parameters for the prompt composer
    pub fn parameters(&self) -> ModelParameters {
        ModelParameters {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
        }
    }

    /// Exposes the API key (for making requests)
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.endpoint".to_string()));
        }
        if self.api_key().is_empty() {
            return Err(ConfigError::MissingField("llm.api_key".to_string()));
        }
        if self.deployment.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.deployment".to_string()));
        }
        if self.api_version.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.api_version".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "llm.temperature {} out of range [0.0, 2.0]",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ConfigError::Invalid(format!(
                "llm.top_p {} out of range [0.0, 1.0]",
                self.top_p
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "llm.max_tokens must be greater than 0".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "llm.timeout_ms must be greater than 0".to_string(),
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

    /// Overlay `BREAKDOWN_LLM_*` variables from the process environment
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay `BREAKDOWN_LLM_*` variables from an arbitrary lookup
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BREAKDOWN_LLM_ENDPOINT") {
            self.endpoint = v;
        }
        if let Some(v) = lookup("BREAKDOWN_LLM_API_KEY") {
            self.api_key = Secret::new(v);
        }
        if let Some(v) = lookup("BREAKDOWN_LLM_DEPLOYMENT") {
            self.deployment = v;
        }
        if let Some(v) = lookup("BREAKDOWN_LLM_API_VERSION") {
            self.api_version = v;
        }
        if let Some(v) = lookup("BREAKDOWN_LLM_TEMPERATURE") {
            self.temperature = parse_env("BREAKDOWN_LLM_TEMPERATURE", v)?;
        }
        if let Some(v) = lookup("BREAKDOWN_LLM_MAX_TOKENS") {
            self.max_tokens = parse_env("BREAKDOWN_LLM_MAX_TOKENS", v)?;
        }
        if let Some(v) = lookup("BREAKDOWN_LLM_TOP_P") {
            self.top_p = parse_env("BREAKDOWN_LLM_TOP_P", v)?;
        }
        if let Some(v) = lookup("BREAKDOWN_LLM_TIMEOUT_MS") {
            self.timeout_ms = parse_env("BREAKDOWN_LLM_TIMEOUT_MS", v)?;
        }
        Ok(self)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid() -> CompletionConfig {
        CompletionConfig::new("https://example.openai.azure.com/", "key-123")
    }

    #[test]
    fn test_defaults() {
        let config = CompletionConfig::default();
        assert_eq!(config.deployment, "gpt-4o");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 1500);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_missing_endpoint() {
        let config = CompletionConfig::new("", "key");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField(field)) if field == "llm.endpoint"
        ));
    }

    #[test]
    fn test_missing_api_key() {
        let config = CompletionConfig::new("https://x", "");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_temperature() {
        let mut config = valid();
        config.temperature = 3.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_timeout() {
        let config = valid().with_timeout(Duration::from_millis(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains("key-123"));
    }

    #[test]
    fn test_parse_toml() {
        let config = CompletionConfig::from_toml(
            r#"
            endpoint = "https://example.openai.azure.com/"
            api_key = "secret"
            deployment = "gpt-4o-mini"
            temperature = 0.6
            max_tokens = 2048
            timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.deployment, "gpt-4o-mini");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.max_tokens, 2048);
        assert_eq!(config.parameters().temperature, 0.6);
        assert_eq!(config.api_key(), "secret");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm.toml");
        std::fs::write(&path, "endpoint = \"https://x\"\napi_key = \"k\"\n").unwrap();
        let config = CompletionConfig::from_file(&path).unwrap();
        assert_eq!(config.endpoint, "https://x");
    }

    #[test]
    fn test_from_missing_file() {
        let result = CompletionConfig::from_file("/nonexistent/llm.toml");
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = [
            ("BREAKDOWN_LLM_ENDPOINT", "https://env.example/"),
            ("BREAKDOWN_LLM_API_KEY", "env-key"),
            ("BREAKDOWN_LLM_TIMEOUT_MS", "1500"),
        ]
        .into_iter()
        .collect();

        let config = CompletionConfig::default()
            .apply_env_with(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.endpoint, "https://env.example/");
        assert_eq!(config.api_key(), "env-key");
        assert_eq!(config.timeout_ms, 1500);
    }

    #[test]
    fn test_env_overlay_sampling_parameters() {
        let env: HashMap<&str, &str> = [
            ("BREAKDOWN_LLM_TEMPERATURE", "0.2"),
            ("BREAKDOWN_LLM_MAX_TOKENS", "800"),
            ("BREAKDOWN_LLM_TOP_P", "0.9"),
        ]
        .into_iter()
        .collect();

        let config = valid()
            .apply_env_with(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(
            config.parameters(),
            ModelParameters {
                temperature: 0.2,
                max_tokens: 800,
                top_p: 0.9,
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overlay_rejects_garbage() {
        let result = CompletionConfig::default().apply_env_with(|k| {
            (k == "BREAKDOWN_LLM_MAX_TOKENS").then(|| "lots".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
    }
}
