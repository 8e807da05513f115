//! Pipeline configuration
//!
//! A single TOML document with an `[llm]` and a `[store]` table:
//!
//! ```toml
//! [llm]
//! endpoint = "https://my-resource.openai.azure.com/"
//! deployment = "gpt-4o"
//! api_version = "2024-12-01-preview"
//! temperature = 0.7
//! max_tokens = 1500
//! timeout_ms = 60000
//!
//! [store]
//! base_url = "https://your-site.atlassian.net"
//! email = "bot@example.com"
//! timeout_ms = 30000
//! ```
//!
//! Secrets are normally left out of the file and supplied through
//! `BREAKDOWN_LLM_API_KEY` and `BREAKDOWN_STORE_API_TOKEN`.

use breakdown_domain::ConfigError;
use breakdown_llm::CompletionConfig;
use breakdown_store::ConfluenceConfig;
use serde::Deserialize;
use std::path::Path;

/// Configuration for the completion client and the document store
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// Completion service settings
    #[serde(default)]
    pub llm: CompletionConfig,

    /// Document store settings
    #[serde(default)]
    pub store: ConfluenceConfig,
}

impl PipelineConfig {
    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Overlay `BREAKDOWN_*` variables from an arbitrary lookup
    pub fn apply_env_with<F>(self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            llm: self.llm.apply_env_with(&lookup)?,
            store: self.store.apply_env_with(&lookup)?,
        })
    }

    /// Validate both sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.llm.validate()?;
        self.store.validate()
    }

    /// Load from an optional file, overlay the process environment, then
    /// validate
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }
}
