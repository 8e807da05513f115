//! Configuration error shared by the adapter configs

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the config document
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// An environment override could not be interpreted
    #[error("Invalid value for {key}: {value}")]
    InvalidEnv {
        /// Variable name
        key: String,
        /// Offending value
        value: String,
    },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// A field is present but out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
