//! Configuration error type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading, validating or resolving configuration.
///
/// Every variant is fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The API key could not be resolved by name
    #[error("Missing API key: set `secrets.fmp_api_key` or the `{env_var}` environment variable")]
    MissingApiKey { env_var: String },

    /// The API key resolved to a blank value
    #[error("API key from {source_name} is blank")]
    BlankApiKey { source_name: String },

    /// Config file could not be read
    #[error("Failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("Failed to parse config from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A field holds a value outside its accepted range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Several problems found during validation
    #[error("Multiple configuration errors: {0:?}")]
    Multiple(Vec<ConfigError>),
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidValue`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error concerns the API key.
    pub const fn is_api_key(&self) -> bool {
        matches!(self, Self::MissingApiKey { .. } | Self::BlankApiKey { .. })
    }
}
