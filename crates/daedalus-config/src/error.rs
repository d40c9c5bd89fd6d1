//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read configuration file.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// The field with the invalid value.
        field: String,
        /// Explanation of why the value is invalid.
        reason: String,
    },

    /// Environment variable parsing error.
    #[error("failed to parse environment variable {var}: {reason}")]
    EnvParseError {
        /// The environment variable name.
        var: String,
        /// Explanation of the parsing error.
        reason: String,
    },

    /// Unsupported source format.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

impl ConfigError {
    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a new invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new environment variable parse error.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Create a new unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat(format.into())
    }
}
