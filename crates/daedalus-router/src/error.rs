//! Router error types.

use thiserror::Error;

/// Errors raised while binding routes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouterError {
    /// The method name is not an HTTP method.
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    /// The path pattern cannot be inserted.
    #[error("invalid path pattern '{path}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        path: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl RouterError {
    /// Create a new invalid pattern error.
    pub fn invalid_pattern(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
