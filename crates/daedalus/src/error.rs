//! Bootstrap errors.

use daedalus_config::ConfigError;
use daedalus_core::LinkError;
use daedalus_router::RouterError;
use daedalus_telemetry::TelemetryError;
use thiserror::Error;

/// Errors that abort application startup.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    /// Entity declarations could not be linked.
    #[error("link error: {0}")]
    Link(#[from] LinkError),

    /// The route table could not be bound.
    #[error("router error: {0}")]
    Router(#[from] RouterError),
}

/// Result type for bootstrap operations.
pub type BootstrapResult<T> = Result<T, BootstrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_link_error() {
        let err: BootstrapError = LinkError::handler_not_found("UserController.find").into();
        assert!(matches!(err, BootstrapError::Link(_)));
        assert!(err.to_string().starts_with("link error: "));
    }

    #[test]
    fn test_from_router_error() {
        let err: BootstrapError = RouterError::InvalidMethod("fetch".to_string()).into();
        assert_eq!(err.to_string(), "router error: invalid HTTP method 'fetch'");
    }
}
