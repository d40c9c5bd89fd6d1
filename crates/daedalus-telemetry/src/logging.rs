//! Subscriber setup.
//!
//! [`LogConfig`] is the runtime view of the `[logging]` configuration section.
//! [`init_logging`] installs a global subscriber built from it; the call fails
//! if another subscriber is already installed.

use daedalus_config::{Environment, LogFormat, LoggingConfig};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g., "info", "`daedalus_linker=trace`").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to emit ANSI colors (pretty format only).
    pub ansi: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from(&LoggingConfig::default())
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            ansi: true,
            include_target: true,
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            ansi: false,
            include_target: true,
        }
    }

    /// Builds the configuration for an environment from the logging section.
    ///
    /// Span events are only emitted in development.
    #[must_use]
    pub fn for_environment(logging: &LoggingConfig, environment: Environment) -> Self {
        let mut config = Self::from(logging);
        config.span_events = !environment.is_production();
        config
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(logging: &LoggingConfig) -> Self {
        Self {
            enabled: logging.enabled,
            level: logging.level.clone(),
            json_format: logging.format == LogFormat::Json,
            span_events: false,
            file_line_info: logging.include_location,
            ansi: logging.ansi_enabled,
            include_target: true,
        }
    }
}

/// Initializes the global logging subscriber.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` if the level is not a valid filter
/// directive, and `TelemetryError::LoggingInit` if a global subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(config.ansi)
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::InvalidConfig(format!("invalid log level '{filter}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_follows_logging_section() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(config.json_format);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert!(config.span_events);
        assert!(config.file_line_info);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_production_config() {
        let config = LogConfig::production();
        assert!(config.json_format);
        assert!(!config.span_events);
        assert!(!config.ansi);
    }

    #[test]
    fn test_from_logging_section() {
        let logging = LoggingConfig {
            enabled: true,
            level: "trace".to_string(),
            format: LogFormat::Pretty,
            ansi_enabled: true,
            include_location: true,
        };
        let config = LogConfig::from(&logging);
        assert_eq!(config.level, "trace");
        assert!(!config.json_format);
        assert!(config.ansi);
        assert!(config.file_line_info);
    }

    #[test]
    fn test_for_environment_span_events() {
        let logging = LoggingConfig::default();
        assert!(LogConfig::for_environment(&logging, Environment::Development).span_events);
        assert!(!LogConfig::for_environment(&logging, Environment::Production).span_events);
    }

    #[test]
    fn test_create_env_filter() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("daedalus_linker=trace,warn").is_ok());
        assert!(matches!(
            create_env_filter("daedalus=loud"),
            Err(TelemetryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(init_logging(&config).is_ok());
    }
}
