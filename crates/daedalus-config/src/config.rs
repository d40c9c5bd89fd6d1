//! Main configuration types.
//!
//! This module provides the top-level [`DaedalusConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Environment, LogFormat, LoggingConfig, RoutingConfig};

/// Route methods accepted in templates, including the `view` and `redirect`
/// pseudo-methods.
const TEMPLATE_METHODS: [&str; 9] = [
    "get", "post", "put", "delete", "patch", "head", "options", "view", "redirect",
];

/// Complete Daedalus configuration.
///
/// # Example
///
/// ```
/// use daedalus_config::DaedalusConfig;
///
/// let config = DaedalusConfig::default();
/// assert!(config.routing.rest);
/// assert!(!config.environment.is_production());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DaedalusConfig {
    /// Deployment environment.
    #[serde(default)]
    pub environment: Environment,

    /// Route generation options.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DaedalusConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> DaedalusConfigBuilder {
        DaedalusConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - A template names an unknown method or a path not starting with `/`
    /// - The log level is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (action, template) in &self.routing.templates {
            validate_template(action, template)?;
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty, colored debug logs with source locations
    /// - Route overrides reported as warnings
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.environment = Environment::Development;
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// - JSON logs at info level
    /// - Route overrides applied silently
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.environment = Environment::Production;
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;

        config
    }
}

fn validate_template(action: &str, template: &str) -> Result<(), ConfigError> {
    let field = format!("routing.templates.{action}");

    let mut parts = template.split_whitespace();
    let (methods, path) = match (parts.next(), parts.next(), parts.next()) {
        (Some(path), None, None) => (None, path),
        (Some(methods), Some(path), None) => (Some(methods), path),
        _ => {
            return Err(ConfigError::invalid_value(
                field,
                format!("template '{template}' must be '[method] /path'"),
            ))
        }
    };

    if let Some(methods) = methods {
        if let Some(unknown) = methods
            .split('|')
            .map(str::to_lowercase)
            .find(|m| !TEMPLATE_METHODS.contains(&m.as_str()))
        {
            return Err(ConfigError::invalid_value(
                field,
                format!("unknown method '{unknown}'"),
            ));
        }
    }

    if !path.starts_with('/') {
        return Err(ConfigError::invalid_value(
            field,
            format!("path '{path}' must start with '/'"),
        ));
    }

    Ok(())
}

/// Builder for [`DaedalusConfig`].
#[derive(Debug, Default)]
pub struct DaedalusConfigBuilder {
    environment: Option<Environment>,
    routing: Option<RoutingConfig>,
    logging: Option<LoggingConfig>,
}

impl DaedalusConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the environment.
    #[must_use]
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Set the routing configuration.
    #[must_use]
    pub fn routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> DaedalusConfig {
        DaedalusConfig {
            environment: self.environment.unwrap_or_default(),
            routing: self.routing.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<DaedalusConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
