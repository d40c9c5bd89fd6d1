//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Placeholder substituted with the action key in route templates.
pub const ACTION_PLACEHOLDER: &str = "{{action}}";

/// Deployment environment.
///
/// Route overrides are reported as warnings in development and stay silent in
/// production.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development.
    #[default]
    Development,
    /// Production deployment.
    Production,
}

impl Environment {
    /// Returns true for [`Environment::Production`].
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Route generation options.
///
/// # Example
///
/// ```
/// use daedalus_config::RoutingConfig;
///
/// let config = RoutingConfig::default();
/// assert!(config.rest);
/// assert!(!config.crud);
/// assert_eq!(config.templates["find"], "get /{{action}}/:id?");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Action key to default route template.
    #[serde(default = "default_templates")]
    pub templates: IndexMap<String, String>,

    /// Generate REST-style routes from actions.
    #[serde(default = "default_true")]
    pub rest: bool,

    /// Generate CRUD-style routes from actions.
    #[serde(default)]
    pub crud: bool,

    /// Reverse-order paths before binding, so literal paths are bound ahead of
    /// parameterized paths sharing a prefix.
    #[serde(default = "default_true")]
    pub sort: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            templates: default_templates(),
            rest: true,
            crud: false,
            sort: true,
        }
    }
}

fn default_templates() -> IndexMap<String, String> {
    [
        ("find", "get /{{action}}/:id?"),
        ("create", "post /{{action}}"),
        ("update", "put /{{action}}/:id?"),
        ("destroy", "delete /{{action}}/:id?"),
    ]
    .into_iter()
    .map(|(action, template)| (action.to_string(), template.to_string()))
    .collect()
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
