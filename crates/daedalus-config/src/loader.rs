//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, DaedalusConfig, Environment, LogFormat};

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use daedalus_config::ConfigLoader;
///
/// # fn main() -> Result<(), daedalus_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("daedalus.toml")?
///     .with_env_prefix("DAEDALUS")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: DaedalusConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader seeded with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: DaedalusConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = DaedalusConfig::default();
        self
    }

    /// Start with development preset configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = DaedalusConfig::development();
        self
    }

    /// Start with production preset configuration.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = DaedalusConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats, picked by extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format ("toml" or "json").
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unsupported.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     environment = "production"
    ///
    ///     [routing]
    ///     crud = true
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.routing.crud);
    /// assert!(config.environment.is_production());
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::unsupported_format(format)),
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`.
    /// For example, with prefix "DAEDALUS":
    /// - `DAEDALUS__ENVIRONMENT=production`
    /// - `DAEDALUS__ROUTING__CRUD=true`
    /// - `DAEDALUS__ROUTING__TEMPLATES__FIND=get /{{action}}/:slug`
    ///
    /// Template keys match existing templates case-insensitively, so
    /// `TEMPLATES__FINDALL` replaces a `findAll` template from a file. A key
    /// with no existing template is added lower-cased.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(ConfigError::env_parse_error(".env", e.to_string())),
        }
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable cannot be parsed or
    /// validation fails.
    pub fn load(mut self) -> Result<DaedalusConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without applying environment overrides or validating.
    #[must_use]
    pub fn load_unvalidated(self) -> DaedalusConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<DaedalusConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::unsupported_format(path.display().to_string())),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let env_vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(key_without_prefix) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__"))
        else {
            return Ok(());
        };

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["ENVIRONMENT"] => {
                self.config.environment = match value.to_lowercase().as_str() {
                    "development" => Environment::Development,
                    "production" => Environment::Production,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'development' or 'production'",
                        ))
                    }
                };
            }
            // Routing section
            ["ROUTING", "REST"] => {
                self.config.routing.rest = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["ROUTING", "CRUD"] => {
                self.config.routing.crud = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["ROUTING", "SORT"] => {
                self.config.routing.sort = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["ROUTING", "TEMPLATES", action] => {
                let templates = &self.config.routing.templates;
                let action = templates
                    .keys()
                    .find(|existing| existing.eq_ignore_ascii_case(action))
                    .cloned()
                    .unwrap_or_else(|| action.to_lowercase());
                if value.is_empty() {
                    self.config.routing.templates.shift_remove(&action);
                } else {
                    self.config
                        .routing
                        .templates
                        .insert(action, value.to_string());
                }
            }
            // Logging section
            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "ANSI_ENABLED"] => {
                self.config.logging.ansi_enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            _ => {}
        }
        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, DaedalusConfig::default());
    }

    #[test]
    fn test_loader_with_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert!(config.environment.is_production());
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"routing": {"rest": false, "crud": true}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();
        assert!(!config.routing.rest);
        assert!(config.routing.crud);
    }

    #[test]
    fn test_loader_with_string_unsupported_format() {
        let result = ConfigLoader::new().with_string("a: 1", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_loader_with_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [routing]
            sort = false

            [routing.templates]
            find = "get /{{{{action}}}}/:slug"
            "#
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();
        assert!(!config.routing.sort);
        assert_eq!(config.routing.templates["find"], "get /{{action}}/:slug");
    }

    #[test]
    fn test_loader_with_file_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/daedalus.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/daedalus.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, DaedalusConfig::default());
    }

    #[test]
    fn test_loader_rejects_invalid_template() {
        let toml = r#"
            [routing.templates]
            find = "get /find"
        "#;
        let result = ConfigLoader::new().with_string(toml, "toml").unwrap().load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("False"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    // Environment overrides are exercised through apply_env_var directly;
    // mutating the process environment needs unsafe code.

    #[test]
    fn test_apply_env_var_routing() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__ROUTING__CRUD", "true", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__ROUTING__SORT", "off", "TEST")
            .unwrap();
        assert!(loader.config.routing.crud);
        assert!(!loader.config.routing.sort);
    }

    #[test]
    fn test_apply_env_var_templates() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__ROUTING__TEMPLATES__FIND", "get /{{action}}/:slug", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__ROUTING__TEMPLATES__DESTROY", "", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__ROUTING__TEMPLATES__COUNT", "get /{{action}}/total", "TEST")
            .unwrap();

        let templates = &loader.config.routing.templates;
        assert_eq!(templates["find"], "get /{{action}}/:slug");
        assert!(!templates.contains_key("destroy"));
        assert_eq!(templates["count"], "get /{{action}}/total");
    }

    #[test]
    fn test_apply_env_var_template_keeps_key_case() {
        let mut loader = ConfigLoader::new();
        loader
            .config
            .routing
            .templates
            .insert("findAll".to_string(), "get /{{action}}".to_string());
        loader
            .apply_env_var("TEST__ROUTING__TEMPLATES__FINDALL", "get /{{action}}/:page?", "TEST")
            .unwrap();

        let templates = &loader.config.routing.templates;
        assert_eq!(templates["findAll"], "get /{{action}}/:page?");
        assert!(!templates.contains_key("findall"));
    }

    #[test]
    fn test_apply_env_var_environment() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__ENVIRONMENT", "Production", "TEST")
            .unwrap();
        assert!(loader.config.environment.is_production());

        assert!(loader
            .apply_env_var("TEST__ENVIRONMENT", "staging", "TEST")
            .is_err());
    }

    #[test]
    fn test_apply_env_var_logging() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__LOGGING__LEVEL", "trace", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__LOGGING__FORMAT", "pretty", "TEST")
            .unwrap();
        assert_eq!(loader.config.logging.level, "trace");
        assert_eq!(loader.config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_apply_env_var_invalid_boolean() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_env_var("TEST__ROUTING__REST", "perhaps", "TEST")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { .. }));
    }

    #[test]
    fn test_apply_env_var_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__SERVER__HTTP_ADDR", "0.0.0.0:1", "TEST")
            .unwrap();
        loader.apply_env_var("TESTING", "1", "TEST").unwrap();
        assert_eq!(loader.config, DaedalusConfig::default());
    }
}
