//! Typed configuration for Daedalus.
//!
//! This crate provides the strongly-typed configuration consumed by the
//! linker and the application bootstrap, with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`DaedalusConfig`] groups three sections:
//!
//! - [`Environment`] - development or production; decides whether route
//!   overrides are reported
//! - [`RoutingConfig`] - action templates and the REST/CRUD/sort switches
//! - [`LoggingConfig`] - level and format of the tracing subscriber
//!
//! # Example
//!
//! ```no_run
//! use daedalus_config::ConfigLoader;
//!
//! # fn main() -> Result<(), daedalus_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("daedalus.toml")?
//!     .with_env_prefix("DAEDALUS")
//!     .load()?;
//!
//! println!("CRUD routes enabled: {}", config.routing.crud);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! environment = "production"
//!
//! [routing]
//! rest = true
//! crud = false
//! sort = true
//!
//! [routing.templates]
//! find = "get /{{action}}/:id?"
//! create = "post /{{action}}"
//! update = "put /{{action}}/:id?"
//! destroy = "delete /{{action}}/:id?"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden via environment variables using the format
//! `PREFIX__SECTION__KEY`. For example:
//!
//! - `DAEDALUS__ENVIRONMENT=production`
//! - `DAEDALUS__ROUTING__CRUD=true`
//! - `DAEDALUS__ROUTING__TEMPLATES__FIND=get /{{action}}/:slug`
//! - `DAEDALUS__LOGGING__LEVEL=debug`

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{DaedalusConfig, DaedalusConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{Environment, LogFormat, LoggingConfig, RoutingConfig, ACTION_PLACEHOLDER};
