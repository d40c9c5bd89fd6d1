//! Structured logging for Daedalus.
//!
//! Daedalus reports its work through `tracing` events:
//!
//! - `trace` for every namespace resolution step
//! - `debug` for entity registration and each route recorded or bound
//! - `info` for a completed link and mount
//! - `warn` for route overrides outside production
//!
//! This crate installs a `tracing-subscriber` registry that renders those
//! events as JSON (production) or pretty text (development).
//!
//! # Example
//!
//! ```rust,ignore
//! use daedalus_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(entity = "UserController", "linked");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
