//! # Daedalus Core
//!
//! Core types for the Daedalus route linker.
//!
//! This crate provides the foundational types used throughout Daedalus:
//!
//! - [`Entity`] / [`Manifest`] - Services and Controllers and the declarative description they are built from
//! - [`Declaration`] - A callable, namespace reference, policy flag, or ordered list of those
//! - [`Handler`] / [`HandlerChain`] - Request callables and the duplicate-free chains the linker produces
//! - [`Registry`] - Insertion-ordered entity registry, plus the process-wide [`global`] registry
//! - [`LinkError`] - Startup error taxonomy

#![doc(html_root_url = "https://docs.rs/daedalus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod entity;
mod error;
mod handler;
mod registry;

pub use entity::{default_base_path, Action, Context, Declaration, Entity, EntityKind, Manifest};
pub use error::{ErrorKind, LinkError, LinkResult};
pub use handler::{Exchange, Flow, Handler, HandlerChain, Request, Response};
pub use registry::{global, Registry};
