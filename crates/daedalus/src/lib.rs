//! # Daedalus
//!
//! **Declarative controller and service routing**
//!
//! Daedalus turns a set of declared entities into mounted routers:
//!
//! - 🧩 **Entities** – Services and Controllers declare policies, filters,
//!   routes and actions as data, not code
//! - 🔗 **References** – `isAuth`, `this.isAuth` or `AuthService.filters.admin`
//!   resolve into flat, duplicate-free handler chains
//! - 🛡️ **Policies** – a Controller's `*` policy guards every route it owns;
//!   `true` allows, `false` denies
//! - 🗺️ **Templates** – actions expand into REST and/or CRUD routes
//! - 🔁 **Repeatable** – linking is a pure function of the registry and config
//!
//! ## Quick Start
//!
//! ```rust
//! use daedalus::prelude::*;
//! use http::Method;
//!
//! let mut app = Application::new(DaedalusConfig::development());
//! app.register(
//!     Manifest::service("AuthService")
//!         .method("isAuth", Handler::new("isAuth", |_ex: &mut Exchange| Flow::Continue)),
//! )
//! .unwrap();
//! app.register(
//!     Manifest::controller("UserController")
//!         .method("find", Handler::new("find", |ex: &mut Exchange| {
//!             ex.response.json(serde_json::json!({ "id": ex.request.param("id") }));
//!             Flow::Halt
//!         }))
//!         .policy("*", "AuthService.isAuth")
//!         .action("find"),
//! )
//! .unwrap();
//!
//! app.mount().unwrap();
//! let response = app.dispatch(Method::GET, "/user/1", serde_json::Value::Null).unwrap();
//! assert_eq!(response.body, Some(serde_json::json!({ "id": "1" })));
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Manifest → Entity → Registry → Linker → RouteTable → mount → Router
//!                                  ↑
//!                     DaedalusConfig (templates, rest, crud, sort)
//! ```

#![doc(html_root_url = "https://docs.rs/daedalus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod application;
mod error;

pub use application::Application;
pub use error::{BootstrapError, BootstrapResult};

// Re-export core types
pub use daedalus_core as core;

// Re-export configuration
pub use daedalus_config as config;

// Re-export telemetry
pub use daedalus_telemetry as telemetry;

// Re-export router types
pub use daedalus_router as router;

// Re-export the linker
pub use daedalus_linker as linker;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use daedalus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Application, BootstrapError, BootstrapResult};

    pub use daedalus_core::{
        global, Action, Context, Declaration, Entity, EntityKind, ErrorKind, Exchange, Flow,
        Handler, HandlerChain, LinkError, LinkResult, Manifest, Registry, Request, Response,
    };

    pub use daedalus_config::{ConfigLoader, DaedalusConfig, Environment, RoutingConfig};

    pub use daedalus_linker::{
        DefaultFormatter, LinkOptions, Linker, Mounted, RouteFormatter, RouteMode, RouteTable,
    };

    pub use daedalus_router::Router;
}
