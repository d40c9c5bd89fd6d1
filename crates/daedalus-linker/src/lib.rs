//! # Daedalus Linker
//!
//! Turns registered entities into a mountable route table.
//!
//! Linking runs once at startup, before any request is served:
//!
//! 1. **Resolve**: every string reference in a declaration is qualified
//!    ([`namespace`]) and resolved into a flat, duplicate-free
//!    [`HandlerChain`](daedalus_core::HandlerChain) ([`Resolver`]).
//! 2. **Guard**: a Controller's `*` policy is merged into each of its policy
//!    chains, which prefix the matching route and action chains ([`PolicySet`]).
//! 3. **Expand**: actions without an explicit route are expanded from the
//!    configured templates in REST and/or CRUD mode ([`ActionExpander`]).
//! 4. **Store**: each chain lands at `mount → method → path` in a
//!    [`RouteTable`]; a repeated slot is an override, not an error.
//! 5. **Mount**: the table is bound onto routers through [`RouteBinder`]
//!    ([`mount()`]).
//!
//! # Example
//!
//! ```
//! use daedalus_core::{Exchange, Flow, Handler, Manifest, Registry};
//! use daedalus_linker::{Linker, Mounted};
//! use daedalus_router::Router;
//! use http::Method;
//!
//! let mut registry = Registry::new();
//! registry
//!     .register(
//!         Manifest::service("AuthService")
//!             .method("isAuth", Handler::new("isAuth", |_ex: &mut Exchange| Flow::Continue)),
//!     )
//!     .unwrap();
//! registry
//!     .register(
//!         Manifest::controller("UserController")
//!             .mount("/id")
//!             .method("find", Handler::new("find", |ex: &mut Exchange| {
//!                 let id = ex.request.param("id").unwrap_or_default().to_string();
//!                 ex.response.json(serde_json::json!({ "id": id }));
//!                 Flow::Halt
//!             }))
//!             .policy("*", "AuthService.isAuth")
//!             .action("find"),
//!     )
//!     .unwrap();
//!
//! let linker = Linker::default();
//! let table = linker.link(&registry).unwrap();
//! assert_eq!(
//!     table.chain("/id", "get", "/user/:id?").unwrap().names(),
//!     vec!["isAuth", "find"]
//! );
//!
//! let mounted: Mounted<Router> = linker.mount(&table).unwrap();
//! let response = mounted
//!     .root()
//!     .dispatch(Method::GET, "/id/user/1", serde_json::Value::Null)
//!     .unwrap();
//! assert_eq!(response.body, Some(serde_json::json!({ "id": "1" })));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod actions;
mod linker;
mod mount;
pub mod namespace;
mod policy;
mod resolver;
mod table;

pub use actions::{ActionExpander, DefaultFormatter, RouteFormatter, RouteMode};
pub use linker::{LinkOptions, Linker};
pub use mount::{mount, Mounted, RouteBinder};
pub use namespace::{qualify, tokenize, Namespace};
pub use policy::{merge, PolicySet, WILDCARD};
pub use resolver::Resolver;
pub use table::{
    join_path, normalize_path, ParsedRoute, RouteOverride, RouteTable, GET, KNOWN_METHODS, REDIRECT,
    VIEW,
};
