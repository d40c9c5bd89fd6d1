//! Radix tree router for Daedalus handler chains.
//!
//! This is the binding layer a linked route table is mounted onto. It
//! provides the two primitives the mount stage needs: binding a handler chain
//! to a method and path, and nesting a router under a mount prefix.
//!
//! # Features
//!
//! - **Radix Tree Matching**: lookup proportional to path length
//! - **Path Parameters**: `/user/:id`, optional `/user/:id?`
//! - **Wildcards**: catch-all routes (`/assets/*path`)
//! - **Nesting**: `nest("/id", &child)` re-binds a router under a prefix
//! - **Dispatch**: runs the matched chain against an [`Exchange`](daedalus_core::Exchange)
//!
//! # Example
//!
//! ```rust
//! use daedalus_core::{Exchange, Flow, Handler, HandlerChain};
//! use daedalus_router::Router;
//! use http::Method;
//!
//! let find = Handler::new("find", |_ex: &mut Exchange| Flow::Halt);
//!
//! let mut users = Router::new();
//! users.bind(Method::GET, "/user/:id?", HandlerChain::from_iter([find])).unwrap();
//!
//! let mut root = Router::new();
//! root.nest("/id", &users).unwrap();
//!
//! let route_match = root.match_route(&Method::GET, "/id/user/1").unwrap();
//! assert_eq!(route_match.chain.names(), vec!["find"]);
//! assert_eq!(route_match.params.get("id"), Some("1"));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod method_router;
mod node;
mod params;
mod router;

use daedalus_core::HandlerChain;

pub use error::RouterError;
pub use method_router::MethodRouter;
pub use params::Params;
pub use router::{Binding, Router};

/// A matched route with its chain and extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// The chain bound to the matched route
    pub chain: &'a HandlerChain,
    /// Extracted path parameters
    pub params: Params,
}

impl<'a> RouteMatch<'a> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(chain: &'a HandlerChain, params: Params) -> Self {
        Self { chain, params }
    }
}
