//! High-level router API.
//!
//! This module provides the [`Router`] struct, the binding target for a linked
//! route table.

use daedalus_core::{Exchange, HandlerChain, Response};
use http::Method;
use serde_json::Value;

use crate::error::RouterError;
use crate::method_router::MethodRouter;
use crate::node::Node;
use crate::params::Params;
use crate::RouteMatch;

/// One `(method, pattern)` binding, in the form it was bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// HTTP method.
    pub method: Method,
    /// Path pattern as bound, before optional segments are expanded.
    pub path: String,
    /// The bound chain.
    pub chain: HandlerChain,
}

/// A radix tree router holding handler chains.
///
/// # Example
///
/// ```rust
/// use daedalus_core::{Exchange, Flow, Handler, HandlerChain};
/// use daedalus_router::Router;
/// use http::Method;
///
/// let find = Handler::new("find", |ex: &mut Exchange| {
///     let id = ex.request.param("id").unwrap_or("all").to_string();
///     ex.response.json(serde_json::json!({ "id": id }));
///     Flow::Halt
/// });
///
/// let mut router = Router::new();
/// router.bind(Method::GET, "/user/:id?", HandlerChain::from_iter([find])).unwrap();
///
/// let response = router.dispatch(Method::GET, "/user/1", serde_json::Value::Null).unwrap();
/// assert_eq!(response.body, Some(serde_json::json!({ "id": "1" })));
///
/// let response = router.dispatch(Method::GET, "/user", serde_json::Value::Null).unwrap();
/// assert_eq!(response.body, Some(serde_json::json!({ "id": "all" })));
/// ```
///
/// # Route Priority
///
/// 1. **Static segments** (e.g., `/user/me`)
/// 2. **Parameter segments** (e.g., `/user/:id`)
/// 3. **Wildcard segments** (e.g., `/assets/*path`)
///
/// Binding a method to a path that already has a chain for that method keeps
/// the first chain.
#[derive(Debug, Clone)]
pub struct Router {
    root: Node,
    bindings: Vec<Binding>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            bindings: Vec::new(),
        }
    }

    /// Binds a chain to a method and path pattern.
    ///
    /// A `:name?` segment is optional: the pattern is registered both with
    /// and without it.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] for malformed patterns and for
    /// patterns whose parameter names differ from a route already bound at
    /// the same position.
    pub fn bind(&mut self, method: Method, path: &str, chain: HandlerChain) -> Result<(), RouterError> {
        for concrete in expand_optional(path) {
            self.root
                .insert(&concrete, MethodRouter::new().on(method.clone(), chain.clone()))?;
        }
        tracing::trace!(%method, path, handlers = chain.len(), "bound route");
        self.bindings.push(Binding {
            method,
            path: path.to_string(),
            chain,
        });
        Ok(())
    }

    /// Binds every route of `child` under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if the prefix makes a pattern
    /// malformed.
    pub fn nest(&mut self, prefix: &str, child: &Self) -> Result<(), RouterError> {
        for binding in &child.bindings {
            let path = join(prefix, &binding.path);
            self.bind(binding.method.clone(), &path, binding.chain.clone())?;
        }
        Ok(())
    }

    /// Matches a method and path.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let (methods, params) = self.root.match_path(path)?;
        let chain = methods.chain(method)?;
        Some(RouteMatch::new(chain, params))
    }

    /// Matches a path regardless of method.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter, Params)> {
        self.root.match_path(path)
    }

    /// Returns the methods bound at a path; empty if the path is unknown.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        self.match_path(path)
            .map(|(methods, _)| methods.allowed_methods())
            .unwrap_or_default()
    }

    /// Runs the chain matched by `method` and `path`.
    ///
    /// Returns `None` if no route matches.
    #[must_use]
    pub fn dispatch(&self, method: Method, path: &str, body: Value) -> Option<Response> {
        let route = self.match_route(&method, path)?;
        let mut exchange = Exchange::new(method, path).with_body(body);
        exchange.request.params = route.params.into_map();
        route.chain.run(&mut exchange);
        Some(exchange.response)
    }

    /// Returns the bindings in binding order.
    #[must_use]
    pub fn routes(&self) -> &[Binding] {
        &self.bindings
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Expands `:name?` segments into every concrete pattern, longest first.
fn expand_optional(path: &str) -> Vec<String> {
    let mut patterns = vec![String::new()];
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match segment.strip_suffix('?').filter(|s| s.starts_with(':')) {
            Some(required) => {
                let with: Vec<String> = patterns.iter().map(|p| format!("{p}/{required}")).collect();
                patterns = with.into_iter().chain(patterns).collect();
            }
            None => {
                for pattern in &mut patterns {
                    pattern.push('/');
                    pattern.push_str(segment);
                }
            }
        }
    }
    for pattern in &mut patterns {
        if pattern.is_empty() {
            pattern.push('/');
        }
    }
    patterns
}

fn join(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{path}"),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{path}"),
    }
}
