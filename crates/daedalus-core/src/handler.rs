//! Handler callables and handler chains.
//!
//! A [`Handler`] is a named callable that receives the per-request
//! [`Exchange`] and decides whether the chain continues. A [`HandlerChain`] is
//! the ordered, duplicate-free sequence the linker produces for every route.
//!
//! # Example
//!
//! ```
//! use daedalus_core::{Exchange, Flow, Handler, HandlerChain};
//! use http::Method;
//!
//! let auth = Handler::new("isAuth", |_ex: &mut Exchange| Flow::Continue);
//! let find = Handler::new("find", |ex: &mut Exchange| {
//!     ex.response.json(serde_json::json!({ "ok": true }));
//!     Flow::Halt
//! });
//!
//! let mut chain = HandlerChain::new();
//! chain.push(auth.clone());
//! chain.push(find);
//! chain.push(auth); // already present, ignored
//!
//! assert_eq!(chain.names(), vec!["isAuth", "find"]);
//!
//! let mut ex = Exchange::new(Method::GET, "/users");
//! chain.run(&mut ex);
//! assert_eq!(ex.response.body, Some(serde_json::json!({ "ok": true })));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::{Method, StatusCode};
use serde_json::Value;

/// Whether a chain continues after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run the next handler in the chain.
    Continue,
    /// Stop the chain; the response is final.
    Halt,
}

/// The inbound side of an [`Exchange`].
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Path parameters extracted by the router.
    pub params: HashMap<String, String>,
    /// Decoded request body.
    pub body: Value,
}

impl Request {
    /// Returns a path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// The outbound side of an [`Exchange`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code.
    pub status: StatusCode,
    /// JSON body, if any handler produced one.
    pub body: Option<Value>,
    /// View name to be rendered by the view layer.
    pub view: Option<String>,
    /// Redirect target.
    pub location: Option<String>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            body: None,
            view: None,
            location: None,
        }
    }
}

impl Response {
    /// Sets a JSON body with status 200.
    pub fn json(&mut self, body: Value) {
        self.status = StatusCode::OK;
        self.body = Some(body);
    }

    /// Sets the status code.
    pub fn status(&mut self, status: StatusCode) {
        self.status = status;
    }
}

/// Per-request state passed through a handler chain.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// The request.
    pub request: Request,
    /// The response being built.
    pub response: Response,
}

impl Exchange {
    /// Creates an exchange with an empty body and no parameters.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request: Request {
                method,
                path: path.into(),
                params: HashMap::new(),
                body: Value::Null,
            },
            response: Response::default(),
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.request.body = body;
        self
    }
}

type HandlerFn = dyn Fn(&mut Exchange) -> Flow + Send + Sync + 'static;

/// A named, cheaply clonable request handler.
///
/// Two handlers are equal when they share the same underlying callable, so a
/// clone of a handler is equal to the original while two handlers built from
/// identical closures are not. Synthesized handlers ([`Handler::deny`],
/// [`Handler::render`], [`Handler::redirect`]) are equal by name.
#[derive(Clone)]
pub struct Handler {
    name: Arc<str>,
    func: Arc<HandlerFn>,
    synthesized: bool,
}

impl Handler {
    /// Wraps a callable as a handler.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Exchange) -> Flow + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            func: Arc::new(func),
            synthesized: false,
        }
    }

    fn synthesized<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Exchange) -> Flow + Send + Sync + 'static,
    {
        Self {
            synthesized: true,
            ..Self::new(name, func)
        }
    }

    /// Returns the handler name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the handler.
    pub fn call(&self, exchange: &mut Exchange) -> Flow {
        (self.func)(exchange)
    }

    /// Builds the handler substituted for a `false` policy: responds 403 and halts.
    #[must_use]
    pub fn deny() -> Self {
        Self::synthesized("deny", |ex: &mut Exchange| {
            ex.response.status(StatusCode::FORBIDDEN);
            ex.response.body = Some(serde_json::json!({ "error": "forbidden" }));
            Flow::Halt
        })
    }

    /// Builds the terminal handler of a `view` route.
    #[must_use]
    pub fn render(view: impl Into<String>) -> Self {
        let view = view.into();
        Self::synthesized(format!("render:{view}"), move |ex: &mut Exchange| {
            ex.response.status(StatusCode::OK);
            ex.response.view = Some(view.clone());
            Flow::Halt
        })
    }

    /// Builds the terminal handler of a `redirect` route.
    #[must_use]
    pub fn redirect(target: impl Into<String>) -> Self {
        let target = target.into();
        Self::synthesized(format!("redirect:{target}"), move |ex: &mut Exchange| {
            ex.response.status(StatusCode::FOUND);
            ex.response.location = Some(target.clone());
            Flow::Halt
        })
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        if self.synthesized && other.synthesized {
            return self.name == other.name;
        }
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.name).finish()
    }
}

/// An ordered, duplicate-free sequence of handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerChain {
    handlers: Vec<Handler>,
}

impl HandlerChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler unless it is already present.
    pub fn push(&mut self, handler: Handler) {
        if !self.contains(&handler) {
            self.handlers.push(handler);
        }
    }

    /// Appends every handler of `other`, keeping first occurrences.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Handler>) {
        for handler in other {
            self.push(handler);
        }
    }

    /// Returns true if the handler is part of the chain.
    #[must_use]
    pub fn contains(&self, handler: &Handler) -> bool {
        self.handlers.contains(handler)
    }

    /// Returns the handlers in execution order.
    #[must_use]
    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    /// Returns the last handler.
    #[must_use]
    pub fn last(&self) -> Option<&Handler> {
        self.handlers.last()
    }

    /// Returns the handler names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(Handler::name).collect()
    }

    /// Returns the number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if the chain has no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the handlers in order until one halts.
    ///
    /// Returns the flow of the last handler that ran.
    pub fn run(&self, exchange: &mut Exchange) -> Flow {
        for handler in &self.handlers {
            if handler.call(exchange) == Flow::Halt {
                return Flow::Halt;
            }
        }
        Flow::Continue
    }
}

impl FromIterator<Handler> for HandlerChain {
    fn from_iter<I: IntoIterator<Item = Handler>>(iter: I) -> Self {
        let mut chain = Self::new();
        chain.extend(iter);
        chain
    }
}

impl IntoIterator for HandlerChain {
    type Item = Handler;
    type IntoIter = std::vec::IntoIter<Handler>;

    fn into_iter(self) -> Self::IntoIter {
        self.handlers.into_iter()
    }
}

impl<'a> IntoIterator for &'a HandlerChain {
    type Item = &'a Handler;
    type IntoIter = std::slice::Iter<'a, Handler>;

    fn into_iter(self) -> Self::IntoIter {
        self.handlers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> Handler {
        Handler::new(name, |_ex: &mut Exchange| Flow::Continue)
    }

    #[test]
    fn test_handler_identity() {
        let a = noop("a");
        let b = noop("a");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_chain_dedup_keeps_first_occurrence() {
        let a = noop("a");
        let b = noop("b");
        let chain: HandlerChain = vec![a.clone(), b.clone(), a.clone()].into_iter().collect();
        assert_eq!(chain.names(), vec!["a", "b"]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_chain_run_stops_on_halt() {
        let stop = Handler::new("stop", |ex: &mut Exchange| {
            ex.response.status(StatusCode::ACCEPTED);
            Flow::Halt
        });
        let never = Handler::new("never", |ex: &mut Exchange| {
            ex.response.status(StatusCode::IM_A_TEAPOT);
            Flow::Continue
        });
        let chain: HandlerChain = vec![noop("first"), stop, never].into_iter().collect();

        let mut ex = Exchange::new(Method::GET, "/");
        assert_eq!(chain.run(&mut ex), Flow::Halt);
        assert_eq!(ex.response.status, StatusCode::ACCEPTED);
    }

    #[test]
    fn test_synthesized_handlers_equal_by_name() {
        assert_eq!(Handler::deny(), Handler::deny());
        assert_eq!(Handler::render("home"), Handler::render("home"));
        assert_ne!(Handler::render("home"), Handler::render("about"));
        assert_ne!(Handler::deny(), noop("deny"));

        let chain: HandlerChain = vec![Handler::deny(), Handler::deny()].into_iter().collect();
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_deny_handler() {
        let mut ex = Exchange::new(Method::GET, "/");
        assert_eq!(Handler::deny().call(&mut ex), Flow::Halt);
        assert_eq!(ex.response.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_render_handler() {
        let handler = Handler::render("users/index");
        assert_eq!(handler.name(), "render:users/index");

        let mut ex = Exchange::new(Method::GET, "/");
        handler.call(&mut ex);
        assert_eq!(ex.response.view.as_deref(), Some("users/index"));
    }

    #[test]
    fn test_redirect_handler() {
        let mut ex = Exchange::new(Method::GET, "/");
        Handler::redirect("/login").call(&mut ex);
        assert_eq!(ex.response.status, StatusCode::FOUND);
        assert_eq!(ex.response.location.as_deref(), Some("/login"));
    }

    #[test]
    fn test_request_param() {
        let mut ex = Exchange::new(Method::GET, "/users/1");
        ex.request.params.insert("id".to_string(), "1".to_string());
        assert_eq!(ex.request.param("id"), Some("1"));
        assert_eq!(ex.request.param("missing"), None);
    }

    #[test]
    fn test_handler_debug_shows_name() {
        assert_eq!(format!("{:?}", noop("isAuth")), "Handler(\"isAuth\")");
    }
}
