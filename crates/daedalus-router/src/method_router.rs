//! HTTP method-based routing.
//!
//! [`MethodRouter`] maps HTTP methods to handler chains for a single path.

use daedalus_core::HandlerChain;
use http::Method;

/// Maps HTTP methods to handler chains for a single route.
///
/// The first chain bound to a method is kept; later bindings for the same
/// method are ignored.
///
/// # Example
///
/// ```rust
/// use daedalus_core::{Exchange, Flow, Handler, HandlerChain};
/// use daedalus_router::MethodRouter;
/// use http::Method;
///
/// let list = Handler::new("list", |_ex: &mut Exchange| Flow::Halt);
/// let router = MethodRouter::new().get(HandlerChain::from_iter([list]));
///
/// assert_eq!(router.chain(&Method::GET).map(HandlerChain::names), Some(vec!["list"]));
/// assert!(router.chain(&Method::POST).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MethodRouter {
    chains: Vec<(Method, HandlerChain)>,
}

impl MethodRouter {
    /// Creates a new empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a GET chain.
    #[must_use]
    pub fn get(self, chain: HandlerChain) -> Self {
        self.on(Method::GET, chain)
    }

    /// Registers a POST chain.
    #[must_use]
    pub fn post(self, chain: HandlerChain) -> Self {
        self.on(Method::POST, chain)
    }

    /// Registers a PUT chain.
    #[must_use]
    pub fn put(self, chain: HandlerChain) -> Self {
        self.on(Method::PUT, chain)
    }

    /// Registers a DELETE chain.
    #[must_use]
    pub fn delete(self, chain: HandlerChain) -> Self {
        self.on(Method::DELETE, chain)
    }

    /// Registers a chain for any method.
    #[must_use]
    pub fn on(mut self, method: Method, chain: HandlerChain) -> Self {
        self.insert(method, chain);
        self
    }

    /// Registers a chain unless the method is already bound.
    ///
    /// Returns false if the method was already bound.
    pub fn insert(&mut self, method: Method, chain: HandlerChain) -> bool {
        if self.chain(&method).is_some() {
            return false;
        }
        self.chains.push((method, chain));
        true
    }

    /// Returns the chain bound to a method.
    #[must_use]
    pub fn chain(&self, method: &Method) -> Option<&HandlerChain> {
        self.chains
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, chain)| chain)
    }

    /// Merges another method router into this one, keeping existing bindings.
    pub fn merge(&mut self, other: Self) {
        for (method, chain) in other.chains {
            self.insert(method, chain);
        }
    }

    /// Returns true if any method is bound.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        !self.chains.is_empty()
    }

    /// Returns the bound methods in binding order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.chains.iter().map(|(m, _)| m.clone()).collect()
    }
}
