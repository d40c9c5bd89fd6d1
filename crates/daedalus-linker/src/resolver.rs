//! Handler reference resolution.
//!
//! The [`Resolver`] turns a [`Declaration`] into a flat [`HandlerChain`]:
//! callables are taken as-is, references are looked up in the registry and
//! resolved recursively, and lists are concatenated in order with duplicates
//! dropped.
//!
//! A bare member key is looked up on the target entity in this order:
//!
//! 1. the method table
//! 2. the collection of the active context, unless that entry is the
//!    declaration being resolved
//! 3. the filters
//!
//! References found inside a target entity are qualified relative to that
//! entity. The resolver tracks the references on the current resolution path
//! and fails with [`LinkError::CircularReference`] when one repeats; two
//! branches reaching the same reference are not a cycle.

use daedalus_core::{
    Context, Declaration, Entity, Handler, HandlerChain, LinkError, LinkResult, Registry,
};

use crate::namespace::{tokenize, Namespace};

/// Resolves declarations against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r Registry,
}

impl<'r> Resolver<'r> {
    /// Creates a resolver over a registry.
    #[must_use]
    pub const fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Resolves a declaration owned by `owner` in `context`.
    ///
    /// `origin` names the declaration in error messages
    /// (e.g. `UserController.policies.find`).
    ///
    /// # Errors
    ///
    /// - [`LinkError::EntityNotFound`] / [`LinkError::HandlerNotFound`] for
    ///   unresolvable references
    /// - [`LinkError::InvalidHandlerType`] for a flag outside a policy context
    /// - [`LinkError::CircularReference`] for a reference cycle
    /// - [`LinkError::InvalidDeclaration`] for a malformed reference
    pub fn resolve(
        &self,
        declaration: &Declaration,
        owner: &Entity,
        context: Context,
        origin: &str,
    ) -> LinkResult<HandlerChain> {
        let mut trail = Vec::new();
        self.resolve_declaration(declaration, owner, context, origin, &mut trail)
    }

    /// Resolves a single reference as if it were declared by `owner`.
    ///
    /// # Errors
    ///
    /// Same as [`Resolver::resolve`].
    pub fn resolve_reference(
        &self,
        reference: &str,
        owner: &Entity,
        context: Context,
    ) -> LinkResult<HandlerChain> {
        let namespace = tokenize(reference, owner.identity())?;
        let mut trail = Vec::new();
        self.resolve_namespace(&namespace, context, reference, &mut trail)
    }

    fn resolve_declaration(
        &self,
        declaration: &Declaration,
        owner: &Entity,
        context: Context,
        origin: &str,
        trail: &mut Vec<String>,
    ) -> LinkResult<HandlerChain> {
        match declaration {
            Declaration::Handler(handler) => Ok(HandlerChain::from_iter([handler.clone()])),
            Declaration::Flag(allow) => {
                if context != Context::Policies {
                    return Err(LinkError::invalid_handler_type(origin, context));
                }
                if *allow {
                    Ok(HandlerChain::new())
                } else {
                    Ok(HandlerChain::from_iter([Handler::deny()]))
                }
            }
            Declaration::Reference(reference) => {
                let namespace = tokenize(reference, owner.identity())?;
                self.resolve_namespace(&namespace, context, origin, trail)
            }
            Declaration::List(items) => {
                let mut chain = HandlerChain::new();
                for item in items {
                    chain.extend(self.resolve_declaration(item, owner, context, origin, trail)?);
                }
                Ok(chain)
            }
        }
    }

    fn resolve_namespace(
        &self,
        namespace: &Namespace,
        context: Context,
        origin: &str,
        trail: &mut Vec<String>,
    ) -> LinkResult<HandlerChain> {
        let qualified = namespace.to_string();

        if let Some(start) = trail.iter().position(|seen| *seen == qualified) {
            let mut cycle = trail[start..].to_vec();
            cycle.push(qualified);
            return Err(LinkError::circular_reference(cycle));
        }

        let target = self
            .registry
            .get(namespace.entity())
            .ok_or_else(|| LinkError::entity_not_found(namespace.entity(), &qualified))?;

        tracing::trace!(namespace = %qualified, ?context, "resolving reference");

        let key = namespace.key();
        let (found_context, declaration) = match namespace.context() {
            Some(named) => (named, target.lookup(named, key)),
            None => {
                if let Some(method) = target.method(key) {
                    return Ok(HandlerChain::from_iter([method.clone()]));
                }
                let location = format!("{}.{context}.{key}", target.identity());
                match target.lookup(context, key) {
                    Some(found) if location != origin && !trail.contains(&location) => {
                        (context, Some(found))
                    }
                    _ => (Context::Filters, target.lookup(Context::Filters, key)),
                }
            }
        };
        let declaration = declaration.ok_or_else(|| LinkError::handler_not_found(&qualified))?;
        let location = format!("{}.{found_context}.{key}", target.identity());

        trail.push(qualified.clone());
        let resolved = self.resolve_declaration(declaration, target, found_context, &location, trail);
        trail.pop();
        let chain = resolved?;

        if chain.is_empty() && found_context != Context::Policies {
            return Err(LinkError::handler_not_found(qualified));
        }
        Ok(chain)
    }
}
