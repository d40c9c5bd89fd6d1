//! Policy merge.
//!
//! A Controller's `*` policy guards everything it owns. Every other policy
//! chain is the resolved `*` chain followed by its own resolved chain, with
//! duplicates dropped.

use daedalus_core::{Context, Entity, EntityKind, HandlerChain, LinkResult};
use indexmap::IndexMap;

use crate::resolver::Resolver;

/// The policy key applied to every route and action of a Controller.
pub const WILDCARD: &str = "*";

/// The resolved policies of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySet {
    wildcard: HandlerChain,
    keyed: IndexMap<String, HandlerChain>,
}

impl PolicySet {
    /// Resolves and merges the policies of an entity.
    ///
    /// Services have no policies and yield an empty set.
    ///
    /// # Errors
    ///
    /// Any resolution error of a policy chain.
    pub fn resolve(resolver: &Resolver<'_>, entity: &Entity) -> LinkResult<Self> {
        if entity.kind() == EntityKind::Service {
            return Ok(Self::default());
        }

        let origin = |key: &str| format!("{}.{}.{key}", entity.identity(), Context::Policies);

        let wildcard = match entity.policies().get(WILDCARD) {
            Some(declaration) => {
                resolver.resolve(declaration, entity, Context::Policies, &origin(WILDCARD))?
            }
            None => HandlerChain::new(),
        };

        let mut keyed = IndexMap::new();
        for (key, declaration) in entity.policies() {
            if key == WILDCARD {
                continue;
            }
            let own = resolver.resolve(declaration, entity, Context::Policies, &origin(key))?;
            keyed.insert(key.clone(), merge(&wildcard, own));
        }

        Ok(Self { wildcard, keyed })
    }

    /// Returns the resolved `*` chain.
    #[must_use]
    pub fn wildcard(&self) -> &HandlerChain {
        &self.wildcard
    }

    /// Returns the merged chain declared for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&HandlerChain> {
        self.keyed.get(key)
    }

    /// Returns the chain guarding `key`: its merged chain if declared,
    /// otherwise the `*` chain alone.
    #[must_use]
    pub fn guard(&self, key: &str) -> HandlerChain {
        self.keyed
            .get(key)
            .unwrap_or(&self.wildcard)
            .clone()
    }
}

/// Prepends the `*` chain to a policy chain, keeping first occurrences.
#[must_use]
pub fn merge(wildcard: &HandlerChain, own: HandlerChain) -> HandlerChain {
    let mut chain = wildcard.clone();
    chain.extend(own);
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_core::{Exchange, Flow, Handler, Manifest, Registry};

    fn noop(name: &str) -> Handler {
        Handler::new(name, |_ex: &mut Exchange| Flow::Continue)
    }

    fn resolve(manifest: Manifest) -> PolicySet {
        let mut registry = Registry::new();
        let entity = registry.register(manifest).unwrap();
        PolicySet::resolve(&Resolver::new(&registry), &entity).unwrap()
    }

    #[test]
    fn test_wildcard_prepended_and_deduplicated() {
        let set = resolve(
            Manifest::controller("UserController")
                .method("isAuth", noop("isAuth"))
                .method("isOwner", noop("isOwner"))
                .policy("*", "isAuth")
                .policy("update", vec!["isOwner", "isAuth"]),
        );

        assert_eq!(set.wildcard().names(), vec!["isAuth"]);
        assert_eq!(set.get("update").unwrap().names(), vec!["isAuth", "isOwner"]);
        assert!(set.get("*").is_none());
    }

    #[test]
    fn test_guard_falls_back_to_wildcard() {
        let set = resolve(
            Manifest::controller("UserController")
                .method("isAuth", noop("isAuth"))
                .policy("*", "isAuth"),
        );
        assert_eq!(set.guard("find").names(), vec!["isAuth"]);
    }

    #[test]
    fn test_true_policy_is_empty_chain() {
        let set = resolve(Manifest::controller("UserController").policy("find", true));
        assert!(set.guard("find").is_empty());
    }

    #[test]
    fn test_false_policy_is_deny() {
        let set = resolve(
            Manifest::controller("UserController")
                .method("isAuth", noop("isAuth"))
                .policy("*", "isAuth")
                .policy("destroy", false),
        );
        assert_eq!(set.guard("destroy").names(), vec!["isAuth", "deny"]);
    }

    #[test]
    fn test_service_has_no_policies() {
        let set = resolve(Manifest::service("AuthService"));
        assert_eq!(set, PolicySet::default());
    }
}
