//! Entity registry.
//!
//! The [`Registry`] holds every constructed entity, keyed by identity, in
//! registration order. Registration order is significant: the linker walks
//! entities in that order, which decides route override order.
//!
//! A process-wide registry is available through the [`global`] module. It is
//! created lazily on first use and can be reset for test isolation.
//!
//! # Example
//!
//! ```
//! use daedalus_core::{Manifest, Registry};
//!
//! let mut registry = Registry::new();
//! registry.register(Manifest::service("AuthService")).unwrap();
//! registry.register(Manifest::controller("UserController")).unwrap();
//!
//! let identities: Vec<_> = registry.iter().map(|e| e.identity().to_string()).collect();
//! assert_eq!(identities, vec!["AuthService", "UserController"]);
//!
//! assert!(registry.register(Manifest::service("AuthService")).is_err());
//! ```

use std::sync::Arc;

use indexmap::IndexMap;

use crate::entity::{Entity, Manifest};
use crate::error::{LinkError, LinkResult};

/// An insertion-ordered collection of entities keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: IndexMap<String, Arc<Entity>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an entity from its manifest and registers it.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::DuplicateEntity`] if the identity is taken, or any
    /// error raised while building the entity.
    pub fn register(&mut self, manifest: Manifest) -> LinkResult<Arc<Entity>> {
        if self.contains(manifest.identity()) {
            return Err(LinkError::duplicate_entity(manifest.identity()));
        }
        self.insert(Entity::new(manifest)?)
    }

    /// Registers an already built entity.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::DuplicateEntity`] if the identity is taken.
    pub fn insert(&mut self, entity: Entity) -> LinkResult<Arc<Entity>> {
        if self.contains(entity.identity()) {
            return Err(LinkError::duplicate_entity(entity.identity()));
        }
        let entity = Arc::new(entity);
        tracing::debug!(
            entity = %entity.identity(),
            kind = %entity.kind(),
            mount = %entity.mount_path(),
            "registered entity"
        );
        self.entities
            .insert(entity.identity().to_string(), Arc::clone(&entity));
        Ok(entity)
    }

    /// Returns the entity with this identity.
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&Arc<Entity>> {
        self.entities.get(identity)
    }

    /// Returns true if an entity with this identity is registered.
    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.entities.contains_key(identity)
    }

    /// Iterates entities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.entities.values()
    }

    /// Returns the number of registered entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if no entity is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Removes every entity.
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

/// The process-wide registry.
///
/// Entities created through [`global::register`] land here. The registry is
/// single-writer state filled during startup; [`global::snapshot`] hands the
/// linker a consistent copy.
pub mod global {
    use std::sync::{Arc, OnceLock};

    use parking_lot::RwLock;

    use super::Registry;
    use crate::entity::{Entity, Manifest};
    use crate::error::LinkResult;

    static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();

    fn registry() -> &'static RwLock<Registry> {
        REGISTRY.get_or_init(|| RwLock::new(Registry::new()))
    }

    /// Builds an entity and registers it in the process-wide registry.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::register`].
    pub fn register(manifest: Manifest) -> LinkResult<Arc<Entity>> {
        registry().write().register(manifest)
    }

    /// Returns a registered entity.
    #[must_use]
    pub fn entity(identity: &str) -> Option<Arc<Entity>> {
        registry().read().get(identity).cloned()
    }

    /// Returns a copy of the registry for linking.
    #[must_use]
    pub fn snapshot() -> Registry {
        registry().read().clone()
    }

    /// Clears the process-wide registry.
    pub fn reset() {
        registry().write().clear();
    }
}
