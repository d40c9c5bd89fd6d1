//! Error types for Daedalus.
//!
//! This module provides the [`LinkError`] type, which is the error type used
//! while declaring entities and linking them into a route table. Every failure
//! is fatal at startup: nothing here is retried.
//!
//! | `ErrorKind` | raised when |
//! |---|---|
//! | `DuplicateEntity` | two entities register under the same identity |
//! | `InvalidDeclaration` | a declaration has an illegal shape (Service policies, bad route string, bad namespace) |
//! | `InvalidHandlerType` | a boolean appears outside a policy chain |
//! | `EntityNotFound` | a namespace names an entity that is not registered |
//! | `HandlerNotFound` | a namespace names a member that does not exist |
//! | `DuplicateKey` | a key is redeclared on one entity without `force` |
//! | `RouteGeneration` | an action has neither an explicit route nor a template |
//! | `CircularReference` | a namespace is revisited while it is being resolved |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::Context;

/// Result type alias using [`LinkError`].
pub type LinkResult<T> = Result<T, LinkError>;

/// Classification of a [`LinkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Two entities share an identity.
    DuplicateEntity,
    /// A declaration has an illegal shape.
    InvalidDeclaration,
    /// A boolean was found outside a policy chain.
    InvalidHandlerType,
    /// A referenced entity is not registered.
    EntityNotFound,
    /// A referenced handler does not exist.
    HandlerNotFound,
    /// A key was redeclared without `force`.
    DuplicateKey,
    /// An action route could not be generated.
    RouteGeneration,
    /// A reference chain loops back on itself.
    CircularReference,
}

/// Errors raised while declaring, registering or linking entities.
///
/// # Example
///
/// ```
/// use daedalus_core::{ErrorKind, LinkError};
///
/// let err = LinkError::handler_not_found("UserController.missing");
/// assert_eq!(err.kind(), ErrorKind::HandlerNotFound);
/// assert!(err.to_string().contains("UserController.missing"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// An entity with this identity is already registered.
    #[error("entity '{identity}' is already registered")]
    DuplicateEntity {
        /// The clashing identity.
        identity: String,
    },

    /// A declaration has an illegal shape.
    #[error("invalid declaration on '{entity}': {message}")]
    InvalidDeclaration {
        /// The entity owning the declaration.
        entity: String,
        /// What is wrong with it.
        message: String,
    },

    /// A boolean was resolved outside a policy chain.
    #[error("boolean handler in '{namespace}' is only allowed in policies, found in {context}")]
    InvalidHandlerType {
        /// The namespace being resolved.
        namespace: String,
        /// The context the boolean was found in.
        context: Context,
    },

    /// The first segment of a namespace names no registered entity.
    #[error("entity '{identity}' referenced by '{namespace}' is not registered")]
    EntityNotFound {
        /// The missing entity identity.
        identity: String,
        /// The full namespace that referenced it.
        namespace: String,
    },

    /// The namespace resolved to nothing.
    #[error("no handler found for '{namespace}'")]
    HandlerNotFound {
        /// The unresolved namespace.
        namespace: String,
    },

    /// A key was declared twice on the same entity without `force`.
    #[error("{context} key '{key}' is already declared on '{entity}'")]
    DuplicateKey {
        /// The entity owning the collection.
        entity: String,
        /// The collection.
        context: Context,
        /// The redeclared key.
        key: String,
    },

    /// An action has neither an explicit route nor a template.
    #[error("cannot generate a route for action '{action}' on '{entity}': no explicit route and no template")]
    RouteGeneration {
        /// The controller identity.
        entity: String,
        /// The action key.
        action: String,
    },

    /// A namespace was revisited before its resolution completed.
    #[error("circular reference: {}", cycle.join(" -> "))]
    CircularReference {
        /// The resolution path, ending with the revisited namespace.
        cycle: Vec<String>,
    },
}

impl LinkError {
    /// Creates a duplicate entity error.
    #[must_use]
    pub fn duplicate_entity(identity: impl Into<String>) -> Self {
        Self::DuplicateEntity {
            identity: identity.into(),
        }
    }

    /// Creates an invalid declaration error.
    #[must_use]
    pub fn invalid_declaration(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDeclaration {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid handler type error.
    #[must_use]
    pub fn invalid_handler_type(namespace: impl Into<String>, context: Context) -> Self {
        Self::InvalidHandlerType {
            namespace: namespace.into(),
            context,
        }
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn entity_not_found(identity: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::EntityNotFound {
            identity: identity.into(),
            namespace: namespace.into(),
        }
    }

    /// Creates a handler not found error.
    #[must_use]
    pub fn handler_not_found(namespace: impl Into<String>) -> Self {
        Self::HandlerNotFound {
            namespace: namespace.into(),
        }
    }

    /// Creates a duplicate key error.
    #[must_use]
    pub fn duplicate_key(entity: impl Into<String>, context: Context, key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            entity: entity.into(),
            context,
            key: key.into(),
        }
    }

    /// Creates a route generation error.
    #[must_use]
    pub fn route_generation(entity: impl Into<String>, action: impl Into<String>) -> Self {
        Self::RouteGeneration {
            entity: entity.into(),
            action: action.into(),
        }
    }

    /// Creates a circular reference error from the resolution path.
    #[must_use]
    pub fn circular_reference(cycle: Vec<String>) -> Self {
        Self::CircularReference { cycle }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateEntity { .. } => ErrorKind::DuplicateEntity,
            Self::InvalidDeclaration { .. } => ErrorKind::InvalidDeclaration,
            Self::InvalidHandlerType { .. } => ErrorKind::InvalidHandlerType,
            Self::EntityNotFound { .. } => ErrorKind::EntityNotFound,
            Self::HandlerNotFound { .. } => ErrorKind::HandlerNotFound,
            Self::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Self::RouteGeneration { .. } => ErrorKind::RouteGeneration,
            Self::CircularReference { .. } => ErrorKind::CircularReference,
        }
    }
}
