//! Entity model: Services and Controllers.
//!
//! An [`Entity`] is built once from a declarative [`Manifest`] and holds four
//! declaration collections (policies, filters, routes, actions) plus a table
//! of named methods. The kind of an entity is a closed tag chosen by the
//! manifest, never derived from the type that produced it.
//!
//! # Example
//!
//! ```
//! use daedalus_core::{Entity, EntityKind, Exchange, Flow, Handler, Manifest};
//!
//! let find = Handler::new("find", |_ex: &mut Exchange| Flow::Halt);
//!
//! let entity = Entity::new(
//!     Manifest::controller("UserController")
//!         .mount("/id")
//!         .method("find", find)
//!         .policy("*", "AuthService.filters.isAuth")
//!         .action("find"),
//! )
//! .unwrap();
//!
//! assert_eq!(entity.kind(), EntityKind::Controller);
//! assert_eq!(entity.base_path(), "/user");
//! assert_eq!(entity.mount_path(), "/id");
//! assert!(entity.policies().contains_key("*"));
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{LinkError, LinkResult};
use crate::handler::Handler;

/// Suffix stripped from a Controller identity to derive its base path.
const CONTROLLER_SUFFIX: &str = "controller";

/// The closed set of entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A reusable provider of handlers and filters. May not declare policies.
    Service,
    /// A request-facing entity with policies and actions.
    Controller,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => f.write_str("service"),
            Self::Controller => f.write_str("controller"),
        }
    }
}

/// One of the four declaration collections of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    /// Authorization chains, keyed by action/route key or `*`.
    Policies,
    /// Reusable middleware chains.
    Filters,
    /// Route declarations, keyed by `"method /path"`.
    Routes,
    /// Controller actions eligible for template expansion.
    Actions,
}

impl Context {
    /// All contexts, in declaration order.
    pub const ALL: [Context; 4] = [
        Context::Policies,
        Context::Filters,
        Context::Routes,
        Context::Actions,
    ];

    /// Parses a namespace segment naming a collection.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "policies" => Some(Self::Policies),
            "filters" => Some(Self::Filters),
            "routes" => Some(Self::Routes),
            "actions" => Some(Self::Actions),
            _ => None,
        }
    }

    /// Returns the collection name used in namespaces.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Policies => "policies",
            Self::Filters => "filters",
            Self::Routes => "routes",
            Self::Actions => "actions",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared value: a callable, a namespace reference, a policy flag, or an
/// ordered list of those. List order is execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// A direct callable.
    Handler(Handler),
    /// A namespace reference such as `"isAuth"` or `"AuthService.filters.isAuth"`.
    Reference(String),
    /// `true` allows with an empty chain, `false` denies. Policies only.
    Flag(bool),
    /// An ordered list of declarations.
    List(Vec<Declaration>),
}

impl Declaration {
    /// Builds a list declaration.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Declaration>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Returns the references contained in this declaration, depth first.
    #[must_use]
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Reference(reference) => out.push(reference),
            Self::List(items) => items.iter().for_each(|item| item.collect_references(out)),
            Self::Handler(_) | Self::Flag(_) => {}
        }
    }
}

impl From<Handler> for Declaration {
    fn from(handler: Handler) -> Self {
        Self::Handler(handler)
    }
}

impl From<&str> for Declaration {
    fn from(reference: &str) -> Self {
        Self::Reference(reference.to_string())
    }
}

impl From<String> for Declaration {
    fn from(reference: String) -> Self {
        Self::Reference(reference)
    }
}

impl From<bool> for Declaration {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl<T: Into<Declaration>> From<Vec<T>> for Declaration {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

/// A Controller action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Explicit route string; when absent the configured template is used.
    pub route: Option<String>,
    /// The chain that executes the action.
    pub handlers: Declaration,
}

impl Action {
    /// An action executed by the method of the same name, routed by template.
    #[must_use]
    pub fn method(key: &str) -> Self {
        Self {
            route: None,
            handlers: Declaration::Reference(format!("this.{key}")),
        }
    }

    /// Sets an explicit route string.
    #[must_use]
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Replaces the executing chain.
    #[must_use]
    pub fn with_handlers(mut self, handlers: impl Into<Declaration>) -> Self {
        self.handlers = handlers.into();
        self
    }
}

#[derive(Debug, Clone)]
enum ManifestEntry {
    Declare {
        context: Context,
        key: String,
        value: Declaration,
        force: bool,
    },
    Action {
        key: String,
        action: Action,
        force: bool,
    },
}

/// The declarative description an entity is constructed from.
///
/// Declarations are applied in the order they were added, so a later entry
/// with the same key fails with [`LinkError::DuplicateKey`] unless it is
/// marked as forced.
#[derive(Debug, Clone)]
pub struct Manifest {
    identity: String,
    kind: EntityKind,
    mount_path: Option<String>,
    base_path: Option<String>,
    methods: IndexMap<String, Handler>,
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Starts a manifest for an entity of the given kind.
    #[must_use]
    pub fn new(identity: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            identity: identity.into(),
            kind,
            mount_path: None,
            base_path: None,
            methods: IndexMap::new(),
            entries: Vec::new(),
        }
    }

    /// Starts a Service manifest.
    #[must_use]
    pub fn service(identity: impl Into<String>) -> Self {
        Self::new(identity, EntityKind::Service)
    }

    /// Starts a Controller manifest.
    #[must_use]
    pub fn controller(identity: impl Into<String>) -> Self {
        Self::new(identity, EntityKind::Controller)
    }

    /// Sets the mount path (default `/`).
    #[must_use]
    pub fn mount(mut self, path: impl Into<String>) -> Self {
        self.mount_path = Some(path.into());
        self
    }

    /// Sets the base path prepended to every route of the entity.
    #[must_use]
    pub fn base(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Adds a named method, addressable as `Identity.name`.
    #[must_use]
    pub fn method(mut self, name: impl Into<String>, handler: Handler) -> Self {
        self.methods.insert(name.into(), handler);
        self
    }

    /// Declares a value in one of the collections.
    #[must_use]
    pub fn declare(
        mut self,
        context: Context,
        key: impl Into<String>,
        value: impl Into<Declaration>,
        force: bool,
    ) -> Self {
        self.entries.push(ManifestEntry::Declare {
            context,
            key: key.into(),
            value: value.into(),
            force,
        });
        self
    }

    /// Declares a policy chain.
    #[must_use]
    pub fn policy(self, key: impl Into<String>, value: impl Into<Declaration>) -> Self {
        self.declare(Context::Policies, key, value, false)
    }

    /// Declares a filter chain.
    #[must_use]
    pub fn filter(self, key: impl Into<String>, value: impl Into<Declaration>) -> Self {
        self.declare(Context::Filters, key, value, false)
    }

    /// Declares a route, keyed by `"method[|method] /path"`.
    #[must_use]
    pub fn route(self, route: impl Into<String>, value: impl Into<Declaration>) -> Self {
        self.declare(Context::Routes, route, value, false)
    }

    /// Declares an action executed by the method of the same name.
    #[must_use]
    pub fn action(self, key: impl Into<String>) -> Self {
        let key = key.into();
        let action = Action::method(&key);
        self.action_with(key, action)
    }

    /// Declares a fully specified action.
    #[must_use]
    pub fn action_with(mut self, key: impl Into<String>, action: Action) -> Self {
        self.entries.push(ManifestEntry::Action {
            key: key.into(),
            action,
            force: false,
        });
        self
    }

    /// Returns the identity the manifest describes.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// A registered Service or Controller.
#[derive(Debug, Clone)]
pub struct Entity {
    identity: String,
    kind: EntityKind,
    mount_path: String,
    base_path: String,
    methods: IndexMap<String, Handler>,
    policies: IndexMap<String, Declaration>,
    filters: IndexMap<String, Declaration>,
    routes: IndexMap<String, Declaration>,
    actions: IndexMap<String, Action>,
}

impl Entity {
    /// Builds an entity from its manifest.
    ///
    /// # Errors
    ///
    /// - [`LinkError::InvalidDeclaration`] if the identity is empty or dotted,
    ///   or a Service declares policies
    /// - [`LinkError::DuplicateKey`] if a key is declared twice without `force`
    pub fn new(manifest: Manifest) -> LinkResult<Self> {
        let Manifest {
            identity,
            kind,
            mount_path,
            base_path,
            methods,
            entries,
        } = manifest;

        if identity.is_empty() || identity.contains('.') || identity == "this" {
            return Err(LinkError::invalid_declaration(
                identity,
                "identity must be a non-empty name without dots",
            ));
        }

        let base_path = base_path.unwrap_or_else(|| match kind {
            EntityKind::Controller => default_base_path(&identity),
            EntityKind::Service => String::new(),
        });

        let mut entity = Self {
            identity,
            kind,
            mount_path: normalize_mount(mount_path.as_deref().unwrap_or("/")),
            base_path,
            methods,
            policies: IndexMap::new(),
            filters: IndexMap::new(),
            routes: IndexMap::new(),
            actions: IndexMap::new(),
        };

        for entry in entries {
            match entry {
                ManifestEntry::Declare {
                    context,
                    key,
                    value,
                    force,
                } => entity.declare(context, key, value, force)?,
                ManifestEntry::Action { key, action, force } => {
                    entity.declare_action(key, action, force)?;
                }
            }
        }

        Ok(entity)
    }

    /// Declares a value after construction.
    ///
    /// Declaring an existing key replaces it only when `force` is set.
    ///
    /// # Errors
    ///
    /// - [`LinkError::InvalidDeclaration`] if a Service declares a policy
    /// - [`LinkError::DuplicateKey`] if the key exists and `force` is false
    pub fn declare(
        &mut self,
        context: Context,
        key: impl Into<String>,
        value: impl Into<Declaration>,
        force: bool,
    ) -> LinkResult<()> {
        let key = key.into();
        let value = value.into();

        let collection = match context {
            Context::Policies => {
                if self.kind == EntityKind::Service {
                    return Err(LinkError::invalid_declaration(
                        &self.identity,
                        format!("services cannot declare policies (key '{key}')"),
                    ));
                }
                &mut self.policies
            }
            Context::Filters => &mut self.filters,
            Context::Routes => &mut self.routes,
            Context::Actions => {
                let action = match self.actions.get(&key) {
                    Some(existing) => Action {
                        route: existing.route.clone(),
                        handlers: value,
                    },
                    None => Action {
                        route: None,
                        handlers: value,
                    },
                };
                return self.declare_action(key, action, force);
            }
        };

        if collection.contains_key(&key) && !force {
            return Err(LinkError::duplicate_key(&self.identity, context, key));
        }
        collection.insert(key, value);
        Ok(())
    }

    /// Declares an action after construction.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::DuplicateKey`] if the key exists and `force` is false.
    pub fn declare_action(
        &mut self,
        key: impl Into<String>,
        action: Action,
        force: bool,
    ) -> LinkResult<()> {
        let key = key.into();
        if self.actions.contains_key(&key) && !force {
            return Err(LinkError::duplicate_key(&self.identity, Context::Actions, key));
        }
        self.actions.insert(key, action);
        Ok(())
    }

    /// Returns the identity.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Returns the kind tag.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the mount path; always begins with `/`.
    #[must_use]
    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    /// Returns the base path prepended to the entity's routes.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns a named method.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Handler> {
        self.methods.get(name)
    }

    /// Returns the method table.
    #[must_use]
    pub fn methods(&self) -> &IndexMap<String, Handler> {
        &self.methods
    }

    /// Returns the policy declarations.
    #[must_use]
    pub fn policies(&self) -> &IndexMap<String, Declaration> {
        &self.policies
    }

    /// Returns the filter declarations.
    #[must_use]
    pub fn filters(&self) -> &IndexMap<String, Declaration> {
        &self.filters
    }

    /// Returns the route declarations.
    #[must_use]
    pub fn routes(&self) -> &IndexMap<String, Declaration> {
        &self.routes
    }

    /// Returns the actions.
    #[must_use]
    pub fn actions(&self) -> &IndexMap<String, Action> {
        &self.actions
    }

    /// Looks up a key in one collection. Actions yield their executing chain.
    #[must_use]
    pub fn lookup(&self, context: Context, key: &str) -> Option<&Declaration> {
        match context {
            Context::Policies => self.policies.get(key),
            Context::Filters => self.filters.get(key),
            Context::Routes => self.routes.get(key),
            Context::Actions => self.actions.get(key).map(|action| &action.handlers),
        }
    }
}

/// Derives a Controller's default base path: `UserController` becomes `/user`.
#[must_use]
pub fn default_base_path(identity: &str) -> String {
    let lower = identity.to_lowercase();
    let stem = lower.strip_suffix(CONTROLLER_SUFFIX).unwrap_or(&lower);
    format!("/{stem}")
}

fn normalize_mount(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}
