//! Route declarations and the route table.
//!
//! A route declaration is `"[method[|method2...]] /path"`; the method defaults
//! to `get`. The table maps `mount → method → full path → chain` and keeps
//! every level in insertion order.

use daedalus_config::Environment;
use daedalus_core::{HandlerChain, LinkError, LinkResult};
use indexmap::IndexMap;

/// Pseudo-method rendering a view; compiles to `get`.
pub const VIEW: &str = "view";

/// Pseudo-method redirecting to a target; compiles to `get`.
pub const REDIRECT: &str = "redirect";

/// The method used when a declaration names none.
pub const GET: &str = "get";

/// Methods accepted in a route declaration.
pub const KNOWN_METHODS: &[&str] = &[
    "get", "post", "put", "delete", "patch", "head", "options", VIEW, REDIRECT,
];

/// A parsed route declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRoute {
    /// Lower-cased methods, without duplicates.
    pub methods: Vec<String>,
    /// The path as declared.
    pub path: String,
    /// The normalized path joined onto the entity's base path.
    pub full_path: String,
}

impl ParsedRoute {
    /// Parses a route declaration of `entity` relative to `base`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidDeclaration`] if the declaration is empty,
    /// names an unknown method, or its path does not start with `/`.
    ///
    /// # Example
    ///
    /// ```
    /// use daedalus_linker::ParsedRoute;
    ///
    /// let route = ParsedRoute::parse("UserController", "get|POST /:id?", "/user").unwrap();
    /// assert_eq!(route.methods, vec!["get", "post"]);
    /// assert_eq!(route.full_path, "/user/:id?");
    /// ```
    pub fn parse(entity: &str, declaration: &str, base: &str) -> LinkResult<Self> {
        Self::parse_with(entity, declaration, base, true)
    }

    /// Parses a route produced by template expansion.
    ///
    /// Unlike [`ParsedRoute::parse`], the path may be relative; it is joined
    /// onto `base` either way.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidDeclaration`] if the route is empty or
    /// names an unknown method.
    ///
    /// ```
    /// use daedalus_linker::ParsedRoute;
    ///
    /// let route = ParsedRoute::expanded("UserController", "get s/:id?", "/user").unwrap();
    /// assert_eq!(route.full_path, "/user/s/:id?");
    /// ```
    pub fn expanded(entity: &str, route: &str, base: &str) -> LinkResult<Self> {
        Self::parse_with(entity, route, base, false)
    }

    fn parse_with(entity: &str, declaration: &str, base: &str, rooted: bool) -> LinkResult<Self> {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            return Err(LinkError::invalid_declaration(entity, "empty route declaration"));
        }

        let (methods, path) = match declaration.split_once(char::is_whitespace) {
            Some((methods, path)) => (methods, path.trim()),
            None if declaration.starts_with('/') || !rooted => (GET, declaration),
            None => {
                return Err(LinkError::invalid_declaration(
                    entity,
                    format!("route '{declaration}' has no path"),
                ))
            }
        };

        if rooted && !path.starts_with('/') {
            return Err(LinkError::invalid_declaration(
                entity,
                format!("route '{declaration}': path must start with '/'"),
            ));
        }

        let mut parsed: Vec<String> = Vec::new();
        for method in methods.split('|') {
            let method = method.trim().to_lowercase();
            if !KNOWN_METHODS.contains(&method.as_str()) {
                return Err(LinkError::invalid_declaration(
                    entity,
                    format!("route '{declaration}': unknown method '{method}'"),
                ));
            }
            if !parsed.contains(&method) {
                parsed.push(method);
            }
        }

        Ok(Self {
            methods: parsed,
            path: path.to_string(),
            full_path: join_path(base, path),
        })
    }

    /// Returns true if the declaration uses `view` or `redirect`.
    #[must_use]
    pub fn is_pseudo(&self) -> bool {
        self.methods
            .iter()
            .any(|method| method == VIEW || method == REDIRECT)
    }
}

/// Collapses repeated slashes and strips the trailing one; the root stays `/`.
///
/// ```
/// use daedalus_linker::normalize_path;
///
/// assert_eq!(normalize_path("//user//:id/"), "/user/:id");
/// assert_eq!(normalize_path(""), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Joins a base path and a route path into a normalized full path.
#[must_use]
pub fn join_path(base: &str, path: &str) -> String {
    normalize_path(&format!("{base}/{path}"))
}

/// A write that replaced an existing `(mount, method, path)` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOverride {
    /// Mount path.
    pub mount: String,
    /// Method bucket.
    pub method: String,
    /// Full path.
    pub path: String,
    /// The entity whose declaration replaced the entry.
    pub entity: String,
}

type PathTable = IndexMap<String, HandlerChain>;
type MethodTable = IndexMap<String, PathTable>;

/// The resolved `mount → method → path → chain` structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    mounts: IndexMap<String, MethodTable>,
    overrides: Vec<RouteOverride>,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a chain; the last write to a slot wins.
    ///
    /// A replaced entry is recorded in [`RouteTable::overrides`] and logged at
    /// `warn` outside production.
    pub fn insert(
        &mut self,
        entity: &str,
        mount: &str,
        method: &str,
        path: &str,
        chain: HandlerChain,
        environment: Environment,
    ) {
        tracing::debug!(
            entity,
            mount,
            method,
            path,
            handlers = ?chain.names(),
            "route table write"
        );

        let previous = self
            .mounts
            .entry(mount.to_string())
            .or_default()
            .entry(method.to_string())
            .or_default()
            .insert(path.to_string(), chain);

        if previous.is_some() {
            if !environment.is_production() {
                tracing::warn!(entity, mount, method, path, "route overridden");
            }
            self.overrides.push(RouteOverride {
                mount: mount.to_string(),
                method: method.to_string(),
                path: path.to_string(),
                entity: entity.to_string(),
            });
        }
    }

    /// Returns the mount paths in insertion order.
    #[must_use]
    pub fn mounts(&self) -> Vec<&str> {
        self.mounts.keys().map(String::as_str).collect()
    }

    /// Returns the method buckets of a mount.
    #[must_use]
    pub fn methods(&self, mount: &str) -> Vec<&str> {
        self.mounts
            .get(mount)
            .map(|methods| methods.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the paths stored under a mount and method.
    #[must_use]
    pub fn paths(&self, mount: &str, method: &str) -> Vec<&str> {
        self.mounts
            .get(mount)
            .and_then(|methods| methods.get(method))
            .map(|paths| paths.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the chain stored at a slot.
    #[must_use]
    pub fn chain(&self, mount: &str, method: &str, path: &str) -> Option<&HandlerChain> {
        self.mounts.get(mount)?.get(method)?.get(path)
    }

    /// Returns the recorded overrides in the order they happened.
    #[must_use]
    pub fn overrides(&self) -> &[RouteOverride] {
        &self.overrides
    }

    /// Iterates `(mount, method, path, chain)` entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str, &HandlerChain)> {
        self.mounts.iter().flat_map(|(mount, methods)| {
            methods.iter().flat_map(move |(method, paths)| {
                paths
                    .iter()
                    .map(move |(path, chain)| (mount.as_str(), method.as_str(), path.as_str(), chain))
            })
        })
    }

    /// Returns the number of stored chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mounts
            .values()
            .flat_map(IndexMap::values)
            .map(IndexMap::len)
            .sum()
    }

    /// Returns true if no chain is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
