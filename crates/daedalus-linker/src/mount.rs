//! Mount/bind stage.
//!
//! Binds a finished [`RouteTable`] onto routers. Root-mounted routes are bound
//! directly on the root router; every other mount gets a fresh router that is
//! bound first and then nested under its mount path.

use daedalus_config::RoutingConfig;
use daedalus_core::HandlerChain;
use daedalus_router::{Router, RouterError};
use http::Method;
use indexmap::IndexMap;

use crate::table::{RouteTable, REDIRECT, VIEW};

/// The capability the mount stage needs from a router.
pub trait RouteBinder: Default {
    /// Binding failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Binds a chain to a lower-case method name and a path pattern.
    ///
    /// # Errors
    ///
    /// Implementation defined.
    fn bind(&mut self, method: &str, path: &str, chain: HandlerChain) -> Result<(), Self::Error>;

    /// Attaches `child` under `prefix`.
    ///
    /// # Errors
    ///
    /// Implementation defined.
    fn nest(&mut self, prefix: &str, child: &Self) -> Result<(), Self::Error>;
}

impl RouteBinder for Router {
    type Error = RouterError;

    fn bind(&mut self, method: &str, path: &str, chain: HandlerChain) -> Result<(), RouterError> {
        let method = Method::from_bytes(method.to_uppercase().as_bytes())
            .map_err(|_| RouterError::InvalidMethod(method.to_string()))?;
        Router::bind(self, method, path, chain)
    }

    fn nest(&mut self, prefix: &str, child: &Self) -> Result<(), RouterError> {
        Router::nest(self, prefix, child)
    }
}

/// The routers produced by [`mount`].
#[derive(Debug, Clone, Default)]
pub struct Mounted<R> {
    root: R,
    mounts: IndexMap<String, R>,
}

impl<R> Mounted<R> {
    /// Returns the root router; every mount is nested into it.
    #[must_use]
    pub fn root(&self) -> &R {
        &self.root
    }

    /// Returns the router scoped to a mount path; `/` is the root router.
    #[must_use]
    pub fn router(&self, mount: &str) -> Option<&R> {
        if mount == "/" {
            return Some(&self.root);
        }
        self.mounts.get(mount)
    }

    /// Returns the non-root mount paths in binding order.
    #[must_use]
    pub fn mounts(&self) -> Vec<&str> {
        self.mounts.keys().map(String::as_str).collect()
    }
}

/// Binds a route table.
///
/// With `config.sort` set, the paths of each method are bound in reverse
/// lexicographic order so literal segments precede parameters sharing a
/// prefix. The `view` and `redirect` buckets are skipped; their chains are
/// mirrored under `get`.
///
/// # Errors
///
/// Any error returned by the binder.
pub fn mount<R: RouteBinder>(table: &RouteTable, config: &RoutingConfig) -> Result<Mounted<R>, R::Error> {
    let mut mounted = Mounted {
        root: R::default(),
        mounts: IndexMap::new(),
    };

    for mount_path in table.mounts() {
        if mount_path == "/" {
            bind_mount(&mut mounted.root, table, mount_path, config)?;
            continue;
        }

        let mut router = R::default();
        bind_mount(&mut router, table, mount_path, config)?;
        mounted.root.nest(mount_path, &router)?;
        tracing::debug!(mount = mount_path, "nested mount router");
        mounted.mounts.insert(mount_path.to_string(), router);
    }

    tracing::info!(
        mounts = table.mounts().len(),
        routes = table.len(),
        sorted = config.sort,
        "mounted route table"
    );
    Ok(mounted)
}

fn bind_mount<R: RouteBinder>(
    router: &mut R,
    table: &RouteTable,
    mount_path: &str,
    config: &RoutingConfig,
) -> Result<(), R::Error> {
    for method in table.methods(mount_path) {
        if method == VIEW || method == REDIRECT {
            continue;
        }

        let mut paths = table.paths(mount_path, method);
        if config.sort {
            paths.sort_by(|a, b| b.cmp(a));
        }

        for path in paths {
            if let Some(chain) = table.chain(mount_path, method, path) {
                router.bind(method, path, chain.clone())?;
            }
        }
    }
    Ok(())
}
