//! Application bootstrap.
//!
//! An [`Application`] owns the configuration and the entity registry, links
//! the registry into a route table and binds that table onto routers.

use std::sync::Arc;

use daedalus_config::{ConfigLoader, DaedalusConfig};
use daedalus_core::{global, Entity, LinkError, Manifest, Registry, Response};
use daedalus_linker::{LinkOptions, Linker, Mounted, RouteFormatter, RouteTable};
use daedalus_router::Router;
use daedalus_telemetry::{init_logging, LogConfig};
use http::Method;
use serde_json::Value;

use crate::error::BootstrapResult;

/// A configured set of entities and the routers they mount onto.
///
/// [`Application::mount`] links and binds once; later calls return the
/// routers built by the first call.
///
/// # Example
///
/// ```rust
/// use daedalus::prelude::*;
/// use http::Method;
///
/// let mut app = Application::new(DaedalusConfig::default());
/// app.register(
///     Manifest::controller("UserController")
///         .mount("/id")
///         .method("find", Handler::new("find", |ex: &mut Exchange| {
///             let id = ex.request.param("id").unwrap_or_default().to_string();
///             ex.response.json(serde_json::json!({ "id": id }));
///             Flow::Halt
///         }))
///         .action("find"),
/// )
/// .unwrap();
///
/// app.mount().unwrap();
/// let response = app.dispatch(Method::GET, "/id/user/7", serde_json::Value::Null).unwrap();
/// assert_eq!(response.body, Some(serde_json::json!({ "id": "7" })));
/// ```
#[derive(Debug)]
pub struct Application {
    config: DaedalusConfig,
    linker: Linker,
    registry: Registry,
    table: Option<RouteTable>,
    mounted: Option<Mounted<Router>>,
}

impl Default for Application {
    fn default() -> Self {
        Self::new(DaedalusConfig::default())
    }
}

impl Application {
    /// Creates an application with an empty registry.
    #[must_use]
    pub fn new(config: DaedalusConfig) -> Self {
        let linker = Linker::new(LinkOptions::from_config(&config));
        Self {
            config,
            linker,
            registry: Registry::new(),
            table: None,
            mounted: None,
        }
    }

    /// Loads the configuration and creates an application.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Config`](crate::BootstrapError::Config) if
    /// the configuration fails to load or validate.
    pub fn from_loader(loader: ConfigLoader) -> BootstrapResult<Self> {
        Ok(Self::new(loader.load()?))
    }

    /// Creates an application over a copy of the process-wide registry.
    #[must_use]
    pub fn from_global(config: DaedalusConfig) -> Self {
        Self::new(config).with_registry(global::snapshot())
    }

    /// Replaces the registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the route formatter.
    #[must_use]
    pub fn with_formatter(mut self, formatter: impl RouteFormatter + 'static) -> Self {
        let options = self.linker.options().clone().with_formatter(formatter);
        self.linker = Linker::new(options);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DaedalusConfig {
        &self.config
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns a registered entity.
    #[must_use]
    pub fn entity(&self, identity: &str) -> Option<&Arc<Entity>> {
        self.registry.get(identity)
    }

    /// Builds an entity and registers it.
    ///
    /// # Errors
    ///
    /// - [`LinkError::DuplicateEntity`] / [`LinkError::DuplicateKey`] /
    ///   [`LinkError::InvalidDeclaration`] from entity construction
    /// - [`LinkError::InvalidDeclaration`] once the application is mounted
    pub fn register(&mut self, manifest: Manifest) -> BootstrapResult<Arc<Entity>> {
        if self.is_mounted() {
            return Err(LinkError::invalid_declaration(
                manifest.identity(),
                "entities cannot be registered after mounting",
            )
            .into());
        }
        Ok(self.registry.register(manifest)?)
    }

    /// Installs the global `tracing` subscriber from the logging config.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Telemetry`](crate::BootstrapError::Telemetry)
    /// if a subscriber is already installed or the level filter is invalid.
    pub fn init_logging(&self) -> BootstrapResult<()> {
        let config = LogConfig::for_environment(&self.config.logging, self.config.environment);
        init_logging(&config)?;
        Ok(())
    }

    /// Links the registry into a fresh route table without mounting it.
    ///
    /// # Errors
    ///
    /// The first [`LinkError`] raised while linking.
    pub fn link(&self) -> BootstrapResult<RouteTable> {
        Ok(self.linker.link(&self.registry)?)
    }

    /// Links and binds the registry, once.
    ///
    /// # Errors
    ///
    /// Link or bind errors of the first call.
    pub fn mount(&mut self) -> BootstrapResult<&Mounted<Router>> {
        let mounted = match self.mounted.take() {
            Some(mounted) => {
                tracing::debug!("already mounted");
                mounted
            }
            None => {
                let table = self.linker.link(&self.registry)?;
                let mounted = self.linker.mount::<Router>(&table)?;
                self.table = Some(table);
                mounted
            }
        };
        let mounted: &Mounted<Router> = self.mounted.insert(mounted);
        Ok(mounted)
    }

    /// Returns true once [`Application::mount`] has succeeded.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Returns the route table built by [`Application::mount`].
    #[must_use]
    pub fn route_table(&self) -> Option<&RouteTable> {
        self.table.as_ref()
    }

    /// Returns the router of a mount path; `/` is the root router.
    #[must_use]
    pub fn router(&self, mount: &str) -> Option<&Router> {
        self.mounted.as_ref()?.router(mount)
    }

    /// Dispatches a request through the root router.
    ///
    /// Returns `None` before mounting or when no route matches.
    #[must_use]
    pub fn dispatch(&self, method: Method, path: &str, body: Value) -> Option<Response> {
        self.mounted.as_ref()?.root().dispatch(method, path, body)
    }
}
