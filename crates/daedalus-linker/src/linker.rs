//! Normalization orchestrator.
//!
//! [`Linker::link`] walks the registry in registration order and builds a
//! fresh [`RouteTable`]. It never mutates entities, so linking the same
//! registry twice yields equal tables.

use std::sync::Arc;

use daedalus_config::{DaedalusConfig, Environment, RoutingConfig};
use daedalus_core::{
    Context, Declaration, Entity, EntityKind, Handler, HandlerChain, LinkError, LinkResult,
    Registry,
};

use crate::actions::{ActionExpander, DefaultFormatter, RouteFormatter};
use crate::mount::{mount, Mounted, RouteBinder};
use crate::policy::PolicySet;
use crate::resolver::Resolver;
use crate::table::{ParsedRoute, RouteTable, GET, REDIRECT, VIEW};

/// Options consumed by the [`Linker`].
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Templates, generation modes and sort flag.
    pub routing: RoutingConfig,
    /// Controls override warnings.
    pub environment: Environment,
    /// Post-processes template paths.
    pub formatter: Arc<dyn RouteFormatter>,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            routing: RoutingConfig::default(),
            environment: Environment::default(),
            formatter: Arc::new(DefaultFormatter),
        }
    }
}

impl LinkOptions {
    /// Builds options from a loaded configuration with the default formatter.
    #[must_use]
    pub fn from_config(config: &DaedalusConfig) -> Self {
        Self {
            routing: config.routing.clone(),
            environment: config.environment,
            formatter: Arc::new(DefaultFormatter),
        }
    }

    /// Replaces the formatter.
    #[must_use]
    pub fn with_formatter(mut self, formatter: impl RouteFormatter + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    /// Replaces the environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Replaces the routing configuration.
    #[must_use]
    pub fn with_routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }
}

/// Builds route tables from a registry.
///
/// # Example
///
/// ```
/// use daedalus_core::{Exchange, Flow, Handler, Manifest, Registry};
/// use daedalus_linker::{LinkOptions, Linker};
///
/// let mut registry = Registry::new();
/// registry
///     .register(
///         Manifest::controller("UserController")
///             .mount("/id")
///             .method("find", Handler::new("find", |_ex: &mut Exchange| Flow::Halt))
///             .action("find"),
///     )
///     .unwrap();
///
/// let table = Linker::new(LinkOptions::default()).link(&registry).unwrap();
/// assert_eq!(table.mounts(), vec!["/id"]);
/// assert_eq!(table.paths("/id", "get"), vec!["/user/:id?"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Linker {
    options: LinkOptions,
}

impl Linker {
    /// Creates a linker.
    #[must_use]
    pub fn new(options: LinkOptions) -> Self {
        Self { options }
    }

    /// Returns the options.
    #[must_use]
    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    /// Resolves every entity of the registry into a route table.
    ///
    /// # Errors
    ///
    /// The first [`LinkError`] raised by any entity; linking stops there.
    pub fn link(&self, registry: &Registry) -> LinkResult<RouteTable> {
        let resolver = Resolver::new(registry);
        let mut table = RouteTable::new();

        for entity in registry.iter() {
            self.link_entity(&resolver, entity, &mut table)?;
        }

        tracing::info!(
            entities = registry.len(),
            routes = table.len(),
            overrides = table.overrides().len(),
            environment = ?self.options.environment,
            "linked route table"
        );
        Ok(table)
    }

    /// Binds a route table using the linker's routing configuration.
    ///
    /// # Errors
    ///
    /// Any error returned by the binder.
    pub fn mount<R: RouteBinder>(&self, table: &RouteTable) -> Result<Mounted<R>, R::Error> {
        mount(table, &self.options.routing)
    }

    fn link_entity(
        &self,
        resolver: &Resolver<'_>,
        entity: &Entity,
        table: &mut RouteTable,
    ) -> LinkResult<()> {
        let identity = entity.identity();
        let _span = tracing::debug_span!("link_entity", entity = identity, kind = %entity.kind()).entered();

        let policies = PolicySet::resolve(resolver, entity)?;

        for (key, declaration) in entity.filters() {
            resolver.resolve(declaration, entity, Context::Filters, &origin(identity, Context::Filters, key))?;
        }

        for (key, declaration) in entity.routes() {
            let route = ParsedRoute::parse(identity, key, entity.base_path())?;
            let chain = route_chain(
                resolver,
                entity,
                &route,
                policies.guard(key),
                declaration,
                Context::Routes,
                &origin(identity, Context::Routes, key),
            )?;
            self.store(table, entity, &route, chain);
        }

        if entity.kind() == EntityKind::Controller {
            let expander = ActionExpander::new(&self.options.routing, self.options.formatter.as_ref());
            for (key, action) in entity.actions() {
                let action_origin = origin(identity, Context::Actions, key);
                for route in expander.expand(identity, key, action)? {
                    let route = ParsedRoute::expanded(identity, &route, entity.base_path())?;
                    let chain = route_chain(
                        resolver,
                        entity,
                        &route,
                        policies.guard(key),
                        &action.handlers,
                        Context::Actions,
                        &action_origin,
                    )?;
                    self.store(table, entity, &route, chain);
                }
            }
        }

        Ok(())
    }

    fn store(&self, table: &mut RouteTable, entity: &Entity, route: &ParsedRoute, chain: HandlerChain) {
        let environment = self.options.environment;
        for method in &route.methods {
            table.insert(
                entity.identity(),
                entity.mount_path(),
                method,
                &route.full_path,
                chain.clone(),
                environment,
            );
            if method == VIEW || method == REDIRECT {
                table.insert(
                    entity.identity(),
                    entity.mount_path(),
                    GET,
                    &route.full_path,
                    chain.clone(),
                    environment,
                );
            }
        }
    }
}

fn route_chain(
    resolver: &Resolver<'_>,
    entity: &Entity,
    route: &ParsedRoute,
    guard: HandlerChain,
    declaration: &Declaration,
    context: Context,
    origin: &str,
) -> LinkResult<HandlerChain> {
    let mut chain = guard;

    if route.is_pseudo() {
        let [method] = route.methods.as_slice() else {
            return Err(LinkError::invalid_declaration(
                entity.identity(),
                format!("'{origin}': view and redirect routes take a single method"),
            ));
        };
        let (rest, target) = split_target(declaration).ok_or_else(|| {
            LinkError::invalid_declaration(
                entity.identity(),
                format!("'{origin}': the last item must name a view or redirect target"),
            )
        })?;
        for item in rest {
            chain.extend(resolver.resolve(item, entity, context, origin)?);
        }
        chain.push(if method == VIEW {
            Handler::render(target)
        } else {
            Handler::redirect(target)
        });
    } else {
        chain.extend(resolver.resolve(declaration, entity, context, origin)?);
    }

    if chain.is_empty() {
        return Err(LinkError::invalid_declaration(
            entity.identity(),
            format!("'{origin}' resolves to an empty handler chain"),
        ));
    }
    Ok(chain)
}

fn origin(identity: &str, context: Context, key: &str) -> String {
    format!("{identity}.{context}.{key}")
}

/// Splits a view/redirect declaration into its leading handlers and the
/// trailing target name.
fn split_target(declaration: &Declaration) -> Option<(&[Declaration], &str)> {
    match declaration {
        Declaration::Reference(target) => Some((&[][..], target.as_str())),
        Declaration::List(items) => match items.split_last() {
            Some((Declaration::Reference(target), rest)) => Some((rest, target.as_str())),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_core::{ErrorKind, Exchange, Flow, Manifest};

    fn noop(name: &str) -> Handler {
        Handler::new(name, |_ex: &mut Exchange| Flow::Continue)
    }

    fn link(manifests: Vec<Manifest>) -> LinkResult<RouteTable> {
        link_with(LinkOptions::default(), manifests)
    }

    fn link_with(options: LinkOptions, manifests: Vec<Manifest>) -> LinkResult<RouteTable> {
        let mut registry = Registry::new();
        for manifest in manifests {
            registry.register(manifest)?;
        }
        Linker::new(options).link(&registry)
    }

    fn user_controller() -> Manifest {
        Manifest::controller("UserController")
            .method("isAuth", noop("isAuth"))
            .method("isOwner", noop("isOwner"))
            .method("find", noop("find"))
            .method("update", noop("update"))
            .method("profile", noop("profile"))
            .policy("*", "isAuth")
            .policy("update", "isOwner")
            .action("find")
            .action("update")
            .route("get /me", "profile")
    }

    #[test]
    fn test_actions_guarded_by_policies() {
        let table = link(vec![user_controller()]).unwrap();

        assert_eq!(table.mounts(), vec!["/"]);
        assert_eq!(
            table.chain("/", "get", "/user/:id?").unwrap().names(),
            vec!["isAuth", "find"]
        );
        assert_eq!(
            table.chain("/", "put", "/user/:id?").unwrap().names(),
            vec!["isAuth", "isOwner", "update"]
        );
        assert_eq!(
            table.chain("/", "get", "/user/me").unwrap().names(),
            vec!["isAuth", "profile"]
        );
    }

    #[test]
    fn test_crud_mode_adds_routes() {
        let options = LinkOptions::default().with_routing(RoutingConfig {
            crud: true,
            ..RoutingConfig::default()
        });
        let table = link_with(options, vec![user_controller()]).unwrap();
        assert_eq!(
            table.paths("/", "get"),
            vec!["/user/me", "/user/:id?", "/user/find/:id?"]
        );
    }

    #[test]
    fn test_service_routes_unguarded() {
        let table = link(vec![Manifest::service("HealthService")
            .method("ping", noop("ping"))
            .route("get /health", "ping")])
        .unwrap();
        assert_eq!(table.chain("/", "get", "/health").unwrap().names(), vec!["ping"]);
    }

    #[test]
    fn test_view_route_mirrored_under_get() {
        let table = link(vec![Manifest::controller("PageController")
            .method("isAuth", noop("isAuth"))
            .route("view /about", vec!["isAuth", "pages/about"])])
        .unwrap();

        let view = table.chain("/", "view", "/page/about").unwrap();
        assert_eq!(view.names(), vec!["isAuth", "render:pages/about"]);
        assert_eq!(table.chain("/", "get", "/page/about"), Some(view));
    }

    #[test]
    fn test_redirect_route() {
        let table = link(vec![Manifest::service("LegacyService").route("redirect /old", "/new")])
            .unwrap();
        let chain = table.chain("/", "get", "/old").unwrap();
        assert_eq!(chain.names(), vec!["redirect:/new"]);

        let mut exchange = Exchange::new(http::Method::GET, "/old");
        chain.run(&mut exchange);
        assert_eq!(exchange.response.location.as_deref(), Some("/new"));
    }

    #[test]
    fn test_view_route_rejects_extra_methods() {
        let err = link(vec![Manifest::service("PageService").route("view|post /about", "about")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDeclaration);
    }

    #[test]
    fn test_empty_route_chain_rejected() {
        let err = link(vec![Manifest::service("EmptyService")
            .route("get /nothing", Declaration::List(Vec::new()))])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDeclaration);
    }

    #[test]
    fn test_missing_template_fails() {
        let err = link(vec![Manifest::controller("UserController")
            .method("search", noop("search"))
            .action("search")])
        .unwrap_err();
        assert_eq!(err, LinkError::route_generation("UserController", "search"));
    }

    #[test]
    fn test_action_falls_back_to_filter_of_same_key() {
        let table = link(vec![Manifest::controller("UserController")
            .method("load", noop("load"))
            .filter("find", "this.load")
            .action("find")])
        .unwrap();
        assert_eq!(
            table.chain("/", "get", "/user/:id?").unwrap().names(),
            vec!["load"]
        );
    }

    #[test]
    fn test_action_without_method_or_filter_not_found() {
        let err = link(vec![Manifest::controller("UserController").action("find")]).unwrap_err();
        assert_eq!(err, LinkError::handler_not_found("UserController.find"));
    }

    #[test]
    fn test_invalid_filter_fails_link() {
        let err = link(vec![Manifest::service("AuthService").filter("broken", "Nowhere.filters.x")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EntityNotFound);
    }

    #[test]
    fn test_override_across_entities() {
        let table = link(vec![
            Manifest::service("AService")
                .method("a", noop("a"))
                .route("get /shared", "a"),
            Manifest::service("BService")
                .method("b", noop("b"))
                .route("get /shared", "b"),
        ])
        .unwrap();

        assert_eq!(table.chain("/", "get", "/shared").unwrap().names(), vec!["b"]);
        assert_eq!(table.overrides().len(), 1);
        assert_eq!(table.overrides()[0].entity, "BService");
    }

    #[test]
    fn test_link_is_repeatable() {
        let mut registry = Registry::new();
        registry.register(user_controller()).unwrap();
        registry
            .register(Manifest::controller("PageController").route("view /about", "about"))
            .unwrap();

        let linker = Linker::default();
        let first = linker.link(&registry).unwrap();
        let second = linker.link(&registry).unwrap();
        assert_eq!(first, second);
    }
}
