//! Action template expansion.
//!
//! A Controller action becomes one or more route declaration strings. An
//! explicit route is used as given; otherwise the template registered for the
//! action key is expanded once per enabled [`RouteMode`] and passed through a
//! [`RouteFormatter`].

use std::fmt;

use daedalus_config::{RoutingConfig, ACTION_PLACEHOLDER};
use daedalus_core::{Action, LinkError, LinkResult};

/// Route generation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMode {
    /// Resource-style routes: the action segment is dropped.
    Rest,
    /// Action-style routes: the action key becomes a path segment.
    Crud,
}

impl RouteMode {
    /// Returns the modes enabled by a routing configuration, REST first.
    #[must_use]
    pub fn enabled(config: &RoutingConfig) -> Vec<Self> {
        let mut modes = Vec::with_capacity(2);
        if config.rest {
            modes.push(Self::Rest);
        }
        if config.crud {
            modes.push(Self::Crud);
        }
        modes
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => f.write_str("rest"),
            Self::Crud => f.write_str("crud"),
        }
    }
}

/// Post-processes a template path for one mode.
///
/// `path` still contains the `{{action}}` placeholder; `key` is the action key.
/// The returned path may be relative; it is joined onto the entity's base path.
pub trait RouteFormatter: fmt::Debug + Send + Sync {
    /// Returns the concrete path.
    fn format(&self, key: &str, path: &str, mode: RouteMode) -> String;
}

/// Drops the action segment in REST mode and substitutes the key in CRUD mode.
///
/// ```
/// use daedalus_linker::{DefaultFormatter, RouteFormatter, RouteMode};
///
/// let formatter = DefaultFormatter;
/// assert_eq!(formatter.format("find", "/{{action}}/:id?", RouteMode::Rest), "/:id?");
/// assert_eq!(formatter.format("find", "/{{action}}/:id?", RouteMode::Crud), "/find/:id?");
/// assert_eq!(formatter.format("create", "/{{action}}", RouteMode::Rest), "/");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl RouteFormatter for DefaultFormatter {
    fn format(&self, key: &str, path: &str, mode: RouteMode) -> String {
        match mode {
            RouteMode::Rest => {
                let stripped = path
                    .replace(&format!("/{ACTION_PLACEHOLDER}"), "")
                    .replace(ACTION_PLACEHOLDER, "");
                if stripped.is_empty() {
                    "/".to_string()
                } else {
                    stripped
                }
            }
            RouteMode::Crud => path.replace(ACTION_PLACEHOLDER, key),
        }
    }
}

/// Expands actions into route declaration strings.
#[derive(Debug, Clone, Copy)]
pub struct ActionExpander<'a> {
    config: &'a RoutingConfig,
    formatter: &'a dyn RouteFormatter,
}

impl<'a> ActionExpander<'a> {
    /// Creates an expander.
    #[must_use]
    pub fn new(config: &'a RoutingConfig, formatter: &'a dyn RouteFormatter) -> Self {
        Self { config, formatter }
    }

    /// Returns the route declarations of one action, without duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::RouteGeneration`] if the action has no explicit
    /// route, no template exists for its key, and a generation mode is
    /// enabled.
    pub fn expand(&self, entity: &str, key: &str, action: &Action) -> LinkResult<Vec<String>> {
        if let Some(route) = &action.route {
            return Ok(vec![route.replace(ACTION_PLACEHOLDER, key)]);
        }

        let modes = RouteMode::enabled(self.config);
        if modes.is_empty() {
            return Ok(Vec::new());
        }

        let template = self
            .config
            .templates
            .get(key)
            .ok_or_else(|| LinkError::route_generation(entity, key))?;

        let template = template.trim();
        let (methods, path) = match template.split_once(char::is_whitespace) {
            Some((methods, path)) => (Some(methods), path.trim()),
            None => (None, template),
        };

        let mut routes: Vec<String> = Vec::with_capacity(modes.len());
        for mode in modes {
            let path = self.formatter.format(key, path, mode);
            let route = match methods {
                Some(methods) => format!("{methods} {path}"),
                None => path,
            };
            tracing::trace!(entity, action = key, %mode, route = %route, "expanded action");
            if !routes.contains(&route) {
                routes.push(route);
            }
        }
        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daedalus_core::ErrorKind;

    fn config(rest: bool, crud: bool) -> RoutingConfig {
        RoutingConfig {
            rest,
            crud,
            ..RoutingConfig::default()
        }
    }

    fn expand(config: &RoutingConfig, key: &str, action: &Action) -> LinkResult<Vec<String>> {
        ActionExpander::new(config, &DefaultFormatter).expand("UserController", key, action)
    }

    #[test]
    fn test_rest_mode() {
        let routes = expand(&config(true, false), "find", &Action::method("find")).unwrap();
        assert_eq!(routes, vec!["get /:id?"]);
    }

    #[test]
    fn test_rest_and_crud_modes() {
        let routes = expand(&config(true, true), "find", &Action::method("find")).unwrap();
        assert_eq!(routes, vec!["get /:id?", "get /find/:id?"]);

        let routes = expand(&config(true, true), "create", &Action::method("create")).unwrap();
        assert_eq!(routes, vec!["post /", "post /create"]);
    }

    #[test]
    fn test_explicit_route_wins() {
        let action = Action::method("search").with_route("get /{{action}}/:term");
        let routes = expand(&config(true, true), "search", &action).unwrap();
        assert_eq!(routes, vec!["get /search/:term"]);
    }

    #[test]
    fn test_missing_template() {
        let err = expand(&config(true, false), "search", &Action::method("search")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RouteGeneration);
        assert_eq!(err, LinkError::route_generation("UserController", "search"));
    }

    #[test]
    fn test_no_modes_generates_nothing() {
        let routes = expand(&config(false, false), "search", &Action::method("search")).unwrap();
        assert!(routes.is_empty());
    }

    #[test]
    fn test_identical_routes_deduplicated() {
        let mut config = config(true, true);
        config
            .templates
            .insert("count".to_string(), "get /total".to_string());
        let routes = expand(&config, "count", &Action::method("count")).unwrap();
        assert_eq!(routes, vec!["get /total"]);
    }

    #[test]
    fn test_template_without_method() {
        let mut config = config(false, true);
        config
            .templates
            .insert("export".to_string(), "/{{action}}.csv".to_string());
        let routes = expand(&config, "export", &Action::method("export")).unwrap();
        assert_eq!(routes, vec!["/export.csv"]);
    }

    #[derive(Debug)]
    struct UpperFormatter;

    impl RouteFormatter for UpperFormatter {
        fn format(&self, key: &str, path: &str, _mode: RouteMode) -> String {
            path.replace(ACTION_PLACEHOLDER, &key.to_uppercase())
        }
    }

    #[test]
    fn test_custom_formatter() {
        let config = config(true, false);
        let routes = ActionExpander::new(&config, &UpperFormatter)
            .expand("UserController", "find", &Action::method("find"))
            .unwrap();
        assert_eq!(routes, vec!["get /FIND/:id?"]);
    }
}
