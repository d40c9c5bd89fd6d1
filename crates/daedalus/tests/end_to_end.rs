//! End-to-end tests: manifests in, dispatched responses out.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use daedalus::prelude::*;
use http::{Method, StatusCode};
use serde_json::{json, Value};
use tracing_subscriber::layer::SubscriberExt;

fn records() -> Value {
    json!({
        "1": { "id": 1, "name": "ada" },
        "2": { "id": 2, "name": "grace" },
    })
}

fn user_controller() -> Manifest {
    Manifest::controller("UserController")
        .mount("/id")
        .method(
            "find",
            Handler::new("find", |ex: &mut Exchange| {
                let record = ex
                    .request
                    .param("id")
                    .and_then(|id| records().get(id).cloned());
                match record {
                    Some(record) => ex.response.json(record),
                    None => ex.response.status(StatusCode::NOT_FOUND),
                }
                Flow::Halt
            }),
        )
        .action("find")
}

fn auth_service() -> Manifest {
    Manifest::service("AuthService").method(
        "isAuth",
        Handler::new("isAuth", |ex: &mut Exchange| {
            if ex.request.body["token"].is_string() {
                Flow::Continue
            } else {
                ex.response.status(StatusCode::UNAUTHORIZED);
                Flow::Halt
            }
        }),
    )
}

#[test]
fn test_user_controller_mounted_at_id() {
    let mut app = Application::default();
    app.register(user_controller()).unwrap();
    app.mount().unwrap();

    let table = app.route_table().unwrap();
    assert_eq!(table.mounts(), vec!["/id"]);
    assert!(table.methods("/id").contains(&"get"));

    let chain = table.chain("/id", "get", "/user/:id?").unwrap();
    assert_eq!(chain.last().unwrap().name(), "find");

    let mounted = app.router("/id").unwrap();
    let response = mounted.dispatch(Method::GET, "/user/1", Value::Null).unwrap();
    assert_eq!(response.body, Some(json!({ "id": 1, "name": "ada" })));

    let response = app.dispatch(Method::GET, "/id/user/1", Value::Null).unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, Some(json!({ "id": 1, "name": "ada" })));

    let response = app.dispatch(Method::GET, "/id/user/9", Value::Null).unwrap();
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    assert!(app.dispatch(Method::GET, "/user/1", Value::Null).is_none());
}

#[test]
fn test_wildcard_policy_guards_actions() {
    let mut app = Application::default();
    app.register(auth_service()).unwrap();
    app.register(user_controller().policy("*", "AuthService.isAuth"))
        .unwrap();
    app.mount().unwrap();

    let denied = app.dispatch(Method::GET, "/id/user/2", Value::Null).unwrap();
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
    assert!(denied.body.is_none());

    let allowed = app
        .dispatch(Method::GET, "/id/user/2", json!({ "token": "t" }))
        .unwrap();
    assert_eq!(allowed.body, Some(json!({ "id": 2, "name": "grace" })));
}

#[test]
fn test_linking_twice_yields_equal_tables() {
    let mut app = Application::default();
    app.register(auth_service()).unwrap();
    app.register(
        user_controller()
            .policy("*", "AuthService.isAuth")
            .method("destroy", Handler::new("destroy", |_ex: &mut Exchange| Flow::Halt))
            .policy("destroy", false)
            .action("destroy")
            .route("view /about", "pages/about")
            .route("redirect /home", "/id/user"),
    )
    .unwrap();

    let first = app.link().unwrap();
    let second = app.link().unwrap();
    assert_eq!(first, second);

    app.mount().unwrap();
    assert_eq!(app.route_table(), Some(&first));
    app.mount().unwrap();
    assert_eq!(app.route_table(), Some(&first));
}

#[test]
fn test_view_and_redirect_dispatch_through_get() {
    let mut app = Application::default();
    app.register(
        Manifest::controller("PageController")
            .route("view /about", "pages/about")
            .route("redirect /home", "/page/about"),
    )
    .unwrap();
    app.mount().unwrap();

    let about = app.dispatch(Method::GET, "/page/about", Value::Null).unwrap();
    assert_eq!(about.view.as_deref(), Some("pages/about"));

    let home = app.dispatch(Method::GET, "/page/home", Value::Null).unwrap();
    assert_eq!(home.status, StatusCode::FOUND);
    assert_eq!(home.location.as_deref(), Some("/page/about"));
}

#[test]
fn test_circular_reference_aborts_startup() {
    let mut app = Application::default();
    app.register(
        Manifest::service("LoopService")
            .filter("a", "this.filters.b")
            .filter("b", "this.filters.a"),
    )
    .unwrap();

    let err = app.mount().unwrap_err();
    let BootstrapError::Link(err) = err else {
        panic!("expected a link error");
    };
    assert_eq!(err.kind(), ErrorKind::CircularReference);
    assert!(!app.is_mounted());
}

#[derive(Clone, Default)]
struct WarnCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Clone, Default)]
struct MessageLog(Arc<Mutex<Vec<String>>>);

struct Message(Option<String>);

impl tracing::field::Visit for Message {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for MessageLog {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut message = Message(None);
        event.record(&mut message);
        if let Some(message) = message.0 {
            self.0.lock().unwrap().push(message);
        }
    }
}

#[test]
fn test_registration_logged_once() {
    let log = MessageLog::default();
    let subscriber = tracing_subscriber::registry().with(log.clone());
    tracing::subscriber::with_default(subscriber, || {
        let mut app = Application::default();
        app.register(user_controller()).unwrap();
    });

    let messages = log.0.lock().unwrap();
    let registered = messages.iter().filter(|m| *m == "registered entity").count();
    assert_eq!(registered, 1);
}

fn overriding_app(environment: Environment) -> Application {
    let config = DaedalusConfig::builder().environment(environment).build();
    let mut app = Application::new(config);
    for identity in ["FirstService", "SecondService"] {
        app.register(
            Manifest::service(identity)
                .method("status", Handler::new(identity, |_ex: &mut Exchange| Flow::Halt))
                .route("get /status", "status"),
        )
        .unwrap();
    }
    app
}

fn warnings_while_linking(app: &Application) -> (RouteTable, usize) {
    let counter = WarnCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let table = tracing::subscriber::with_default(subscriber, || app.link().unwrap());
    (table, counter.0.load(Ordering::SeqCst))
}

#[test]
fn test_override_warns_in_development() {
    let app = overriding_app(Environment::Development);
    let (table, warnings) = warnings_while_linking(&app);

    assert_eq!(table.overrides().len(), 1);
    assert_eq!(table.overrides()[0].entity, "SecondService");
    assert_eq!(
        table.chain("/", "get", "/status").unwrap().names(),
        vec!["SecondService"]
    );
    assert_eq!(warnings, 1);
}

#[test]
fn test_override_silent_in_production() {
    let app = overriding_app(Environment::Production);
    let (table, warnings) = warnings_while_linking(&app);

    assert_eq!(table.overrides().len(), 1);
    assert_eq!(
        table.chain("/", "get", "/status").unwrap().names(),
        vec!["SecondService"]
    );
    assert_eq!(warnings, 0);
}

#[test]
fn test_config_file_enables_crud_routes() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
environment = "production"

[routing]
crud = true

[routing.templates]
find = "get /{{{{action}}}}/:id?"
"#
    )
    .unwrap();

    let loader = ConfigLoader::new().with_file(file.path()).unwrap();
    let mut app = Application::from_loader(loader).unwrap();
    assert!(app.config().environment.is_production());

    app.register(user_controller()).unwrap();
    app.mount().unwrap();

    let table = app.route_table().unwrap();
    assert_eq!(table.paths("/id", "get"), vec!["/user/:id?", "/user/find/:id?"]);

    let response = app.dispatch(Method::GET, "/id/user/find/2", Value::Null).unwrap();
    assert_eq!(response.body, Some(json!({ "id": 2, "name": "grace" })));
}

#[test]
fn test_global_registry_snapshot() {
    global::reset();
    global::register(user_controller()).unwrap();
    assert!(global::entity("UserController").is_some());

    let mut app = Application::from_global(DaedalusConfig::default());
    app.mount().unwrap();
    assert!(app.dispatch(Method::GET, "/id/user/1", Value::Null).is_some());

    global::reset();
    assert!(global::entity("UserController").is_none());
    assert!(app.entity("UserController").is_some());
}
