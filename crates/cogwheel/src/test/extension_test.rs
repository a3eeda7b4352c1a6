//! Extension lifecycle tests: load, unload, reload and their failure modes.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use crate::{
    Error,
    commands::{
        Command, CommandHandler, Context, Dispatch, Extension, ExtensionCatalog, ExtensionInfo,
        FaultKind,
    },
    testing::{MockTransport, TestEvents, TestState, message},
};

type Ctx = Context<Error, TestState>;
type Built = Result<Box<dyn Extension<Error, TestState>>, Error>;

async fn ping(ctx: Ctx) -> Result<(), Error> {
    ctx.say("pong!").await
}

async fn hello(ctx: Ctx) -> Result<(), Error> {
    ctx.say(format!("hello {}", ctx.author().name)).await
}

fn boxed<X: Extension<Error, TestState>>(extension: X) -> Built {
    Ok(Box::new(extension))
}

struct Greeter;

impl Extension<Error, TestState> for Greeter {
    fn name(&self) -> &str {
        "Greeter"
    }

    fn description(&self) -> Option<&str> {
        Some("Says hello.")
    }

    fn commands(&self) -> Vec<Command<Error, TestState>> {
        vec![
            Command::new("hello", hello).alias("hi"),
            Command::new("wave", hello),
        ]
    }
}

/// An extension whose shape can be changed between loads.
struct Switch {
    names: Mutex<Vec<&'static str>>,
    panics: AtomicBool,
    fails: AtomicBool,
    unloads: AtomicUsize,
}

impl Switch {
    fn new(names: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            names: Mutex::new(names.to_vec()),
            panics: AtomicBool::new(false),
            fails: AtomicBool::new(false),
            unloads: AtomicUsize::new(0),
        })
    }

    fn set_names(&self, names: &[&'static str]) {
        *self.names.lock().unwrap() = names.to_vec();
    }

    fn build(self: &Arc<Self>) -> Built {
        if self.panics.load(Ordering::SeqCst) {
            panic!("syntax error in switch");
        }

        boxed(Switched(self.clone()))
    }

    fn unloads(&self) -> usize {
        self.unloads.load(Ordering::SeqCst)
    }
}

struct Switched(Arc<Switch>);

impl Extension<Error, TestState> for Switched {
    fn name(&self) -> &str {
        "Switch"
    }

    fn commands(&self) -> Vec<Command<Error, TestState>> {
        self.0
            .names
            .lock()
            .unwrap()
            .iter()
            .map(|name| Command::new(*name, ping))
            .collect()
    }

    fn on_load(&self, _state: &TestState) -> Result<(), Error> {
        if self.0.fails.load(Ordering::SeqCst) {
            return Err(Error::NotLoaded("cogs.database".to_string()));
        }

        Ok(())
    }

    fn on_unload(&self, _state: &TestState) {
        self.0.unloads.fetch_add(1, Ordering::SeqCst);
    }
}

fn setup(switch: &Arc<Switch>) -> (CommandHandler<TestEvents>, Arc<MockTransport>) {
    let transport = MockTransport::new();
    let switch = switch.clone();

    let catalog = ExtensionCatalog::new()
        .add("greeter", || boxed(Greeter))
        .add("cogs.switch", move || switch.build());

    let handler = CommandHandler::new(
        TestEvents::default(),
        TestState::default(),
        transport.clone(),
    )
    .with_catalog(catalog)
    .register(vec![Command::new("ping", ping)])
    .unwrap();

    (handler, transport)
}

fn names(handler: &CommandHandler<TestEvents>) -> Vec<String> {
    handler
        .commands()
        .get_commands()
        .into_iter()
        .map(|command| command.name)
        .collect()
}

#[tokio::test]
async fn test_load_registers_commands_owned_by_the_extension() {
    let (handler, transport) = setup(&Switch::new(&[]));

    let id = handler.extensions().load("greeter").unwrap();

    assert_eq!(id, "cogs.greeter");
    assert_eq!(handler.extensions().loaded(), vec!["cogs.greeter"]);
    assert_eq!(
        handler.commands().resolve("hi").unwrap().extension.as_deref(),
        Some("cogs.greeter")
    );
    assert_eq!(handler.commands().resolve("ping").unwrap().extension, None);

    let dispatch = handler.process_commands(message("!hi")).await.unwrap();

    assert_eq!(dispatch, Dispatch::Completed);
    assert_eq!(
        transport.responses()[0].description.as_deref(),
        Some("hello dave")
    );
}

#[test]
fn test_load_twice_is_already_loaded() {
    let (handler, _transport) = setup(&Switch::new(&[]));

    handler.extensions().load("cogs.greeter").unwrap();

    assert!(matches!(
        handler.extensions().load("greeter"),
        Err(Error::AlreadyLoaded(id)) if id == "cogs.greeter"
    ));
}

#[test]
fn test_load_unknown_extension_fails() {
    let (handler, _transport) = setup(&Switch::new(&[]));

    assert!(matches!(
        handler.extensions().load("music"),
        Err(Error::ExtensionLoad { id, reason })
            if id == "cogs.music" && reason == "no such extension"
    ));
    assert!(handler.extensions().loaded().is_empty());
}

#[tokio::test]
async fn test_unload_removes_every_command() {
    let (handler, _transport) = setup(&Switch::new(&[]));

    handler.extensions().load("greeter").unwrap();
    handler.extensions().unload("cogs.greeter").unwrap();

    for token in ["hello", "hi", "wave"] {
        assert!(matches!(
            handler.commands().resolve(token),
            Err(Error::NotFound(_))
        ));
    }

    assert_eq!(names(&handler), vec!["ping"]);

    let dispatch = handler.process_commands(message("!hello")).await.unwrap();

    assert_eq!(dispatch, Dispatch::Faulted(FaultKind::CommandNotFound));
}

#[test]
fn test_unload_runs_teardown_and_requires_loaded() {
    let switch = Switch::new(&["one"]);
    let (handler, _transport) = setup(&switch);

    assert!(matches!(
        handler.extensions().unload("switch"),
        Err(Error::NotLoaded(_))
    ));

    handler.extensions().load("switch").unwrap();
    handler.extensions().unload("switch").unwrap();

    assert_eq!(switch.unloads(), 1);
    assert!(!handler.extensions().is_loaded("switch"));
}

#[test]
fn test_panicking_extension_leaves_nothing_behind() {
    let switch = Switch::new(&["one", "two"]);
    let (handler, _transport) = setup(&switch);

    switch.panics.store(true, Ordering::SeqCst);

    let result = handler.extensions().load("switch");

    assert!(matches!(
        result,
        Err(Error::ExtensionLoad { reason, .. }) if reason.contains("syntax error in switch")
    ));
    assert_eq!(names(&handler), vec!["ping"]);
    assert!(handler.extensions().loaded().is_empty());

    switch.panics.store(false, Ordering::SeqCst);

    handler.extensions().load("switch").unwrap();

    assert_eq!(names(&handler), vec!["one", "ping", "two"]);
}

#[test]
fn test_failing_load_hook_surfaces_the_cause() {
    let switch = Switch::new(&["one"]);
    let (handler, _transport) = setup(&switch);

    switch.fails.store(true, Ordering::SeqCst);

    assert!(matches!(
        handler.extensions().load("switch"),
        Err(Error::ExtensionLoad { reason, .. }) if reason.contains("cogs.database")
    ));
    assert_eq!(names(&handler), vec!["ping"]);
}

#[test]
fn test_colliding_extension_is_rolled_back() {
    let switch = Switch::new(&["one", "ping"]);
    let (handler, _transport) = setup(&switch);

    assert!(matches!(
        handler.extensions().load("switch"),
        Err(Error::ExtensionLoad { reason, .. }) if reason.contains("ping")
    ));
    assert_eq!(names(&handler), vec!["ping"]);
    assert_eq!(handler.commands().resolve("ping").unwrap().extension, None);
    assert_eq!(switch.unloads(), 1);
}

#[test]
fn test_reload_swaps_commands() {
    let switch = Switch::new(&["old", "kept"]);
    let (handler, _transport) = setup(&switch);

    handler.extensions().load("switch").unwrap();
    switch.set_names(&["new", "kept"]);
    handler.extensions().reload("switch").unwrap();

    assert_eq!(names(&handler), vec!["kept", "new", "ping"]);
    assert!(matches!(
        handler.commands().resolve("old"),
        Err(Error::NotFound(_))
    ));
    assert_eq!(switch.unloads(), 1);
}

#[test]
fn test_failed_reload_preserves_previous_state() {
    let switch = Switch::new(&["one", "two"]);
    let (handler, _transport) = setup(&switch);

    handler.extensions().load("switch").unwrap();

    let before = names(&handler);

    switch.set_names(&["three"]);
    switch.panics.store(true, Ordering::SeqCst);

    assert!(matches!(
        handler.extensions().reload("switch"),
        Err(Error::ExtensionReload { id, .. }) if id == "cogs.switch"
    ));

    switch.panics.store(false, Ordering::SeqCst);
    switch.fails.store(true, Ordering::SeqCst);

    assert!(matches!(
        handler.extensions().reload("switch"),
        Err(Error::ExtensionReload { .. })
    ));

    assert_eq!(names(&handler), before);
    assert!(handler.extensions().is_loaded("switch"));
    assert_eq!(
        handler.commands().resolve("one").unwrap().extension.as_deref(),
        Some("cogs.switch")
    );
    assert_eq!(switch.unloads(), 0);
}

#[test]
fn test_reload_collision_keeps_previous_commands() {
    let switch = Switch::new(&["one"]);
    let (handler, _transport) = setup(&switch);

    handler.extensions().load("switch").unwrap();
    switch.set_names(&["one", "ping"]);

    assert!(matches!(
        handler.extensions().reload("switch"),
        Err(Error::ExtensionReload { .. })
    ));
    assert_eq!(names(&handler), vec!["one", "ping"]);
    assert_eq!(handler.commands().resolve("ping").unwrap().extension, None);
    // only the rejected instance was torn down
    assert_eq!(switch.unloads(), 1);
    assert!(handler.extensions().is_loaded("switch"));
}

#[test]
fn test_reload_requires_loaded() {
    let (handler, _transport) = setup(&Switch::new(&[]));

    assert!(matches!(
        handler.extensions().reload("greeter"),
        Err(Error::NotLoaded(id)) if id == "cogs.greeter"
    ));
}

#[test]
fn test_describes_loaded_and_available_extensions() {
    let (handler, _transport) = setup(&Switch::new(&[]));

    handler.extensions().load("greeter").unwrap();

    assert_eq!(
        handler.extensions().available(),
        vec!["cogs.greeter", "cogs.switch"]
    );
    assert_eq!(
        handler.extensions().get("greeter"),
        Some(ExtensionInfo {
            id: "cogs.greeter".to_string(),
            name: "Greeter".to_string(),
            description: Some("Says hello.".to_string()),
        })
    );
    assert_eq!(handler.extensions().get("switch"), None);
    assert_eq!(handler.extensions().describe().len(), 1);
}

#[test]
fn test_cloned_handles_share_the_table() {
    let (handler, _transport) = setup(&Switch::new(&[]));
    let extensions = handler.extensions().clone();
    let commands = handler.commands().clone();

    extensions.load("greeter").unwrap();

    assert_eq!(handler.extensions().loaded(), vec!["cogs.greeter"]);
    assert!(handler.commands().resolve("wave").is_ok());

    handler.extensions().unload("greeter").unwrap();

    assert!(extensions.loaded().is_empty());
    assert!(matches!(commands.resolve("wave"), Err(Error::NotFound(_))));
}
