//! Help command tests: visibility filtering, pagination and subject lookup.

use std::sync::Arc;

use crate::{
    Error,
    commands::{
        Command, CommandHandler, Context, DefaultHelpCommand, Extension, ExtensionCatalog,
        help_command,
    },
    testing::{MockTransport, TestEvents, TestState, message},
};

type Ctx = Context<Error, TestState>;
type Cmd = Command<Error, TestState>;

async fn noop(_ctx: Ctx) -> Result<(), Error> {
    Ok(())
}

async fn never(_ctx: Ctx) -> Result<bool, Error> {
    Ok(false)
}

struct Bundle {
    name: &'static str,
    description: Option<&'static str>,
    commands: fn() -> Vec<Cmd>,
}

impl Extension<Error, TestState> for Bundle {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> Option<&str> {
        self.description
    }

    fn commands(&self) -> Vec<Cmd> {
        (self.commands)()
    }
}

fn add(
    catalog: ExtensionCatalog<Error, TestState>,
    id: &str,
    name: &'static str,
    commands: fn() -> Vec<Cmd>,
) -> ExtensionCatalog<Error, TestState> {
    catalog.add(id, move || {
        Ok(Box::new(Bundle {
            name,
            description: None,
            commands,
        }))
    })
}

fn setup() -> (CommandHandler<TestEvents>, Arc<MockTransport>) {
    let transport = MockTransport::new();

    let catalog = ExtensionCatalog::<Error, TestState>::new().add("greeter", || {
        Ok(Box::new(Bundle {
            name: "Greeter",
            description: Some("Says hello."),
            commands: || {
                vec![
                    Command::new("hello", noop)
                        .alias("hi")
                        .signature("[name]")
                        .description("Greets someone.\nDefaults to you."),
                    Command::new("secret", noop).hidden(),
                    Command::new("guarded", noop).check(never),
                ]
            },
        }))
    });

    let catalog = add(catalog, "alpha", "Alpha", || vec![Command::new("a", noop)]);
    let catalog = add(catalog, "bravo", "Bravo", || vec![Command::new("b", noop)]);
    let catalog = add(catalog, "charlie", "Charlie", || vec![Command::new("c", noop)]);
    let catalog = add(catalog, "delta", "Delta", || vec![Command::new("d", noop)]);
    let catalog = add(catalog, "quiet", "Quiet", || {
        vec![Command::new("q", noop).hidden()]
    });

    let handler = CommandHandler::new(
        TestEvents::default(),
        TestState::default(),
        transport.clone(),
    )
    .with_catalog(catalog)
    .register(vec![help_command(DefaultHelpCommand)])
    .unwrap();

    for id in handler.extensions().available() {
        handler.extensions().load(&id).unwrap();
    }

    (handler, transport)
}

async fn help(
    handler: &CommandHandler<TestEvents>,
    transport: &MockTransport,
    content: &str,
) -> String {
    transport.clear();
    handler.process_commands(message(content)).await.unwrap();

    transport
        .responses()
        .first()
        .map(|response| response.text_content())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_bot_help_pages_three_sections() {
    let (handler, transport) = setup();

    let first = help(&handler, &transport, "!help").await;

    assert!(first.starts_with("Help [1/2]"));
    assert!(first.contains("Alpha:"));
    assert!(first.contains("Charlie:"));
    assert!(!first.contains("Delta:"));

    let second = help(&handler, &transport, "!help 2").await;

    assert!(second.starts_with("Help [2/2]"));
    assert!(second.contains("Delta:"));
    assert!(second.contains("Greeter:"));
    assert!(second.contains("hello - Greets someone."));
    assert!(!second.contains("Defaults to you."));
}

#[tokio::test]
async fn test_bot_help_hides_invisible_commands() {
    let (handler, transport) = setup();

    let text = help(&handler, &transport, "!help 2").await;

    assert!(!text.contains("secret"));
    assert!(!text.contains("guarded"));
    assert!(!text.contains("Quiet"));
}

#[tokio::test]
async fn test_page_number_is_clamped() {
    let (handler, transport) = setup();

    assert!(help(&handler, &transport, "!help 9").await.starts_with("Help [2/2]"));
    assert!(help(&handler, &transport, "!help 0").await.starts_with("Help [1/2]"));
}

#[tokio::test]
async fn test_command_help() {
    let (handler, transport) = setup();

    let text = help(&handler, &transport, "!help hi").await;

    assert!(text.contains("hello:"));
    assert!(text.contains("Usage: !hello [name]"));
    assert!(text.contains("Aliases: hi"));
    assert!(text.contains("Defaults to you."));
}

#[tokio::test]
async fn test_hidden_command_is_not_found() {
    let (handler, transport) = setup();

    assert_eq!(
        help(&handler, &transport, "!help secret").await,
        "Command `secret` not found."
    );
    assert_eq!(
        help(&handler, &transport, "!help no such thing").await,
        "Command `no such thing` not found."
    );
}

#[tokio::test]
async fn test_extension_help_by_name_or_id() {
    let (handler, transport) = setup();

    let by_name = help(&handler, &transport, "!help greeter").await;

    assert!(by_name.contains("Says hello."));
    assert!(by_name.contains("hello - Greets someone."));
    assert!(!by_name.contains("secret"));

    assert_eq!(help(&handler, &transport, "!help cogs.greeter").await, by_name);
}
