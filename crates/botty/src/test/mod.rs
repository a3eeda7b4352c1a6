//! Scenario tests for the shipped extensions and administration commands,
//! run against the recording transport.

use std::{fs, path::PathBuf, sync::Arc};

use cogwheel::{
    Message, Response,
    commands::{CommandHandler, Dispatch},
    testing::{MockTransport, USER_ID, message},
};
use serde_json::json;
use tempfile::TempDir;

use crate::{ConfigStore, State, commands};

mod help_test;

pub struct Harness {
    pub handler: CommandHandler<commands::CommandEvents>,
    pub transport: Arc<MockTransport>,
    pub path: PathBuf,
    _dir: TempDir,
}

impl Harness {
    /// A bot owned by the test user with its default extensions loaded.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = json!({
            "prefix": "!",
            "footer": {
                "text": "Botty McBotface",
                "icon_url": "https://example.com/botty.png"
            },
            "embed": { "color": 16750592 },
            "owners": [USER_ID]
        });

        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let state = State::new(ConfigStore::load(&path).unwrap());
        let transport = MockTransport::new();

        let handler =
            CommandHandler::new(commands::CommandEvents, state.clone(), transport.clone())
                .with_catalog(commands::catalog())
                .register(commands::builtin())
                .unwrap();

        for id in &state.config.get().extensions {
            handler.extensions().load(id).unwrap();
        }

        Self {
            handler,
            transport,
            path,
            _dir: dir,
        }
    }

    /// Dispatches a guild message from the test user, forgetting earlier
    /// transport calls first.
    pub async fn send(&self, content: &str) -> Dispatch {
        self.dispatch(message(content)).await
    }

    pub async fn dispatch(&self, message: Message) -> Dispatch {
        self.transport.clear();

        self.handler.process_commands(message).await.unwrap()
    }

    pub fn reply(&self) -> Response {
        self.transport.responses().first().cloned().unwrap_or_default()
    }

    pub fn config_file(&self) -> String {
        fs::read_to_string(&self.path).unwrap()
    }
}
