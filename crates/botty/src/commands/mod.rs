use cogwheel::{
    Actor, Message, async_trait,
    commands::{CommandEventHandler, ExtensionCatalog},
};

use crate::{Command, Error, State};

mod admin;
mod botty;
mod help;

pub struct CommandEvents;

#[async_trait]
impl CommandEventHandler for CommandEvents {
    type State = State;
    type Error = Error;

    async fn get_prefix(&self, _message: &Message, state: &State) -> Result<Vec<String>, Error> {
        Ok(vec![state.config.prefix()])
    }

    async fn ready(&self, user: &Actor, state: &State) -> Result<(), Error> {
        log::info!(
            "Logged on as {} ({}) after {:.2?}",
            user.name,
            user.id,
            state.started.elapsed()
        );

        Ok(())
    }
}

/// Every extension the bot can load, by id.
pub fn catalog() -> ExtensionCatalog<Error, State> {
    ExtensionCatalog::<Error, State>::new()
        .add("botty", || Ok(Box::new(botty::Botty)))
        .add("help", || Ok(Box::new(help::Help)))
}

/// Commands that live outside any extension.
pub fn builtin() -> Vec<Command> {
    admin::commands()
}
