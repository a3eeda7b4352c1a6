use std::{fmt, sync::Arc};

use crate::{
    Actor, Error, Id, Response, Role, Transport,
    commands::{Command, Commands, Extensions, Words},
    types::Message,
};

/// Everything a single command invocation can see.
///
/// Created per inbound message by the
/// [`CommandHandler`](crate::commands::CommandHandler) and dropped once
/// dispatch of that message is complete.
#[derive(Clone)]
pub struct Context<E, S> {
    pub message: Message,
    /// The prefix the message matched.
    pub prefix: String,
    /// The token the command was invoked with, a name or an alias.
    pub invoked_with: String,
    pub command: Option<Command<E, S>>,
    /// The argument tail after the command token.
    pub words: Words,
    pub state: S,
    pub commands: Commands<E, S>,
    pub extensions: Extensions<E, S>,
    pub transport: Arc<dyn Transport>,
}

impl<E, S: fmt::Debug> fmt::Debug for Context<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("message", &self.message)
            .field("prefix", &self.prefix)
            .field("invoked_with", &self.invoked_with)
            .field("command", &self.command)
            .field("words", &self.words)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<E, S> Context<E, S> {
    pub fn author(&self) -> &Actor {
        &self.message.author
    }

    pub fn channel_id(&self) -> Id {
        self.message.channel_id
    }

    pub fn guild_id(&self) -> Result<Id, Error> {
        self.message.guild_id.ok_or(Error::NotInGuild)
    }

    /// The matched prefix with surrounding whitespace removed, for help text.
    pub fn clean_prefix(&self) -> &str {
        self.prefix.trim()
    }

    /// The raw argument tail as the author typed it.
    pub fn raw_args(&self) -> &str {
        self.words.input()
    }

    pub async fn send(&self, response: Response) -> Result<(), Error> {
        self.transport
            .send_response(self.channel_id(), response)
            .await
            .map_err(Error::from)
    }

    pub async fn say(&self, text: impl Into<String>) -> Result<(), Error> {
        self.send(Response::text(text)).await
    }

    /// Reacts to the invoking message with a check mark.
    ///
    /// Failing to react is not an error worth reporting to the author.
    pub async fn confirm(&self) {
        if let Err(e) = self
            .transport
            .add_reaction(self.channel_id(), self.message.id, "\u{2705}")
            .await
        {
            log::debug!("could not add confirmation reaction: {e}");
        }
    }

    pub async fn guild_roles(&self) -> Result<Vec<Role>, Error> {
        let guild_id = self.guild_id()?;

        Ok(self.transport.get_guild_roles(guild_id).await?)
    }

    pub async fn author_roles(&self) -> Result<Vec<Role>, Error> {
        let guild_id = self.guild_id()?;

        Ok(self
            .transport
            .get_actor_roles(guild_id, self.author().id)
            .await?)
    }
}
