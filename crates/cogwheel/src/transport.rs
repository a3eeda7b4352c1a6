//! The capability interface to the chat platform.
//!
//! The framework never talks to the network itself. Everything it needs from
//! the platform goes through [`Transport`], which the bot implements on top of
//! its client library.

use async_trait::async_trait;

use crate::{Id, Response, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The bot lacks the privileges to perform the action.
    Forbidden,
    NotFound,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::NotFound, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Other, message)
    }

    pub fn is_forbidden(&self) -> bool {
        self.kind == TransportErrorKind::Forbidden
    }
}

#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Renders and sends a response to a channel.
    async fn send_response(&self, channel_id: Id, response: Response)
    -> Result<(), TransportError>;

    async fn add_reaction(
        &self,
        channel_id: Id,
        message_id: Id,
        emoji: &str,
    ) -> Result<(), TransportError>;

    /// All roles of a guild, in the platform's order.
    async fn get_guild_roles(&self, guild_id: Id) -> Result<Vec<Role>, TransportError>;

    /// The roles an actor currently holds in a guild.
    async fn get_actor_roles(
        &self,
        guild_id: Id,
        actor_id: Id,
    ) -> Result<Vec<Role>, TransportError>;

    async fn add_role(&self, guild_id: Id, actor_id: Id, role: &Role)
    -> Result<(), TransportError>;

    async fn remove_role(&self, guild_id: Id, actor_id: Id, role: &Role)
    -> Result<(), TransportError>;
}
