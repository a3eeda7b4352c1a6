//! Fault classification for dispatched commands.
//!
//! Every failure met while dispatching a message ends up as a [`Fault`]. The
//! handler logs it as a [`FaultReport`] and answers the author with
//! [`Fault::response`] (or whatever the bot's event handler substitutes), and
//! dispatch carries on with the next message.

use std::{any::Any, fmt};

use log::Level;

use crate::{Author, CommandError, Error, Id, Response, commands::Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    CommandNotFound,
    PermissionDenied,
    MissingArgument,
    BadArgumentValue,
    HandlerFault,
    TransportFault,
}

impl FaultKind {
    pub fn level(self) -> Level {
        match self {
            Self::CommandNotFound | Self::PermissionDenied => Level::Warn,
            _ => Level::Error,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::CommandNotFound => "Command not found",
            Self::PermissionDenied => "User attempted to use command without permission",
            Self::MissingArgument => "Missing required parameter",
            Self::BadArgumentValue => "Bad argument",
            Self::HandlerFault => "Command failed",
            Self::TransportFault => "Platform request failed",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone)]
pub enum Cause<E> {
    Error(E),
    /// A panic caught while running handler code.
    Panic(String),
}

impl<E: fmt::Display> fmt::Display for Cause<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(error) => error.fmt(f),
            Self::Panic(message) => write!(f, "handler panicked: {message}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Fault<E> {
    pub kind: FaultKind,
    pub cause: Cause<E>,
}

impl<E: CommandError> Fault<E> {
    pub fn from_error(error: E) -> Self {
        let kind = match error.framework_error() {
            Some(Error::CommandNotFound(_)) => FaultKind::CommandNotFound,
            Some(Error::CheckFailure | Error::NotInGuild) => FaultKind::PermissionDenied,
            Some(Error::MissingParameter { .. }) => FaultKind::MissingArgument,
            Some(Error::ArgumentNotFound { .. } | Error::BadArgument { .. }) => {
                FaultKind::BadArgumentValue
            }
            Some(Error::Transport(_)) => FaultKind::TransportFault,
            _ => FaultKind::HandlerFault,
        };

        Self {
            kind,
            cause: Cause::Error(error),
        }
    }

    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        Self {
            kind: FaultKind::HandlerFault,
            cause: Cause::Panic(panic_message(payload.as_ref())),
        }
    }

    pub fn framework_error(&self) -> Option<&Error> {
        match &self.cause {
            Cause::Error(error) => error.framework_error(),
            Cause::Panic(_) => None,
        }
    }

    /// The default answer to the author for this fault.
    pub fn response<S>(&self, context: &Context<E, S>) -> Response {
        let author = Author::from(context.author());

        match (self.kind, self.framework_error()) {
            (FaultKind::CommandNotFound, _) => Response::new()
                .title("\u{274c} Command Not Found")
                .author(author),
            (FaultKind::PermissionDenied, _) => Response::new()
                .title("\u{274c} Permission Denied")
                .description(format!(
                    "I'm sorry {}, I'm afraid I can't do that.",
                    context.author().name
                ))
                .author(author),
            (FaultKind::MissingArgument, Some(Error::MissingParameter { position })) => {
                let parameter = context
                    .command
                    .as_ref()
                    .and_then(|command| command.parameter(*position))
                    .unwrap_or_else(|| "argument".to_string());

                Response::new()
                    .title("Missing Required Parameter")
                    .description(format!("`{parameter}`"))
                    .author(author)
            }
            (FaultKind::BadArgumentValue, Some(Error::ArgumentNotFound { kind, input })) => {
                Response::new()
                    .title(format!("\u{274c} {kind} Not Found"))
                    .field("Received", format!("`{input}`"), false)
                    .author(author)
            }
            (FaultKind::BadArgumentValue, Some(Error::BadArgument { expected, input })) => {
                Response::new()
                    .title("\u{274c} Bad Argument")
                    .description(format!("Expected {expected}."))
                    .field("Received", format!("`{input}`"), false)
                    .author(author)
            }
            (FaultKind::TransportFault, Some(Error::Transport(error))) if error.is_forbidden() => {
                Response::new()
                    .title("Command Failed")
                    .description("Sorry, I do not have sufficient privileges.")
                    .author(author)
            }
            _ => Response::new()
                .title("Command Failed")
                .description(self.cause.to_string())
                .author(author),
        }
    }

    pub fn report<S>(&self, context: &Context<E, S>) -> FaultReport {
        FaultReport {
            kind: self.kind,
            actor_id: context.author().id,
            actor_name: context.author().name.clone(),
            channel_id: context.channel_id(),
            guild_id: context.message.guild_id,
            command: context.invoked_with.clone(),
            args: context.raw_args().to_string(),
            error: self.cause.to_string(),
        }
    }
}

/// The log record of a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultReport {
    pub kind: FaultKind,
    pub actor_id: Id,
    pub actor_name: String,
    pub channel_id: Id,
    pub guild_id: Option<Id>,
    pub command: String,
    pub args: String,
    pub error: String,
}

impl FaultReport {
    pub fn log(&self) {
        log::log!(
            self.kind.level(),
            "{}: command={:?} args={:?} author={} ({}) channel={} guild={:?} error={}",
            self.kind,
            self.command,
            self.args,
            self.actor_name,
            self.actor_id,
            self.channel_id,
            self.guild_id,
            self.error,
        );
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
