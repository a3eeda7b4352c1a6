use std::fmt::{Debug, Display};

use crate::transport::TransportError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("command name or alias `{0}` is already registered")]
    DuplicateName(String),
    #[error("command `{0}` is not registered")]
    NotFound(String),

    #[error("command `{0}` not found")]
    CommandNotFound(String),
    #[error("check failed")]
    CheckFailure,
    #[error("this command can only be used in a server")]
    NotInGuild,
    #[error("missing required parameter at position {position}")]
    MissingParameter { position: usize },
    #[error("{kind} \"{input}\" not found")]
    ArgumentNotFound { kind: String, input: String },
    #[error("expected {expected}, received \"{input}\"")]
    BadArgument { expected: String, input: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("extension `{0}` is already loaded")]
    AlreadyLoaded(String),
    #[error("extension `{0}` is not loaded")]
    NotLoaded(String),
    #[error("extension `{id}` failed to load: {reason}")]
    ExtensionLoad { id: String, reason: String },
    #[error("extension `{id}` failed to reload: {reason}")]
    ExtensionReload { id: String, reason: String },
}

/// Error type returned by command handlers.
///
/// Bots usually wrap [`Error`] inside their own error enum; `framework_error`
/// hands the wrapped value back so faults can be classified.
pub trait CommandError: From<Error> + Clone + Debug + Display + Send + Sync + 'static {
    fn framework_error(&self) -> Option<&Error>;
}

impl CommandError for Error {
    fn framework_error(&self) -> Option<&Error> {
        Some(self)
    }
}
