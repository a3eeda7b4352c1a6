use std::{io, path::PathBuf, sync::Arc};

use cogwheel::{CommandError, TransportError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: Arc<io::Error>,
    },
    #[error("config file {path} is invalid: {source}")]
    Parse {
        path: PathBuf,
        source: Arc<serde_json::Error>,
    },
    #[error("could not write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: Arc<io::Error>,
    },
    #[error("invalid prefix {0:?}: must be non-empty and contain no whitespace")]
    InvalidPrefix(String),
    #[error("environment variable {0} is not set")]
    MissingSecret(&'static str),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Cogwheel(#[from] cogwheel::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("gateway error: {0}")]
    Gateway(Arc<serenity::Error>),
}

impl From<TransportError> for Error {
    fn from(value: TransportError) -> Self {
        Self::Cogwheel(value.into())
    }
}

impl From<serenity::Error> for Error {
    fn from(value: serenity::Error) -> Self {
        Self::Gateway(Arc::new(value))
    }
}

impl CommandError for Error {
    fn framework_error(&self) -> Option<&cogwheel::Error> {
        match self {
            Self::Cogwheel(error) => Some(error),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
