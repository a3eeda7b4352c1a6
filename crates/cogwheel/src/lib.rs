pub mod client;
pub mod commands;
pub mod error;
pub mod response;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(test)]
mod test;

pub use client::{Client, Event};
pub use error::{CommandError, Error, Result};
pub use response::{Author, Field, Footer, Response};
pub use transport::{Transport, TransportError, TransportErrorKind};
pub use types::{Actor, Id, Message, Role};

pub use async_trait::async_trait;
