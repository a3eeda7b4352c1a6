//! Commands

pub mod boundary;
pub mod checks;
pub mod command;
pub mod context;
pub mod converter;
pub mod events;
pub mod extension;
pub mod handler;
pub mod help;
pub mod registry;
pub mod words;

pub use boundary::{Cause, Fault, FaultKind, FaultReport};
pub use checks::*;
pub use command::Command;
pub use context::Context;
pub use converter::*;
pub use events::CommandEventHandler;
pub use extension::{Extension, ExtensionCatalog, ExtensionInfo, Extensions, qualify};
pub use handler::{CommandHandler, Dispatch};
pub use help::*;
pub use registry::Commands;
pub use words::Words;
