mod checks;
mod config;
mod error;
mod help;
mod state;
mod transport;

pub use checks::*;
pub use config::*;
pub use error::*;
pub use help::*;
pub use state::*;
pub use transport::*;
