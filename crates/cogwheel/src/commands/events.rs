use std::fmt::Debug;

use async_trait::async_trait;

use crate::{
    Actor, CommandError, Response,
    commands::{Context, Fault, FaultReport},
    types::Message,
};

/// Bot-specific hooks called by the [`CommandHandler`](super::CommandHandler).
#[async_trait]
#[allow(unused)]
pub trait CommandEventHandler: Send + Sync + 'static {
    type State: Debug + Clone + Send + Sync + 'static;
    type Error: CommandError;

    /// Prefixes a message may start with. Called for every message so prefix
    /// changes apply immediately.
    async fn get_prefix(
        &self,
        message: &Message,
        state: &Self::State,
    ) -> Result<Vec<String>, Self::Error>;

    async fn ready(&self, user: &Actor, state: &Self::State) -> Result<(), Self::Error> {
        log::info!("Logged on as {} ({})", user.name, user.id);

        Ok(())
    }

    /// Runs after a command passed its checks and before it is invoked.
    async fn before_command(
        &self,
        context: Context<Self::Error, Self::State>,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Runs after a command completed successfully.
    async fn after_command(
        &self,
        context: Context<Self::Error, Self::State>,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called with every fault after it has been logged.
    async fn fault(&self, report: &FaultReport) {}

    /// The response sent for a fault. Return `None` to stay silent.
    async fn fault_response(
        &self,
        context: &Context<Self::Error, Self::State>,
        fault: &Fault<Self::Error>,
    ) -> Option<Response> {
        Some(fault.response(context))
    }
}
