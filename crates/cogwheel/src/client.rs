use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    Actor,
    commands::{CommandEventHandler, CommandHandler, Dispatch, boundary::panic_message},
    types::Message,
};

/// Inbound events from the platform gateway.
#[derive(Debug, Clone)]
pub enum Event {
    Ready { user: Actor },
    Message(Message),
}

/// The event loop.
///
/// Events are taken in delivery order and each one runs as its own task, so
/// a handler waiting on the platform only holds up its own message.
pub struct Client<H: CommandEventHandler> {
    handler: Arc<CommandHandler<H>>,
}

impl<H: CommandEventHandler> Clone for Client<H> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

impl<H: CommandEventHandler> Client<H> {
    pub fn new(handler: CommandHandler<H>) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    pub fn handler(&self) -> &CommandHandler<H> {
        &self.handler
    }

    /// Runs until the sending half of `events` is dropped.
    pub async fn run(&self, mut events: UnboundedReceiver<Event>) {
        while let Some(event) = events.recv().await {
            let client = self.clone();

            tokio::spawn(async move {
                client.handle_event(event).await;
            });
        }

        log::info!("Event stream closed");
    }

    /// Handles one event. Anything that escapes the command boundary is
    /// logged here and goes no further.
    pub async fn handle_event(&self, event: Event) -> Option<Dispatch> {
        let handler = &self.handler;

        let outcome = AssertUnwindSafe(async move {
            match event {
                Event::Ready { user } => handler
                    .event_handler()
                    .ready(&user, handler.state())
                    .await
                    .map(|_| None),
                Event::Message(message) => handler.process_commands(message).await.map(Some),
            }
        })
        .catch_unwind()
        .await;

        match outcome {
            Ok(Ok(dispatch)) => dispatch,
            Ok(Err(e)) => {
                log::error!("Ignoring exception while handling event: {e}");

                None
            }
            Err(payload) => {
                log::error!(
                    "Ignoring panic while handling event: {}",
                    panic_message(payload.as_ref())
                );

                None
            }
        }
    }
}
