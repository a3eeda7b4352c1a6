use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;

use crate::{
    Error, Transport,
    commands::{
        Check, Command, CommandEventHandler, Commands, Context, ExtensionCatalog, Extensions,
        FaultKind, Words, boundary::Fault,
    },
    types::Message,
};

/// Terminal outcome of dispatching one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a command: no prefix, a bot author, or nothing after the prefix.
    Ignored,
    Completed,
    Faulted(FaultKind),
}

pub struct CommandHandler<H: CommandEventHandler> {
    commands: Commands<H::Error, H::State>,
    extensions: Extensions<H::Error, H::State>,
    checks: Vec<Arc<dyn Check<H::Error, H::State>>>,
    event_handler: Arc<H>,
    state: H::State,
    transport: Arc<dyn Transport>,
}

impl<H: CommandEventHandler> CommandHandler<H> {
    pub fn new(event_handler: H, state: H::State, transport: Arc<dyn Transport>) -> Self {
        let commands = Commands::new();
        let extensions = Extensions::new(commands.clone(), state.clone());

        Self {
            commands,
            extensions,
            checks: Vec::new(),
            event_handler: Arc::new(event_handler),
            state,
            transport,
        }
    }

    pub fn with_catalog(self, catalog: ExtensionCatalog<H::Error, H::State>) -> Self {
        self.extensions.set_catalog(catalog);

        self
    }

    /// Registers commands that belong to no extension.
    pub fn register(self, commands: Vec<Command<H::Error, H::State>>) -> Result<Self, Error> {
        self.commands.register_all(commands)?;

        Ok(self)
    }

    /// Adds a check evaluated for every command, after the guild-only flag
    /// and before the command's own checks.
    pub fn check<C: Check<H::Error, H::State>>(mut self, check: C) -> Self {
        self.checks.push(Arc::new(check));

        self
    }

    pub fn commands(&self) -> &Commands<H::Error, H::State> {
        &self.commands
    }

    pub fn extensions(&self) -> &Extensions<H::Error, H::State> {
        &self.extensions
    }

    pub fn event_handler(&self) -> &H {
        &self.event_handler
    }

    pub fn state(&self) -> &H::State {
        &self.state
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Dispatches one inbound message.
    ///
    /// Every fault met after the command token was read is reported and
    /// turned into a response here; only a failing prefix lookup is returned
    /// as an error.
    pub async fn process_commands(&self, message: Message) -> Result<Dispatch, H::Error> {
        if message.author.bot {
            log::trace!("ignoring message {} from bot {}", message.id, message.author.id);

            return Ok(Dispatch::Ignored);
        }

        let prefixes = self.event_handler.get_prefix(&message, &self.state).await?;

        let Some(prefix) = prefixes
            .into_iter()
            .find(|prefix| !prefix.is_empty() && message.content.starts_with(prefix.as_str()))
        else {
            return Ok(Dispatch::Ignored);
        };

        let rest = &message.content[prefix.len()..];

        let (token, tail) = match rest.split_once(char::is_whitespace) {
            Some((token, tail)) => (token.to_string(), tail.trim_start().to_string()),
            None => (rest.to_string(), String::new()),
        };

        if token.is_empty() {
            return Ok(Dispatch::Ignored);
        }

        let doubled = message.content.starts_with(&prefix.repeat(2));

        let mut context = Context {
            message,
            prefix,
            invoked_with: token,
            command: None,
            words: Words::new(&tail),
            state: self.state.clone(),
            commands: self.commands.clone(),
            extensions: self.extensions.clone(),
            transport: self.transport.clone(),
        };

        let command = match self.commands.resolve(&context.invoked_with) {
            Ok(command) => command,
            Err(_) if doubled => {
                log::trace!("ignoring doubled prefix in message {}", context.message.id);

                return Ok(Dispatch::Ignored);
            }
            Err(_) => {
                let error = Error::CommandNotFound(context.invoked_with.clone());

                return Ok(self.report(&context, Fault::from_error(error.into())).await);
            }
        };

        log::debug!(
            "invoking `{}` for {} ({})",
            command.name,
            context.author().name,
            context.author().id
        );

        context.command = Some(command.clone());

        let outcome = AssertUnwindSafe(self.invoke(&command, context.clone()))
            .catch_unwind()
            .await;

        let fault = match outcome {
            Ok(Ok(())) => return Ok(Dispatch::Completed),
            Ok(Err(e)) => Fault::from_error(e),
            Err(payload) => Fault::from_panic(payload),
        };

        Ok(self.report(&context, fault).await)
    }

    async fn authorize(
        &self,
        command: &Command<H::Error, H::State>,
        context: Context<H::Error, H::State>,
    ) -> Result<(), H::Error> {
        command.check_guild(&context)?;

        for check in &self.checks {
            if !check.run(context.clone()).await? {
                return Err(Error::CheckFailure.into());
            }
        }

        command.run_checks(context).await.map(|_| ())
    }

    async fn invoke(
        &self,
        command: &Command<H::Error, H::State>,
        context: Context<H::Error, H::State>,
    ) -> Result<(), H::Error> {
        self.authorize(command, context.clone()).await?;
        self.event_handler.before_command(context.clone()).await?;

        command.handle.handle(context.clone()).await?;

        self.event_handler.after_command(context).await
    }

    async fn report(
        &self,
        context: &Context<H::Error, H::State>,
        fault: Fault<H::Error>,
    ) -> Dispatch {
        let report = fault.report(context);

        report.log();
        self.event_handler.fault(&report).await;

        if let Some(response) = self.event_handler.fault_response(context, &fault).await {
            if let Err(e) = context.send(response).await {
                log::error!("Failed to send fault response: {e}");
            }
        }

        Dispatch::Faulted(fault.kind)
    }
}
