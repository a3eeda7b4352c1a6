use std::{fmt, marker::PhantomData, sync::Arc};

use async_fn_traits::{AsyncFn1, AsyncFn2, AsyncFn3, AsyncFn4};
use async_trait::async_trait;

use crate::{
    CommandError, Error,
    commands::{Context, Converter, checks::Check},
};

/// Declarative description of a command.
///
/// Built once with the builder methods and handed to the registry, usually
/// through an [`Extension`](crate::commands::Extension).
#[derive(Clone)]
pub struct Command<E, S> {
    pub name: String,
    pub handle: Arc<dyn CommandHandle<(), E, S>>,
    pub checks: Vec<Arc<dyn Check<E, S>>>,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub brief: Option<String>,
    pub signature: Option<String>,
    pub hidden: bool,
    pub guild_only: bool,
    /// Id of the extension that registered this command.
    pub extension: Option<String>,
}

impl<E, S> fmt::Debug for Command<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .field("signature", &self.signature)
            .field("hidden", &self.hidden)
            .field("guild_only", &self.guild_only)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

impl<E: CommandError, S: Clone + Send + Sync + 'static> Command<E, S> {
    pub fn new<T: 'static, I: Into<String>, F: CommandHandle<T, E, S>>(
        name: I,
        handle: F,
    ) -> Self {
        let erased = ErasedCommandHandler {
            handle,
            _p: PhantomData,
        };

        Self {
            name: name.into(),
            handle: Arc::new(erased),
            checks: Vec::new(),
            aliases: Vec::new(),
            description: None,
            brief: None,
            signature: None,
            hidden: false,
            guild_only: false,
            extension: None,
        }
    }

    pub fn description<I: Into<String>>(mut self, description: I) -> Self {
        self.description = Some(description.into());

        self
    }

    /// Example arguments, shown in help as `prefix + name + brief`.
    pub fn brief<I: Into<String>>(mut self, brief: I) -> Self {
        self.brief = Some(brief.into());

        self
    }

    pub fn signature<I: Into<String>>(mut self, signature: I) -> Self {
        self.signature = Some(signature.into());

        self
    }

    pub fn check<C: Check<E, S>>(mut self, check: C) -> Self {
        self.checks.push(Arc::new(check));

        self
    }

    pub fn alias<I: Into<String>>(mut self, alias: I) -> Self {
        self.aliases.push(alias.into());

        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;

        self
    }

    pub fn guild_only(mut self) -> Self {
        self.guild_only = true;

        self
    }

    pub async fn can_run(&self, context: Context<E, S>) -> Result<bool, E> {
        self.check_guild(&context)?;
        self.run_checks(context).await
    }

    pub(crate) fn check_guild(&self, context: &Context<E, S>) -> Result<(), E> {
        if self.guild_only && context.message.guild_id.is_none() {
            return Err(Error::NotInGuild.into());
        }

        Ok(())
    }

    /// Runs only the command's own checks.
    pub(crate) async fn run_checks(&self, context: Context<E, S>) -> Result<bool, E> {
        for check in &self.checks {
            if !check.run(context.clone()).await? {
                return Err(Error::CheckFailure.into());
            }
        }

        Ok(true)
    }
}

impl<E, S> Command<E, S> {
    /// The name followed by every alias.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.name).chain(self.aliases.iter())
    }

    /// First line of the description.
    pub fn summary(&self) -> &str {
        self.description
            .as_deref()
            .and_then(|desc| desc.lines().next())
            .unwrap_or("No description")
    }

    /// Name of the parameter at `position` as written in the signature,
    /// e.g. `role` for `[role...]`.
    pub fn parameter(&self, position: usize) -> Option<String> {
        let signature = self.signature.as_deref()?;
        let raw = signature.split_whitespace().nth(position)?;

        Some(
            raw.trim_matches(|c| matches!(c, '<' | '>' | '[' | ']'))
                .trim_end_matches("...")
                .to_string(),
        )
    }
}

#[async_trait]
pub trait CommandHandle<T, E, S>: Send + Sync + 'static {
    async fn handle(&self, context: Context<E, S>) -> Result<(), E>;
}

#[async_trait]
impl<E, S, F> CommandHandle<(), E, S> for F
where
    E: CommandError,
    S: Clone + Send + Sync + 'static,
    F: AsyncFn1<Context<E, S>, Output = Result<(), E>> + Send + Sync + 'static,
    F::OutputFuture: Send,
{
    async fn handle(&self, context: Context<E, S>) -> Result<(), E> {
        (self)(context).await
    }
}

/// Handlers with converted parameters after the context. Parameters are
/// converted left to right, each taking its words from the tail.
macro_rules! converting_handles {
    ($($fn_trait: ident => ($($param: ident $value: ident),+);)+) => {
        $(
            #[async_trait]
            impl<$($param,)+ E, S, F> CommandHandle<($($param,)+), E, S> for F
            where
                $($param: Converter<E, S> + Send,)+
                E: CommandError,
                S: Clone + Send + Sync + 'static,
                F: $fn_trait<Context<E, S>, $($param,)+ Output = Result<(), E>>
                    + Send
                    + Sync
                    + 'static,
                F::OutputFuture: Send,
            {
                async fn handle(&self, context: Context<E, S>) -> Result<(), E> {
                    $(let $value = $param::from_context(&context).await?;)+

                    (self)(context, $($value),+).await
                }
            }
        )+
    };
}

converting_handles! {
    AsyncFn2 => (A a);
    AsyncFn3 => (A a, B b);
    AsyncFn4 => (A a, B b, C c);
}

struct ErasedCommandHandler<T, E, S, H> {
    handle: H,
    _p: PhantomData<fn() -> (T, E, S)>,
}

#[async_trait]
impl<T, E, S, H> CommandHandle<(), E, S> for ErasedCommandHandler<T, E, S, H>
where
    T: 'static,
    E: CommandError,
    S: Clone + Send + Sync + 'static,
    H: CommandHandle<T, E, S>,
{
    async fn handle(&self, context: Context<E, S>) -> Result<(), E> {
        self.handle.handle(context).await
    }
}
