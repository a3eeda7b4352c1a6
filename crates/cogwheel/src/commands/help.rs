use std::{marker::PhantomData, sync::Arc};

use async_trait::async_trait;

use crate::{
    CommandError, Response,
    commands::{Command, Context, Converter, ExtensionInfo, command::CommandHandle, qualify},
};

/// Sections shown per page of the bot-wide help.
pub const PAGE_SIZE: usize = 3;

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub entries: Vec<T>,
    /// 1-based.
    pub number: usize,
    pub total: usize,
}

/// Slices `items` into pages of [`PAGE_SIZE`] and returns page `number`,
/// clamped into range. An empty list still has one (empty) page.
pub fn paginate<T>(items: Vec<T>, number: usize) -> Page<T> {
    let total = items.len().div_ceil(PAGE_SIZE).max(1);
    let number = number.clamp(1, total);

    Page {
        entries: items
            .into_iter()
            .skip((number - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect(),
        number,
        total,
    }
}

/// An extension together with the commands of it an actor gets to see.
pub struct HelpSection<E, S> {
    pub extension: ExtensionInfo,
    pub commands: Vec<Command<E, S>>,
}

#[async_trait]
pub trait HelpCommand<E: CommandError, S: Clone + Send + Sync + 'static>:
    Send + Sync + 'static
{
    async fn create_bot_help(
        &self,
        context: Context<E, S>,
        page: Page<HelpSection<E, S>>,
    ) -> Result<Response, E>;

    async fn create_command_help(
        &self,
        context: Context<E, S>,
        command: Command<E, S>,
    ) -> Result<Response, E>;

    async fn create_extension_help(
        &self,
        context: Context<E, S>,
        section: HelpSection<E, S>,
    ) -> Result<Response, E>;

    async fn no_command_found(
        &self,
        context: Context<E, S>,
        name: String,
    ) -> Result<Response, E>;

    /// Commands the invoking actor may see: not hidden, and every check
    /// passes.
    async fn filter_commands(
        &self,
        context: Context<E, S>,
        commands: Vec<Command<E, S>>,
    ) -> Vec<Command<E, S>> {
        let mut filtered = Vec::new();

        for command in commands {
            if command.hidden {
                continue;
            }

            if command.can_run(context.clone()).await.is_ok_and(|b| b) {
                filtered.push(command);
            }
        }

        filtered
    }

    /// Loaded extensions with at least one visible command.
    async fn sections(&self, context: Context<E, S>) -> Vec<HelpSection<E, S>> {
        let mut sections = Vec::new();

        for extension in context.extensions.describe() {
            let commands = self
                .filter_commands(context.clone(), context.commands.owned_by(&extension.id))
                .await;

            if !commands.is_empty() {
                sections.push(HelpSection {
                    extension,
                    commands,
                });
            }
        }

        sections
    }

    async fn send_help_command(
        &self,
        context: Context<E, S>,
        response: Response,
    ) -> Result<(), E> {
        Ok(context.send(response).await?)
    }
}

/// Plain-text help in code blocks.
#[derive(Debug)]
pub struct DefaultHelpCommand;

#[async_trait]
impl<E: CommandError, S: Clone + Send + Sync + 'static> HelpCommand<E, S> for DefaultHelpCommand {
    async fn create_bot_help(
        &self,
        _context: Context<E, S>,
        page: Page<HelpSection<E, S>>,
    ) -> Result<Response, E> {
        let mut lines = vec!["```".to_string()];

        for section in page.entries {
            lines.push(format!("{}:", section.extension.name));

            for command in section.commands {
                lines.push(format!("    {} - {}", &command.name, command.summary()));
            }
        }

        lines.push("```".to_string());

        Ok(Response::new()
            .title(format!("Help [{}/{}]", page.number, page.total))
            .description(lines.join("\n")))
    }

    async fn create_command_help(
        &self,
        context: Context<E, S>,
        command: Command<E, S>,
    ) -> Result<Response, E> {
        let mut lines = vec!["```".to_string(), format!("{}:", &command.name)];

        lines.push(format!(
            "    Usage: {}{} {}",
            context.clean_prefix(),
            command.name,
            command.signature.clone().unwrap_or_default()
        ));

        if !command.aliases.is_empty() {
            lines.push(format!("    Aliases: {}", command.aliases.join(", ")));
        }

        if let Some(description) = command.description.clone() {
            lines.push("".to_string());
            lines.push(description);
        }

        lines.push("```".to_string());

        Ok(Response::text(lines.join("\n")))
    }

    async fn create_extension_help(
        &self,
        _context: Context<E, S>,
        section: HelpSection<E, S>,
    ) -> Result<Response, E> {
        let mut lines = vec!["```".to_string(), format!("{}:", section.extension.name)];

        if let Some(description) = section.extension.description.clone() {
            lines.push(description);
            lines.push("".to_string());
        }

        for command in section.commands {
            lines.push(format!("    {} - {}", &command.name, command.summary()));
        }

        lines.push("```".to_string());

        Ok(Response::text(lines.join("\n")))
    }

    async fn no_command_found(
        &self,
        _context: Context<E, S>,
        name: String,
    ) -> Result<Response, E> {
        Ok(Response::text(format!("Command `{name}` not found.")))
    }
}

struct HelpCommandImpl<H, E, S> {
    help: Arc<H>,
    _p: PhantomData<fn() -> (E, S)>,
}

#[async_trait]
impl<H, E, S> CommandHandle<(), E, S> for HelpCommandImpl<H, E, S>
where
    H: HelpCommand<E, S>,
    E: CommandError,
    S: Clone + Send + Sync + 'static,
{
    async fn handle(&self, context: Context<E, S>) -> Result<(), E> {
        let args = Vec::<String>::from_context(&context).await?;
        let help = &self.help;

        let page = match args.as_slice() {
            [] => Some(1),
            [number] => number.parse::<usize>().ok(),
            _ => None,
        };

        let response = if let Some(number) = page {
            let sections = help.sections(context.clone()).await;

            help.create_bot_help(context.clone(), paginate(sections, number))
                .await?
        } else {
            let subject = args.join(" ");

            if let Some(command) = context
                .commands
                .resolve(&subject)
                .ok()
                .filter(|command| !command.hidden)
            {
                help.create_command_help(context.clone(), command).await?
            } else if let Some(extension) = find_extension(&context, &subject) {
                let commands = context
                    .commands
                    .owned_by(&extension.id)
                    .into_iter()
                    .filter(|command| !command.hidden)
                    .collect();

                help.create_extension_help(
                    context.clone(),
                    HelpSection {
                        extension,
                        commands,
                    },
                )
                .await?
            } else {
                help.no_command_found(context.clone(), subject).await?
            }
        };

        help.send_help_command(context, response).await
    }
}

/// A loaded extension by display name (ignoring case) or id.
fn find_extension<E, S>(context: &Context<E, S>, subject: &str) -> Option<ExtensionInfo>
where
    E: CommandError,
    S: Clone + Send + Sync + 'static,
{
    let extensions = context.extensions.describe();

    extensions
        .iter()
        .find(|info| info.name.eq_ignore_ascii_case(subject))
        .or_else(|| {
            let id = qualify(subject)?;

            extensions.iter().find(|info| info.id == id)
        })
        .cloned()
}

/// The `help` command, rendering with `help`.
pub fn help_command<H, E, S>(help: H) -> Command<E, S>
where
    H: HelpCommand<E, S>,
    E: CommandError,
    S: Clone + Send + Sync + 'static,
{
    let handle = HelpCommandImpl {
        help: Arc::new(help),
        _p: PhantomData,
    };

    Command::new("help", handle)
        .signature("[command]")
        .description("Shows help for a command, an extension or all commands.")
}
