use cogwheel::{
    Response, async_trait,
    commands::{HelpCommand, HelpSection, Page},
};

use crate::{CmdCtx, Command, Error, State};

/// Embed help with one field per extension,
/// three to a page.
#[derive(Debug)]
pub struct BottyHelpCommand;

fn more_info(ctx: &CmdCtx) -> String {
    format!(
        "To learn more about specific commands, use `{}help <command>`",
        ctx.clean_prefix()
    )
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// `` `{prefix}{name} {rest}` `` or just the name when there is no rest.
fn invocation(ctx: &CmdCtx, command: &Command, rest: Option<&str>) -> String {
    match rest.filter(|rest| !rest.is_empty()) {
        Some(rest) => format!("`{}{} {rest}`", ctx.clean_prefix(), command.name),
        None => format!("`{}{}`", ctx.clean_prefix(), command.name),
    }
}

#[async_trait]
impl HelpCommand<Error, State> for BottyHelpCommand {
    async fn create_bot_help(
        &self,
        ctx: CmdCtx,
        page: Page<HelpSection<Error, State>>,
    ) -> Result<Response, Error> {
        let mut response = Response::new()
            .title(format!(
                "\u{1f4f0} Help Menu [{}/{}]",
                page.number, page.total
            ))
            .description(format!(
                "A listing of all available commands sorted by grouping.\n{}",
                more_info(&ctx)
            ));

        for section in page.entries {
            let names = section
                .commands
                .iter()
                .map(|command| format!("`{}`", command.name))
                .collect::<Vec<_>>()
                .join(", ");

            let value = match section.extension.description {
                Some(description) => format!("{description}\nCommands:\n{names}"),
                None => format!("Commands:\n{names}"),
            };

            response = response.field(section.extension.name, value, false);
        }

        Ok(response)
    }

    async fn create_command_help(&self, ctx: CmdCtx, command: Command) -> Result<Response, Error> {
        let mut response = Response::new()
            .title(format!("'{}' Help", capitalize(&command.name)))
            .description(command.description.clone().unwrap_or_default())
            .author(ctx.author());

        if !command.aliases.is_empty() {
            let aliases = command
                .aliases
                .iter()
                .map(|alias| format!("`{alias}`"))
                .collect::<Vec<_>>()
                .join(", ");

            response = response.field("Aliases", aliases, false);
        }

        Ok(response
            .field(
                "Usage",
                invocation(&ctx, &command, command.signature.as_deref()),
                false,
            )
            .field(
                "Example",
                invocation(&ctx, &command, command.brief.as_deref()),
                false,
            ))
    }

    async fn create_extension_help(
        &self,
        ctx: CmdCtx,
        section: HelpSection<Error, State>,
    ) -> Result<Response, Error> {
        let description = match &section.extension.description {
            Some(description) => format!("{description}\n{}", more_info(&ctx)),
            None => more_info(&ctx),
        };

        let names = section
            .commands
            .iter()
            .map(|command| format!("`{}`", command.name))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Response::new()
            .title(format!("{} Help", section.extension.name))
            .description(description)
            .author(ctx.author())
            .field("Commands", names, false))
    }

    async fn no_command_found(&self, ctx: CmdCtx, name: String) -> Result<Response, Error> {
        Ok(Response::new()
            .title("\u{274c} Not Found")
            .description(format!("No command or extension called `{name}`."))
            .author(ctx.author()))
    }
}

#[cfg(test)]
mod tests {
    use super::capitalize;

    #[test]
    fn capitalizes_first_letter() {
        assert_eq!(capitalize("addrole"), "Addrole");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("removeRole"), "Removerole");
        assert_eq!(capitalize("PING"), "Ping");
    }
}
