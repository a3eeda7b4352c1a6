use cogwheel::commands::{AuthorRole, Extension, GuildRole};

use crate::{CmdCtx, Command, Error, State};

pub struct Botty;

impl Extension<Error, State> for Botty {
    fn name(&self) -> &str {
        "Botty McBotface"
    }

    fn description(&self) -> Option<&str> {
        Some("The commands used to self-administer roles and similar actions.")
    }

    fn commands(&self) -> Vec<Command> {
        vec![
            Command::new("ping", ping).description(
                "A test function for ensuring that extensions and permissions are implemented \
                 properly.",
            ),
            Command::new("addrole", addrole)
                .description("Adds a server role to self. Case insensitive.")
                .brief("CYBV 301")
                .signature("[role...]")
                .guild_only(),
            Command::new("removerole", removerole)
                .description("Removes a server role from self. Case insensitive.")
                .brief("CYBV 301")
                .signature("[role...]")
                .guild_only(),
        ]
    }

    fn on_load(&self, _state: &State) -> Result<(), Error> {
        log::info!("Loaded Botty Cog.");

        Ok(())
    }

    fn on_unload(&self, _state: &State) {
        log::info!("Unloaded Botty Cog.");
    }
}

async fn ping(ctx: CmdCtx) -> Result<(), Error> {
    Ok(ctx.say("pong!").await?)
}

async fn addrole(ctx: CmdCtx, role: Option<GuildRole>) -> Result<(), Error> {
    let Some(GuildRole(role)) = role else {
        return Ok(ctx.say("Please specify a role.").await?);
    };

    ctx.transport
        .add_role(ctx.guild_id()?, ctx.author().id, &role)
        .await?;

    ctx.say(format!(
        "{}, successfully added role {}.",
        ctx.author().mention(),
        role.name
    ))
    .await?;

    Ok(())
}

async fn removerole(ctx: CmdCtx, role: Option<AuthorRole>) -> Result<(), Error> {
    let Some(AuthorRole(role)) = role else {
        return Ok(ctx.say("Please specify a role.").await?);
    };

    ctx.transport
        .remove_role(ctx.guild_id()?, ctx.author().id, &role)
        .await?;

    ctx.say(format!(
        "{}, successfully removed role {}.",
        ctx.author().mention(),
        role.name
    ))
    .await?;

    Ok(())
}
