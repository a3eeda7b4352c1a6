//! Owner-only maintenance commands. They belong to no extension so they
//! survive every reload.

use cogwheel::Response;

use crate::{CmdCtx, Command, Error, PrefixUpdate, is_owner};

async fn load(ctx: CmdCtx, extension: String) -> Result<(), Error> {
    ctx.extensions.load(&extension)?;
    ctx.confirm().await;

    Ok(())
}

async fn unload(ctx: CmdCtx, extension: String) -> Result<(), Error> {
    ctx.extensions.unload(&extension)?;
    ctx.confirm().await;

    Ok(())
}

async fn reload(ctx: CmdCtx, extension: String) -> Result<(), Error> {
    ctx.extensions.reload(&extension)?;
    ctx.confirm().await;

    Ok(())
}

fn listing(ids: &[String]) -> String {
    if ids.is_empty() {
        return "None".to_string();
    }

    ids.iter()
        .map(|id| format!("`{id}`"))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn extensions(ctx: CmdCtx) -> Result<(), Error> {
    let loaded = ctx.extensions.loaded();
    let unloaded = ctx
        .extensions
        .available()
        .into_iter()
        .filter(|id| !loaded.contains(id))
        .collect::<Vec<_>>();

    let response = Response::new()
        .title("Extensions")
        .field("Loaded", listing(&loaded), false)
        .field("Available", listing(&unloaded), false)
        .author(ctx.author());

    Ok(ctx.send(response).await?)
}

async fn prefix(ctx: CmdCtx, prefix: Option<String>) -> Result<(), Error> {
    let Some(prefix) = prefix else {
        let current = ctx.state.config.prefix();

        return Ok(ctx.say(format!("The current prefix is `{current}`.")).await?);
    };

    match ctx.state.config.set_prefix(&prefix)? {
        PrefixUpdate::Unchanged => ctx.say(format!("`{prefix}` is already in use.")).await?,
        PrefixUpdate::Changed { .. } => ctx.confirm().await,
    }

    Ok(())
}

pub fn commands() -> Vec<Command> {
    vec![
        Command::new("load", load)
            .description("Loads an extension.")
            .signature("<extension>"),
        Command::new("unload", unload)
            .description("Unloads an extension and removes its commands.")
            .signature("<extension>"),
        Command::new("reload", reload)
            .description("Reloads an extension, keeping the old one if that fails.")
            .signature("<extension>"),
        Command::new("extensions", extensions)
            .description("Lists loaded and available extensions."),
        Command::new("prefix", prefix)
            .description("Shows or changes the command prefix.")
            .signature("[prefix]"),
    ]
    .into_iter()
    .map(|command| command.hidden().check(is_owner))
    .collect()
}
