use std::{process::ExitCode, sync::Arc};

use cogwheel::{Client, commands::CommandHandler};
use serenity::all::GatewayIntents;
use tokio::sync::mpsc;

mod commands;
mod events;
mod utils;

#[cfg(test)]
mod test;

pub use utils::*;

pub type CmdCtx = cogwheel::commands::Context<Error, State>;
pub type Command = cogwheel::commands::Command<Error, State>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");

            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let token = load_token()?;
    let config = ConfigStore::load(config_path())?;

    if let Ok(prefix) = std::env::var(PREFIX_VAR) {
        config.override_prefix(&prefix)?;
    }

    let state = State::new(config);

    let (sender, receiver) = mpsc::unbounded_channel();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut gateway = serenity::Client::builder(&token, intents)
        .event_handler(events::Events { sender })
        .await?;

    let transport = DiscordTransport::new(gateway.http.clone(), state.config.clone());

    let handler = CommandHandler::new(commands::CommandEvents, state.clone(), Arc::new(transport))
        .with_catalog(commands::catalog())
        .register(commands::builtin())?;

    for id in &state.config.get().extensions {
        if let Err(e) = handler.extensions().load(id) {
            log::error!("Skipping extension `{id}`: {e}");
        }
    }

    let client = Client::new(handler);

    tokio::select! {
        result = gateway.start() => result?,
        _ = client.run(receiver) => {},
        _ = tokio::signal::ctrl_c() => log::info!("Shutting down"),
    }

    Ok(())
}
