use cogwheel::commands::{Extension, help_command};

use crate::{BottyHelpCommand, Command, Error, State};

pub struct Help;

impl Extension<Error, State> for Help {
    fn name(&self) -> &str {
        "Help"
    }

    fn description(&self) -> Option<&str> {
        Some("Lists the commands you can use.")
    }

    fn commands(&self) -> Vec<Command> {
        vec![help_command(BottyHelpCommand)]
    }

    fn on_load(&self, _state: &State) -> Result<(), Error> {
        log::info!("Loaded Help Cog.");

        Ok(())
    }

    fn on_unload(&self, _state: &State) {
        log::info!("Unloaded Help Cog.");
    }
}
