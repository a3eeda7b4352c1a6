use crate::{CmdCtx, Error};

/// Passes for the actors listed under `owners` in the config.
pub async fn is_owner(ctx: CmdCtx) -> Result<bool, Error> {
    Ok(ctx.state.is_owner(ctx.author().id))
}
