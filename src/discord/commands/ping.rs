use crate::discord::commands::replies::reply_ephemeral;
use crate::discord::{Context, Error};

/// Check that the bot is alive.
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    reply_ephemeral(ctx, "pong").await
}
