// Discord commands for the images inside a banned list.

use crate::core::registry::normalize_name;
use crate::discord::commands::replies::{reply_ephemeral, reply_registry_error};
use crate::discord::moderation::DiscordAttachment;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Manage images in lists.
#[poise::command(slash_command, guild_only, subcommands("add", "delete"))]
pub async fn image(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Add an image to a list
#[poise::command(slash_command, guild_only)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Target list name"] list_name: String,
    #[description = "Image name"] image_name: String,
    #[description = "Image file"] image: serenity::Attachment,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command is only for guilds.")?.get();

    // Downloading can outlast the interaction response window
    ctx.defer_ephemeral().await?;

    let attachment = DiscordAttachment::new(&image, &ctx.data().fetcher);
    match ctx
        .data()
        .registry
        .add_image(&list_name, &image_name, &attachment, guild_id)
        .await
    {
        Ok(()) => {
            tracing::info!(
                guild_id,
                list = %normalize_name(&list_name),
                image = %normalize_name(&image_name),
                "Added banned image"
            );
            reply_ephemeral(ctx, "Image added.").await
        }
        Err(e) => reply_registry_error(ctx, "image add", e).await,
    }
}

/// Delete an image from a list
#[poise::command(slash_command, guild_only)]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "Target list name"] list_name: String,
    #[description = "Image name"] image_name: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command is only for guilds.")?.get();

    match ctx
        .data()
        .registry
        .delete_image(&list_name, &image_name, guild_id)
        .await
    {
        Ok(()) => {
            tracing::info!(
                guild_id,
                list = %normalize_name(&list_name),
                image = %normalize_name(&image_name),
                "Deleted banned image"
            );
            reply_ephemeral(ctx, "Image deleted.").await
        }
        Err(e) => reply_registry_error(ctx, "image delete", e).await,
    }
}
