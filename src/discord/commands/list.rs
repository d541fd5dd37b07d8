// Discord commands for banned image lists.
//
// Same pattern as every command here:
// 1. Extract primitive data from Discord types
// 2. Call the registry service
// 3. Reply ephemerally based on the result

use crate::discord::commands::replies::{reply_ephemeral, reply_registry_error};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Manage banned image lists.
#[poise::command(
    slash_command,
    guild_only,
    subcommands("create", "share", "register", "show")
)]
pub async fn list(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Create a banned image list
#[poise::command(slash_command, guild_only)]
pub async fn create(
    ctx: Context<'_>,
    #[description = "List name"] name: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command is only for guilds.")?.get();

    match ctx.data().registry.create_list(&name, guild_id).await {
        Ok(list) => {
            tracing::info!(guild_id, list = %list, "Created banned image list");
            reply_ephemeral(ctx, "List created and registered.").await
        }
        Err(e) => reply_registry_error(ctx, "list create", e).await,
    }
}

/// Share all lists from this guild
#[poise::command(slash_command, guild_only)]
pub async fn share(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command is only for guilds.")?.get();

    match ctx.data().registry.share_lists(guild_id).await {
        Ok(shared) if shared.is_empty() => reply_ephemeral(ctx, "No lists found to share.").await,
        Ok(shared) => {
            tracing::info!(guild_id, count = shared.len(), "Shared banned image lists");
            reply_ephemeral(ctx, format!("Shared lists: {}", shared.join(", "))).await
        }
        Err(e) => reply_registry_error(ctx, "list share", e).await,
    }
}

/// Register a shared list to this guild
#[poise::command(slash_command, guild_only)]
pub async fn register(
    ctx: Context<'_>,
    #[description = "Shared list name"] name: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command is only for guilds.")?.get();

    match ctx.data().registry.register_list(&name, guild_id).await {
        Ok(list) => {
            tracing::info!(guild_id, list = %list, "Registered shared list");
            reply_ephemeral(ctx, "List registered.").await
        }
        Err(e) => reply_registry_error(ctx, "list register", e).await,
    }
}

/// Show the lists this guild enforces and owns
#[poise::command(slash_command, guild_only)]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command is only for guilds.")?.get();

    let overview = match ctx.data().registry.guild_overview(guild_id).await {
        Ok(overview) => overview,
        Err(e) => return reply_registry_error(ctx, "list show", e.into()).await,
    };

    let registered = if overview.registered.is_empty() {
        "None".to_string()
    } else {
        overview
            .registered
            .iter()
            .map(|(name, exists)| {
                if *exists {
                    format!("• {}", name)
                } else {
                    format!("• ~~{}~~ (deleted)", name)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let owned = if overview.owned.is_empty() {
        "None".to_string()
    } else {
        overview
            .owned
            .iter()
            .map(|list| {
                format!(
                    "• {} - {} image{}{}",
                    list.name,
                    list.image_count,
                    if list.image_count == 1 { "" } else { "s" },
                    if list.shared { " (shared)" } else { "" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let embed = serenity::CreateEmbed::new()
        .title("🛡️ Banned Image Lists")
        .color(0x5865F2)
        .field("Registered", registered, false)
        .field("Owned", owned, false);

    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
