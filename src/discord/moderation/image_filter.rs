// Discord-specific banned image handling - runs the core pipeline on a message
// and turns the outcome into log lines. Nothing here is shown to users.

use super::attachment_adapter::DiscordMessage;
use crate::core::moderation::ModerationOutcome;
use crate::discord::Data;
use poise::serenity_prelude as serenity;

/// Check a message for banned images and delete it on a match.
///
/// Returns `true` if the message matched a banned image.
pub async fn handle_message_for_banned_images(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> bool {
    // Skip the registry load entirely for the common case
    if msg.author.bot || msg.guild_id.is_none() || msg.attachments.is_empty() {
        return false;
    }

    let message = DiscordMessage::new(ctx, msg, &data.fetcher);
    match data.moderation.moderate(&message).await {
        Ok(ModerationOutcome::Deleted { digest, filename }) => {
            tracing::info!(
                guild_id = msg.guild_id.map(|id| id.get()),
                channel_id = msg.channel_id.get(),
                author_id = msg.author.id.get(),
                digest = %digest,
                filename = %filename,
                "Removed message containing a banned image"
            );
            true
        }
        Ok(ModerationOutcome::Filtered(reason)) => {
            tracing::trace!(message_id = msg.id.get(), %reason, "Image filter skipped message");
            false
        }
        Ok(ModerationOutcome::Clean) => false,
        Err(e) => {
            tracing::error!(
                message_id = msg.id.get(),
                "Could not load banned image registry: {}",
                e
            );
            false
        }
    }
}
