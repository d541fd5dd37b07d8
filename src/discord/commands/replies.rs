// Reply helpers shared by the registry commands.
//
// Every outcome goes back to the invoking user as one ephemeral message.

use crate::core::registry::{ErrorKind, RegistryError};
use crate::discord::{Context, Error};

pub async fn reply_ephemeral(ctx: Context<'_>, content: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Render a rejected command. User mistakes are echoed as-is; storage and
/// download failures are logged and replaced with a generic message.
pub async fn reply_registry_error(
    ctx: Context<'_>,
    command: &str,
    err: RegistryError,
) -> Result<(), Error> {
    reply_ephemeral(ctx, user_message(command, &err)).await
}

fn user_message(command: &str, err: &RegistryError) -> String {
    match (err.kind(), err) {
        (ErrorKind::Storage, RegistryError::Attachment(e)) => {
            tracing::warn!(command, "Attachment download failed: {}", e);
            "Could not download the image, please try again.".to_string()
        }
        (ErrorKind::Storage, _) => {
            tracing::error!(command, "Registry storage failure: {}", err);
            "Something went wrong while saving. Nothing was changed, please try again later."
                .to_string()
        }
        _ => err.to_string(),
    }
}
