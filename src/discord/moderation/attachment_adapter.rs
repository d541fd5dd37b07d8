// Adapters from serenity types to the core moderation ports.
//
// The core only sees `ImageAttachment` / `InboundMessage`; nothing here makes
// decisions, it just forwards fields and HTTP calls.

use crate::core::moderation::{AttachmentError, ImageAttachment, InboundMessage};
use crate::infra::attachments::AttachmentFetcher;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;

pub struct DiscordAttachment<'a> {
    attachment: &'a serenity::Attachment,
    fetcher: &'a AttachmentFetcher,
}

impl<'a> DiscordAttachment<'a> {
    pub fn new(attachment: &'a serenity::Attachment, fetcher: &'a AttachmentFetcher) -> Self {
        Self {
            attachment,
            fetcher,
        }
    }
}

#[async_trait]
impl<'a> ImageAttachment for DiscordAttachment<'a> {
    fn declared_media_type(&self) -> Option<&str> {
        self.attachment.content_type.as_deref()
    }

    fn filename(&self) -> &str {
        &self.attachment.filename
    }

    fn byte_size(&self) -> Option<u64> {
        Some(u64::from(self.attachment.size))
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, AttachmentError> {
        self.fetcher.fetch(&self.attachment.url).await
    }
}

pub struct DiscordMessage<'a> {
    ctx: &'a serenity::Context,
    message: &'a serenity::Message,
    attachments: Vec<DiscordAttachment<'a>>,
}

impl<'a> DiscordMessage<'a> {
    pub fn new(
        ctx: &'a serenity::Context,
        message: &'a serenity::Message,
        fetcher: &'a AttachmentFetcher,
    ) -> Self {
        let attachments = message
            .attachments
            .iter()
            .map(|attachment| DiscordAttachment::new(attachment, fetcher))
            .collect();

        Self {
            ctx,
            message,
            attachments,
        }
    }
}

#[async_trait]
impl<'a> InboundMessage for DiscordMessage<'a> {
    type Attachment = DiscordAttachment<'a>;

    fn guild_id(&self) -> Option<u64> {
        self.message.guild_id.map(|id| id.get())
    }

    fn from_bot(&self) -> bool {
        self.message.author.bot
    }

    fn attachments(&self) -> &[DiscordAttachment<'a>] {
        &self.attachments
    }

    async fn delete(&self) -> Result<(), String> {
        self.message
            .delete(&self.ctx.http)
            .await
            .map_err(|e| e.to_string())
    }
}
