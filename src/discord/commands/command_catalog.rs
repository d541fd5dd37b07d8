// Discord commands module.
// Each command group gets its own file.

use crate::core::moderation::ImageModerationService;
use crate::core::registry::RegistryService;
use crate::infra::attachments::AttachmentFetcher;
use crate::infra::registry::JsonRegistryStore;
use std::sync::Arc;

pub mod image;
pub mod list;
pub mod ping;
pub mod replies;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared state handed to every command and event.
pub struct Data {
    pub registry: Arc<RegistryService<JsonRegistryStore>>,
    pub moderation: Arc<ImageModerationService<JsonRegistryStore>>,
    pub fetcher: AttachmentFetcher,
}

/// Every slash command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![ping::ping(), list::list(), image::image()]
}
