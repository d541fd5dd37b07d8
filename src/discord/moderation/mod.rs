// Discord moderation glue.
// - `attachment_adapter.rs` exposes serenity messages/attachments through the core ports.
// - `image_filter.rs` runs the banned image pipeline on incoming messages.

#[path = "attachment_adapter.rs"]
pub mod attachment_adapter;

#[path = "image_filter.rs"]
pub mod image_filter;

pub use attachment_adapter::{DiscordAttachment, DiscordMessage};
pub use image_filter::handle_message_for_banned_images;
