// Core moderation module - banned image detection.
// Attachment rules are shared with the registry (image add uses them too).

pub mod attachment_rules;
pub mod moderation_models;
pub mod moderation_service;

pub use attachment_rules::*;
pub use moderation_models::*;
pub use moderation_service::*;
