// Moderation domain models - what the image filter decided for one message.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer translates them into log lines.

use async_trait::async_trait;

use super::attachment_rules::ImageAttachment;

/// Why a message was dropped before any attachment was scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReason {
    /// Sent by a bot, or outside a guild
    NotApplicable,
    /// Message carries no attachments
    NoAttachments,
    /// Guild has no entry or no registered lists
    NoRegistrations,
    /// Registered lists exist but contain no images
    NoBannedHashes,
}

impl std::fmt::Display for FilterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterReason::NotApplicable => write!(f, "Not Applicable"),
            FilterReason::NoAttachments => write!(f, "No Attachments"),
            FilterReason::NoRegistrations => write!(f, "No Registrations"),
            FilterReason::NoBannedHashes => write!(f, "No Banned Hashes"),
        }
    }
}

/// Terminal state of the per-message pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ModerationOutcome {
    Filtered(FilterReason),
    /// Every image was scanned and none matched
    Clean,
    /// An attachment matched a banned digest and deletion was requested.
    /// A failed deletion is logged, not reported here.
    Deleted { digest: String, filename: String },
}

/// An inbound chat message as seen by the image filter.
#[async_trait]
pub trait InboundMessage: Send + Sync {
    type Attachment: ImageAttachment;

    fn guild_id(&self) -> Option<u64>;
    fn from_bot(&self) -> bool;
    fn attachments(&self) -> &[Self::Attachment];
    /// Remove the message. Errors are descriptions only; the caller logs them.
    async fn delete(&self) -> Result<(), String>;
}
