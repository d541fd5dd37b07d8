// Image moderation service - core business logic for banned image removal.
//
// For every inbound message:
// - Drop bot messages, DMs and messages without attachments
// - Collect the banned digests from the guild's registered lists
// - Digest each image attachment in order and delete on the first match
//
// NO Discord dependencies here - just pure domain logic.

use super::attachment_rules::{digest, exceeds_size_limit, is_image, ImageAttachment};
use super::moderation_models::{FilterReason, InboundMessage, ModerationOutcome};
use crate::core::registry::{RegistryService, RegistryStore, StoreError};
use std::sync::Arc;

/// Image filter applied to every guild message.
pub struct ImageModerationService<S: RegistryStore> {
    registry: Arc<RegistryService<S>>,
}

impl<S: RegistryStore> ImageModerationService<S> {
    /// Create a new moderation service reading from the shared registry.
    pub fn new(registry: Arc<RegistryService<S>>) -> Self {
        Self { registry }
    }

    /// Run the pipeline for one message.
    ///
    /// Only a registry load failure is returned as an error. Attachment fetch
    /// failures skip to the next attachment and deletion failures are
    /// swallowed, both with a log line.
    pub async fn moderate<M: InboundMessage>(
        &self,
        message: &M,
    ) -> Result<ModerationOutcome, StoreError> {
        let guild_id = match message.guild_id() {
            Some(id) if !message.from_bot() => id,
            _ => return Ok(ModerationOutcome::Filtered(FilterReason::NotApplicable)),
        };

        let attachments = message.attachments();
        if attachments.is_empty() {
            return Ok(ModerationOutcome::Filtered(FilterReason::NoAttachments));
        }

        let guild = guild_id.to_string();
        let (has_registrations, banned) = self
            .registry
            .read(|registry| {
                let registered = registry
                    .guilds
                    .get(&guild)
                    .is_some_and(|entry| !entry.registered_lists.is_empty());
                (registered, registry.banned_hashes(&guild))
            })
            .await?;

        if !has_registrations {
            return Ok(ModerationOutcome::Filtered(FilterReason::NoRegistrations));
        }
        if banned.is_empty() {
            return Ok(ModerationOutcome::Filtered(FilterReason::NoBannedHashes));
        }

        let limit_bytes = self.registry.size_limit().bytes();
        for attachment in attachments {
            if !is_image(attachment.declared_media_type(), attachment.filename()) {
                continue;
            }
            if exceeds_size_limit(attachment.byte_size(), limit_bytes) {
                continue;
            }

            let bytes = match attachment.read_bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(
                        guild_id,
                        filename = attachment.filename(),
                        "Skipping attachment that could not be fetched: {}",
                        e
                    );
                    continue;
                }
            };

            let image_digest = digest(&bytes);
            if !banned.contains(&image_digest) {
                continue;
            }

            if let Err(e) = message.delete().await {
                tracing::warn!(
                    guild_id,
                    digest = %image_digest,
                    "Failed to delete message with banned image: {}",
                    e
                );
            }

            return Ok(ModerationOutcome::Deleted {
                digest: image_digest,
                filename: attachment.filename().to_string(),
            });
        }

        Ok(ModerationOutcome::Clean)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::ImageSizeLimit;
    use crate::core::testing::{FakeAttachment, MemoryRegistryStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const GUILD: u64 = 456;
    const OTHER_GUILD: u64 = 789;

    struct FakeMessage {
        guild_id: Option<u64>,
        from_bot: bool,
        attachments: Vec<FakeAttachment>,
        delete_fails: bool,
        deletes: AtomicUsize,
    }

    impl FakeMessage {
        fn in_guild(attachments: Vec<FakeAttachment>) -> Self {
            Self {
                guild_id: Some(GUILD),
                from_bot: false,
                attachments,
                delete_fails: false,
                deletes: AtomicUsize::new(0),
            }
        }

        fn deletes(&self) -> usize {
            self.deletes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InboundMessage for FakeMessage {
        type Attachment = FakeAttachment;

        fn guild_id(&self) -> Option<u64> {
            self.guild_id
        }

        fn from_bot(&self) -> bool {
            self.from_bot
        }

        fn attachments(&self) -> &[FakeAttachment] {
            &self.attachments
        }

        async fn delete(&self) -> Result<(), String> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            if self.delete_fails {
                return Err("Unknown Message".to_string());
            }
            Ok(())
        }
    }

    /// Registry where GUILD has list "x" registered, holding one banned image.
    async fn setup(banned: &[u8]) -> ImageModerationService<MemoryRegistryStore> {
        let registry = Arc::new(RegistryService::new(
            MemoryRegistryStore::new(),
            ImageSizeLimit::default(),
        ));
        registry.create_list("x", GUILD).await.unwrap();
        registry
            .add_image("x", "bad", &FakeAttachment::image("bad.png", banned), GUILD)
            .await
            .unwrap();
        ImageModerationService::new(registry)
    }

    #[tokio::test]
    async fn test_matching_attachment_is_deleted() {
        let service = setup(b"banned").await;
        let message = FakeMessage::in_guild(vec![FakeAttachment::image("meme.png", b"banned")]);

        let outcome = service.moderate(&message).await.unwrap();

        assert_eq!(
            outcome,
            ModerationOutcome::Deleted {
                digest: digest(b"banned"),
                filename: "meme.png".to_string(),
            }
        );
        assert_eq!(message.deletes(), 1);
    }

    #[tokio::test]
    async fn test_different_bytes_are_clean() {
        let service = setup(b"banned").await;
        let message = FakeMessage::in_guild(vec![FakeAttachment::image("cat.png", b"harmless")]);

        let outcome = service.moderate(&message).await.unwrap();

        assert_eq!(outcome, ModerationOutcome::Clean);
        assert_eq!(message.deletes(), 0);
    }

    #[tokio::test]
    async fn test_stops_at_first_match() {
        let service = setup(b"banned").await;
        let message = FakeMessage::in_guild(vec![
            FakeAttachment::image("a.png", b"harmless"),
            FakeAttachment::image("b.png", b"banned"),
            FakeAttachment::image("c.png", b"banned"),
        ]);

        let outcome = service.moderate(&message).await.unwrap();

        assert!(matches!(outcome, ModerationOutcome::Deleted { ref filename, .. } if filename == "b.png"));
        assert_eq!(message.attachments[0].reads(), 1);
        assert_eq!(message.attachments[2].reads(), 0);
        assert_eq!(message.deletes(), 1);
    }

    #[tokio::test]
    async fn test_non_images_and_oversized_are_skipped() {
        let service = setup(b"banned").await;
        let message = FakeMessage::in_guild(vec![
            FakeAttachment::new(Some("text/plain"), "banned.txt", b"banned"),
            FakeAttachment::image("big.png", b"banned").with_size(9 * 1024 * 1024),
        ]);

        let outcome = service.moderate(&message).await.unwrap();

        assert_eq!(outcome, ModerationOutcome::Clean);
        assert_eq!(message.attachments[0].reads(), 0);
        assert_eq!(message.attachments[1].reads(), 0);
    }

    #[tokio::test]
    async fn test_unknown_size_is_scanned() {
        let service = setup(b"banned").await;
        let message = FakeMessage::in_guild(vec![
            FakeAttachment::image("mystery.png", b"banned").without_size(),
        ]);

        let outcome = service.moderate(&message).await.unwrap();
        assert!(matches!(outcome, ModerationOutcome::Deleted { .. }));
    }

    #[tokio::test]
    async fn test_fetch_failure_moves_to_next_attachment() {
        let service = setup(b"banned").await;
        let message = FakeMessage::in_guild(vec![
            FakeAttachment::image("broken.png", b"banned").failing(),
            FakeAttachment::image("second.png", b"banned"),
        ]);

        let outcome = service.moderate(&message).await.unwrap();
        assert!(matches!(outcome, ModerationOutcome::Deleted { ref filename, .. } if filename == "second.png"));
    }

    #[tokio::test]
    async fn test_delete_failure_is_swallowed() {
        let service = setup(b"banned").await;
        let mut message = FakeMessage::in_guild(vec![FakeAttachment::image("a.png", b"banned")]);
        message.delete_fails = true;

        let outcome = service.moderate(&message).await.unwrap();

        assert!(matches!(outcome, ModerationOutcome::Deleted { .. }));
        assert_eq!(message.deletes(), 1);
    }

    #[tokio::test]
    async fn test_filtered_states() {
        let service = setup(b"banned").await;

        let mut from_bot = FakeMessage::in_guild(vec![FakeAttachment::image("a.png", b"banned")]);
        from_bot.from_bot = true;
        assert_eq!(
            service.moderate(&from_bot).await.unwrap(),
            ModerationOutcome::Filtered(FilterReason::NotApplicable)
        );

        let mut direct = FakeMessage::in_guild(vec![FakeAttachment::image("a.png", b"banned")]);
        direct.guild_id = None;
        assert_eq!(
            service.moderate(&direct).await.unwrap(),
            ModerationOutcome::Filtered(FilterReason::NotApplicable)
        );

        let empty = FakeMessage::in_guild(Vec::new());
        assert_eq!(
            service.moderate(&empty).await.unwrap(),
            ModerationOutcome::Filtered(FilterReason::NoAttachments)
        );

        let mut elsewhere = FakeMessage::in_guild(vec![FakeAttachment::image("a.png", b"banned")]);
        elsewhere.guild_id = Some(OTHER_GUILD);
        assert_eq!(
            service.moderate(&elsewhere).await.unwrap(),
            ModerationOutcome::Filtered(FilterReason::NoRegistrations)
        );
        assert_eq!(elsewhere.attachments[0].reads(), 0);
    }

    #[tokio::test]
    async fn test_registered_but_empty_lists() {
        let registry = Arc::new(RegistryService::new(
            MemoryRegistryStore::new(),
            ImageSizeLimit::default(),
        ));
        registry.create_list("empty", GUILD).await.unwrap();
        let service = ImageModerationService::new(registry);

        let message = FakeMessage::in_guild(vec![FakeAttachment::image("a.png", b"banned")]);
        assert_eq!(
            service.moderate(&message).await.unwrap(),
            ModerationOutcome::Filtered(FilterReason::NoBannedHashes)
        );
    }

    #[tokio::test]
    async fn test_shared_list_applies_to_registering_guild() {
        let registry = Arc::new(RegistryService::new(
            MemoryRegistryStore::new(),
            ImageSizeLimit::default(),
        ));
        registry.create_list("x", GUILD).await.unwrap();
        registry
            .add_image("x", "bad", &FakeAttachment::image("bad.png", b"banned"), GUILD)
            .await
            .unwrap();
        registry.share_lists(GUILD).await.unwrap();
        registry.register_list("x", OTHER_GUILD).await.unwrap();
        let service = ImageModerationService::new(Arc::clone(&registry));

        let mut message = FakeMessage::in_guild(vec![FakeAttachment::image("a.png", b"banned")]);
        message.guild_id = Some(OTHER_GUILD);

        assert!(matches!(
            service.moderate(&message).await.unwrap(),
            ModerationOutcome::Deleted { .. }
        ));
    }
}
