// Registry service - every command runs as one locked transaction.
//
// The pattern for each operation is the same:
// 1. Take the store lock
// 2. Load the full registry
// 3. Apply one model operation
// 4. Save the full registry (only if the operation succeeded)
//
// NO Discord dependencies here. Guild ids come in as plain u64s and are
// stringified the way they are keyed in the persisted file.

use super::registry_models::{GuildOverview, ImageMetadata, Registry, RegistryError};
use super::registry_store::{RegistryStore, StoreError};
use crate::core::moderation::{digest, exceeds_size_limit, is_image, ImageAttachment, ImageSizeLimit};
use std::collections::HashSet;

pub struct RegistryService<S: RegistryStore> {
    store: S,
    size_limit: ImageSizeLimit,
}

impl<S: RegistryStore> RegistryService<S> {
    pub fn new(store: S, size_limit: ImageSizeLimit) -> Self {
        Self { store, size_limit }
    }

    pub fn size_limit(&self) -> ImageSizeLimit {
        self.size_limit
    }

    /// Run a read-only view over a consistent snapshot.
    pub async fn read<T, F>(&self, view: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Registry) -> T + Send,
    {
        let lock = self.store.lock().await;
        let registry = self.store.load(&lock).await?;
        Ok(view(&registry))
    }

    /// Read-modify-write under a single lock. Nothing is written when the
    /// mutation is rejected.
    pub async fn update<T, F>(&self, mutate: F) -> Result<T, RegistryError>
    where
        F: FnOnce(&mut Registry) -> Result<T, RegistryError> + Send,
        T: Send,
    {
        let lock = self.store.lock().await;
        let mut registry = self.store.load(&lock).await?;
        let value = mutate(&mut registry)?;
        self.store.save(&lock, &registry).await?;
        Ok(value)
    }

    pub async fn create_list(&self, list_name: &str, guild_id: u64) -> Result<String, RegistryError> {
        let guild = guild_id.to_string();
        self.update(|registry| registry.create_list(list_name, &guild))
            .await
    }

    /// Share every list the guild owns. An empty result is not an error, and
    /// leaves the persisted file untouched.
    pub async fn share_lists(&self, guild_id: u64) -> Result<Vec<String>, RegistryError> {
        let guild = guild_id.to_string();
        let lock = self.store.lock().await;
        let mut registry = self.store.load(&lock).await?;

        let shared = registry.share_lists(&guild);
        if !shared.is_empty() {
            self.store.save(&lock, &registry).await?;
        }
        Ok(shared)
    }

    pub async fn register_list(&self, list_name: &str, guild_id: u64) -> Result<String, RegistryError> {
        let guild = guild_id.to_string();
        self.update(|registry| registry.register_list(list_name, &guild))
            .await
    }

    /// Validate, fetch and digest an uploaded image, then insert it.
    ///
    /// The bytes are fetched outside the lock. The slot checks run once
    /// against a snapshot (to avoid a pointless download) and again inside the
    /// write transaction, where they are authoritative.
    pub async fn add_image<A: ImageAttachment>(
        &self,
        list_name: &str,
        image_name: &str,
        attachment: &A,
        guild_id: u64,
    ) -> Result<(), RegistryError> {
        let guild = guild_id.to_string();

        if list_name.trim().is_empty() || image_name.trim().is_empty() {
            return Err(RegistryError::NamesRequired);
        }
        if !is_image(attachment.declared_media_type(), attachment.filename()) {
            return Err(RegistryError::NotAnImage);
        }
        if exceeds_size_limit(attachment.byte_size(), self.size_limit.bytes()) {
            return Err(RegistryError::ImageTooLarge {
                limit_mb: self.size_limit.megabytes(),
            });
        }

        self.read(|registry| registry.check_image_slot(list_name, image_name, &guild))
            .await??;

        let bytes = attachment.read_bytes().await?;
        let image_digest = digest(&bytes);
        let metadata = ImageMetadata {
            filename: attachment.filename().to_string(),
            content_type: attachment.declared_media_type().map(str::to_string),
            size: attachment.byte_size(),
        };

        self.update(|registry| {
            registry.add_image(list_name, image_name, image_digest, metadata, &guild)
        })
        .await
    }

    pub async fn delete_image(
        &self,
        list_name: &str,
        image_name: &str,
        guild_id: u64,
    ) -> Result<(), RegistryError> {
        let guild = guild_id.to_string();
        self.update(|registry| {
            registry
                .delete_image(list_name, image_name, &guild)
                .map(|_| ())
        })
        .await
    }

    /// Every digest the guild currently enforces.
    pub async fn banned_hashes(&self, guild_id: u64) -> Result<HashSet<String>, StoreError> {
        let guild = guild_id.to_string();
        self.read(|registry| registry.banned_hashes(&guild)).await
    }

    pub async fn guild_overview(&self, guild_id: u64) -> Result<GuildOverview, StoreError> {
        let guild = guild_id.to_string();
        self.read(|registry| registry.guild_overview(&guild)).await
    }
}

// ============================================================================
// TESTS
// ============================================================================
