// Registry domain models - the banned image lists and guild registrations.
//
// These are pure domain types with no Discord dependencies. Every mutation
// below works on an in-memory `Registry`; persisting the result is the job of
// the `RegistryService` transaction that called it.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::registry_store::StoreError;
use crate::core::moderation::AttachmentError;

// ============================================================================
// MODELS
// ============================================================================

/// The root persisted object: every list plus every guild's registrations.
///
/// Maps are insertion-ordered so that reports built by iterating them (e.g.
/// the names returned by `share_lists`) follow creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub lists: IndexMap<String, ImageList>,
    #[serde(default)]
    pub guilds: IndexMap<String, GuildEntry>,
}

/// A named collection of banned images, owned by the guild that created it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageList {
    pub owner_guild_id: String,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub images: IndexMap<String, ImageRecord>,
}

/// One banned image. Only `sha256` takes part in matching; the rest is
/// provenance kept for moderators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub sha256: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// Which lists a guild enforces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuildEntry {
    #[serde(default)]
    pub registered_lists: Vec<String>,
}

/// Provenance of an uploaded image, as reported by the attachment source.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata {
    pub filename: String,
    pub content_type: Option<String>,
    pub size: Option<u64>,
}

/// Read-only summary of a guild's view of the registry, used by `/list show`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuildOverview {
    /// Registered list names, paired with whether the list still exists.
    pub registered: Vec<(String, bool)>,
    pub owned: Vec<OwnedListSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnedListSummary {
    pub name: String,
    pub shared: bool,
    pub image_count: usize,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Broad category of a registry failure. Everything except `Storage` is a
/// user mistake that leaves the registry untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Authorization,
    Conflict,
    Storage,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("List name is required.")]
    ListNameRequired,

    #[error("List name and image name are required.")]
    NamesRequired,

    #[error("Only image attachments are allowed.")]
    NotAnImage,

    #[error("Image is too large (max {limit_mb}MB).")]
    ImageTooLarge { limit_mb: u64 },

    #[error("List not found.")]
    ListNotFound,

    #[error("Image name not found.")]
    ImageNotFound,

    #[error("You can only edit your own lists.")]
    NotOwner,

    #[error("List is not shared.")]
    NotShared,

    #[error("List name already exists.")]
    ListExists,

    #[error("Image name already exists.")]
    ImageExists,

    #[error("List already registered.")]
    AlreadyRegistered,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Attachment error: {0}")]
    Attachment(#[from] AttachmentError),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::ListNameRequired
            | RegistryError::NamesRequired
            | RegistryError::NotAnImage
            | RegistryError::ImageTooLarge { .. } => ErrorKind::Validation,
            RegistryError::ListNotFound | RegistryError::ImageNotFound => ErrorKind::NotFound,
            RegistryError::NotOwner | RegistryError::NotShared => ErrorKind::Authorization,
            RegistryError::ListExists
            | RegistryError::ImageExists
            | RegistryError::AlreadyRegistered => ErrorKind::Conflict,
            RegistryError::Storage(_) | RegistryError::Attachment(_) => ErrorKind::Storage,
        }
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Trim surrounding whitespace and lowercase. List and image names are always
/// stored and looked up in this form.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Registry {
    /// Get the guild's entry, creating an empty one on first use.
    fn guild_entry_mut(&mut self, guild_id: &str) -> &mut GuildEntry {
        self.guilds.entry(guild_id.to_string()).or_default()
    }

    /// Look up a list the guild is allowed to edit.
    fn owned_list_mut(
        &mut self,
        list_name: &str,
        guild_id: &str,
    ) -> Result<&mut ImageList, RegistryError> {
        let list = self
            .lists
            .get_mut(list_name)
            .ok_or(RegistryError::ListNotFound)?;
        if list.owner_guild_id != guild_id {
            return Err(RegistryError::NotOwner);
        }
        Ok(list)
    }

    /// Create an empty, unshared list and register it to its owner.
    /// Returns the normalized list name.
    pub fn create_list(&mut self, list_name: &str, guild_id: &str) -> Result<String, RegistryError> {
        let name = normalize_name(list_name);
        if name.is_empty() {
            return Err(RegistryError::ListNameRequired);
        }
        if self.lists.contains_key(&name) {
            return Err(RegistryError::ListExists);
        }

        self.lists.insert(
            name.clone(),
            ImageList {
                owner_guild_id: guild_id.to_string(),
                shared: false,
                images: IndexMap::new(),
            },
        );

        let entry = self.guild_entry_mut(guild_id);
        if !entry.registered_lists.contains(&name) {
            entry.registered_lists.push(name.clone());
        }
        Ok(name)
    }

    /// Mark every list owned by the guild as shared. Returns the affected names
    /// in registry order; an empty result means the guild owns no lists.
    pub fn share_lists(&mut self, guild_id: &str) -> Vec<String> {
        self.lists
            .iter_mut()
            .filter(|(_, list)| list.owner_guild_id == guild_id)
            .map(|(name, list)| {
                list.shared = true;
                name.clone()
            })
            .collect()
    }

    /// Subscribe a guild to a shared list. Returns the normalized list name.
    pub fn register_list(
        &mut self,
        list_name: &str,
        guild_id: &str,
    ) -> Result<String, RegistryError> {
        let name = normalize_name(list_name);
        let list = self.lists.get(&name).ok_or(RegistryError::ListNotFound)?;
        if !list.shared {
            return Err(RegistryError::NotShared);
        }

        let entry = self.guild_entry_mut(guild_id);
        if entry.registered_lists.contains(&name) {
            return Err(RegistryError::AlreadyRegistered);
        }
        entry.registered_lists.push(name.clone());
        Ok(name)
    }

    /// Check that `image_name` could be added to `list_name` by this guild,
    /// without changing anything. Used to reject early before fetching bytes.
    pub fn check_image_slot(
        &self,
        list_name: &str,
        image_name: &str,
        guild_id: &str,
    ) -> Result<(), RegistryError> {
        let (list_name, image_name) = normalize_pair(list_name, image_name)?;
        let list = self
            .lists
            .get(&list_name)
            .ok_or(RegistryError::ListNotFound)?;
        if list.owner_guild_id != guild_id {
            return Err(RegistryError::NotOwner);
        }
        if list.images.contains_key(&image_name) {
            return Err(RegistryError::ImageExists);
        }
        Ok(())
    }

    /// Insert a banned image into a list owned by the guild.
    pub fn add_image(
        &mut self,
        list_name: &str,
        image_name: &str,
        digest: String,
        metadata: ImageMetadata,
        guild_id: &str,
    ) -> Result<(), RegistryError> {
        let (list_name, image_name) = normalize_pair(list_name, image_name)?;
        let list = self.owned_list_mut(&list_name, guild_id)?;
        if list.images.contains_key(&image_name) {
            return Err(RegistryError::ImageExists);
        }

        list.images.insert(
            image_name,
            ImageRecord {
                sha256: digest,
                filename: metadata.filename,
                content_type: metadata.content_type,
                size: metadata.size,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Remove one image from a list owned by the guild. Returns the removed record.
    pub fn delete_image(
        &mut self,
        list_name: &str,
        image_name: &str,
        guild_id: &str,
    ) -> Result<ImageRecord, RegistryError> {
        let list_name = normalize_name(list_name);
        let image_name = normalize_name(image_name);
        let list = self.owned_list_mut(&list_name, guild_id)?;
        // shift_remove keeps the remaining images in their original order
        list.images
            .shift_remove(&image_name)
            .ok_or(RegistryError::ImageNotFound)
    }

    /// Union of every digest in the lists the guild has registered.
    /// Registered names whose list no longer exists are skipped.
    pub fn banned_hashes(&self, guild_id: &str) -> HashSet<String> {
        let Some(entry) = self.guilds.get(guild_id) else {
            return HashSet::new();
        };

        entry
            .registered_lists
            .iter()
            .filter_map(|name| self.lists.get(name))
            .flat_map(|list| list.images.values().map(|image| image.sha256.clone()))
            .collect()
    }

    pub fn guild_overview(&self, guild_id: &str) -> GuildOverview {
        let registered = self
            .guilds
            .get(guild_id)
            .map(|entry| {
                entry
                    .registered_lists
                    .iter()
                    .map(|name| (name.clone(), self.lists.contains_key(name)))
                    .collect()
            })
            .unwrap_or_default();

        let owned = self
            .lists
            .iter()
            .filter(|(_, list)| list.owner_guild_id == guild_id)
            .map(|(name, list)| OwnedListSummary {
                name: name.clone(),
                shared: list.shared,
                image_count: list.images.len(),
            })
            .collect();

        GuildOverview { registered, owned }
    }
}

fn normalize_pair(list_name: &str, image_name: &str) -> Result<(String, String), RegistryError> {
    let list_name = normalize_name(list_name);
    let image_name = normalize_name(image_name);
    if list_name.is_empty() || image_name.is_empty() {
        return Err(RegistryError::NamesRequired);
    }
    Ok((list_name, image_name))
}
