use crate::core::registry::{Registry, RegistryLock, RegistryStore, StoreError};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// JSON-file registry store. The whole registry lives in one document:
/// { "lists": { name: ImageList }, "guilds": { guild_id: GuildEntry } }
///
/// Saves go to a temp file next to the target and are renamed over it, so a
/// reader never sees a half-written document.
pub struct JsonRegistryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonRegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomically(path: &Path, text: &str) -> Result<(), StoreError> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(text.as_bytes())?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[async_trait]
impl RegistryStore for JsonRegistryStore {
    async fn lock<'a>(&'a self) -> RegistryLock<'a> {
        RegistryLock::new(self.lock.lock().await)
    }

    async fn load(&self, _lock: &RegistryLock<'_>) -> Result<Registry, StoreError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Registry::default()),
            Err(e) => return Err(e.into()),
        };

        // An existing but unreadable file must not turn into an empty registry,
        // that would silently drop every ban.
        serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }

    async fn save(&self, _lock: &RegistryLock<'_>, registry: &Registry) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(registry)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::write_atomically(&path, &text))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::{ImageMetadata, RegistryService};
    use crate::core::moderation::ImageSizeLimit;
    use std::sync::Arc;
    use tempfile::tempdir;

    async fn load(store: &JsonRegistryStore) -> Result<Registry, StoreError> {
        let lock = store.lock().await;
        store.load(&lock).await
    }

    async fn save(store: &JsonRegistryStore, registry: &Registry) -> Result<(), StoreError> {
        let lock = store.lock().await;
        store.save(&lock, registry).await
    }

    fn sample_registry() -> Registry {
        let mut registry = Registry::default();
        registry.create_list("memes", "1").unwrap();
        registry.create_list("spam", "1").unwrap();
        registry
            .add_image(
                "memes",
                "cat",
                "ab".repeat(32),
                ImageMetadata {
                    filename: "cat.png".to_string(),
                    content_type: Some("image/png".to_string()),
                    size: Some(1234),
                },
                "1",
            )
            .unwrap();
        registry.share_lists("1");
        registry.register_list("memes", "2").unwrap();
        registry
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty_registry() {
        let dir = tempdir().unwrap();
        let store = JsonRegistryStore::new(dir.path().join("storage.json"));

        let registry = load(&store).await.unwrap();
        assert_eq!(registry, Registry::default());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_roundtrips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("storage.json");
        let store = JsonRegistryStore::new(path.clone());
        let registry = sample_registry();

        save(&store, &registry).await.unwrap();
        assert!(path.exists());

        let reloaded = load(&JsonRegistryStore::new(path)).await.unwrap();
        assert_eq!(reloaded, registry);
        assert_eq!(
            reloaded.lists.keys().collect::<Vec<_>>(),
            vec!["memes", "spam"]
        );
    }

    #[tokio::test]
    async fn test_save_of_load_is_a_no_op() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let store = JsonRegistryStore::new(path.clone());
        save(&store, &sample_registry()).await.unwrap();
        let first = std::fs::read_to_string(&path).unwrap();

        let loaded = load(&store).await.unwrap();
        save(&store, &loaded).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[tokio::test]
    async fn test_reads_documented_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(
            &path,
            r#"{
  "lists": {
    "memes": {
      "owner_guild_id": "10",
      "shared": true,
      "images": {
        "cat": {
          "sha256": "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
          "filename": "cat.png",
          "content_type": null,
          "size": null,
          "created_at": "2024-05-01T12:30:00.123456+00:00"
        }
      }
    }
  },
  "guilds": {
    "20": { "registered_lists": ["memes", "deleted"] }
  }
}"#,
        )
        .unwrap();

        let registry = load(&JsonRegistryStore::new(path)).await.unwrap();
        let image = &registry.lists["memes"].images["cat"];
        assert_eq!(image.content_type, None);
        assert_eq!(image.size, None);
        assert_eq!(registry.guilds["20"].registered_lists, vec!["memes", "deleted"]);
        assert_eq!(registry.banned_hashes("20").len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ \"lists\": ").unwrap();

        let err = load(&JsonRegistryStore::new(path.clone())).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        // The corrupt file is left for an operator to inspect
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ \"lists\": ");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_do_not_lose_updates() {
        let dir = tempdir().unwrap();
        let store = JsonRegistryStore::new(dir.path().join("storage.json"));
        let service = Arc::new(RegistryService::new(store, ImageSizeLimit::default()));

        let mut handles = Vec::new();
        for i in 0..16u64 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.create_list(&format!("list-{i}"), 1000 + i).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reloaded = load(&JsonRegistryStore::new(dir.path().join("storage.json")))
            .await
            .unwrap();
        assert_eq!(reloaded.lists.len(), 16);
        assert_eq!(reloaded.guilds.len(), 16);
    }
}
