// Test doubles shared by the core unit tests.

use crate::core::moderation::{AttachmentError, ImageAttachment};
use crate::core::registry::{Registry, RegistryLock, RegistryStore, StoreError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

/// In-memory registry store. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryRegistryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    lock: Mutex<()>,
    registry: StdMutex<Registry>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, fail: bool) {
        self.inner.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RegistryStore for MemoryRegistryStore {
    async fn lock<'a>(&'a self) -> RegistryLock<'a> {
        RegistryLock::new(self.inner.lock.lock().await)
    }

    async fn load(&self, _lock: &RegistryLock<'_>) -> Result<Registry, StoreError> {
        Ok(self.inner.registry.lock().unwrap().clone())
    }

    async fn save(&self, _lock: &RegistryLock<'_>, registry: &Registry) -> Result<(), StoreError> {
        if self.inner.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        *self.inner.registry.lock().unwrap() = registry.clone();
        self.inner.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Attachment with canned bytes that counts how often it was read.
pub struct FakeAttachment {
    media_type: Option<String>,
    filename: String,
    size: Option<u64>,
    bytes: Vec<u8>,
    fail: bool,
    reads: AtomicUsize,
}

impl FakeAttachment {
    pub fn new(media_type: Option<&str>, filename: &str, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.map(str::to_string),
            filename: filename.to_string(),
            size: Some(bytes.len() as u64),
            bytes: bytes.to_vec(),
            fail: false,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn image(filename: &str, bytes: &[u8]) -> Self {
        Self::new(Some("image/png"), filename, bytes)
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn without_size(mut self) -> Self {
        self.size = None;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageAttachment for FakeAttachment {
    fn declared_media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    fn filename(&self) -> &str {
        &self.filename
    }

    fn byte_size(&self) -> Option<u64> {
        self.size
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, AttachmentError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AttachmentError::Fetch("connection reset".to_string()));
        }
        Ok(self.bytes.clone())
    }
}
