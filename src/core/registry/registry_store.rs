use super::registry_models::Registry;
use async_trait::async_trait;
use tokio::sync::MutexGuard;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Registry file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Proof that the caller holds the store-wide lock.
///
/// `load` and `save` both demand one, so a read-modify-write transaction is
/// written by holding a single guard across both calls.
pub struct RegistryLock<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl<'a> RegistryLock<'a> {
    pub fn new(guard: MutexGuard<'a, ()>) -> Self {
        Self { _guard: guard }
    }
}

/// Port for whole-registry persistence.
///
/// The store owns the lock. Implementations must return an empty registry
/// when nothing has been persisted yet, and must fail (not fall back to empty)
/// when persisted content exists but cannot be parsed.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Acquire the store-wide lock. Waiters are served first come, first served.
    async fn lock<'a>(&'a self) -> RegistryLock<'a>;
    async fn load(&self, lock: &RegistryLock<'_>) -> Result<Registry, StoreError>;
    async fn save(&self, lock: &RegistryLock<'_>, registry: &Registry) -> Result<(), StoreError>;
}
