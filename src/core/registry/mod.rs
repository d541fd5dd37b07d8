pub mod registry_models;
pub mod registry_service;
pub mod registry_store;

pub use registry_models::*;
pub use registry_service::RegistryService;
pub use registry_store::{RegistryLock, RegistryStore, StoreError};
