// Registry infra layer.
// - `json_store.rs` persists the whole registry as one JSON document.

#[path = "json_store.rs"]
pub mod json_store;

pub use json_store::JsonRegistryStore;
