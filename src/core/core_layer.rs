// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "registry/mod.rs"]
pub mod registry;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[cfg(test)]
#[path = "testing.rs"]
pub mod testing;
