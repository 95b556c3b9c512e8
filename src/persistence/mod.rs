//! Durable state behind a namespaced key-value store.
//!
//! The host hands plugins a string key-value store split into namespaces.
//! Everything the engine persists is a JSON string under one of these keys:
//!
//! | namespace                  | key                          | value                         |
//! |----------------------------|------------------------------|-------------------------------|
//! | `tabsman`                  | `pinned-tabs-data`           | pinned tab records            |
//! | `tabsman`                  | `recently-closed-tabs-data`  | recently closed tab records   |
//! | `tabsman`                  | `favorite-blocks-data`       | favorite blocks               |
//! | `tabsman-workspace`        | `<millis>_<name>`            | map of tab id to tab record   |
//! | `tabsman-workspace`        | `tabsman-workspace-exit`     | the layout to return to       |
//! | `tabsman-workspace-scroll` | same key as the workspace    | map of panel id to scroll top |

mod file;
mod gateway;
mod memory;

pub use file::FileStore;
pub use gateway::{FavoriteBlock, PersistenceGateway, RecordOrigin, wake_tabs};
pub use memory::MemoryStore;

use anyhow::Result;

pub const TABS_NAMESPACE: &str = "tabsman";
pub const WORKSPACE_NAMESPACE: &str = "tabsman-workspace";
pub const WORKSPACE_SCROLL_NAMESPACE: &str = "tabsman-workspace-scroll";

pub const PINNED_KEY: &str = "pinned-tabs-data";
pub const RECENTLY_CLOSED_KEY: &str = "recently-closed-tabs-data";
pub const FAVORITES_KEY: &str = "favorite-blocks-data";
/// Workspace key holding the layout that was live before entering a workspace
pub const WORKSPACE_EXIT_KEY: &str = "tabsman-workspace-exit";

/// A namespaced string key-value store.
pub trait KeyValueStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>>;

    fn set(&mut self, namespace: &str, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, namespace: &str, key: &str) -> Result<()>;

    /// Remove every key in a namespace
    fn clear(&mut self, namespace: &str) -> Result<()>;

    /// Keys of a namespace in ascending order
    fn keys(&self, namespace: &str) -> Result<Vec<String>>;
}
