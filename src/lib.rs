//! Per-panel tabs with private back/forward history for a block editor host.
//!
//! The host keeps one shared navigation history for all of its panels. This
//! crate layers browser-style tabs on top: every panel holds an ordered set
//! of tabs, each tab owns its own bounded back/forward stacks, and host
//! history events are reconciled into whichever tab is focused. Tabs can be
//! pinned, closed and restored, bookmarked as favorites, and whole layouts
//! saved and reopened as named workspaces.
//!
//! The entry point is [`TabController`]. It talks to the host only through
//! the traits in [`host`] and persists through a [`KeyValueStore`].

/// Crate version, reported by hosts in their plugin listings.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod content;
pub mod controller;
pub mod error;
pub mod history;
pub mod host;
pub mod naming;
pub mod persistence;
pub mod sync_state;
pub mod tab;

pub use content::{BlockId, ContentId, PanelId, TabId};
pub use controller::{RenderCallback, TabController, TabTarget, workspace_display_name};
pub use error::{TabsError, TabsResult};
pub use history::{HistoryDirection, HistoryItem, HistoryStacks};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, PersistenceGateway};
pub use tab::{Tab, TabStore};
pub use tabsman_config::Config;
