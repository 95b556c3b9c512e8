//! Tab records and their per-panel store.
//!
//! A tab is a persistent bookmark inside one host panel: it remembers what it
//! shows and keeps a private back/forward history. The store owns every tab
//! and keeps the active-tab map, per-panel id sets, and sorted views in step.

mod sorting;
mod store;

pub use sorting::presentation_order;
pub use store::TabStore;

use crate::content::{ContentId, PanelId, TabId};
use crate::history::{HistoryItem, HistoryStacks};
use crate::naming::TabLabel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single tab.
///
/// Serialized in the camelCase record shape shared by workspace snapshots,
/// the pinned list, and the recently-closed list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    /// Owning panel. Empty for detached records.
    pub panel_id: PanelId,
    pub name: String,
    pub current_icon: String,
    /// What the tab currently shows
    #[serde(rename = "currentBlockId")]
    pub current: ContentId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_pinned: bool,
    /// Millisecond stamp of the pin; 0 when unpinned
    #[serde(default)]
    pub pin_order: i64,
    #[serde(flatten)]
    pub history: HistoryStacks,
}

impl Tab {
    /// Create an inactive, unpinned tab with empty history.
    pub fn new(
        id: TabId,
        panel_id: PanelId,
        current: ContentId,
        label: TabLabel,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            panel_id,
            name: label.name,
            current_icon: label.icon,
            current,
            created_at,
            is_active: false,
            is_pinned: false,
            pin_order: 0,
            history: HistoryStacks::default(),
        }
    }

    /// The history entry describing what the tab shows right now.
    pub fn current_item(&self) -> HistoryItem {
        HistoryItem::new(
            self.current.clone(),
            self.name.clone(),
            self.current_icon.clone(),
        )
    }

    /// Point the tab at new content and relabel it.
    pub fn show(&mut self, content: ContentId, label: TabLabel) {
        self.current = content;
        self.name = label.name;
        self.current_icon = label.icon;
    }

    /// Copy suitable for the recently-closed list: detached, inactive.
    pub fn detached(&self) -> Self {
        Self {
            panel_id: PanelId::default(),
            is_active: false,
            ..self.clone()
        }
    }
}
