//! Persistence gateway: the durable lists and workspace records.
//!
//! Keeps an in-memory copy of the pinned, recently-closed, and favorite lists
//! and writes the whole list back after every change. Workspace snapshots are
//! read and written straight through to the store.

use super::{
    FAVORITES_KEY, KeyValueStore, PINNED_KEY, RECENTLY_CLOSED_KEY, TABS_NAMESPACE,
    WORKSPACE_EXIT_KEY, WORKSPACE_NAMESPACE, WORKSPACE_SCROLL_NAMESPACE,
};
use crate::content::{ContentId, PanelId, TabId};
use crate::error::{TabsError, TabsResult};
use crate::history::HistoryStacks;
use crate::tab::Tab;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};

/// A block the user bookmarked for quick access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteBlock {
    pub id: ContentId,
    pub icon: String,
    pub title: String,
}

/// Where a persisted tab record came from; decides how it is re-attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrigin {
    Workspace,
    Pinned,
    RecentlyClosed,
}

/// Re-attach woken tab records.
///
/// Pinned and recently-closed records are detached, so they land in the given
/// panel as inactive tabs. Workspace records keep their own panel ids and
/// active flags; the layout rebuild remaps them afterwards.
pub fn wake_tabs(tabs: Vec<Tab>, origin: RecordOrigin, panel: &PanelId) -> Vec<Tab> {
    match origin {
        RecordOrigin::Workspace => tabs,
        RecordOrigin::Pinned | RecordOrigin::RecentlyClosed => tabs
            .into_iter()
            .map(|mut tab| {
                tab.panel_id = panel.clone();
                tab.is_active = false;
                tab
            })
            .collect(),
    }
}

pub struct PersistenceGateway<S: KeyValueStore> {
    store: S,
    pinned: Vec<Tab>,
    recently_closed: Vec<Tab>,
    favorites: Vec<FavoriteBlock>,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            pinned: Vec::new(),
            recently_closed: Vec::new(),
            favorites: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Read every durable list from the store.
    ///
    /// A list that fails to parse is logged and treated as empty so the
    /// others still load; store failures are returned.
    pub fn load(&mut self) -> TabsResult<()> {
        self.pinned = self.read_list(PINNED_KEY)?;
        self.recently_closed = self.read_list(RECENTLY_CLOSED_KEY)?;
        self.favorites = self.read_list(FAVORITES_KEY)?;
        crate::debug_info!(
            "PERSIST",
            "Loaded {} pinned, {} recently closed, {} favorites",
            self.pinned.len(),
            self.recently_closed.len(),
            self.favorites.len()
        );
        Ok(())
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> TabsResult<Vec<T>> {
        let Some(raw) = self.store.get(TABS_NAMESPACE, key)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                log::error!("Discarding unreadable {} record: {}", key, e);
                Ok(Vec::new())
            }
        }
    }

    // ========================================================================
    // Pinned tabs
    // ========================================================================

    pub fn pinned(&self) -> &[Tab] {
        &self.pinned
    }

    /// Remember a pinned tab. Stored detached and without history.
    pub fn add_pinned(&mut self, tab: &Tab) -> TabsResult<()> {
        let mut record = tab.detached();
        record.history = HistoryStacks::default();
        self.pinned.retain(|t| t.id != record.id);
        self.pinned.insert(0, record);
        write_list(&mut self.store, PINNED_KEY, &self.pinned)
    }

    pub fn remove_pinned(&mut self, id: &TabId) -> TabsResult<()> {
        self.pinned.retain(|t| &t.id != id);
        write_list(&mut self.store, PINNED_KEY, &self.pinned)
    }

    // ========================================================================
    // Recently closed tabs
    // ========================================================================

    /// Recently closed tabs, most recent first
    pub fn recently_closed(&self) -> &[Tab] {
        &self.recently_closed
    }

    /// Remember a closed tab, dropping the oldest entry at capacity.
    pub fn add_recently_closed(&mut self, tab: &Tab, capacity: usize) -> TabsResult<()> {
        let record = tab.detached();
        self.recently_closed.retain(|t| t.id != record.id);
        while self.recently_closed.len() >= capacity.max(1) {
            self.recently_closed.pop();
        }
        self.recently_closed.insert(0, record);
        write_list(&mut self.store, RECENTLY_CLOSED_KEY, &self.recently_closed)
    }

    /// Take a closed tab out of the list, returning its record.
    pub fn take_recently_closed(&mut self, id: &TabId) -> TabsResult<Option<Tab>> {
        let Some(index) = self.recently_closed.iter().position(|t| &t.id == id) else {
            return Ok(None);
        };
        let record = self.recently_closed.remove(index);
        write_list(&mut self.store, RECENTLY_CLOSED_KEY, &self.recently_closed)?;
        Ok(Some(record))
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    /// Favorite blocks, most recently added first
    pub fn favorites(&self) -> &[FavoriteBlock] {
        &self.favorites
    }

    pub fn add_favorite(&mut self, favorite: FavoriteBlock) -> TabsResult<()> {
        if self.favorites.iter().any(|f| f.id == favorite.id) {
            return Err(TabsError::FavoriteExists);
        }
        self.favorites.insert(0, favorite);
        write_list(&mut self.store, FAVORITES_KEY, &self.favorites)
    }

    pub fn remove_favorite(&mut self, id: &ContentId) -> TabsResult<()> {
        let Some(index) = self.favorites.iter().position(|f| &f.id == id) else {
            return Err(TabsError::FavoriteMissing);
        };
        self.favorites.remove(index);
        write_list(&mut self.store, FAVORITES_KEY, &self.favorites)
    }

    /// Reset the pinned, recently-closed, and favorite lists to empty.
    pub fn clear_all(&mut self) -> TabsResult<()> {
        self.pinned.clear();
        self.recently_closed.clear();
        self.favorites.clear();
        for key in [PINNED_KEY, RECENTLY_CLOSED_KEY, FAVORITES_KEY] {
            self.store.set(TABS_NAMESPACE, key, "[]")?;
        }
        log::info!("Cleared persisted tab data");
        Ok(())
    }

    // ========================================================================
    // Workspaces
    // ========================================================================

    /// Saved workspace keys in ascending (creation) order, exit point excluded
    pub fn workspace_keys(&self) -> TabsResult<Vec<String>> {
        Ok(self
            .store
            .keys(WORKSPACE_NAMESPACE)?
            .into_iter()
            .filter(|k| k != WORKSPACE_EXIT_KEY)
            .collect())
    }

    pub fn has_workspace(&self, key: &str) -> TabsResult<bool> {
        Ok(self.store.get(WORKSPACE_NAMESPACE, key)?.is_some())
    }

    /// Read a workspace snapshot. `Ok(None)` if the key is absent.
    pub fn read_workspace(&self, key: &str) -> TabsResult<Option<Vec<Tab>>> {
        let Some(raw) = self.store.get(WORKSPACE_NAMESPACE, key)? else {
            return Ok(None);
        };
        let tabs: BTreeMap<TabId, Tab> = serde_json::from_str(&raw)?;
        Ok(Some(tabs.into_values().collect()))
    }

    /// Write a workspace snapshot as a map of tab id to record.
    pub fn write_workspace<'a>(
        &mut self,
        key: &str,
        tabs: impl IntoIterator<Item = &'a Tab>,
    ) -> TabsResult<()> {
        let map: BTreeMap<&TabId, &Tab> = tabs.into_iter().map(|t| (&t.id, t)).collect();
        let json = serde_json::to_string(&map)?;
        self.store.set(WORKSPACE_NAMESPACE, key, &json)?;
        Ok(())
    }

    pub fn read_scroll(&self, key: &str) -> TabsResult<HashMap<PanelId, f64>> {
        let Some(raw) = self.store.get(WORKSPACE_SCROLL_NAMESPACE, key)? else {
            return Ok(HashMap::new());
        };
        match serde_json::from_str(&raw) {
            Ok(scroll) => Ok(scroll),
            Err(e) => {
                log::warn!("Ignoring unreadable scroll record for {}: {}", key, e);
                Ok(HashMap::new())
            }
        }
    }

    pub fn write_scroll(&mut self, key: &str, scroll: &HashMap<PanelId, f64>) -> TabsResult<()> {
        let json = serde_json::to_string(scroll)?;
        self.store.set(WORKSPACE_SCROLL_NAMESPACE, key, &json)?;
        Ok(())
    }

    /// Remove a workspace snapshot and its scroll record.
    pub fn remove_workspace(&mut self, key: &str) -> TabsResult<()> {
        self.store.remove(WORKSPACE_NAMESPACE, key)?;
        self.store.remove(WORKSPACE_SCROLL_NAMESPACE, key)?;
        Ok(())
    }

    /// Remove every workspace snapshot, the exit point included.
    pub fn clear_workspaces(&mut self) -> TabsResult<()> {
        self.store.clear(WORKSPACE_NAMESPACE)?;
        self.store.clear(WORKSPACE_SCROLL_NAMESPACE)?;
        Ok(())
    }

    pub fn remove_exit_point(&mut self) -> TabsResult<()> {
        self.remove_workspace(WORKSPACE_EXIT_KEY)
    }
}

fn write_list<S: KeyValueStore, T: Serialize>(
    store: &mut S,
    key: &str,
    list: &[T],
) -> TabsResult<()> {
    let json = serde_json::to_string(list)?;
    store.set(TABS_NAMESPACE, key, &json)?;
    crate::debug_log!("PERSIST", "Saved {} entries to {}", list.len(), key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::TabLabel;
    use crate::persistence::MemoryStore;
    use chrono::DateTime;

    fn tab(id: &str, block: u64) -> Tab {
        let mut tab = Tab::new(
            TabId::from(id),
            PanelId::from("p1"),
            ContentId::Block(block),
            TabLabel {
                name: id.to_string(),
                icon: "ti ti-cube".to_string(),
            },
            DateTime::from_timestamp_millis(1_000 + block as i64).unwrap(),
        );
        let item = tab.current_item();
        tab.history.record(item, 31);
        tab
    }

    #[test]
    fn test_recently_closed_is_bounded_and_detached() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        for n in 1..=7 {
            gateway
                .add_recently_closed(&tab(&format!("t{n}"), n), 5)
                .unwrap();
        }
        let ids: Vec<&str> = gateway.recently_closed().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t7", "t6", "t5", "t4", "t3"]);
        assert!(gateway.recently_closed()[0].panel_id.is_detached());
        assert_eq!(gateway.recently_closed()[0].history.back_stack.len(), 1);

        let mut reloaded = PersistenceGateway::new(gateway.store().clone());
        reloaded.load().unwrap();
        assert_eq!(reloaded.recently_closed(), gateway.recently_closed());
    }

    #[test]
    fn test_pinned_record_drops_history() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        let mut pinned = tab("t1", 1);
        pinned.is_pinned = true;
        pinned.pin_order = 99;
        gateway.add_pinned(&pinned).unwrap();
        gateway.add_pinned(&pinned).unwrap();

        assert_eq!(gateway.pinned().len(), 1);
        assert!(gateway.pinned()[0].history.is_empty());
        assert_eq!(gateway.pinned()[0].pin_order, 99);

        gateway.remove_pinned(&TabId::from("t1")).unwrap();
        assert!(gateway.pinned().is_empty());
    }

    #[test]
    fn test_favorites_reject_duplicates() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        let favorite = FavoriteBlock {
            id: ContentId::Block(5),
            icon: "ti ti-cube".to_string(),
            title: "Five".to_string(),
        };
        gateway.add_favorite(favorite.clone()).unwrap();
        assert!(matches!(
            gateway.add_favorite(favorite),
            Err(TabsError::FavoriteExists)
        ));
        gateway.remove_favorite(&ContentId::Block(5)).unwrap();
        assert!(matches!(
            gateway.remove_favorite(&ContentId::Block(5)),
            Err(TabsError::FavoriteMissing)
        ));
    }

    #[test]
    fn test_corrupt_list_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(TABS_NAMESPACE, PINNED_KEY, "{not json").unwrap();
        store.set(TABS_NAMESPACE, FAVORITES_KEY, "[]").unwrap();
        let mut gateway = PersistenceGateway::new(store);
        gateway.load().unwrap();
        assert!(gateway.pinned().is_empty());
    }

    #[test]
    fn test_clear_all_writes_empty_lists() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        gateway.add_recently_closed(&tab("t1", 1), 5).unwrap();
        gateway.clear_all().unwrap();
        assert_eq!(
            gateway.store().get(TABS_NAMESPACE, RECENTLY_CLOSED_KEY).unwrap().as_deref(),
            Some("[]")
        );
        assert!(gateway.recently_closed().is_empty());
    }

    #[test]
    fn test_workspace_roundtrip_keeps_panels() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        let tabs = vec![tab("t1", 1), tab("t2", 2)];
        gateway.write_workspace("100_W", &tabs).unwrap();
        gateway
            .write_scroll("100_W", &HashMap::from([(PanelId::from("p1"), 120.0)]))
            .unwrap();

        let woken = gateway.read_workspace("100_W").unwrap().unwrap();
        let woken = wake_tabs(woken, RecordOrigin::Workspace, &PanelId::from("other"));
        assert_eq!(woken, tabs);
        assert_eq!(gateway.read_scroll("100_W").unwrap()[&PanelId::from("p1")], 120.0);
        assert_eq!(gateway.workspace_keys().unwrap(), vec!["100_W"]);

        gateway.remove_workspace("100_W").unwrap();
        assert!(gateway.read_workspace("100_W").unwrap().is_none());
        assert!(gateway.read_scroll("100_W").unwrap().is_empty());
    }

    #[test]
    fn test_detached_records_wake_into_panel() {
        let mut record = tab("t1", 1).detached();
        record.is_active = true;
        let woken = wake_tabs(vec![record], RecordOrigin::RecentlyClosed, &PanelId::from("p9"));
        assert_eq!(woken[0].panel_id, PanelId::from("p9"));
        assert!(!woken[0].is_active);
    }
}
