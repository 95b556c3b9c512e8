//! Tab store: the single owner of tab records.
//!
//! Besides the records it maintains three derived indexes that must always
//! agree with them:
//! - the active-tab map (at most one active tab per panel),
//! - per-panel id sets in insertion order,
//! - per-panel sorted views in presentation order.
//!
//! Every structural mutation goes through a method here, and each one brings
//! the sorted view of the affected panel(s) back in line before returning.
//! Mutators are crate-private; the controller is their only caller.

use super::Tab;
use super::sorting::presentation_order;
use crate::content::{PanelId, TabId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct TabStore {
    tabs: HashMap<TabId, Tab>,
    active: HashMap<PanelId, TabId>,
    panel_tabs: HashMap<PanelId, Vec<TabId>>,
    sorted: HashMap<PanelId, Vec<TabId>>,
}

impl TabStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn contains(&self, id: &TabId) -> bool {
        self.tabs.contains_key(id)
    }

    pub fn get(&self, id: &TabId) -> Option<&Tab> {
        self.tabs.get(id)
    }

    /// Every tab, in no particular order
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.values()
    }

    /// Panels that hold at least one tab, in id order
    pub fn panels(&self) -> Vec<PanelId> {
        let mut panels: Vec<PanelId> = self.panel_tabs.keys().cloned().collect();
        panels.sort();
        panels
    }

    pub fn panel_count(&self) -> usize {
        self.panel_tabs.len()
    }

    pub fn has_panel(&self, panel: &PanelId) -> bool {
        self.panel_tabs.contains_key(panel)
    }

    /// Ids of a panel's tabs in insertion order
    pub fn panel_tab_ids(&self, panel: &PanelId) -> &[TabId] {
        self.panel_tabs.get(panel).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn active_id(&self, panel: &PanelId) -> Option<&TabId> {
        self.active.get(panel)
    }

    pub fn active_tab(&self, panel: &PanelId) -> Option<&Tab> {
        self.active.get(panel).and_then(|id| self.tabs.get(id))
    }

    /// Active tab of every panel, in panel id order
    pub fn active_tabs(&self) -> Vec<&Tab> {
        self.panels()
            .iter()
            .filter_map(|panel| self.active_tab(panel))
            .collect()
    }

    /// Ids of a panel's tabs in presentation order
    pub fn sorted_ids(&self, panel: &PanelId) -> &[TabId] {
        self.sorted.get(panel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A panel's tabs in presentation order
    pub fn sorted_tabs(&self, panel: &PanelId) -> Vec<&Tab> {
        self.sorted_ids(panel)
            .iter()
            .filter_map(|id| self.tabs.get(id))
            .collect()
    }

    /// Position of a tab within its panel's sorted view
    pub fn sorted_position(&self, id: &TabId) -> Option<usize> {
        let tab = self.tabs.get(id)?;
        self.sorted_ids(&tab.panel_id).iter().position(|t| t == id)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub(crate) fn get_mut(&mut self, id: &TabId) -> Option<&mut Tab> {
        self.tabs.get_mut(id)
    }

    /// Insert a tab into its panel. It becomes the active tab only when the
    /// panel had no tabs before.
    pub(crate) fn insert(&mut self, mut tab: Tab) {
        let panel = tab.panel_id.clone();
        let id = tab.id.clone();
        let first_in_panel = !self.has_panel(&panel);

        tab.is_active = first_in_panel;
        if first_in_panel {
            self.active.insert(panel.clone(), id.clone());
        }
        self.tabs.insert(id.clone(), tab);
        self.panel_tabs.entry(panel.clone()).or_default().push(id);
        self.resort(&panel);
    }

    /// Make `id` the active tab of its panel. Returns the previously active id.
    pub(crate) fn set_active(&mut self, id: &TabId) -> Option<TabId> {
        let panel = self.tabs.get(id)?.panel_id.clone();
        let previous = self.active.insert(panel, id.clone());
        if let Some(prev) = previous.as_ref().and_then(|p| self.tabs.get_mut(p)) {
            prev.is_active = false;
        }
        if let Some(tab) = self.tabs.get_mut(id) {
            tab.is_active = true;
        }
        previous.filter(|p| p != id)
    }

    /// Remove a tab. The panel's active slot is cleared if it held this tab;
    /// choosing a successor is the caller's decision.
    pub(crate) fn remove(&mut self, id: &TabId) -> Option<Tab> {
        let tab = self.tabs.remove(id)?;
        let panel = tab.panel_id.clone();
        if self.active.get(&panel) == Some(id) {
            self.active.remove(&panel);
        }
        self.detach_from_panel(id, &panel);
        Some(tab)
    }

    /// Remove every tab of a panel and forget the panel.
    pub(crate) fn purge_panel(&mut self, panel: &PanelId) -> Vec<Tab> {
        let ids = self.panel_tabs.remove(panel).unwrap_or_default();
        self.sorted.remove(panel);
        self.active.remove(panel);
        ids.iter().filter_map(|id| self.tabs.remove(id)).collect()
    }

    /// Move a tab to another panel, where it arrives inactive (or active if
    /// the destination had no tabs).
    pub(crate) fn relocate(&mut self, id: &TabId, to: &PanelId) -> bool {
        let Some(mut tab) = self.remove(id) else {
            return false;
        };
        tab.panel_id = to.clone();
        self.insert(tab);
        true
    }

    pub(crate) fn set_pinned(&mut self, id: &TabId, pinned: bool, pin_order: i64) -> bool {
        let Some(tab) = self.tabs.get_mut(id) else {
            return false;
        };
        tab.is_pinned = pinned;
        tab.pin_order = if pinned { pin_order } else { 0 };
        let panel = tab.panel_id.clone();
        self.resort(&panel);
        true
    }

    /// Replace the whole store with `tabs`, rebuilding every index.
    ///
    /// Active flags on the records are honored (first one wins per panel); a
    /// panel without any flagged tab gets its first tab in presentation order.
    pub(crate) fn replace_all(&mut self, tabs: impl IntoIterator<Item = Tab>) {
        self.clear();
        let mut flagged: Vec<TabId> = Vec::new();
        for tab in tabs {
            if tab.is_active {
                flagged.push(tab.id.clone());
            }
            let panel = tab.panel_id.clone();
            self.panel_tabs
                .entry(panel)
                .or_default()
                .push(tab.id.clone());
            self.tabs.insert(tab.id.clone(), tab);
        }
        for tab in self.tabs.values_mut() {
            tab.is_active = false;
        }
        for panel in self.panels() {
            self.resort(&panel);
        }
        for id in flagged {
            let Some(panel) = self.tabs.get(&id).map(|t| t.panel_id.clone()) else {
                continue;
            };
            if !self.active.contains_key(&panel) {
                self.set_active(&id);
            }
        }
        for panel in self.panels() {
            if !self.active.contains_key(&panel)
                && let Some(first) = self.sorted_ids(&panel).first().cloned()
            {
                self.set_active(&first);
            }
        }
    }

    /// Re-key panels after the host rebuilt its layout.
    pub(crate) fn remap_panels(&mut self, mapping: &HashMap<PanelId, PanelId>) {
        let mut tabs: Vec<Tab> = self
            .tabs
            .drain()
            .map(|(_, mut tab)| {
                if let Some(new_panel) = mapping.get(&tab.panel_id) {
                    tab.panel_id = new_panel.clone();
                }
                tab
            })
            .collect();
        let order: HashMap<TabId, usize> = self
            .panel_tabs
            .values()
            .flat_map(|ids| ids.iter().cloned().enumerate().map(|(i, id)| (id, i)))
            .collect();
        tabs.sort_by_key(|tab| order.get(&tab.id).copied().unwrap_or(usize::MAX));
        self.replace_all(tabs);
    }

    pub(crate) fn clear(&mut self) {
        self.tabs.clear();
        self.active.clear();
        self.panel_tabs.clear();
        self.sorted.clear();
    }

    fn detach_from_panel(&mut self, id: &TabId, panel: &PanelId) {
        let emptied = match self.panel_tabs.get_mut(panel) {
            Some(ids) => {
                ids.retain(|t| t != id);
                ids.is_empty()
            }
            None => false,
        };
        if emptied {
            self.panel_tabs.remove(panel);
            self.sorted.remove(panel);
            self.active.remove(panel);
        } else {
            self.resort(panel);
        }
    }

    fn resort(&mut self, panel: &PanelId) {
        let Some(ids) = self.panel_tabs.get(panel) else {
            self.sorted.remove(panel);
            return;
        };
        let mut tabs: Vec<&Tab> = ids.iter().filter_map(|id| self.tabs.get(id)).collect();
        tabs.sort_by(|a, b| presentation_order(a, b));
        let sorted = tabs.into_iter().map(|t| t.id.clone()).collect();
        self.sorted.insert(panel.clone(), sorted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentId;
    use crate::naming::TabLabel;
    use chrono::DateTime;

    fn tab(id: &str, panel: &str, created_ms: i64) -> Tab {
        Tab::new(
            TabId::from(id),
            PanelId::from(panel),
            ContentId::Block(created_ms as u64),
            TabLabel {
                name: id.to_string(),
                icon: "ti ti-cube".to_string(),
            },
            DateTime::from_timestamp_millis(created_ms).unwrap(),
        )
    }

    fn sorted(store: &TabStore, panel: &str) -> Vec<String> {
        store
            .sorted_ids(&PanelId::from(panel))
            .iter()
            .map(|id| id.to_string())
            .collect()
    }

    /// Every panel has exactly one active tab and the flags agree with the map.
    fn assert_consistent(store: &TabStore) {
        for panel in store.panels() {
            let active: Vec<&Tab> = store
                .sorted_tabs(&panel)
                .into_iter()
                .filter(|t| t.is_active)
                .collect();
            assert_eq!(active.len(), 1, "panel {panel} active count");
            assert_eq!(store.active_id(&panel), Some(&active[0].id));
            assert_eq!(
                store.sorted_ids(&panel).len(),
                store.panel_tab_ids(&panel).len()
            );
        }
    }

    #[test]
    fn test_first_tab_in_panel_becomes_active() {
        let mut store = TabStore::new();
        store.insert(tab("t1", "p", 10));
        store.insert(tab("t2", "p", 20));
        assert_eq!(store.active_id(&PanelId::from("p")).unwrap().as_str(), "t1");
        assert!(!store.get(&TabId::from("t2")).unwrap().is_active);
        assert_eq!(sorted(&store, "p"), vec!["t1", "t2"]);
        assert_consistent(&store);
    }

    #[test]
    fn test_pin_reorders_cache() {
        let mut store = TabStore::new();
        for (id, ms) in [("t1", 10), ("t2", 20), ("t3", 30), ("t4", 40)] {
            store.insert(tab(id, "p", ms));
        }
        store.set_pinned(&TabId::from("t1"), true, 1000);
        store.set_pinned(&TabId::from("t2"), true, 2000);
        assert_eq!(sorted(&store, "p"), vec!["t2", "t1", "t3", "t4"]);

        store.set_pinned(&TabId::from("t2"), false, 0);
        assert_eq!(store.get(&TabId::from("t2")).unwrap().pin_order, 0);
        assert_eq!(sorted(&store, "p"), vec!["t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn test_remove_last_tab_forgets_panel() {
        let mut store = TabStore::new();
        store.insert(tab("t1", "p", 10));
        store.insert(tab("t2", "q", 20));
        store.remove(&TabId::from("t1"));
        assert!(!store.has_panel(&PanelId::from("p")));
        assert!(store.sorted_ids(&PanelId::from("p")).is_empty());
        assert_eq!(store.panel_count(), 1);
    }

    #[test]
    fn test_relocate_updates_both_panels() {
        let mut store = TabStore::new();
        store.insert(tab("t1", "p", 10));
        store.insert(tab("t2", "p", 20));
        store.insert(tab("t3", "q", 30));

        assert!(store.relocate(&TabId::from("t2"), &PanelId::from("q")));
        assert_eq!(sorted(&store, "p"), vec!["t1"]);
        assert_eq!(sorted(&store, "q"), vec!["t2", "t3"]);
        assert_eq!(store.get(&TabId::from("t2")).unwrap().panel_id.as_str(), "q");
        assert_consistent(&store);
    }

    #[test]
    fn test_set_active_clears_previous_flag() {
        let mut store = TabStore::new();
        store.insert(tab("t1", "p", 10));
        store.insert(tab("t2", "p", 20));
        let previous = store.set_active(&TabId::from("t2"));
        assert_eq!(previous, Some(TabId::from("t1")));
        assert!(!store.get(&TabId::from("t1")).unwrap().is_active);
        assert_consistent(&store);

        assert_eq!(store.set_active(&TabId::from("t2")), None);
    }

    #[test]
    fn test_replace_all_repairs_active_slots() {
        let mut store = TabStore::new();
        let mut a = tab("a", "p", 10);
        a.is_active = true;
        let mut b = tab("b", "p", 20);
        b.is_active = true;
        let c = tab("c", "q", 30);
        let d = tab("d", "q", 5);
        store.replace_all(vec![a, b, c, d]);

        assert_eq!(store.active_id(&PanelId::from("p")).unwrap().as_str(), "a");
        assert_eq!(store.active_id(&PanelId::from("q")).unwrap().as_str(), "d");
        assert_consistent(&store);
    }

    #[test]
    fn test_remap_panels_keeps_active_tabs() {
        let mut store = TabStore::new();
        store.insert(tab("t1", "old-a", 10));
        store.insert(tab("t2", "old-a", 20));
        store.insert(tab("t3", "old-b", 30));
        store.set_active(&TabId::from("t2"));

        let mapping = HashMap::from([
            (PanelId::from("old-a"), PanelId::from("new-a")),
            (PanelId::from("old-b"), PanelId::from("old-a")),
        ]);
        store.remap_panels(&mapping);

        assert_eq!(sorted(&store, "new-a"), vec!["t1", "t2"]);
        assert_eq!(sorted(&store, "old-a"), vec!["t3"]);
        assert_eq!(store.active_id(&PanelId::from("new-a")).unwrap().as_str(), "t2");
        assert_consistent(&store);
    }

    #[test]
    fn test_purge_panel_returns_tabs() {
        let mut store = TabStore::new();
        store.insert(tab("t1", "p", 10));
        store.insert(tab("t2", "p", 20));
        store.insert(tab("t3", "q", 30));
        let purged = store.purge_panel(&PanelId::from("p"));
        assert_eq!(purged.len(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.active_id(&PanelId::from("p")).is_none());
    }
}
