//! Tab lifecycle: create, switch, delete, move, pin, import, favorites

use super::TabController;
use crate::content::{ContentId, PanelId, TabId};
use crate::error::{TabsError, TabsResult};
use crate::host::{HostApp, NotifyLevel};
use crate::persistence::{FavoriteBlock, KeyValueStore, RecordOrigin, wake_tabs};
use crate::tab::Tab;

/// What a new tab should show.
#[derive(Debug, Clone, PartialEq)]
pub enum TabTarget {
    /// Whatever the panel currently shows (today's day log if nothing)
    PanelContent,
    /// Today's day log
    TodayJournal,
    Content(ContentId),
}

/// Direction for cycling through a panel's sorted tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cycle {
    Next,
    Previous,
}

impl<H: HostApp, S: KeyValueStore> TabController<H, S> {
    // ========================================================================
    // Create
    // ========================================================================

    /// Create a tab in the panel new tabs go to (see [`Self::create_tab_in`]).
    pub fn create_tab(&mut self, target: TabTarget, switch: bool) -> TabId {
        let panel = self.tab_panel();
        self.create_tab_in(&panel, target, switch)
    }

    /// Create a tab in `panel`.
    ///
    /// The tab becomes the panel's active tab only if the panel had no tabs.
    /// With `switch` it is then switched to; otherwise the UI is re-rendered.
    pub fn create_tab_in(&mut self, panel: &PanelId, target: TabTarget, switch: bool) -> TabId {
        let content = self.resolve_target(panel, target);
        let label = self.label_for(Some(&content));
        let id = self.ids.next_id(|id| self.store.contains(id));
        let tab = Tab::new(
            id.clone(),
            panel.clone(),
            content,
            label,
            self.clock.stamp(),
        );
        self.store.insert(tab);
        log::info!(
            "Created tab {} in panel {} (panel tabs: {})",
            id,
            panel,
            self.store.panel_tab_ids(panel).len()
        );

        if switch {
            let result = self.switch_to(&id);
            self.fold(result);
        } else {
            self.render();
        }
        id
    }

    /// Create and seed the first tab of a panel the host just opened.
    pub(super) fn create_tab_for_new_panel(&mut self, panel: &PanelId, focus: bool) -> TabId {
        if focus && self.host.active_panel() != *panel {
            self.host.switch_focus(panel);
        }
        let id = self.create_tab_in(panel, TabTarget::PanelContent, false);
        self.seed_history(&id);
        // The host's entry for the panel's initial content is now accounted for.
        self.last_history_len = self.host.history_len();
        id
    }

    fn resolve_target(&self, panel: &PanelId, target: TabTarget) -> ContentId {
        let content = match target {
            TabTarget::PanelContent => self
                .host
                .find_view_panel(panel)
                .and_then(|view| view.content)
                .unwrap_or_else(ContentId::today),
            TabTarget::TodayJournal => ContentId::today(),
            TabTarget::Content(content) => content,
        };
        self.normalize(content)
    }

    /// A block that stands for a day-log entry is replaced by its date so
    /// equality checks treat it as a day view.
    fn normalize(&self, content: ContentId) -> ContentId {
        let Some(id) = content.block_id() else {
            return content;
        };
        match self.host.get_block(id) {
            Ok(Some(block)) => match block.repr {
                Some(repr) if repr.kind == "journal" => match repr.date {
                    Some(date) => ContentId::Journal(date),
                    None => content,
                },
                _ => content,
            },
            Ok(None) => content,
            Err(e) => {
                crate::debug_error!("TAB", "could not resolve block {}: {:#}", id, e);
                content
            }
        }
    }

    // ========================================================================
    // Switch
    // ========================================================================

    /// Bring a tab to the foreground of its panel and focus that panel.
    ///
    /// Switching to the already-active tab changes nothing.
    pub fn switch_tab(&mut self, id: &TabId) -> bool {
        let result = self.switch_to(id);
        self.fold(result)
    }

    pub(super) fn switch_to(&mut self, id: &TabId) -> TabsResult<()> {
        let panel = self
            .store
            .get(id)
            .ok_or_else(|| TabsError::UnknownTab(id.clone()))?
            .panel_id
            .clone();
        if self.host.active_panel() != panel {
            self.host.switch_focus(&panel);
        }
        self.last_tab_panel = Some(panel.clone());

        if self.store.active_id(&panel) == Some(id) {
            crate::debug_log!("TAB", "tab {} is already active", id);
            return Ok(());
        }
        self.activate(id, None)
    }

    /// Make `id` the active tab of its panel and bring the panel to its content.
    ///
    /// `replaced` is the content of an active tab that was removed just before,
    /// for when there is no previous active tab left to compare against.
    pub(super) fn activate(&mut self, id: &TabId, replaced: Option<ContentId>) -> TabsResult<()> {
        let panel = self
            .store
            .get(id)
            .ok_or_else(|| TabsError::UnknownTab(id.clone()))?
            .panel_id
            .clone();

        let previous = self.store.set_active(id);
        let previous_content = previous
            .as_ref()
            .and_then(|prev| self.store.get(prev))
            .map(|tab| tab.current.clone())
            .or(replaced);
        if let Some(prev) = previous {
            self.previous_active.insert(panel.clone(), prev);
        }

        self.heal_missing_content(id);
        let target = match self.store.get(id) {
            Some(tab) => tab.current.clone(),
            None => return Err(TabsError::UnknownTab(id.clone())),
        };

        if previous_content.as_ref() == Some(&target) {
            crate::debug_log!("TAB", "tab {} shows the same content, no navigation", id);
        } else {
            self.navigate_quietly(&target, &panel);
        }
        self.seed_history(id);

        log::debug!("Switched panel {} to tab {}", panel, id);
        self.render();
        Ok(())
    }

    /// Switch to the next tab of the focused panel, wrapping around.
    pub fn switch_to_next_tab(&mut self) -> bool {
        let result = self.cycle(Cycle::Next);
        self.fold(result)
    }

    /// Switch to the previous tab of the focused panel, wrapping around.
    pub fn switch_to_previous_tab(&mut self) -> bool {
        let result = self.cycle(Cycle::Previous);
        self.fold(result)
    }

    fn cycle(&mut self, direction: Cycle) -> TabsResult<()> {
        let panel = self.host.active_panel();
        let active = self
            .store
            .active_id(&panel)
            .cloned()
            .ok_or(TabsError::NoActiveTab)?;
        let sorted = self.store.sorted_ids(&panel);
        if sorted.len() <= 1 {
            return Err(TabsError::NoOtherTab);
        }
        let len = sorted.len();
        let index = sorted.iter().position(|t| *t == active).unwrap_or(0);
        let next = match direction {
            Cycle::Next => (index + 1) % len,
            Cycle::Previous => (index + len - 1) % len,
        };
        let target = sorted[next].clone();
        self.switch_to(&target)
    }

    /// Return to the tab that was active in `panel` before the current one.
    pub fn switch_previous_active_tab(&mut self, panel: &PanelId) -> bool {
        let previous = self.previous_active.get(panel).cloned().filter(|id| {
            self.store.get(id).is_some_and(|tab| tab.panel_id == *panel)
                && self.store.active_id(panel) != Some(id)
        });
        let result = match previous {
            Some(id) => self.switch_to(&id),
            None => Err(TabsError::NoPreviousTab),
        };
        self.fold(result)
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Close a tab.
    ///
    /// The tab is remembered as recently closed. Closing the last tab of a
    /// panel closes the panel; closing the very last tab is refused.
    pub fn delete_tab(&mut self, id: &TabId) -> bool {
        let result = self.remove_tab(id);
        self.fold(result)
    }

    fn remove_tab(&mut self, id: &TabId) -> TabsResult<()> {
        let tab = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| TabsError::UnknownTab(id.clone()))?;
        if self.store.len() <= 1 {
            return Err(TabsError::LastTab);
        }
        let panel = tab.panel_id.clone();

        let capacity = self.config.recently_closed_capacity;
        if let Err(e) = self.gateway.add_recently_closed(&tab, capacity) {
            log::error!("Failed to remember closed tab {}: {}", id, e);
        }
        if tab.is_pinned
            && self.workspace.is_none()
            && let Err(e) = self.gateway.remove_pinned(id)
        {
            log::error!("Failed to unpin closed tab {}: {}", id, e);
        }

        if self.store.panel_tab_ids(&panel).len() == 1 {
            self.store.purge_panel(&panel);
            self.previous_active.remove(&panel);
            self.host.close_panel(&panel);
            log::info!("Closed tab {} and its panel {}", id, panel);
            self.render();
            return Ok(());
        }

        let was_active = self.store.active_id(&panel) == Some(id);
        let position = self.store.sorted_position(id).unwrap_or(0);
        self.store.remove(id);
        self.previous_active.retain(|_, prev| prev != id);
        log::info!("Closed tab {} (total: {})", id, self.store.len());

        if was_active {
            // The neighbour one position closer to the top, or the new first tab
            let successor = self
                .store
                .sorted_ids(&panel)
                .get(position.saturating_sub(1))
                .cloned();
            if let Some(next) = successor {
                if self.host.active_panel() != panel {
                    self.host.switch_focus(&panel);
                }
                return self.activate(&next, Some(tab.current));
            }
        }
        self.render();
        Ok(())
    }

    // ========================================================================
    // Move
    // ========================================================================

    /// Move a tab into another panel that already holds tabs.
    pub fn move_tab_to_panel(&mut self, id: &TabId, to: &PanelId) -> bool {
        let result = self.relocate_tab(id, to);
        self.fold(result)
    }

    fn relocate_tab(&mut self, id: &TabId, to: &PanelId) -> TabsResult<()> {
        let from = self
            .store
            .get(id)
            .ok_or_else(|| TabsError::UnknownTab(id.clone()))?
            .panel_id
            .clone();
        if from == *to {
            return Err(TabsError::SamePanel(to.clone()));
        }
        if !self.store.has_panel(to) {
            return Err(TabsError::UnknownPanel(to.clone()));
        }
        if self.store.panel_tab_ids(&from).len() <= 1 {
            return Err(TabsError::SoleTabInPanel);
        }

        if self.store.active_id(&from) == Some(id) {
            if self.host.active_panel() == from {
                self.cycle(Cycle::Previous)?;
            } else {
                let sorted = self.store.sorted_ids(&from);
                let index = sorted.iter().position(|t| t == id).unwrap_or(0);
                let neighbour = if index == 0 { 1 } else { index - 1 };
                if let Some(next) = sorted.get(neighbour).cloned() {
                    self.activate(&next, None)?;
                }
            }
        }

        self.store.relocate(id, to);
        self.previous_active.retain(|_, prev| prev != id);
        log::debug!("Moved tab {} from panel {} to {}", id, from, to);
        self.render();
        Ok(())
    }

    // ========================================================================
    // Pin
    // ========================================================================

    /// Pin a tab to the top of its panel. Outside a workspace the pin is
    /// also persisted so the tab comes back on the next start.
    pub fn pin_tab(&mut self, id: &TabId) -> bool {
        let result = self.set_pinned(id, true);
        self.fold(result)
    }

    pub fn unpin_tab(&mut self, id: &TabId) -> bool {
        let result = self.set_pinned(id, false);
        self.fold(result)
    }

    fn set_pinned(&mut self, id: &TabId, pinned: bool) -> TabsResult<()> {
        let tab = self
            .store
            .get(id)
            .ok_or_else(|| TabsError::UnknownTab(id.clone()))?;
        if tab.is_pinned == pinned {
            return Ok(());
        }
        let order = if pinned { self.clock.stamp_millis() } else { 0 };
        self.store.set_pinned(id, pinned, order);
        log::debug!("Tab {} pinned: {}", id, pinned);
        self.render();

        if self.workspace.is_none() {
            if pinned {
                let record = self
                    .store
                    .get(id)
                    .cloned()
                    .ok_or_else(|| TabsError::UnknownTab(id.clone()))?;
                self.gateway.add_pinned(&record)?;
            } else {
                self.gateway.remove_pinned(id)?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Import / restore
    // ========================================================================

    /// Re-insert tab records into the panel new tabs go to, as inactive tabs.
    /// Records whose id is already open are skipped. Returns how many were added.
    pub fn import_tabs_to_active_panel(&mut self, tabs: Vec<Tab>) -> usize {
        let panel = self.tab_panel();
        let tabs = wake_tabs(tabs, RecordOrigin::RecentlyClosed, &panel);
        let imported = self.insert_imported(tabs);
        self.render();
        imported
    }

    pub(super) fn insert_imported(&mut self, tabs: Vec<Tab>) -> usize {
        let mut imported = 0;
        for tab in tabs {
            if self.store.contains(&tab.id) {
                crate::debug_log!("TAB", "tab {} already open, not imported", tab.id);
                continue;
            }
            self.store.insert(tab);
            imported += 1;
        }
        imported
    }

    /// Reopen a recently closed tab in the panel new tabs go to.
    pub fn restore_recently_closed(&mut self, id: &TabId) -> bool {
        let result = self.reopen(id);
        self.fold(result)
    }

    fn reopen(&mut self, id: &TabId) -> TabsResult<()> {
        if self.store.contains(id) {
            return Err(TabsError::AlreadyRestored(id.clone()));
        }
        let record = self
            .gateway
            .take_recently_closed(id)?
            .ok_or_else(|| TabsError::NotRecentlyClosed(id.clone()))?;
        self.import_tabs_to_active_panel(vec![record]);
        log::info!("Restored closed tab {}", id);

        // A tab closed while pinned comes back pinned, so its record does too
        if self.workspace.is_none()
            && let Some(tab) = self.store.get(id).filter(|t| t.is_pinned).cloned()
        {
            self.gateway.add_pinned(&tab)?;
        }
        Ok(())
    }

    /// Recently closed tabs, most recent first
    pub fn recently_closed(&self) -> &[Tab] {
        self.gateway.recently_closed()
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    pub fn favorites(&self) -> &[FavoriteBlock] {
        self.gateway.favorites()
    }

    /// Bookmark `content`. Refused if it is already a favorite.
    pub fn add_favorite(&mut self, content: ContentId) -> bool {
        let label = self.label_for(Some(&content));
        let favorite = FavoriteBlock {
            id: content,
            icon: label.icon,
            title: label.name,
        };
        let result = self.gateway.add_favorite(favorite);
        let added = self.fold(result);
        if added {
            self.notify(NotifyLevel::Success, "added to favorites");
            self.render();
        }
        added
    }

    pub fn remove_favorite(&mut self, content: &ContentId) -> bool {
        let result = self.gateway.remove_favorite(content);
        let removed = self.fold(result);
        if removed {
            self.render();
        }
        removed
    }

    /// Open a favorite as a background tab.
    pub fn open_favorite(&mut self, content: &ContentId) -> TabId {
        self.create_tab(TabTarget::Content(content.clone()), false)
    }

    /// Empty the pinned, recently-closed, and favorite lists.
    pub fn clear_persisted_data(&mut self) -> bool {
        let result = if self.config.enable_clear_data {
            self.gateway.clear_all()
        } else {
            Err(TabsError::ClearDataDisabled)
        };
        let cleared = self.fold(result);
        if cleared {
            self.notify(NotifyLevel::Success, "persisted data cleared");
        }
        cleared
    }
}
