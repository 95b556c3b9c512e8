//! Reconciling per-tab history with the host's shared history.
//!
//! The host only reports that its history grew. Growth caused by the engine
//! itself (switch, back, forward, move) is consumed; any other growth is a
//! user navigation and is recorded into the focused panel's active tab.

use super::TabController;
use crate::content::{ContentId, PanelId, TabId};
use crate::error::{TabsError, TabsResult};
use crate::history::{HistoryDirection, HistoryItem};
use crate::host::HostApp;
use crate::naming::TabLabel;
use crate::persistence::KeyValueStore;
use crate::sync_state::HistoryEvent;
use crate::tab::Tab;

impl<H: HostApp, S: KeyValueStore> TabController<H, S> {
    /// Entry point for the host's history-change notification.
    ///
    /// Shrinking (a panel closed) is ignored, as is everything during a
    /// workspace switch. An unchanged length still counts: a host whose
    /// history is full drops its oldest entry on every navigation.
    pub fn on_history_changed(&mut self) {
        let len = self.host.history_len();
        if self.sync.is_switching_workspace() {
            crate::debug_trace!("HISTORY", "workspace switch in progress, ignoring event");
            self.last_history_len = len;
            return;
        }
        if len < self.last_history_len {
            crate::debug_trace!(
                "HISTORY",
                "history shrank {} -> {}, nothing to record",
                self.last_history_len,
                len
            );
            self.last_history_len = len;
            return;
        }
        self.last_history_len = len;

        let panel = self.host.active_panel();
        if self.store.has_panel(&panel) {
            self.last_tab_panel = Some(panel);
        }

        match self.sync.on_growth() {
            HistoryEvent::Consumed => {
                crate::debug_log!("HISTORY", "consumed engine navigation");
                self.refresh_active_tab();
            }
            HistoryEvent::Record => {
                self.record_current_access();
                self.refresh_active_tab();
            }
            HistoryEvent::Ignored => {}
        }
    }

    /// Point the focused panel's active tab at what the host now shows.
    fn refresh_active_tab(&mut self) {
        let panel = self.host.active_panel();
        let Some(id) = self.store.active_id(&panel).cloned() else {
            return;
        };
        let Some(content) = self.host.find_view_panel(&panel).and_then(|v| v.content) else {
            return;
        };
        let label = self.label_for(Some(&content));
        if let Some(tab) = self.store.get_mut(&id) {
            tab.show(content, label);
        }
        self.render();
    }

    /// Record the host's current location into the focused panel's active tab.
    ///
    /// A pinned tab that already has its home entry does not record; the
    /// navigation escapes into a new tab instead.
    fn record_current_access(&mut self) {
        let panel = self.host.active_panel();
        let Some(id) = self.store.active_id(&panel).cloned() else {
            crate::debug_log!("HISTORY", "panel {} has no active tab, not recorded", panel);
            return;
        };
        let Some(content) = self.host.find_view_panel(&panel).and_then(|v| v.content) else {
            return;
        };
        let label = self.label_for(Some(&content));
        let item = HistoryItem::new(content.clone(), label.name.clone(), label.icon.clone());

        let max_back = self.config.max_back_stack;
        let Some(tab) = self.store.get_mut(&id) else {
            return;
        };
        if tab.history.current().is_some_and(|top| top.target == content) {
            crate::debug_trace!("HISTORY", "tab {} already at {}, not recorded", id, content);
            return;
        }
        if tab.is_pinned && !tab.history.is_empty() {
            tab.history.forward_stack.clear();
            self.escape_pinned(&id, &panel, content, label, item);
            return;
        }
        tab.history.record(item, max_back);
        crate::debug_log!(
            "HISTORY",
            "recorded {} into tab {} (depth {})",
            content,
            id,
            tab.history.back_stack.len()
        );
    }

    /// Open a new active tab for content the host navigated to from a pinned
    /// tab. The host already shows the content, so nothing is navigated.
    fn escape_pinned(
        &mut self,
        pinned: &TabId,
        panel: &PanelId,
        content: ContentId,
        label: TabLabel,
        item: HistoryItem,
    ) {
        let id = self.ids.next_id(|id| self.store.contains(id));
        let mut tab = Tab::new(id.clone(), panel.clone(), content, label, self.clock.stamp());
        tab.history.record(item, self.config.max_back_stack);
        self.store.insert(tab);
        self.store.set_active(&id);
        self.previous_active.insert(panel.clone(), pinned.clone());
        log::info!("Pinned tab {} navigated away, opened tab {}", pinned, id);
    }

    // ========================================================================
    // Back / forward
    // ========================================================================

    /// Step the focused panel's active tab back one entry.
    pub fn navigate_back(&mut self) -> bool {
        let result = self.step_history(HistoryDirection::Back);
        self.fold(result)
    }

    /// Step the focused panel's active tab forward one entry.
    pub fn navigate_forward(&mut self) -> bool {
        let result = self.step_history(HistoryDirection::Forward);
        self.fold(result)
    }

    fn step_history(&mut self, direction: HistoryDirection) -> TabsResult<()> {
        let panel = self.host.active_panel();
        let id = self
            .store
            .active_id(&panel)
            .cloned()
            .ok_or(TabsError::NoActiveTab)?;
        let (max_back, max_forward) = (self.config.max_back_stack, self.config.max_forward_stack);
        let tab = self
            .store
            .get_mut(&id)
            .ok_or_else(|| TabsError::UnknownTab(id.clone()))?;

        let item = match direction {
            HistoryDirection::Back => tab
                .history
                .step_back(max_forward)
                .cloned()
                .ok_or(TabsError::NoBackHistory)?,
            HistoryDirection::Forward => tab
                .history
                .step_forward(max_back)
                .cloned()
                .ok_or(TabsError::NoForwardHistory)?,
        };
        tab.show(
            item.target.clone(),
            TabLabel {
                name: item.name,
                icon: item.icon,
            },
        );
        crate::debug_log!("HISTORY", "tab {} {:?} to {}", id, direction, item.target);

        self.navigate_quietly(&item.target, &panel);
        self.render();
        Ok(())
    }

    /// Entries for a back or forward menu of the focused panel's active tab,
    /// newest first.
    pub fn history_entries(&self, direction: HistoryDirection) -> Vec<HistoryItem> {
        let panel = self.host.active_panel();
        self.store
            .active_tab(&panel)
            .map(|tab| {
                tab.history
                    .menu_entries(direction, self.config.history_menu_limit)
            })
            .unwrap_or_default()
    }

    /// Open a history menu entry. This is an ordinary navigation, recorded
    /// like any other.
    pub fn open_history_entry(&mut self, item: &HistoryItem) {
        let panel = self.host.active_panel();
        self.host.go_to(&item.target, Some(&panel));
    }
}
