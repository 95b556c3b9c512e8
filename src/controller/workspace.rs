//! Workspace snapshots: swapping the whole tab universe and host layout.
//!
//! A workspace is stored under `<millis>_<name>` as a map of tab records,
//! with per-panel scroll offsets kept alongside under the same key. The
//! layout that was live before entering any workspace is kept as the exit
//! point, which `exit_workspace` returns to.

use super::TabController;
use crate::content::{ContentId, PanelId, today};
use crate::error::{TabsError, TabsResult};
use crate::host::{HostApp, NotifyLevel, PanelDirection};
use crate::persistence::{KeyValueStore, RecordOrigin, WORKSPACE_EXIT_KEY, wake_tabs};
use chrono::Utc;
use std::collections::HashMap;

/// The user-facing name inside a workspace key (`<millis>_<name>`).
pub fn workspace_display_name(key: &str) -> &str {
    match key.split_once('_') {
        Some((stamp, name)) if stamp.chars().all(|c| c.is_ascii_digit()) => name,
        _ => key,
    }
}

impl<H: HostApp, S: KeyValueStore> TabController<H, S> {
    /// Saved workspace keys, oldest first.
    pub fn list_workspaces(&self) -> Vec<String> {
        match self.gateway.workspace_keys() {
            Ok(keys) => keys,
            Err(e) => {
                log::error!("Failed to list workspaces: {}", e);
                Vec::new()
            }
        }
    }

    /// Save the current tabs as a new workspace and return its key.
    ///
    /// An empty name becomes today's `M-D`. With `only_active_tab` just the
    /// focused panel's active tab is saved.
    pub fn save_workspace(&mut self, name: &str, only_active_tab: bool) -> Option<String> {
        match self.save_snapshot(name, only_active_tab) {
            Ok(key) => {
                self.notify(NotifyLevel::Success, "workspace saved");
                Some(key)
            }
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    fn save_snapshot(&mut self, name: &str, only_active_tab: bool) -> TabsResult<String> {
        let name = match name.trim() {
            "" => today().format("%-m-%-d").to_string(),
            trimmed => trimmed.to_string(),
        };
        let key = format!("{}_{}", Utc::now().timestamp_millis(), name);
        if name == WORKSPACE_EXIT_KEY || self.gateway.has_workspace(&key)? {
            return Err(TabsError::WorkspaceNameTaken(name));
        }

        if only_active_tab {
            let panel = self.host.active_panel();
            let mut tab = self
                .store
                .active_tab(&panel)
                .cloned()
                .ok_or(TabsError::NoActiveTab)?;
            tab.is_active = true;
            self.gateway.write_workspace(&key, [&tab])?;
            let scroll: HashMap<PanelId, f64> = self
                .scroll_snapshot()
                .into_iter()
                .filter(|(p, _)| *p == panel)
                .collect();
            self.gateway.write_scroll(&key, &scroll)?;
        } else {
            self.gateway.write_workspace(&key, self.store.tabs())?;
            let scroll = self.scroll_snapshot();
            self.gateway.write_scroll(&key, &scroll)?;
        }
        log::info!("Saved workspace {} ({} tabs)", key, self.store.len());
        Ok(key)
    }

    /// Open a saved workspace. An empty key returns to the exit point.
    pub fn open_workspace(&mut self, key: &str) -> bool {
        let result = self.enter(key);
        self.fold(result)
    }

    /// Leave the open workspace and restore the layout from before it.
    pub fn exit_workspace(&mut self) -> bool {
        self.open_workspace("")
    }

    fn enter(&mut self, key: &str) -> TabsResult<()> {
        let target = (!key.is_empty()).then(|| key.to_string());
        if self.workspace == target {
            let shown = target
                .as_deref()
                .map(workspace_display_name)
                .unwrap_or("exit point");
            return Err(TabsError::WorkspaceAlreadyOpen(shown.to_string()));
        }
        let source = target.as_deref().unwrap_or(WORKSPACE_EXIT_KEY);
        let tabs = self
            .gateway
            .read_workspace(source)?
            .filter(|tabs| !tabs.is_empty())
            .ok_or_else(|| {
                TabsError::WorkspaceMissing(workspace_display_name(source).to_string())
            })?;
        let scroll = self.gateway.read_scroll(source)?;

        // Everything the old layout can tell us is read before it is torn down
        let leaving_scroll = self.scroll_snapshot();
        self.sync.begin_workspace_switch();
        let anchor = self.host.active_panel();
        let Some(temporary) = self.host.add_panel(&anchor, PanelDirection::Right, None) else {
            self.sync.end_workspace_switch();
            return Err(TabsError::PanelRefused);
        };

        let saved = self.save_departure(target.is_none(), &leaving_scroll);
        if let Err(e) = saved {
            self.host.close_panel(&temporary);
            self.sync.end_workspace_switch();
            self.last_history_len = self.host.history_len();
            return Err(e);
        }

        self.workspace = target;
        self.store
            .replace_all(wake_tabs(tabs, RecordOrigin::Workspace, &PanelId::default()));
        self.previous_active.clear();
        self.last_tab_panel = None;

        self.rebuild_layout(&temporary, &scroll);
        self.sync.end_workspace_switch();
        self.last_history_len = self.host.history_len();

        log::info!(
            "Opened workspace {} ({} tabs, {} panels)",
            self.workspace.as_deref().unwrap_or(WORKSPACE_EXIT_KEY),
            self.store.len(),
            self.store.panel_count()
        );
        self.render();
        Ok(())
    }

    /// Write what is being left: the exit point when leaving the normal
    /// layout, otherwise the open workspace. Returning to the exit point
    /// consumes it.
    fn save_departure(
        &mut self,
        exiting: bool,
        scroll: &HashMap<PanelId, f64>,
    ) -> TabsResult<()> {
        match self.workspace.clone() {
            None => {
                self.gateway.write_workspace(WORKSPACE_EXIT_KEY, self.store.tabs())?;
                self.gateway.write_scroll(WORKSPACE_EXIT_KEY, scroll)?;
            }
            Some(current) => {
                self.gateway.write_workspace(&current, self.store.tabs())?;
                self.gateway.write_scroll(&current, scroll)?;
                if exiting {
                    self.gateway.remove_exit_point()?;
                }
            }
        }
        Ok(())
    }

    /// Replace every host panel with one panel per active tab of the store.
    ///
    /// `temporary` anchors the rebuild so the host never runs out of panels
    /// while the old layout is torn down; it is closed at the end.
    fn rebuild_layout(&mut self, temporary: &PanelId, scroll: &HashMap<PanelId, f64>) {
        self.host.close_all_but(temporary);

        let actives: Vec<(PanelId, ContentId)> = self
            .store
            .active_tabs()
            .into_iter()
            .map(|tab| (tab.panel_id.clone(), tab.current.clone()))
            .collect();

        let mut mapping = HashMap::new();
        for (old_panel, content) in actives {
            let anchor = self.host.active_panel();
            let Some(new_panel) = self
                .host
                .add_panel(&anchor, PanelDirection::Left, Some(&content))
            else {
                log::error!("Host refused a panel for workspace panel {}", old_panel);
                self.store.purge_panel(&old_panel);
                continue;
            };
            if self.config.workspace_scroll_restore
                && let Some(top) = scroll.get(&old_panel).filter(|top| **top > 0.0)
            {
                self.host.scroll_to(&new_panel, *top);
            }
            crate::debug_log!("WORKSPACE", "panel {} rebuilt as {}", old_panel, new_panel);
            mapping.insert(old_panel, new_panel);
        }
        self.store.remap_panels(&mapping);
        self.host.close_panel(temporary);
    }

    /// Scroll offsets of every panel that holds tabs
    fn scroll_snapshot(&self) -> HashMap<PanelId, f64> {
        self.store
            .panels()
            .into_iter()
            .filter_map(|panel| {
                let top = self.host.find_view_panel(&panel)?.scroll_top?;
                Some((panel, top))
            })
            .collect()
    }

    /// Delete a saved workspace, leaving it first if it is open.
    pub fn delete_workspace(&mut self, key: &str) -> bool {
        let result = self.remove_workspace(key);
        let removed = self.fold(result);
        if removed {
            self.notify(NotifyLevel::Success, "workspace deleted");
        }
        removed
    }

    fn remove_workspace(&mut self, key: &str) -> TabsResult<()> {
        if self.workspace.as_deref() == Some(key) {
            self.leave_for_removal();
        }
        self.gateway.remove_workspace(key)?;
        log::info!("Deleted workspace {}", key);
        Ok(())
    }

    /// Delete every saved workspace, leaving the open one first.
    pub fn delete_all_workspaces(&mut self) -> bool {
        if self.workspace.is_some() {
            self.leave_for_removal();
        }
        let result = self.gateway.clear_workspaces();
        let cleared = self.fold(result);
        if cleared {
            log::info!("Deleted all workspaces");
        }
        cleared
    }

    /// Exit before a workspace's record is removed. If there is no exit
    /// point to go back to, the tabs stay but stop being saved under the key.
    fn leave_for_removal(&mut self) {
        if let Err(e) = self.enter("") {
            log::warn!("Could not exit workspace before removal: {}", e);
            self.workspace = None;
        }
    }
}
