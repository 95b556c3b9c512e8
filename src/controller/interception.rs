//! Before-command hooks and wrapped navigation primitives.
//!
//! The host routes each registered command or primitive to the matching
//! method here. Methods that delegate call the host's original primitive
//! through `HostNavigator`, which never re-enters the engine.

use super::{TabController, TabTarget};
use crate::content::{ContentId, PanelId};
use crate::error::TabsError;
use crate::host::{
    CommandDisposition, Gesture, HostApp, HostCommand, NavPrimitive, NotifyLevel, PanelDirection,
};
use crate::persistence::KeyValueStore;

impl<H: HostApp, S: KeyValueStore> TabController<H, S> {
    pub(super) fn install_hooks(&mut self) {
        for command in HostCommand::ALL {
            let handle = self.host.register_before_command(command);
            self.command_hooks.push(handle);
        }
        for primitive in NavPrimitive::ALL {
            let handle = self.host.install_interceptor(primitive);
            self.interceptors.push(handle);
        }
        crate::debug_info!(
            "HOOKS",
            "installed {} command hooks and {} interceptors",
            self.command_hooks.len(),
            self.interceptors.len()
        );
    }

    pub(super) fn remove_hooks(&mut self) {
        for handle in self.command_hooks.drain(..) {
            self.host.unregister_before_command(handle);
        }
        for handle in self.interceptors.drain(..) {
            self.host.remove_interceptor(handle);
        }
    }

    /// Runs before a hooked host command.
    ///
    /// Back and forward are always absorbed into the focused tab's own
    /// history. Panel-closing commands drop the affected tabs first and let
    /// the host proceed, unless only one panel is left.
    pub fn before_command(&mut self, command: HostCommand) -> CommandDisposition {
        match command {
            HostCommand::GoBack => {
                self.navigate_back();
                CommandDisposition::Suppress
            }
            HostCommand::GoForward => {
                self.navigate_forward();
                CommandDisposition::Suppress
            }
            HostCommand::ClosePanel | HostCommand::CloseOtherPanels
                if self.store.panel_count() <= 1 =>
            {
                crate::debug_log!("HOOKS", "{} refused, single panel", command.name());
                self.report(&TabsError::SinglePanel);
                CommandDisposition::Suppress
            }
            HostCommand::ClosePanel => {
                let panel = self.host.active_panel();
                let purged = self.store.purge_panel(&panel);
                self.previous_active.remove(&panel);
                log::info!("Panel {} closing, dropped {} tabs", panel, purged.len());
                self.render();
                CommandDisposition::Proceed
            }
            HostCommand::CloseOtherPanels => {
                let keep = self.host.active_panel();
                let mut dropped = 0;
                for panel in self.store.panels() {
                    if panel != keep {
                        dropped += self.store.purge_panel(&panel).len();
                        self.previous_active.remove(&panel);
                    }
                }
                log::info!("Closing panels other than {}, dropped {} tabs", keep, dropped);
                self.render();
                CommandDisposition::Proceed
            }
        }
    }

    /// Wrapped go-to-view.
    ///
    /// The background-tab gesture opens `target` in a new tab without
    /// navigating. Otherwise focus is moved to the target panel first so the
    /// resulting history event lands in the right tab.
    pub fn on_go_to(&mut self, target: &ContentId, panel: Option<&PanelId>, gesture: Gesture) {
        if gesture == Gesture::BackgroundTab {
            let tab_panel = match panel {
                Some(p) if self.store.has_panel(p) => p.clone(),
                _ => self.tab_panel(),
            };
            self.create_tab_in(&tab_panel, TabTarget::Content(target.clone()), false);
            self.notify(NotifyLevel::Success, "opened background tab");
            return;
        }

        if let Some(p) = panel
            && *p != self.host.active_panel()
            && self.store.has_panel(p)
        {
            self.host.switch_focus(p);
        }
        self.host.go_to(target, panel);
    }

    /// Wrapped add-panel: the new panel gets a seeded first tab.
    pub fn on_add_panel(
        &mut self,
        anchor: &PanelId,
        direction: PanelDirection,
        initial: Option<&ContentId>,
    ) -> Option<PanelId> {
        let panel = self.host.add_panel(anchor, direction, initial)?;
        self.create_tab_for_new_panel(&panel, true);
        Some(panel)
    }

    /// Wrapped open-in-last-panel.
    ///
    /// The foreground-tab gesture opens `target` in a new tab and switches
    /// to it. Otherwise the host's behavior runs, and a panel it focused that
    /// has no tabs yet gets its first one.
    pub fn on_open_in_last_panel(&mut self, target: &ContentId, gesture: Gesture) {
        if gesture == Gesture::ForegroundTab {
            self.create_tab(TabTarget::Content(target.clone()), true);
            self.notify(NotifyLevel::Success, "opened foreground tab");
            return;
        }

        self.host.open_in_last_panel(target);
        let panel = self.host.active_panel();
        if !self.store.has_panel(&panel) {
            self.create_tab_for_new_panel(&panel, false);
        }
    }
}
