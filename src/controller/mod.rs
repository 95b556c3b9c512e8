//! The tab controller.
//!
//! `TabController` is the single context object that owns the tab store, the
//! synchronization state, the persistence gateway, and the host handle. Every
//! operation the UI layer or the host can trigger is a method on it:
//!
//! - `lifecycle`: create, switch, delete, move, pin, import, favorites
//! - `history_sync`: host history events, back/forward, history menus
//! - `interception`: before-command hooks and wrapped navigation primitives
//! - `workspace`: save, open, exit, and delete workspace snapshots
//!
//! Public mutators return `bool` and report failures through the host's
//! notifier, so a command handler can simply chain on the result.

mod history_sync;
mod interception;
mod lifecycle;
mod workspace;

pub use lifecycle::TabTarget;
pub use workspace::workspace_display_name;

use crate::content::{Clock, ContentId, PanelId, TabId, TabIdGenerator};
use crate::error::{TabsError, TabsResult};
use crate::host::{HookHandle, HostApp, NotifyLevel};
use crate::naming::{self, TabLabel};
use crate::persistence::{KeyValueStore, PersistenceGateway, RecordOrigin, wake_tabs};
use crate::sync_state::{RenderGuard, SyncState};
use crate::tab::TabStore;
use std::collections::HashMap;
use tabsman_config::Config;

/// Called after every structural mutation with the current store.
pub type RenderCallback = Box<dyn FnMut(&TabStore)>;

pub struct TabController<H: HostApp, S: KeyValueStore> {
    host: H,
    gateway: PersistenceGateway<S>,
    config: Config,
    store: TabStore,
    sync: SyncState,
    render_guard: RenderGuard,
    render_callback: Option<RenderCallback>,
    /// Before-command hooks registered with the host
    command_hooks: Vec<HookHandle>,
    /// Navigation interceptors installed in the host
    interceptors: Vec<HookHandle>,
    clock: Clock,
    ids: TabIdGenerator,
    /// Host history length as of the last processed event
    last_history_len: usize,
    /// Per panel, the tab that was active before the current one
    previous_active: HashMap<PanelId, TabId>,
    /// Key of the open workspace; `None` at the exit point
    workspace: Option<String>,
    /// Last focused panel that holds tabs
    last_tab_panel: Option<PanelId>,
    started: bool,
}

impl<H: HostApp, S: KeyValueStore> TabController<H, S> {
    pub fn new(host: H, store: S, config: Config) -> Self {
        Self {
            host,
            gateway: PersistenceGateway::new(store),
            config,
            store: TabStore::new(),
            sync: SyncState::default(),
            render_guard: RenderGuard::default(),
            render_callback: None,
            command_hooks: Vec::new(),
            interceptors: Vec::new(),
            clock: Clock::new(),
            ids: TabIdGenerator::new(),
            last_history_len: 0,
            previous_active: HashMap::new(),
            workspace: None,
            last_tab_panel: None,
            started: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Read access to every tab, active map, and sorted view
    pub fn tabs(&self) -> &TabStore {
        &self.store
    }

    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    /// Key of the open workspace, `None` when at the exit point
    pub fn current_workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Install the render callback. It runs after every structural mutation.
    pub fn set_render_callback(&mut self, callback: impl FnMut(&TabStore) + 'static) {
        self.render_callback = Some(Box::new(callback));
    }

    // ========================================================================
    // Startup / teardown
    // ========================================================================

    /// Start managing tabs.
    ///
    /// Creates and seeds one tab per host panel, installs hooks, loads the
    /// persisted lists, restores pinned tabs into the focused panel, and drops
    /// any stale workspace exit point.
    pub fn start(&mut self) -> bool {
        if self.started {
            return true;
        }
        self.install_hooks();

        for panel in self.host.panel_ids() {
            if !self.store.has_panel(&panel) {
                self.create_tab_for_new_panel(&panel, false);
            }
        }
        self.sync = SyncState::Idle;
        self.last_history_len = self.host.history_len();

        if let Err(e) = self.gateway.load() {
            log::error!("Failed to load persisted tabs: {}", e);
            self.report(&e);
        }
        let panel = self.tab_panel();
        let pinned = wake_tabs(self.gateway.pinned().to_vec(), RecordOrigin::Pinned, &panel);
        let restored = self.insert_imported(pinned);
        if let Err(e) = self.gateway.remove_exit_point() {
            log::warn!("Failed to discard stale workspace exit point: {}", e);
        }

        self.started = true;
        log::info!(
            "Tab engine started: {} tabs across {} panels ({} pinned restored)",
            self.store.len(),
            self.store.panel_count(),
            restored
        );
        self.render();
        true
    }

    /// Tear down hooks and forget all in-memory state.
    pub fn destroy(&mut self) {
        self.remove_hooks();
        self.store.clear();
        self.previous_active.clear();
        self.workspace = None;
        self.last_tab_panel = None;
        self.sync = SyncState::Idle;
        self.render_guard = RenderGuard::Idle;
        self.render_callback = None;
        self.ids.reset();
        self.started = false;
        log::info!("Tab engine destroyed");
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Run the render callback. While a workspace is open the store is also
    /// written back under its key.
    pub fn render(&mut self) {
        if !self.render_guard.enter() {
            crate::debug_trace!("RENDER", "render requested during render, skipped");
            return;
        }
        if let Some(callback) = self.render_callback.as_mut() {
            callback(&self.store);
        }
        if let Some(key) = self.workspace.clone()
            && !self.sync.is_switching_workspace()
            && let Err(e) = self.gateway.write_workspace(&key, self.store.tabs())
        {
            log::error!("Failed to persist workspace {}: {}", key, e);
        }
        self.render_guard.leave();
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    /// Fold an internal result into the public success flag.
    fn fold(&mut self, result: TabsResult<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    fn report(&mut self, err: &TabsError) {
        match err.notify_level() {
            NotifyLevel::Error => log::error!("{}", err),
            NotifyLevel::Warn => log::warn!("{}", err),
            _ => log::debug!("{}", err),
        }
        self.notify(err.notify_level(), &err.to_string());
    }

    fn notify(&mut self, level: NotifyLevel, message: &str) {
        let text = format!("{} {}", self.config.notify_prefix, message);
        self.host.notify(level, &text);
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    fn label_for(&self, content: Option<&ContentId>) -> TabLabel {
        naming::describe(content, &self.host, &self.config)
    }

    /// Panel that new tabs go to: the focused panel if it holds tabs,
    /// otherwise the last focused panel that did.
    fn tab_panel(&self) -> PanelId {
        let active = self.host.active_panel();
        if self.store.has_panel(&active) {
            return active;
        }
        match &self.last_tab_panel {
            Some(panel) if self.store.has_panel(panel) => panel.clone(),
            _ => self.store.panels().into_iter().next().unwrap_or(active),
        }
    }

    /// Show `target` in `panel` as an engine-initiated navigation.
    ///
    /// The next history growth is consumed rather than recorded. Nothing is
    /// issued when the panel already shows the target, since the host would
    /// not produce an event to consume.
    fn navigate_quietly(&mut self, target: &ContentId, panel: &PanelId) {
        let shown = self.host.find_view_panel(panel).and_then(|v| v.content);
        if shown.as_ref() == Some(target) {
            crate::debug_trace!("SYNC", "panel {} already shows {}", panel, target);
            return;
        }
        self.sync.suppress_next();
        crate::debug_trace!("SYNC", "suppressing next history event for {}", target);
        self.host.go_to(target, Some(panel));
    }

    /// Give a never-visited tab its first history entry.
    fn seed_history(&mut self, id: &TabId) {
        let max_back = self.config.max_back_stack;
        if let Some(tab) = self.store.get_mut(id)
            && tab.history.is_empty()
        {
            let item = tab.current_item();
            tab.history.record(item, max_back);
            crate::debug_log!("HISTORY", "seeded tab {} with {}", id, tab.current);
        }
    }

    /// Redirect a tab whose block no longer exists to today's day log,
    /// rewriting its newest history entry to match.
    fn heal_missing_content(&mut self, id: &TabId) {
        let Some(block) = self.store.get(id).and_then(|t| t.current.block_id()) else {
            return;
        };
        match self.host.get_block(block) {
            Ok(Some(_)) => return,
            Ok(None) => {}
            Err(e) => {
                crate::debug_error!("TAB", "could not check block {}: {:#}", block, e);
                return;
            }
        }
        let today = ContentId::today();
        let label = self.label_for(Some(&today));
        log::warn!(
            "Tab {} points at missing block {}, redirecting to today's journal",
            id,
            block
        );
        if let Some(tab) = self.store.get_mut(id) {
            tab.show(today, label);
            let item = tab.current_item();
            if let Some(top) = tab.history.back_stack.last_mut() {
                *top = item;
            }
        }
    }
}
