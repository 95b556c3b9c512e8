//! Shared integration test helpers for tabsman.
//!
//! `FakeHost` is an in-memory stand-in for the editor: it keeps a panel
//! layout, a shared history that grows on every content change, a small
//! block table, and a log of notifications and hook registrations.
//!
//! Host history events are delivered explicitly with [`pump`], the way a real
//! host calls back after a navigation settles.
//!
//! ```ignore
//! mod common;
//! use common::{started, navigate, pump};
//! ```

#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use tabsman::host::{
    Block, BlockRepr, CommandHooks, ContentBackend, Gesture, HookHandle, HostCommand,
    HostNavigator, NavPrimitive, Notifier, NotifyLevel, PanelDirection, ViewPanel,
};
use tabsman::{BlockId, Config, ContentId, MemoryStore, PanelId, TabController};

#[derive(Debug, Clone)]
pub struct FakePanel {
    pub id: PanelId,
    pub content: Option<ContentId>,
    pub scroll_top: Option<f64>,
}

#[derive(Debug)]
pub struct FakeHost {
    pub panels: Vec<FakePanel>,
    pub active: PanelId,
    /// Shared navigation history: which panel showed what
    pub history: Vec<(PanelId, ContentId)>,
    /// Set whenever `history` changed and the engine has not been told yet
    pub history_dirty: bool,
    pub blocks: HashMap<BlockId, Block>,
    pub aliases: HashMap<String, Vec<BlockId>>,
    pub notifications: Vec<(NotifyLevel, String)>,
    pub commands: HashMap<HookHandle, HostCommand>,
    pub interceptors: HashMap<HookHandle, NavPrimitive>,
    pub scrolls: Vec<(PanelId, f64)>,
    pub go_to_calls: usize,
    pub refuse_panels: bool,
    next_panel: u64,
    next_handle: u64,
}

impl FakeHost {
    /// One panel showing `initial`, with that visit as the only history entry.
    pub fn new(initial: ContentId) -> Self {
        let id = PanelId::new("panel-1");
        Self {
            panels: vec![FakePanel {
                id: id.clone(),
                content: Some(initial.clone()),
                scroll_top: None,
            }],
            active: id.clone(),
            history: vec![(id, initial)],
            history_dirty: false,
            blocks: HashMap::new(),
            aliases: HashMap::new(),
            notifications: Vec::new(),
            commands: HashMap::new(),
            interceptors: HashMap::new(),
            scrolls: Vec::new(),
            go_to_calls: 0,
            refuse_panels: false,
            next_panel: 1,
            next_handle: 0,
        }
    }

    pub fn with_text_block(mut self, id: BlockId, text: &str) -> Self {
        self.add_block(Block {
            id,
            text: Some(text.to_string()),
            repr: Some(BlockRepr {
                kind: "text".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        });
        self
    }

    pub fn add_block(&mut self, block: Block) {
        self.blocks.insert(block.id, block);
    }

    /// A block that stands for the day log of `date`.
    pub fn add_journal_block(&mut self, id: BlockId, date: NaiveDate) {
        self.add_block(Block {
            id,
            repr: Some(BlockRepr {
                kind: "journal".to_string(),
                date: Some(date),
                ..Default::default()
            }),
            ..Default::default()
        });
    }

    pub fn panel(&self, id: &PanelId) -> Option<&FakePanel> {
        self.panels.iter().find(|p| p.id == *id)
    }

    pub fn shown(&self, id: &PanelId) -> Option<ContentId> {
        self.panel(id).and_then(|p| p.content.clone())
    }

    pub fn set_scroll(&mut self, id: &PanelId, top: f64) {
        if let Some(panel) = self.panels.iter_mut().find(|p| p.id == *id) {
            panel.scroll_top = Some(top);
        }
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.history_dirty)
    }

    pub fn last_notification(&self) -> Option<&(NotifyLevel, String)> {
        self.notifications.last()
    }

    fn new_panel_id(&mut self) -> PanelId {
        self.next_panel += 1;
        PanelId::new(format!("panel-{}", self.next_panel))
    }

    fn index_of(&self, id: &PanelId) -> Option<usize> {
        self.panels.iter().position(|p| p.id == *id)
    }

    fn forget_history_of(&mut self, keep: impl Fn(&PanelId) -> bool) {
        let before = self.history.len();
        self.history.retain(|(panel, _)| keep(panel));
        if self.history.len() != before {
            self.history_dirty = true;
        }
    }
}

impl HostNavigator for FakeHost {
    fn active_panel(&self) -> PanelId {
        self.active.clone()
    }

    fn panel_ids(&self) -> Vec<PanelId> {
        self.panels.iter().map(|p| p.id.clone()).collect()
    }

    fn find_view_panel(&self, panel: &PanelId) -> Option<ViewPanel> {
        self.panel(panel).map(|p| ViewPanel {
            id: p.id.clone(),
            content: p.content.clone(),
            scroll_top: p.scroll_top,
        })
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }

    fn go_to(&mut self, target: &ContentId, panel: Option<&PanelId>) {
        self.go_to_calls += 1;
        let id = panel.cloned().unwrap_or_else(|| self.active.clone());
        let Some(p) = self.panels.iter_mut().find(|p| p.id == id) else {
            return;
        };
        if p.content.as_ref() == Some(target) {
            return;
        }
        p.content = Some(target.clone());
        p.scroll_top = None;
        self.history.push((id, target.clone()));
        self.history_dirty = true;
    }

    fn add_panel(
        &mut self,
        anchor: &PanelId,
        direction: PanelDirection,
        initial: Option<&ContentId>,
    ) -> Option<PanelId> {
        if self.refuse_panels {
            return None;
        }
        let index = self.index_of(anchor)?;
        let content = initial.cloned().or_else(|| self.panels[index].content.clone());
        let id = self.new_panel_id();
        let at = match direction {
            PanelDirection::Left | PanelDirection::Top => index,
            PanelDirection::Right | PanelDirection::Bottom => index + 1,
        };
        self.panels.insert(
            at,
            FakePanel {
                id: id.clone(),
                content,
                scroll_top: None,
            },
        );
        self.active = id.clone();
        Some(id)
    }

    fn open_in_last_panel(&mut self, target: &ContentId) {
        let other = self
            .panels
            .iter()
            .map(|p| p.id.clone())
            .find(|id| *id != self.active);
        let panel = match other {
            Some(id) => id,
            None => {
                let anchor = self.active.clone();
                let refuse = std::mem::take(&mut self.refuse_panels);
                let created = self.add_panel(&anchor, PanelDirection::Right, None);
                self.refuse_panels = refuse;
                match created {
                    Some(id) => id,
                    None => return,
                }
            }
        };
        self.active = panel.clone();
        self.go_to(target, Some(&panel));
    }

    fn switch_focus(&mut self, panel: &PanelId) {
        if self.index_of(panel).is_some() {
            self.active = panel.clone();
        }
    }

    fn close_panel(&mut self, panel: &PanelId) {
        if self.panels.len() <= 1 {
            return;
        }
        let Some(index) = self.index_of(panel) else {
            return;
        };
        self.panels.remove(index);
        self.forget_history_of(|p| p != panel);
        if self.active == *panel {
            self.active = self.panels[0].id.clone();
        }
    }

    fn close_all_but(&mut self, keep: &PanelId) {
        if self.index_of(keep).is_none() {
            return;
        }
        self.panels.retain(|p| p.id == *keep);
        self.forget_history_of(|p| p == keep);
        self.active = keep.clone();
    }

    fn scroll_to(&mut self, panel: &PanelId, top: f64) {
        self.set_scroll(panel, top);
        self.scrolls.push((panel.clone(), top));
    }
}

impl ContentBackend for FakeHost {
    fn get_block(&self, id: BlockId) -> Result<Option<Block>> {
        Ok(self.blocks.get(&id).cloned())
    }

    fn get_aliased_blocks(&self, alias: &str) -> Result<Vec<BlockId>> {
        Ok(self.aliases.get(alias).cloned().unwrap_or_default())
    }
}

impl Notifier for FakeHost {
    fn notify(&mut self, level: NotifyLevel, message: &str) {
        self.notifications.push((level, message.to_string()));
    }
}

impl CommandHooks for FakeHost {
    fn register_before_command(&mut self, command: HostCommand) -> HookHandle {
        self.next_handle += 1;
        let handle = HookHandle(self.next_handle);
        self.commands.insert(handle, command);
        handle
    }

    fn unregister_before_command(&mut self, handle: HookHandle) {
        self.commands.remove(&handle);
    }

    fn install_interceptor(&mut self, primitive: NavPrimitive) -> HookHandle {
        self.next_handle += 1;
        let handle = HookHandle(self.next_handle);
        self.interceptors.insert(handle, primitive);
        handle
    }

    fn remove_interceptor(&mut self, handle: HookHandle) {
        self.interceptors.remove(&handle);
    }
}

pub type Controller = TabController<FakeHost, MemoryStore>;

/// A host whose panel shows block 1 ("Home"), with blocks 2..=9 available.
pub fn fake_host() -> FakeHost {
    let mut host = FakeHost::new(ContentId::Block(1)).with_text_block(1, "Home");
    for id in 2..=9 {
        host = host.with_text_block(id, &format!("Block {}", id));
    }
    host
}

/// A started controller over [`fake_host`] with default configuration.
pub fn started() -> Controller {
    started_with(fake_host(), MemoryStore::new(), Config::default())
}

pub fn started_with(host: FakeHost, store: MemoryStore, config: Config) -> Controller {
    let mut ctl = TabController::new(host, store, config);
    assert!(ctl.start());
    pump(&mut ctl);
    ctl
}

/// Deliver pending host history events to the engine.
pub fn pump(ctl: &mut Controller) {
    while ctl.host_mut().take_dirty() {
        ctl.on_history_changed();
    }
}

/// A plain user navigation in the focused panel, followed by its event.
pub fn navigate(ctl: &mut Controller, target: ContentId) {
    ctl.on_go_to(&target, None, Gesture::Plain);
    pump(ctl);
}

/// Block ids on the back stack of the focused panel's active tab, oldest first.
pub fn back_blocks(ctl: &Controller) -> Vec<Option<BlockId>> {
    let panel = ctl.host().active_panel();
    ctl.tabs()
        .active_tab(&panel)
        .map(|tab| {
            tab.history
                .back_stack
                .iter()
                .map(|item| item.target.block_id())
                .collect()
        })
        .unwrap_or_default()
}

pub fn forward_blocks(ctl: &Controller) -> Vec<Option<BlockId>> {
    let panel = ctl.host().active_panel();
    ctl.tabs()
        .active_tab(&panel)
        .map(|tab| {
            tab.history
                .forward_stack
                .iter()
                .map(|item| item.target.block_id())
                .collect()
        })
        .unwrap_or_default()
}

/// Count render callbacks.
pub fn render_counter(ctl: &mut Controller) -> Rc<Cell<usize>> {
    let count = Rc::new(Cell::new(0));
    let seen = Rc::clone(&count);
    ctl.set_render_callback(move |_| seen.set(seen.get() + 1));
    count
}

pub fn blocks(ids: &[BlockId]) -> Vec<Option<BlockId>> {
    ids.iter().map(|id| Some(*id)).collect()
}
