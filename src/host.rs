//! Contracts between the tab engine and the host editor.
//!
//! The host owns panels, the shared navigation history, block storage, the
//! command registry, and user notifications. The engine only sees it through
//! these traits, which lets the integration tests drive the engine with an
//! in-memory fake host.
//!
//! Every call is synchronous. A host whose real API is asynchronous adapts it
//! at the boundary and delivers history-change notifications by calling
//! [`TabController::on_history_changed`](crate::controller::TabController::on_history_changed)
//! after each navigation settles.

use crate::content::{BlockId, ContentId, PanelId};

// ── Panels and navigation ────────────────────────────────────────────────────

/// A snapshot of one host panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPanel {
    pub id: PanelId,
    /// What the panel currently shows. `None` for panels without a navigable view.
    pub content: Option<ContentId>,
    /// Vertical scroll offset of the panel's content, when the host tracks one.
    pub scroll_top: Option<f64>,
}

/// Side of an anchor panel on which a new panel is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelDirection {
    Left,
    Right,
    Top,
    Bottom,
}

/// Navigation primitives the host exposes. Calling these directly performs
/// the host's original behavior; they never re-enter the engine.
pub trait HostNavigator {
    /// The panel that currently has focus.
    fn active_panel(&self) -> PanelId;

    /// Every open panel, in layout order.
    fn panel_ids(&self) -> Vec<PanelId>;

    fn find_view_panel(&self, panel: &PanelId) -> Option<ViewPanel>;

    /// Length of the host's shared navigation history.
    fn history_len(&self) -> usize;

    /// Show `target` in `panel` (or the focused panel when `None`).
    fn go_to(&mut self, target: &ContentId, panel: Option<&PanelId>);

    /// Open a new panel next to `anchor`, optionally showing `initial`.
    /// Returns the new panel's id, or `None` when the host refused.
    fn add_panel(
        &mut self,
        anchor: &PanelId,
        direction: PanelDirection,
        initial: Option<&ContentId>,
    ) -> Option<PanelId>;

    /// Show `target` in the most recently used other panel, opening one if needed.
    fn open_in_last_panel(&mut self, target: &ContentId);

    fn switch_focus(&mut self, panel: &PanelId);

    fn close_panel(&mut self, panel: &PanelId);

    /// Close every panel except `keep`.
    fn close_all_but(&mut self, keep: &PanelId);

    fn scroll_to(&mut self, panel: &PanelId, top: f64);
}

// ── Content ──────────────────────────────────────────────────────────────────

/// Render hints for a block, as reported by the host.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockRepr {
    /// Block kind: `heading`, `ul`, `ol`, `task`, `text`, `code`, `journal`, ...
    pub kind: String,
    /// Heading level for `heading` blocks.
    pub level: Option<u8>,
    /// The date a `journal` block stands for.
    pub date: Option<chrono::NaiveDate>,
}

/// A host block, reduced to what naming and normalization need.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub id: BlockId,
    pub text: Option<String>,
    pub aliases: Vec<String>,
    pub repr: Option<BlockRepr>,
    /// Whether the block prefers to be labeled by its first alias.
    /// `None` means the host did not say, which is treated as `true`.
    pub as_alias: Option<bool>,
}

/// Read access to the host's block storage.
pub trait ContentBackend {
    /// Fetch a block. `Ok(None)` means the block no longer exists.
    fn get_block(&self, id: BlockId) -> anyhow::Result<Option<Block>>;

    /// Blocks that are named by `alias`.
    fn get_aliased_blocks(&self, alias: &str) -> anyhow::Result<Vec<BlockId>>;
}

// ── Notifications ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Success,
    Warn,
    Error,
}

pub trait Notifier {
    fn notify(&mut self, level: NotifyLevel, message: &str);
}

// ── Command interception ─────────────────────────────────────────────────────

/// Host commands the engine hooks before they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCommand {
    GoBack,
    GoForward,
    ClosePanel,
    CloseOtherPanels,
}

impl HostCommand {
    pub const ALL: [HostCommand; 4] = [
        HostCommand::GoBack,
        HostCommand::GoForward,
        HostCommand::ClosePanel,
        HostCommand::CloseOtherPanels,
    ];

    /// Name of the command in the host's registry.
    pub fn name(self) -> &'static str {
        match self {
            HostCommand::GoBack => "core.goBack",
            HostCommand::GoForward => "core.goForward",
            HostCommand::ClosePanel => "core.closePanel",
            HostCommand::CloseOtherPanels => "core.closeOtherPanels",
        }
    }
}

/// Navigation primitives the engine wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavPrimitive {
    GoTo,
    AddPanel,
    OpenInLastPanel,
}

impl NavPrimitive {
    pub const ALL: [NavPrimitive; 3] = [
        NavPrimitive::GoTo,
        NavPrimitive::AddPanel,
        NavPrimitive::OpenInLastPanel,
    ];
}

/// Modifier state accompanying an intercepted navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    /// No modifier: the host's own behavior.
    #[default]
    Plain,
    /// Open the target in a new tab without switching to it (Ctrl-click).
    BackgroundTab,
    /// Open the target in a new tab and switch to it (Ctrl+Shift-click).
    ForegroundTab,
}

/// What the host should do after a before-command hook ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandDisposition {
    Proceed,
    Suppress,
}

/// Token returned by hook registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle(pub u64);

/// Registration points for before-command hooks and navigation interceptors.
///
/// Once registered, the host routes the command (or primitive) to the
/// controller's matching `before_command` / `on_*` entry point.
pub trait CommandHooks {
    fn register_before_command(&mut self, command: HostCommand) -> HookHandle;

    fn unregister_before_command(&mut self, handle: HookHandle);

    fn install_interceptor(&mut self, primitive: NavPrimitive) -> HookHandle;

    fn remove_interceptor(&mut self, handle: HookHandle);
}

/// Everything the engine needs from the host.
pub trait HostApp: HostNavigator + ContentBackend + Notifier + CommandHooks {}

impl<T> HostApp for T where T: HostNavigator + ContentBackend + Notifier + CommandHooks {}
