//! Typed errors for the tab engine.
//!
//! Internal operations return `Result<_, TabsError>`. The controller's public
//! entry points fold these into a `bool` plus a host notification, which is
//! how the host's command system expects plugin commands to report.

use crate::content::{PanelId, TabId};
use crate::host::NotifyLevel;

/// Errors produced by tab, history, and workspace operations.
#[derive(Debug, thiserror::Error)]
pub enum TabsError {
    /// The referenced tab does not exist in the store.
    #[error("tab {0} does not exist")]
    UnknownTab(TabId),

    /// The referenced panel holds no tabs.
    #[error("panel {0} has no tabs")]
    UnknownPanel(PanelId),

    /// Deleting would leave the store without any tab.
    #[error("cannot close the last tab")]
    LastTab,

    /// The back stack holds only the current entry.
    #[error("no earlier history for this tab")]
    NoBackHistory,

    /// The forward stack is empty.
    #[error("no later history for this tab")]
    NoForwardHistory,

    /// A tab cannot be moved onto the panel it already lives in.
    #[error("tab is already in panel {0}")]
    SamePanel(PanelId),

    /// Moving would leave the source panel without tabs.
    #[error("the only tab of a panel cannot be moved")]
    SoleTabInPanel,

    /// No tab is active in the focused panel.
    #[error("no active tab in the focused panel")]
    NoActiveTab,

    /// Panel-closing commands refuse to close the last panel.
    #[error("cannot close the only panel")]
    SinglePanel,

    /// Cycling needs at least two tabs in the panel.
    #[error("no other tab in this panel")]
    NoOtherTab,

    /// The panel has never had another tab activated.
    #[error("no previously active tab in this panel")]
    NoPreviousTab,

    #[error("already in workspace {0}")]
    WorkspaceAlreadyOpen(String),

    #[error("workspace {0} not found")]
    WorkspaceMissing(String),

    #[error("workspace name {0} is already used")]
    WorkspaceNameTaken(String),

    #[error("already in favorites")]
    FavoriteExists,

    #[error("not in favorites")]
    FavoriteMissing,

    /// A recently-closed tab is already present in the store.
    #[error("tab {0} is already open")]
    AlreadyRestored(TabId),

    #[error("tab {0} is not in the recently closed list")]
    NotRecentlyClosed(TabId),

    /// The host did not open a panel the layout rebuild needed.
    #[error("the host refused to open a panel")]
    PanelRefused,

    /// Clearing persisted data is disabled by configuration.
    #[error("clearing persisted data is disabled")]
    ClearDataDisabled,

    /// The host key-value store failed.
    #[error("persistence failure: {0}")]
    Persistence(#[from] anyhow::Error),

    /// A persisted record could not be (de)serialized.
    #[error("invalid persisted record: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl TabsError {
    /// Severity used when the error is surfaced to the user.
    pub fn notify_level(&self) -> NotifyLevel {
        match self {
            TabsError::LastTab | TabsError::SinglePanel | TabsError::SoleTabInPanel => {
                NotifyLevel::Warn
            }
            TabsError::UnknownTab(_)
            | TabsError::UnknownPanel(_)
            | TabsError::PanelRefused
            | TabsError::Persistence(_)
            | TabsError::Snapshot(_) => NotifyLevel::Error,
            _ => NotifyLevel::Info,
        }
    }
}

pub type TabsResult<T> = Result<T, TabsError>;
