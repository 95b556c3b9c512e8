//! Synchronization state between tab history and host history.
//!
//! Exactly one of these holds at any time, replacing the loose boolean flags a
//! host integration would otherwise juggle:
//! - `Idle`: the next history growth was caused by the user and is recorded.
//! - `SuppressingNextEvent`: the engine just issued a navigation that its own
//!   stacks already account for, so the next growth is consumed without a push.
//! - `SwitchingWorkspace`: the host layout is being rebuilt and every history
//!   event is ignored.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    SuppressingNextEvent,
    SwitchingWorkspace,
}

/// Outcome of feeding one history-growth event through the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    /// Record the new host entry into the active tab.
    Record,
    /// The engine caused this navigation; only refresh tab properties.
    Consumed,
    /// Ignore entirely.
    Ignored,
}

impl SyncState {
    /// Arm suppression before an engine-initiated navigation.
    ///
    /// Has no effect while a workspace switch is in progress.
    pub fn suppress_next(&mut self) {
        if *self == SyncState::Idle {
            *self = SyncState::SuppressingNextEvent;
        }
    }

    /// Disarm suppression when the engine decided not to navigate after all.
    pub fn cancel_suppression(&mut self) {
        if *self == SyncState::SuppressingNextEvent {
            *self = SyncState::Idle;
        }
    }

    pub fn begin_workspace_switch(&mut self) {
        *self = SyncState::SwitchingWorkspace;
    }

    pub fn end_workspace_switch(&mut self) {
        *self = SyncState::Idle;
    }

    pub fn is_switching_workspace(&self) -> bool {
        *self == SyncState::SwitchingWorkspace
    }

    /// Classify a history event that did not shrink the history, consuming
    /// suppression if armed.
    pub fn on_growth(&mut self) -> HistoryEvent {
        match *self {
            SyncState::Idle => HistoryEvent::Record,
            SyncState::SuppressingNextEvent => {
                *self = SyncState::Idle;
                HistoryEvent::Consumed
            }
            SyncState::SwitchingWorkspace => HistoryEvent::Ignored,
        }
    }
}

/// Guard against re-entrant renders triggered from inside a render callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderGuard {
    #[default]
    Idle,
    Rendering,
}

impl RenderGuard {
    /// Try to enter a render. Returns false if one is already running.
    pub fn enter(&mut self) -> bool {
        if *self == RenderGuard::Rendering {
            return false;
        }
        *self = RenderGuard::Rendering;
        true
    }

    pub fn leave(&mut self) {
        *self = RenderGuard::Idle;
    }
}
