//! Per-tab bounded back/forward history.
//!
//! The top of the back stack is the tab's current entry, so a tab that has
//! shown anything has a back stack of length at least 1. "Back" is only
//! possible with two or more entries.

use crate::content::ContentId;
use serde::{Deserialize, Serialize};

/// A single history entry: what was shown plus how it was labeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(flatten)]
    pub target: ContentId,
    pub name: String,
    pub icon: String,
}

impl HistoryItem {
    pub fn new(target: ContentId, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            target,
            name: name.into(),
            icon: icon.into(),
        }
    }
}

/// Which stack a history menu lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Back,
    Forward,
}

/// A tab's private history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStacks {
    #[serde(default)]
    pub back_stack: Vec<HistoryItem>,
    #[serde(default)]
    pub forward_stack: Vec<HistoryItem>,
}

impl HistoryStacks {
    /// The current entry (top of the back stack).
    pub fn current(&self) -> Option<&HistoryItem> {
        self.back_stack.last()
    }

    pub fn is_empty(&self) -> bool {
        self.back_stack.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.back_stack.len() > 1
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward_stack.is_empty()
    }

    /// Record a fresh navigation: push onto back (evicting the oldest entry at
    /// capacity) and clear forward.
    pub fn record(&mut self, item: HistoryItem, max_back: usize) {
        push_bounded(&mut self.back_stack, item, max_back);
        self.forward_stack.clear();
    }

    /// Move the current entry to forward. Returns the new current entry.
    pub fn step_back(&mut self, max_forward: usize) -> Option<&HistoryItem> {
        if !self.can_go_back() {
            return None;
        }
        let item = self.back_stack.pop()?;
        push_bounded(&mut self.forward_stack, item, max_forward);
        self.back_stack.last()
    }

    /// Move the newest forward entry back onto back. Returns the new current entry.
    pub fn step_forward(&mut self, max_back: usize) -> Option<&HistoryItem> {
        let item = self.forward_stack.pop()?;
        push_bounded(&mut self.back_stack, item, max_back);
        self.back_stack.last()
    }

    /// Entries a history menu shows, newest first.
    ///
    /// The back menu skips the current entry, since choosing it would be a no-op.
    pub fn menu_entries(&self, direction: HistoryDirection, limit: usize) -> Vec<HistoryItem> {
        let source: &[HistoryItem] = match direction {
            HistoryDirection::Back => {
                let len = self.back_stack.len();
                &self.back_stack[..len.saturating_sub(1)]
            }
            HistoryDirection::Forward => &self.forward_stack,
        };
        source.iter().rev().take(limit).cloned().collect()
    }
}

fn push_bounded(stack: &mut Vec<HistoryItem>, item: HistoryItem, max: usize) {
    stack.push(item);
    if stack.len() > max {
        let excess = stack.len() - max;
        stack.drain(..excess);
    }
}
