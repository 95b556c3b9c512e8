//! Default value functions for configuration.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes on
//! `Config` fields so partial YAML files still load.

// ── History bounds ─────────────────────────────────────────────────────────

/// Back stack holds the current entry plus 30 earlier ones.
pub fn max_back_stack() -> usize {
    31
}

pub fn max_forward_stack() -> usize {
    30
}

// ── Persistence ────────────────────────────────────────────────────────────

pub fn recently_closed_capacity() -> usize {
    5
}

// ── Presentation ───────────────────────────────────────────────────────────

pub fn history_menu_limit() -> usize {
    5
}

pub fn default_tab_name() -> String {
    "New Tab".to_string()
}

pub fn default_tab_icon() -> String {
    "ti ti-cube".to_string()
}

pub fn notify_prefix() -> String {
    "[tabsman]".to_string()
}

// ── Primitive helpers ──────────────────────────────────────────────────────

pub fn bool_false() -> bool {
    false
}

pub fn bool_true() -> bool {
    true
}
