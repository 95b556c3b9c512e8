//! Presentation order for a panel's tabs

use super::Tab;
use std::cmp::Ordering;

/// Pinned tabs first, most recently pinned first; then unpinned tabs, oldest
/// first. Ties fall back to the tab id so the order is total.
pub fn presentation_order(a: &Tab, b: &Tab) -> Ordering {
    match (a.is_pinned, b.is_pinned) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => b.pin_order.cmp(&a.pin_order),
        (false, false) => a.created_at.cmp(&b.created_at),
    }
    .then_with(|| a.id.cmp(&b.id))
}
