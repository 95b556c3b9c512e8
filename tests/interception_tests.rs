//! Tests for before-command hooks and wrapped navigation primitives

mod common;

use common::{back_blocks, blocks, navigate, pump, started};
use tabsman::host::{
    CommandDisposition, Gesture, HostCommand, HostNavigator, NotifyLevel, PanelDirection,
};
use tabsman::{ContentId, PanelId};

fn panel_1() -> PanelId {
    PanelId::new("panel-1")
}

// ============================================================================
// Before-command hooks
// ============================================================================

#[test]
fn test_every_command_is_hooked() {
    let ctl = started();
    let mut names: Vec<_> = ctl.host().commands.values().map(|c| c.name()).collect();
    names.sort();

    assert_eq!(
        names,
        vec![
            "core.closeOtherPanels",
            "core.closePanel",
            "core.goBack",
            "core.goForward"
        ]
    );
}

#[test]
fn test_go_back_is_absorbed_into_tab_history() {
    let mut ctl = started();
    navigate(&mut ctl, ContentId::Block(2));

    assert_eq!(
        ctl.before_command(HostCommand::GoBack),
        CommandDisposition::Suppress
    );
    pump(&mut ctl);
    assert_eq!(ctl.host().shown(&panel_1()), Some(ContentId::Block(1)));
    assert_eq!(back_blocks(&ctl), blocks(&[1]));

    assert_eq!(
        ctl.before_command(HostCommand::GoForward),
        CommandDisposition::Suppress
    );
    pump(&mut ctl);
    assert_eq!(back_blocks(&ctl), blocks(&[1, 2]));
}

#[test]
fn test_go_forward_without_history_is_still_suppressed() {
    let mut ctl = started();

    assert_eq!(
        ctl.before_command(HostCommand::GoForward),
        CommandDisposition::Suppress
    );
    let (level, message) = ctl.host().last_notification().unwrap();
    assert_eq!(*level, NotifyLevel::Info);
    assert!(message.ends_with("no later history for this tab"));
}

#[test]
fn test_closing_the_only_panel_is_refused() {
    let mut ctl = started();

    assert_eq!(
        ctl.before_command(HostCommand::ClosePanel),
        CommandDisposition::Suppress
    );
    assert_eq!(
        ctl.before_command(HostCommand::CloseOtherPanels),
        CommandDisposition::Suppress
    );
    assert_eq!(ctl.tabs().len(), 1);
    let (level, message) = ctl.host().last_notification().unwrap();
    assert_eq!(*level, NotifyLevel::Warn);
    assert!(message.ends_with("cannot close the only panel"));
}

#[test]
fn test_close_panel_drops_its_tabs() {
    let mut ctl = started();
    let right = ctl
        .on_add_panel(&panel_1(), PanelDirection::Right, None)
        .unwrap();
    navigate(&mut ctl, ContentId::Block(3));

    assert_eq!(
        ctl.before_command(HostCommand::ClosePanel),
        CommandDisposition::Proceed
    );
    assert!(!ctl.tabs().has_panel(&right));
    assert_eq!(ctl.tabs().len(), 1);

    // The host carries out the command
    ctl.host_mut().close_panel(&right);
    pump(&mut ctl);
    navigate(&mut ctl, ContentId::Block(4));
    assert_eq!(back_blocks(&ctl), blocks(&[1, 4]));
}

#[test]
fn test_close_other_panels_keeps_focused_panel() {
    let mut ctl = started();
    ctl.on_add_panel(&panel_1(), PanelDirection::Right, None);
    let focused = ctl
        .on_add_panel(&panel_1(), PanelDirection::Bottom, None)
        .unwrap();

    assert_eq!(
        ctl.before_command(HostCommand::CloseOtherPanels),
        CommandDisposition::Proceed
    );
    assert_eq!(ctl.tabs().panels(), vec![focused.clone()]);

    ctl.host_mut().close_all_but(&focused);
    pump(&mut ctl);
    assert_eq!(ctl.host().panel_ids(), vec![focused]);
}

// ============================================================================
// Wrapped go-to
// ============================================================================

#[test]
fn test_background_gesture_opens_tab_without_navigating() {
    let mut ctl = started();
    let calls = ctl.host().go_to_calls;

    ctl.on_go_to(&ContentId::Block(5), None, Gesture::BackgroundTab);
    pump(&mut ctl);

    assert_eq!(ctl.tabs().len(), 2);
    assert_eq!(ctl.host().go_to_calls, calls);
    assert_eq!(back_blocks(&ctl), blocks(&[1]));
    let (level, message) = ctl.host().last_notification().unwrap();
    assert_eq!(*level, NotifyLevel::Success);
    assert!(message.ends_with("opened background tab"));
}

#[test]
fn test_go_to_other_panel_records_there() {
    let mut ctl = started();
    let right = ctl
        .on_add_panel(&panel_1(), PanelDirection::Right, None)
        .unwrap();

    ctl.on_go_to(&ContentId::Block(2), Some(&panel_1()), Gesture::Plain);
    pump(&mut ctl);

    assert_eq!(ctl.host().active_panel(), panel_1());
    assert_eq!(back_blocks(&ctl), blocks(&[1, 2]));
    let other = ctl.tabs().active_tab(&right).unwrap();
    assert_eq!(other.history.back_stack.len(), 1);
}

// ============================================================================
// Wrapped add-panel / open-in-last-panel
// ============================================================================

#[test]
fn test_add_panel_seeds_a_focused_tab() {
    let mut ctl = started();
    let history = ctl.host().history_len();

    let panel = ctl
        .on_add_panel(&panel_1(), PanelDirection::Right, Some(&ContentId::Block(7)))
        .unwrap();
    pump(&mut ctl);

    assert_eq!(ctl.host().active_panel(), panel);
    assert_eq!(ctl.host().history_len(), history);
    let tab = ctl.tabs().active_tab(&panel).unwrap();
    assert_eq!(tab.current, ContentId::Block(7));
    assert_eq!(back_blocks(&ctl), blocks(&[7]));
}

#[test]
fn test_add_panel_refused_by_host() {
    let mut ctl = started();
    ctl.host_mut().refuse_panels = true;

    let panel = ctl.on_add_panel(&panel_1(), PanelDirection::Right, None);
    assert!(panel.is_none());
    assert_eq!(ctl.tabs().panel_count(), 1);
}

#[test]
fn test_open_in_last_panel_creates_tab_for_new_panel() {
    let mut ctl = started();

    ctl.on_open_in_last_panel(&ContentId::Block(3), Gesture::Plain);
    pump(&mut ctl);

    let panel = ctl.host().active_panel();
    assert_ne!(panel, panel_1());
    assert_eq!(ctl.tabs().panel_tab_ids(&panel).len(), 1);
    assert_eq!(back_blocks(&ctl), blocks(&[3]));
    let left = ctl.tabs().active_tab(&panel_1()).unwrap();
    assert_eq!(left.history.back_stack.len(), 1);
}

#[test]
fn test_open_in_last_panel_records_into_existing_panel() {
    let mut ctl = started();
    let right = ctl
        .on_add_panel(&panel_1(), PanelDirection::Right, None)
        .unwrap();
    let first = ctl.tabs().active_id(&panel_1()).cloned().unwrap();
    ctl.switch_tab(&first);

    ctl.on_open_in_last_panel(&ContentId::Block(4), Gesture::Plain);
    pump(&mut ctl);

    assert_eq!(ctl.host().active_panel(), right);
    assert_eq!(ctl.tabs().panel_tab_ids(&right).len(), 1);
    assert_eq!(back_blocks(&ctl), blocks(&[1, 4]));
}

#[test]
fn test_foreground_gesture_opens_and_switches() {
    let mut ctl = started();

    ctl.on_open_in_last_panel(&ContentId::Block(4), Gesture::ForegroundTab);
    pump(&mut ctl);

    assert_eq!(ctl.host().panels.len(), 1);
    assert_eq!(ctl.tabs().len(), 2);
    let active = ctl.tabs().active_tab(&panel_1()).unwrap();
    assert_eq!(active.current, ContentId::Block(4));
    assert_eq!(ctl.host().shown(&panel_1()), Some(ContentId::Block(4)));
    assert_eq!(back_blocks(&ctl), blocks(&[4]));
}
