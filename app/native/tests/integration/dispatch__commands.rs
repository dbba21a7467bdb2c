use std::fs;

use uiviz_lib::Error;
use uiviz_lib::dispatch::TargetSelector;
use uiviz_lib::effect::{EffectCall, StubController};
use uiviz_lib::state::{LockError, StateValue, Subsystem};

use crate::common::*;

#[test]
fn test_toggle_hidden_menu_bar_reveals_it() {
    let dir = StateDir::new();
    fs::write(dir.path().join("menubar_state"), "1\n").unwrap();
    let mut dispatcher = dir.dispatcher(StubController::new());

    dispatcher.toggle(&[Subsystem::MenuBar]).unwrap();

    assert_eq!(dir.read("menubar_state").as_deref(), Some("0\n"));
    assert_eq!(dispatcher.controller().calls(), &[EffectCall::Apply(
        Subsystem::MenuBar,
        StateValue::Flag(false)
    )]);
    assert!(dir.read("uiviz.lock").is_none());
}

#[test]
fn test_toggle_with_stale_lock_proceeds() {
    let dir = StateDir::new();
    fs::write(dir.path().join("uiviz.lock"), dead_pid().to_string()).unwrap();
    let mut dispatcher = dir.dispatcher(StubController::new());

    dispatcher.toggle(&[Subsystem::Dock]).unwrap();

    assert_eq!(dir.read("dock_state").as_deref(), Some("1\n"));
    assert!(dir.read("uiviz.lock").is_none());
}

#[test]
fn test_toggle_with_live_lock_changes_nothing() {
    let dir = StateDir::new();
    let _held = dir.lock().acquire().unwrap();
    let mut dispatcher = dir.dispatcher(StubController::new());

    let err = dispatcher.toggle(&[Subsystem::MenuBar, Subsystem::Dock]).unwrap_err();

    assert!(matches!(err, Error::Lock(LockError::Held { .. })));
    assert!(dir.read("menubar_state").is_none());
    assert!(dir.read("dock_state").is_none());
    assert!(dispatcher.controller().calls().is_empty());
}

#[test]
fn test_select_while_hidden_restores_hidden_state() {
    let dir = StateDir::new();
    let mut dispatcher = dir.dispatcher(StubController::new().with_targets(["Apple", "File", "Edit"]));
    dispatcher.set(Subsystem::MenuBar, StateValue::Flag(true)).unwrap();

    let index = dispatcher.select_target(&TargetSelector::Name("File".into())).unwrap();

    assert_eq!(index, 1);
    assert_eq!(dir.read("menubar_state").as_deref(), Some("1\n"));
    assert!(dispatcher.controller().calls().contains(&EffectCall::Invoke(1)));
}

#[test]
fn test_status_after_mixed_commands() {
    let dir = StateDir::new();
    let mut dispatcher = dir.dispatcher(StubController::new());
    dispatcher.set(Subsystem::MenuBarAlpha, StateValue::Fraction(0.3)).unwrap();
    dispatcher.toggle(&[Subsystem::Dock]).unwrap();

    let status = dispatcher.status();

    assert_eq!(status, vec![
        (Subsystem::MenuBar, StateValue::Flag(false)),
        (Subsystem::Dock, StateValue::Flag(true)),
        (Subsystem::MenuBarAlpha, StateValue::Fraction(0.3)),
    ]);
}
