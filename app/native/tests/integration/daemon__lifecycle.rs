use uiviz_lib::daemon::{DaemonContext, DaemonPhase};
use uiviz_lib::effect::StubController;
use uiviz_lib::state::{StateValue, Subsystem};

use crate::common::*;

#[test]
fn test_daemon_follows_cli_toggles() {
    let dir = StateDir::new();
    let mut daemon = DaemonContext::new(&dir.settings(), StubController::new());
    daemon.start().unwrap();
    assert_eq!(dir.read("menubar_state").as_deref(), Some("1\n"));

    let mut cli = dir.dispatcher(StubController::new());
    cli.toggle(&[Subsystem::MenuBar, Subsystem::Dock]).unwrap();

    let report = daemon.tick();
    assert_eq!(report.reapplied, vec![Subsystem::MenuBar, Subsystem::Dock]);
    assert_eq!(daemon.controller().applied(Subsystem::MenuBar), Some(StateValue::Flag(false)));
    assert_eq!(daemon.controller().applied(Subsystem::Dock), Some(StateValue::Flag(false)));
}

#[test]
fn test_daemon_reasserts_hidden_menu_bar_every_tick() {
    let dir = StateDir::new();
    let mut daemon = DaemonContext::new(&dir.settings(), StubController::new());
    daemon.start().unwrap();

    for _ in 0..3 {
        daemon.tick();
    }

    assert_eq!(daemon.controller().reassert_count(Subsystem::MenuBar), 3);
    assert_eq!(daemon.controller().reassert_count(Subsystem::Dock), 0);
}

#[test]
fn test_daemon_restore_cleans_state_dir() {
    let dir = StateDir::new();
    let mut daemon = DaemonContext::new(&dir.settings(), StubController::new());
    daemon.acquire_instance().unwrap();
    daemon.start().unwrap();

    daemon.restore();

    assert_eq!(daemon.phase(), DaemonPhase::Terminated);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
