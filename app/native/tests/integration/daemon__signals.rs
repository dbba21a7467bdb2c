//! Runs the real binary. On macOS it would drive the actual desktop, so these
//! tests only run where the stub controller is the platform controller.

#![cfg(not(target_os = "macos"))]

use std::fs;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use uiviz_lib::effect::stub::RESTORE_MARKER;

use crate::common::*;

const WAIT: Duration = Duration::from_secs(10);

fn spawn_daemon(dir: &StateDir) -> Child {
    let config = dir.path().join("config.jsonc");
    fs::write(&config, r#"{ "daemon": { "pollIntervalMs": 100 } }"#).unwrap();

    Command::new(env!("CARGO_BIN_EXE_uiviz"))
        .arg("daemon")
        .arg("--state-dir")
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap()
}

fn wait_for(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

fn terminate(child: &mut Child, signal: libc::c_int) -> std::process::ExitStatus {
    let pid = libc::pid_t::try_from(child.id()).unwrap();
    assert_eq!(unsafe { libc::kill(pid, signal) }, 0);
    child.wait().unwrap()
}

fn stderr_of(child: &mut Child) -> String {
    let mut output = String::new();
    child.stderr.take().unwrap().read_to_string(&mut output).unwrap();
    output
}

#[test]
fn test_sigterm_restores_and_cleans_up() {
    let dir = StateDir::new();
    let mut daemon = spawn_daemon(&dir);
    assert!(wait_for(|| dir.read("menubar_state").is_some() && dir.read("dock_state").is_some()));
    assert_eq!(dir.read("menubar_state").as_deref(), Some("1\n"));

    let status = terminate(&mut daemon, libc::SIGTERM);

    assert!(status.success());
    assert!(stderr_of(&mut daemon).contains(std::str::from_utf8(RESTORE_MARKER).unwrap()));
    assert!(dir.read("menubar_state").is_none());
    assert!(dir.read("dock_state").is_none());
    assert!(dir.read("uiviz.daemon.lock").is_none());
}

#[test]
fn test_sigint_keeps_foreign_lock() {
    let dir = StateDir::new();
    fs::write(dir.path().join("uiviz.lock"), "1").unwrap();
    let mut daemon = spawn_daemon(&dir);
    assert!(wait_for(|| dir.read("uiviz.daemon.lock").is_some() && dir.read("dock_state").is_some()));

    let status = terminate(&mut daemon, libc::SIGINT);

    assert!(status.success());
    assert!(stderr_of(&mut daemon).contains(std::str::from_utf8(RESTORE_MARKER).unwrap()));
    assert_eq!(dir.read("uiviz.lock").as_deref(), Some("1"));
}

#[test]
fn test_second_daemon_exits_with_error() {
    let dir = StateDir::new();
    let mut first = spawn_daemon(&dir);
    assert!(wait_for(|| dir.read("menubar_state").is_some()));

    let second = spawn_daemon(&dir).wait().unwrap();
    let status = terminate(&mut first, libc::SIGTERM);

    assert_eq!(second.code(), Some(1));
    assert!(status.success());
}
