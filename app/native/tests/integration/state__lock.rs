use std::fs;
use std::process::{Command, Stdio};

use uiviz_lib::state::{LockError, lock};

use crate::common::*;

#[test]
fn test_lock_of_reaped_process_is_reclaimed() {
    let dir = StateDir::new();
    let manager = dir.lock();
    fs::write(manager.path(), dead_pid().to_string()).unwrap();

    let handle = manager.acquire().unwrap();

    assert_eq!(lock::read_owner(handle.path()).unwrap(), std::process::id());
}

#[test]
fn test_lock_of_live_process_is_respected() {
    let dir = StateDir::new();
    let manager = dir.lock();
    let mut child = Command::new("sleep").arg("30").stdin(Stdio::null()).spawn().unwrap();
    fs::write(manager.path(), child.id().to_string()).unwrap();

    let result = manager.acquire();

    child.kill().unwrap();
    child.wait().unwrap();
    assert!(matches!(result, Err(LockError::Held { pid: Some(pid), .. }) if pid == child.id()));
    assert_eq!(fs::read_to_string(manager.path()).unwrap(), child.id().to_string());
}

#[test]
fn test_reclaimed_lock_is_released_on_drop() {
    let dir = StateDir::new();
    let manager = dir.lock();
    fs::write(manager.path(), dead_pid().to_string()).unwrap();

    drop(manager.acquire().unwrap());

    assert!(!manager.path().exists());
}
