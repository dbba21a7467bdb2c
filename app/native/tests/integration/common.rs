//! Common test utilities.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use tempfile::TempDir;
use uiviz_lib::config::{Settings, Timing, UivizConfig};
use uiviz_lib::dispatch::Dispatcher;
use uiviz_lib::effect::StubController;
use uiviz_lib::state::{LockManager, StateStore};

/// Timing without any delays.
pub const NO_DELAYS: Timing = Timing {
    poll_interval: Duration::from_millis(100),
    reveal_delay: Duration::ZERO,
    interaction_delay: Duration::ZERO,
    dock_settle: Duration::ZERO,
};

/// A temporary state directory.
pub struct StateDir {
    dir: TempDir,
}

impl StateDir {
    pub fn new() -> Self { Self { dir: TempDir::new().unwrap() } }

    pub fn path(&self) -> &Path { self.dir.path() }

    pub fn store(&self) -> StateStore { StateStore::new(self.path()) }

    pub fn lock(&self) -> LockManager { LockManager::new(self.path().join("uiviz.lock")) }

    pub fn settings(&self) -> Settings {
        let mut settings = Settings::resolve(&UivizConfig::default(), Some(self.path()));
        settings.timing = NO_DELAYS;
        settings
    }

    pub fn dispatcher(&self, controller: StubController) -> Dispatcher<StubController> {
        Dispatcher::from_settings(&self.settings(), controller)
    }

    /// Contents of a file in the state directory, `None` if missing.
    pub fn read(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.path().join(name)).ok()
    }
}

/// Returns the pid of a process that has already exited and been reaped.
pub fn dead_pid() -> u32 {
    let mut child = Command::new("true").spawn().unwrap();
    let pid = child.id();
    child.wait().unwrap();
    pid
}
