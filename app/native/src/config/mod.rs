//! Configuration for uiviz.
//!
//! An optional JSONC file provides defaults; command-line flags and environment
//! variables take precedence. [`Settings`] is the resolved view every command
//! works with.

pub mod types;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use types::{ConfigError, DaemonConfig, UivizConfig, load_config, load_config_from_path};

use crate::core::constants::{files, timing};
use crate::state::{LockManager, StateStore, Subsystem};

/// Directory used for state files when none is configured.
pub const DEFAULT_STATE_DIR: &str = "/tmp";

/// Delays used by the daemon and interactive commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Delay between daemon ticks.
    pub poll_interval: Duration,
    /// Wait after revealing the menu bar, before selecting a menu.
    pub reveal_delay: Duration,
    /// Wait after selecting a menu, before hiding the menu bar again.
    pub interaction_delay: Duration,
    /// Wait after making the Dock visible.
    pub dock_settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: timing::POLL_INTERVAL,
            reveal_delay: timing::REVEAL_DELAY,
            interaction_delay: timing::INTERACTION_DELAY,
            dock_settle: timing::DOCK_SETTLE,
        }
    }
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding state and lock files.
    pub state_dir: PathBuf,
    /// Delays.
    pub timing: Timing,
    /// Subsystems owned by the daemon.
    pub daemon_subsystems: Vec<Subsystem>,
}

impl Settings {
    /// Resolves settings from a loaded config and an optional state directory override.
    #[must_use]
    pub fn resolve(config: &UivizConfig, state_dir: Option<&Path>) -> Self {
        let state_dir = state_dir
            .map(Path::to_path_buf)
            .or_else(|| config.state_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));

        let mut daemon_subsystems = config.daemon.subsystems.clone();
        daemon_subsystems.sort_unstable();
        daemon_subsystems.dedup();

        Self {
            state_dir,
            timing: Timing {
                poll_interval: Duration::from_millis(config.daemon.poll_interval_ms)
                    .max(timing::MIN_POLL_INTERVAL),
                reveal_delay: Duration::from_millis(config.reveal_delay_ms),
                interaction_delay: Duration::from_millis(config.interaction_delay_ms),
                dock_settle: Duration::from_millis(config.dock_settle_ms),
            },
            daemon_subsystems,
        }
    }

    /// State store rooted in the state directory.
    #[must_use]
    pub fn store(&self) -> StateStore { StateStore::new(&self.state_dir) }

    /// Lock guarding toggles and menu selection.
    #[must_use]
    pub fn lock(&self) -> LockManager { LockManager::new(self.state_dir.join(files::LOCK)) }

    /// Single-instance lock of the daemon.
    #[must_use]
    pub fn daemon_lock(&self) -> LockManager {
        LockManager::new(self.state_dir.join(files::DAEMON_LOCK))
    }
}

/// Returns the JSON Schema of the configuration file.
///
/// # Errors
///
/// Returns an error if the schema cannot be serialized.
pub fn print_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(UivizConfig);
    serde_json::to_string_pretty(&schema)
}
