//! Application constants for uiviz.
//!
//! File names, timings and other static values shared by the CLI and the daemon.

use std::time::Duration;

/// The application name.
pub const APP_NAME: &str = "uiviz";

/// Application version from Cargo.toml.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Names of the ephemeral files kept in the state directory.
pub mod files {
    /// Persisted menu bar hidden flag.
    pub const MENU_BAR_STATE: &str = "menubar_state";

    /// Persisted Dock hidden flag.
    pub const DOCK_STATE: &str = "dock_state";

    /// Persisted menu bar opacity.
    pub const MENU_BAR_ALPHA_STATE: &str = "menubar_alpha";

    /// Lock guarding multi-step mutations (toggle, select).
    pub const LOCK: &str = "uiviz.lock";

    /// Single-instance lock held by the daemon for its whole lifetime.
    pub const DAEMON_LOCK: &str = "uiviz.daemon.lock";

    /// Suffix of the sibling file used for atomic state writes.
    pub const TEMP_SUFFIX: &str = ".tmp";
}

/// Timing defaults.
pub mod timing {
    use super::Duration;

    /// Delay between two daemon reconciliation ticks.
    pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

    /// Lower bound accepted for a configured poll interval.
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// Time given to the menu bar to appear before a target is pressed.
    pub const REVEAL_DELAY: Duration = Duration::from_millis(200);

    /// Time given to an opened menu before the menu bar is hidden again.
    pub const INTERACTION_DELAY: Duration = Duration::from_secs(1);

    /// Time given to the Dock to restart after its preferences change.
    pub const DOCK_SETTLE: Duration = Duration::from_millis(500);
}

/// Configuration file names.
pub mod config {
    /// Sub-directory of the user config directory.
    pub const CONFIG_DIR: &str = "uiviz";

    /// Primary config file name.
    pub const CONFIG_FILE: &str = "config.jsonc";

    /// Alternative config file name (JSON without comments).
    pub const CONFIG_FILE_ALT: &str = "config.json";
}
