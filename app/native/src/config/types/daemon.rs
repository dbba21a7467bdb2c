//! Daemon configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::Subsystem;

/// Settings of the reconciliation daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DaemonConfig {
    /// Milliseconds between two reconciliation ticks.
    ///
    /// Values below 100 are raised to 100. Default: 2000.
    pub poll_interval_ms: u64,

    /// Subsystems the daemon hides at startup and keeps in sync.
    ///
    /// Default: `["menu-bar", "dock"]`.
    pub subsystems: Vec<Subsystem>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            subsystems: vec![Subsystem::MenuBar, Subsystem::Dock],
        }
    }
}
