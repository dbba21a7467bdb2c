//! Root configuration types and loading functions.
//!
//! Contains the main `UivizConfig` struct and configuration file loading utilities.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::daemon::DaemonConfig;
use crate::core::constants::config::{CONFIG_DIR, CONFIG_FILE, CONFIG_FILE_ALT};

/// Root configuration structure for uiviz.
///
/// Every field is optional; a missing file behaves like an empty object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UivizConfig {
    /// Directory holding the state and lock files shared by every uiviz process.
    ///
    /// Default: `/tmp`.
    pub state_dir: Option<PathBuf>,

    /// Milliseconds to wait for the menu bar to appear before selecting a menu.
    pub reveal_delay_ms: u64,

    /// Milliseconds to keep the menu bar visible after selecting a menu.
    pub interaction_delay_ms: u64,

    /// Milliseconds to wait for the Dock to restart after it is made visible.
    pub dock_settle_ms: u64,

    /// Reconciliation daemon settings.
    pub daemon: DaemonConfig,
}

impl Default for UivizConfig {
    fn default() -> Self {
        Self {
            state_dir: None,
            reveal_delay_ms: 200,
            interaction_delay_ms: 1000,
            dock_settle_ms: 500,
            daemon: DaemonConfig::default(),
        }
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("Configuration file {} not found", .0.display())]
    NotFound(PathBuf),

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/uiviz/` when set
/// 2. `~/.config/uiviz/`
/// 3. `~/Library/Application Support/uiviz/` (macOS native)
///
/// Each directory is checked for `config.jsonc` then `config.json`.
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut dirs_to_check = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        dirs_to_check.push(PathBuf::from(xdg_config).join(CONFIG_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        dirs_to_check.push(home.join(".config").join(CONFIG_DIR));
    }
    if let Some(config_dir) = dirs::config_dir() {
        dirs_to_check.push(config_dir.join(CONFIG_DIR));
    }

    let mut paths = Vec::new();
    for dir in dirs_to_check {
        for filename in [CONFIG_FILE, CONFIG_FILE_ALT] {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }
    paths
}

/// Loads the configuration from a specific file path.
///
/// The file supports JSONC: `//` and `/* */` comments are stripped before parsing.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, `IoError` if it
/// cannot be read, and `ParseError` if it is not valid JSON for [`UivizConfig`].
pub fn load_config_from_path(path: &Path) -> Result<UivizConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Loads the configuration from the first existing default location.
///
/// Returns the default configuration when no file exists.
///
/// # Errors
///
/// Returns an error if a configuration file exists but cannot be read or parsed.
pub fn load_config() -> Result<(UivizConfig, Option<PathBuf>), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            let config = load_config_from_path(&path)?;
            return Ok((config, Some(path)));
        }
    }

    Ok((UivizConfig::default(), None))
}
