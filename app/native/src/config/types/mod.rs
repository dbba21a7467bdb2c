//! Configuration types.

mod daemon;
mod root;

pub use daemon::DaemonConfig;
pub use root::{ConfigError, UivizConfig, config_paths, load_config, load_config_from_path};
