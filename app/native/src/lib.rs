//! uiviz - hides and restores the macOS menu bar and Dock.
//!
//! Short-lived CLI invocations and a long-running daemon coordinate through
//! small state files in a shared directory:
//!
//! - [`state`] - State files and the lock guarding multi-step mutations
//! - [`effect`] - Platform calls that change the desktop
//! - [`dispatch`] - User commands (toggle, set, status, list, select)
//! - [`daemon`] - Reconciliation loop and signal-safe restoration
//! - [`config`] - Configuration file and resolved settings
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod core;
pub mod daemon;
pub mod dispatch;
pub mod effect;
pub mod logging;
pub mod state;

pub use crate::core::{Error, Result};
