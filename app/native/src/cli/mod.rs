//! Command-line interface.

pub mod commands;

use clap::Parser;

pub use commands::{Cli, Commands, ToggleTarget};

/// Parses the process arguments and runs the requested command.
///
/// # Errors
///
/// Returns the error of the executed command.
pub fn run() -> crate::Result<()> { Cli::parse().execute() }
