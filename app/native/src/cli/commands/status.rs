//! Status command output.

use std::fmt::Write as _;
use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::core::prelude::*;
use crate::dispatch::Dispatcher;
use crate::effect::EffectController;

/// Persisted state of one subsystem, as printed by `uiviz status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    /// Subsystem identifier.
    pub subsystem: Subsystem,
    /// Human-readable state.
    pub state: String,
    /// Raw value.
    pub value: StateValue,
    /// Backing state file.
    pub file: PathBuf,
}

/// Collects the status of every subsystem.
pub fn entries<C: EffectController>(dispatcher: &Dispatcher<C>) -> Vec<StatusEntry> {
    dispatcher
        .status()
        .into_iter()
        .map(|(subsystem, value)| StatusEntry {
            subsystem,
            state: subsystem.describe(value),
            value,
            file: dispatcher.store().path(subsystem),
        })
        .collect()
}

/// Formats entries as an aligned table.
#[must_use]
pub fn format_status_table(entries: &[StatusEntry]) -> String {
    let width = entries.iter().map(|entry| entry.subsystem.label().len()).max().unwrap_or(0);

    let mut out = String::new();
    for entry in entries {
        let state = if entry.value.is_hidden() {
            entry.state.yellow()
        } else {
            entry.state.green()
        };
        let label = format!("{:<width$}", entry.subsystem.label());
        let _ = writeln!(out, "{}  {state}", label.bold());
    }
    out.trim_end().to_string()
}

/// Prints the status of every subsystem.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute<C: EffectController>(dispatcher: &Dispatcher<C>, json: bool) -> Result<()> {
    let entries = entries(dispatcher);
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("{}", format_status_table(&entries));
    }
    Ok(())
}
