//! Menu listing and selection commands.

use std::fmt::Write as _;

use crate::core::Result;
use crate::dispatch::{Dispatcher, TargetSelector};
use crate::effect::{EffectController, Target};

/// Formats targets as an indexed list.
#[must_use]
pub fn format_targets(targets: &[Target]) -> String {
    if targets.is_empty() {
        return "No menu options available.".to_string();
    }

    let mut out = String::from("Available menu options:");
    for target in targets {
        let _ = write!(out, "\n  [{}] {}", target.index, target.label);
    }
    out
}

/// Prints the menu options of the frontmost application.
///
/// # Errors
///
/// Returns an error if the menu bar cannot be read.
pub fn list<C: EffectController>(dispatcher: &Dispatcher<C>, json: bool) -> Result<()> {
    let targets = dispatcher.list_targets()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
    } else {
        println!("{}", format_targets(&targets));
    }
    Ok(())
}

/// Opens a menu of the frontmost application.
///
/// # Errors
///
/// Returns an error if the menu cannot be found or opened.
pub fn select<C: EffectController>(
    dispatcher: &mut Dispatcher<C>,
    selector: &TargetSelector,
) -> Result<()> {
    let index = dispatcher.select_target(selector)?;
    println!("Selected menu option [{index}]");
    Ok(())
}
