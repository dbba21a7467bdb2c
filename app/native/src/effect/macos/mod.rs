//! macOS effect controller.
//!
//! - [`skylight`] - Menu bar visibility and opacity via the private `SkyLight` framework
//! - [`dock`] - Dock auto-hide preferences
//! - [`accessibility`] - Menu bar items of the frontmost application

pub mod accessibility;
pub mod dock;
pub mod skylight;

use std::time::Duration;

use super::{EffectController, EffectError, RestoreHook, Target};
use crate::state::{StateValue, Subsystem};

/// Restores the menu bar and Dock. Installed as the termination hook.
fn restore_defaults() {
    skylight::restore_menu_bar();
    dock::restore();
}

/// Effect controller driving the real macOS desktop.
#[derive(Debug, Clone)]
pub struct MacosController {
    dock_settle: Duration,
}

impl MacosController {
    /// Creates a controller waiting `dock_settle` after making the Dock visible.
    #[must_use]
    pub const fn new(dock_settle: Duration) -> Self { Self { dock_settle } }
}

impl EffectController for MacosController {
    fn apply(&mut self, subsystem: Subsystem, desired: StateValue) -> Result<(), EffectError> {
        match (subsystem, desired) {
            (Subsystem::MenuBar, StateValue::Flag(hidden)) => {
                skylight::set_menu_bar_hidden(hidden);
                Ok(())
            }
            (Subsystem::MenuBarAlpha, StateValue::Fraction(alpha)) => {
                skylight::set_menu_bar_alpha(alpha);
                Ok(())
            }
            (Subsystem::Dock, StateValue::Flag(hidden)) => dock::apply(hidden, self.dock_settle)
                .map_err(|reason| EffectError::Apply { subsystem, reason }),
            (subsystem, value) => Err(EffectError::Apply {
                subsystem,
                reason: format!("unsupported value {value}"),
            }),
        }
    }

    fn reassert_hidden(&mut self, subsystem: Subsystem) -> Result<(), EffectError> {
        if subsystem == Subsystem::MenuBar {
            skylight::reassert_hidden_override();
            Ok(())
        } else {
            self.apply(subsystem, subsystem.hidden_value())
        }
    }

    fn enumerate_targets(&self) -> Result<Vec<Target>, EffectError> {
        accessibility::list_menu_items()
    }

    fn invoke_target(&mut self, index: usize) -> Result<(), EffectError> {
        accessibility::press_menu_item(index)
    }

    fn restore_hook(&self) -> RestoreHook { restore_defaults }
}
