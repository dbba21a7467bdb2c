//! Boundary to the platform calls that actually change the desktop.
//!
//! The rest of uiviz never reaches into platform internals: it tells an
//! [`EffectController`] which state a subsystem should be in, asks it for the
//! interactive targets (menu bar items) of the frontmost application, and
//! obtains from it a plain restoration function for the termination handler.
//!
//! - [`stub`] - In-memory controller used by tests and on non-macOS hosts
//! - `macos` - `SkyLight`, Dock preferences and Accessibility implementation

#[cfg(target_os = "macos")]
pub mod macos;
pub mod stub;

use serde::Serialize;
use thiserror::Error;

#[cfg(target_os = "macos")]
pub use macos::MacosController;
pub use stub::{EffectCall, StubController};

use crate::state::{StateValue, Subsystem};

/// Allocation-free function restoring every subsystem to its visible default.
///
/// It is called from the termination signal handler, so implementations may
/// only use async-signal-safe operations.
pub type RestoreHook = fn();

/// Errors reported by an effect controller.
#[derive(Debug, Error)]
pub enum EffectError {
    /// A desired state could not be applied.
    #[error("Failed to apply {subsystem}: {reason}")]
    Apply {
        /// Subsystem being changed.
        subsystem: Subsystem,
        /// Platform-specific failure description.
        reason: String,
    },

    /// Interactive targets could not be enumerated.
    #[error("Failed to enumerate menu options: {0}")]
    Enumerate(String),

    /// A target index outside of the enumerated range was requested.
    #[error("Menu index {index} is out of bounds ({count} options available)")]
    TargetOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of available targets.
        count: usize,
    },

    /// No target matches the requested name.
    #[error("No menu option named '{0}'")]
    TargetNotFound(String),

    /// Invoking a target failed.
    #[error("Failed to select menu option {index}: {reason}")]
    Invoke {
        /// Target index.
        index: usize,
        /// Platform-specific failure description.
        reason: String,
    },

    /// A required permission is missing.
    #[error("{0} permission required. Please grant it in System Settings.")]
    Permission(&'static str),
}

/// An interactive element of the frontmost application's menu bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Position among the menu bar children.
    pub index: usize,
    /// Menu title.
    pub label: String,
}

impl Target {
    /// Creates a target.
    pub fn new(index: usize, label: impl Into<String>) -> Self {
        Self { index, label: label.into() }
    }
}

/// Capability that applies desired state to the live environment.
pub trait EffectController {
    /// Applies `desired` to `subsystem`.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::Apply`] if the platform rejected the change.
    fn apply(&mut self, subsystem: Subsystem, desired: StateValue) -> Result<(), EffectError>;

    /// Re-applies the hidden effect of a subsystem the host may silently revert.
    ///
    /// Called by the daemon on every tick while the subsystem is hidden, so it
    /// should be cheap. The default simply applies the hidden value again.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::Apply`] if the platform rejected the change.
    fn reassert_hidden(&mut self, subsystem: Subsystem) -> Result<(), EffectError> {
        self.apply(subsystem, subsystem.hidden_value())
    }

    /// Lists the interactive targets currently available.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::Enumerate`] or [`EffectError::Permission`].
    fn enumerate_targets(&self) -> Result<Vec<Target>, EffectError>;

    /// Presses the target at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::TargetOutOfRange`] for an unknown index, or
    /// [`EffectError::Invoke`] if the press failed.
    fn invoke_target(&mut self, index: usize) -> Result<(), EffectError>;

    /// Returns the function restoring every subsystem to visible.
    fn restore_hook(&self) -> RestoreHook;
}

/// Controller used by the binary on this platform.
#[cfg(target_os = "macos")]
pub type PlatformController = MacosController;

/// Controller used by the binary on this platform.
#[cfg(not(target_os = "macos"))]
pub type PlatformController = StubController;

/// Creates the controller for this platform.
#[cfg(target_os = "macos")]
#[must_use]
pub fn platform_controller(timing: &crate::config::Timing) -> PlatformController {
    MacosController::new(timing.dock_settle)
}

/// Creates the controller for this platform.
///
/// There is no desktop to drive here; changes are only logged.
#[cfg(not(target_os = "macos"))]
#[must_use]
pub fn platform_controller(_timing: &crate::config::Timing) -> PlatformController {
    tracing::warn!("no platform effect controller available, running with the stub controller");
    StubController::new()
}
