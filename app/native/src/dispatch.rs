//! Command dispatcher.
//!
//! Maps each CLI operation onto the state store, the lock manager and the effect
//! controller. Every mutation applies the effect first and commits the state
//! file only once the effect succeeded, so the persisted state never describes
//! something that was not at least attempted successfully.

use std::fmt;
use std::str::FromStr;
use std::thread;

use crate::config::{Settings, Timing};
use crate::core::{Error, Result};
use crate::effect::{EffectController, EffectError, Target};
use crate::state::{LockManager, StateStore, StateValue, Subsystem};

/// A committed change, reported back to the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    /// Subsystem that changed.
    pub subsystem: Subsystem,
    /// Value now applied and persisted.
    pub value: StateValue,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} set to: {}", self.subsystem.label(), self.subsystem.describe(self.value))
    }
}

/// Which menu option `select` should press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelector {
    /// Position in the enumerated list.
    Index(usize),
    /// Case-insensitive menu title.
    Name(String),
}

impl FromStr for TargetSelector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Menu option must be an index or a name.".to_string());
        }
        Ok(trimmed
            .parse::<usize>()
            .map_or_else(|_| Self::Name(trimmed.to_string()), Self::Index))
    }
}

impl fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Executes user commands against the shared state.
#[derive(Debug)]
pub struct Dispatcher<C> {
    store: StateStore,
    lock: LockManager,
    controller: C,
    timing: Timing,
}

impl<C: EffectController> Dispatcher<C> {
    /// Creates a dispatcher.
    pub const fn new(store: StateStore, lock: LockManager, controller: C, timing: Timing) -> Self {
        Self { store, lock, controller, timing }
    }

    /// Creates a dispatcher for the resolved settings.
    pub fn from_settings(settings: &Settings, controller: C) -> Self {
        Self::new(settings.store(), settings.lock(), controller, settings.timing)
    }

    /// Returns the effect controller.
    pub const fn controller(&self) -> &C { &self.controller }

    /// Returns the state store.
    pub const fn store(&self) -> &StateStore { &self.store }

    /// Flips every subsystem in `subsystems` under a single lock.
    ///
    /// # Errors
    ///
    /// Returns a lock error if another operation is in progress, or the first
    /// effect/persistence error. Subsystems processed before the failure keep
    /// their new state.
    pub fn toggle(&mut self, subsystems: &[Subsystem]) -> Result<Vec<Change>> {
        let _lock = self.lock.acquire()?;

        let mut changes = Vec::with_capacity(subsystems.len());
        for &subsystem in subsystems {
            let value = self.store.read(subsystem).toggled();
            changes.push(self.apply_and_commit(subsystem, value)?);
        }
        Ok(changes)
    }

    /// Sets `subsystem` to `value` without taking the lock.
    ///
    /// Concurrent `set` calls race; the last one to commit wins.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `value` has the wrong kind, or the
    /// effect/persistence error.
    pub fn set(&mut self, subsystem: Subsystem, value: StateValue) -> Result<Change> {
        if value.kind() != subsystem.kind() {
            return Err(Error::config(format!("{value} is not a valid value for {subsystem}")));
        }
        self.apply_and_commit(subsystem, value)
    }

    /// Returns the persisted value of every subsystem.
    #[must_use]
    pub fn status(&self) -> Vec<(Subsystem, StateValue)> {
        Subsystem::ALL.iter().map(|&subsystem| (subsystem, self.store.read(subsystem))).collect()
    }

    /// Lists the interactive targets of the frontmost application.
    ///
    /// # Errors
    ///
    /// Returns the controller's enumeration error.
    pub fn list_targets(&self) -> Result<Vec<Target>> { Ok(self.controller.enumerate_targets()?) }

    /// Presses a menu option, revealing a hidden menu bar for the duration.
    ///
    /// The reveal is committed to the state file so a running daemon does not
    /// hide the menu bar again mid-interaction; the hidden state is committed
    /// back afterwards, even if pressing the option failed.
    ///
    /// # Errors
    ///
    /// Returns a lock error, a lookup error for unknown names or indexes, or the
    /// effect/persistence error.
    pub fn select_target(&mut self, selector: &TargetSelector) -> Result<usize> {
        let index = self.resolve(selector)?;
        let _lock = self.lock.acquire()?;

        let was_hidden = self.store.read(Subsystem::MenuBar).is_hidden();
        if was_hidden {
            self.apply_and_commit(Subsystem::MenuBar, StateValue::Flag(false))?;
            thread::sleep(self.timing.reveal_delay);
        }

        let pressed = self.controller.invoke_target(index);
        if pressed.is_ok() {
            thread::sleep(self.timing.interaction_delay);
        }

        let restored = if was_hidden {
            self.apply_and_commit(Subsystem::MenuBar, StateValue::Flag(true)).map(|_| ())
        } else {
            Ok(())
        };

        pressed?;
        restored?;
        Ok(index)
    }

    fn resolve(&self, selector: &TargetSelector) -> Result<usize> {
        match selector {
            TargetSelector::Index(index) => Ok(*index),
            TargetSelector::Name(name) => self
                .controller
                .enumerate_targets()?
                .into_iter()
                .find(|target| target.label.eq_ignore_ascii_case(name))
                .map(|target| target.index)
                .ok_or_else(|| EffectError::TargetNotFound(name.clone()).into()),
        }
    }

    fn apply_and_commit(&mut self, subsystem: Subsystem, value: StateValue) -> Result<Change> {
        self.controller.apply(subsystem, value)?;
        self.store.write(subsystem, value)?;
        tracing::debug!(%subsystem, %value, "state committed");
        Ok(Change { subsystem, value })
    }
}
