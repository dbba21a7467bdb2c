//! In-memory effect controller.
//!
//! Records every request instead of touching the desktop. It backs the unit and
//! integration tests, and is the controller of the binary on hosts without a
//! platform implementation.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut controller = StubController::new().with_targets(["File", "Edit"]);
//! controller.apply(Subsystem::MenuBar, StateValue::Flag(true))?;
//! assert_eq!(controller.apply_count(Subsystem::MenuBar), 1);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{EffectController, EffectError, RestoreHook, Target};
use crate::state::{StateValue, Subsystem};

/// Number of times the stub restore hook ran in this process.
static RESTORE_CALLS: AtomicUsize = AtomicUsize::new(0);

/// Written to stderr whenever the restore hook runs.
pub const RESTORE_MARKER: &[u8] = b"stub controller: defaults restored\n";

fn restore_defaults() {
    RESTORE_CALLS.fetch_add(1, Ordering::SeqCst);
    // SAFETY: write(2) on stderr with a static buffer.
    unsafe {
        libc::write(libc::STDERR_FILENO, RESTORE_MARKER.as_ptr().cast(), RESTORE_MARKER.len());
    }
}

/// A request received by the stub.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectCall {
    /// `apply(subsystem, value)`.
    Apply(Subsystem, StateValue),
    /// `reassert_hidden(subsystem)`.
    Reassert(Subsystem),
    /// `invoke_target(index)`.
    Invoke(usize),
}

/// Effect controller that only records what it was asked to do.
#[derive(Debug, Default)]
pub struct StubController {
    calls: Vec<EffectCall>,
    applied: BTreeMap<Subsystem, StateValue>,
    targets: Vec<String>,
    failing: BTreeSet<Subsystem>,
}

impl StubController {
    /// Creates a stub with no targets.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Sets the labels returned by `enumerate_targets`.
    #[must_use]
    pub fn with_targets<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Makes every `apply` on `subsystem` fail.
    #[must_use]
    pub fn failing_on(mut self, subsystem: Subsystem) -> Self {
        self.failing.insert(subsystem);
        self
    }

    /// Stops failing `apply` on `subsystem`.
    pub fn recover(&mut self, subsystem: Subsystem) { self.failing.remove(&subsystem); }

    /// Every request received so far, in order.
    #[must_use]
    pub fn calls(&self) -> &[EffectCall] { &self.calls }

    /// Forgets the recorded requests.
    pub fn clear_calls(&mut self) { self.calls.clear(); }

    /// Last value successfully applied to `subsystem`.
    #[must_use]
    pub fn applied(&self, subsystem: Subsystem) -> Option<StateValue> {
        self.applied.get(&subsystem).copied()
    }

    /// Number of `apply` requests for `subsystem`, failed ones included.
    #[must_use]
    pub fn apply_count(&self, subsystem: Subsystem) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, EffectCall::Apply(s, _) if *s == subsystem))
            .count()
    }

    /// Number of `reassert_hidden` requests for `subsystem`.
    #[must_use]
    pub fn reassert_count(&self, subsystem: Subsystem) -> usize {
        self.calls.iter().filter(|call| **call == EffectCall::Reassert(subsystem)).count()
    }

    /// Number of times the restore hook ran in this process.
    #[must_use]
    pub fn restore_count() -> usize { RESTORE_CALLS.load(Ordering::SeqCst) }
}

impl EffectController for StubController {
    fn apply(&mut self, subsystem: Subsystem, desired: StateValue) -> Result<(), EffectError> {
        self.calls.push(EffectCall::Apply(subsystem, desired));
        if self.failing.contains(&subsystem) {
            return Err(EffectError::Apply { subsystem, reason: "stub failure".to_string() });
        }
        tracing::debug!(%subsystem, %desired, "stub apply");
        self.applied.insert(subsystem, desired);
        Ok(())
    }

    fn reassert_hidden(&mut self, subsystem: Subsystem) -> Result<(), EffectError> {
        self.calls.push(EffectCall::Reassert(subsystem));
        if self.failing.contains(&subsystem) {
            return Err(EffectError::Apply { subsystem, reason: "stub failure".to_string() });
        }
        self.applied.insert(subsystem, subsystem.hidden_value());
        Ok(())
    }

    fn enumerate_targets(&self) -> Result<Vec<Target>, EffectError> {
        Ok(self.targets.iter().enumerate().map(|(index, label)| Target::new(index, label.clone())).collect())
    }

    fn invoke_target(&mut self, index: usize) -> Result<(), EffectError> {
        if index >= self.targets.len() {
            return Err(EffectError::TargetOutOfRange { index, count: self.targets.len() });
        }
        self.calls.push(EffectCall::Invoke(index));
        Ok(())
    }

    fn restore_hook(&self) -> RestoreHook { restore_defaults }
}
