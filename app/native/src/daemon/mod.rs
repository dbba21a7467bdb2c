//! Reconciliation daemon.
//!
//! Keeps the live desktop in line with the state files. On start it hides every
//! subsystem it owns and commits that state; afterwards it polls the files and
//! re-applies whatever another process committed. The hidden menu bar override
//! is re-asserted on every tick because the window server drops it on its own,
//! for instance when the active display changes.
//!
//! ```text
//! Starting ──start()──▶ Running ──tick()…──▶ ShuttingDown ──▶ Terminated
//! ```

pub mod termination;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::config::Settings;
use crate::core::Result;
use crate::effect::EffectController;
use crate::state::{LockHandle, LockManager, StateStore, StateValue, Subsystem, lock, store};

pub use termination::Restoration;

/// Lifecycle of a daemon instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonPhase {
    /// Created, nothing applied yet.
    Starting,
    /// Reconciling on every tick.
    Running,
    /// Restoring the desktop before exiting.
    ShuttingDown,
    /// Restoration done.
    Terminated,
}

/// What a single tick did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Subsystems whose persisted state was applied.
    pub reapplied: Vec<Subsystem>,
    /// Subsystems whose hidden state was re-asserted.
    pub reasserted: Vec<Subsystem>,
    /// Subsystems whose effect failed; retried next tick.
    pub failed: Vec<Subsystem>,
}

impl TickReport {
    /// Returns `true` when the tick neither changed nor failed anything.
    #[must_use]
    pub const fn is_quiet(&self) -> bool { self.reapplied.is_empty() && self.failed.is_empty() }
}

/// State owned by a running daemon.
#[derive(Debug)]
pub struct DaemonContext<C> {
    store: StateStore,
    controller: C,
    subsystems: Vec<Subsystem>,
    applied: BTreeMap<Subsystem, StateValue>,
    poll_interval: Duration,
    phase: DaemonPhase,
    shared_lock: LockManager,
    instance_lock: LockManager,
    instance: Option<LockHandle>,
}

impl<C: EffectController> DaemonContext<C> {
    /// Creates a daemon for the subsystems configured in `settings`.
    pub fn new(settings: &Settings, controller: C) -> Self {
        let subsystems = settings.daemon_subsystems.clone();
        let applied = subsystems.iter().map(|&s| (s, s.default_value())).collect();

        Self {
            store: settings.store(),
            controller,
            subsystems,
            applied,
            poll_interval: settings.timing.poll_interval,
            phase: DaemonPhase::Starting,
            shared_lock: settings.lock(),
            instance_lock: settings.daemon_lock(),
            instance: None,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> DaemonPhase { self.phase }

    /// Last value successfully applied to `subsystem`.
    #[must_use]
    pub fn applied(&self, subsystem: Subsystem) -> Option<StateValue> {
        self.applied.get(&subsystem).copied()
    }

    /// Returns the effect controller.
    pub const fn controller(&self) -> &C { &self.controller }

    /// Returns the effect controller mutably.
    pub const fn controller_mut(&mut self) -> &mut C { &mut self.controller }

    /// Takes the single-instance lock.
    ///
    /// # Errors
    ///
    /// Returns a lock error if another daemon is running on the same state directory.
    pub fn acquire_instance(&mut self) -> Result<()> {
        self.instance = Some(self.instance_lock.acquire()?);
        Ok(())
    }

    /// Builds the plan run by the termination signal handler.
    ///
    /// # Errors
    ///
    /// Returns an IO error if a path cannot be handed to the OS.
    pub fn restoration(&self) -> Result<Restoration> {
        let state_files: Vec<_> = self
            .subsystems
            .iter()
            .map(|&s| self.store.path(s))
            .flat_map(|path| [store::temp_path(&path), path])
            .collect();
        let mut owned: Vec<&Path> = state_files.iter().map(PathBuf::as_path).collect();
        owned.push(self.instance_lock.path());

        Ok(Restoration::new(self.controller.restore_hook(), &owned, self.shared_lock.path())?)
    }

    /// Hides every owned subsystem and commits the hidden state.
    ///
    /// A subsystem whose effect fails is logged and left uncommitted.
    ///
    /// # Errors
    ///
    /// Returns the persistence error if a state file cannot be written.
    pub fn start(&mut self) -> Result<()> {
        for &subsystem in &self.subsystems {
            let hidden = subsystem.hidden_value();
            if let Err(err) = self.controller.apply(subsystem, hidden) {
                tracing::warn!(%subsystem, error = %err, "failed to hide on startup");
                continue;
            }
            self.applied.insert(subsystem, hidden);
            self.store.write(subsystem, hidden)?;
        }

        self.phase = DaemonPhase::Running;
        tracing::info!(subsystems = ?self.subsystems, "daemon started");
        Ok(())
    }

    /// Reconciles once.
    ///
    /// Effect failures never abort the daemon; the affected subsystem keeps its
    /// previous applied value so the next tick tries again.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        for &subsystem in &self.subsystems {
            let persisted = self.store.read(subsystem);
            if self.applied.get(&subsystem) == Some(&persisted) {
                continue;
            }
            match self.controller.apply(subsystem, persisted) {
                Ok(()) => {
                    tracing::info!(%subsystem, value = %persisted, "applied external change");
                    self.applied.insert(subsystem, persisted);
                    report.reapplied.push(subsystem);
                }
                Err(err) => {
                    tracing::warn!(%subsystem, error = %err, "failed to apply, retrying next tick");
                    report.failed.push(subsystem);
                }
            }
        }

        for &subsystem in &self.subsystems {
            let hidden = self.applied.get(&subsystem).is_some_and(|value| value.is_hidden());
            if !subsystem.needs_reassertion() || !hidden {
                continue;
            }
            match self.controller.reassert_hidden(subsystem) {
                Ok(()) => report.reasserted.push(subsystem),
                Err(err) => {
                    tracing::warn!(%subsystem, error = %err, "failed to re-assert hidden state");
                    report.failed.push(subsystem);
                }
            }
        }

        report
    }

    /// Ticks forever at the configured poll interval.
    pub fn run(&mut self) -> ! {
        self.phase = DaemonPhase::Running;
        tracing::info!(interval = ?self.poll_interval, "reconciling");

        loop {
            thread::sleep(self.poll_interval);
            let report = self.tick();
            if !report.is_quiet() {
                tracing::debug!(?report, "tick");
            }
        }
    }

    /// Restores the desktop and removes the daemon's files.
    ///
    /// The shared operation lock is removed only if this process holds it.
    pub fn restore(&mut self) {
        self.phase = DaemonPhase::ShuttingDown;
        (self.controller.restore_hook())();

        for &subsystem in &self.subsystems {
            if let Err(err) = self.store.remove(subsystem) {
                tracing::warn!(%subsystem, error = %err, "failed to remove state file");
            }
        }
        if lock::read_owner(self.shared_lock.path()).is_ok_and(|pid| pid == std::process::id()) {
            lock::release(self.shared_lock.path());
        }
        if let Some(instance) = self.instance.take() {
            instance.release();
        }

        self.phase = DaemonPhase::Terminated;
        tracing::info!("desktop restored");
    }

    /// Restores the desktop and exits with `code`.
    pub fn shutdown(mut self, code: i32) -> ! {
        self.restore();
        std::process::exit(code);
    }
}

/// Runs the daemon until a termination signal arrives.
///
/// # Errors
///
/// Returns an error if another daemon owns the state directory or the signal
/// handlers cannot be installed. Failing to commit the initial state restores
/// the desktop and exits with status 1.
pub fn run_daemon<C: EffectController>(settings: &Settings, controller: C) -> Result<()> {
    let mut daemon = DaemonContext::new(settings, controller);
    daemon.acquire_instance()?;
    termination::install(daemon.restoration()?)?;

    if let Err(err) = daemon.start() {
        tracing::error!(error = %err, "failed to start daemon");
        daemon.shutdown(1);
    }

    println!("Press Ctrl+C to stop and restore UI.");
    daemon.run()
}
