//! Advisory, non-blocking lock files with stale-owner reclamation.
//!
//! A lock is a file created exclusively and holding the owner's process id.
//! Holders can crash or be killed without cleaning up, so a lock whose owner is
//! no longer alive is considered stale: it is removed and acquisition is retried
//! exactly once. A live owner is never waited on; callers get [`LockError::Held`]
//! and decide whether to skip or abort their mutation.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Number of stale-lock reclamations attempted before giving up.
const MAX_RECLAIM_RETRIES: u32 = 1;

/// Errors returned when a lock cannot be acquired.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another live process owns the lock, or it kept changing hands after
    /// the reclamation retry.
    #[error(
        "Lock {} is held by {}. Another operation may be in progress.",
        path.display(),
        describe_owner(*pid)
    )]
    Held {
        /// Lock file path.
        path: PathBuf,
        /// Recorded owner, if it could be read.
        pid: Option<u32>,
    },

    /// The lock exists but its owner could not be determined.
    #[error("Lock {} exists but does not record a valid owner", path.display())]
    Unreadable {
        /// Lock file path.
        path: PathBuf,
    },

    /// The lock file could not be created or removed.
    #[error("Cannot acquire lock {}: {source}", path.display())]
    Io {
        /// Lock file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

fn describe_owner(pid: Option<u32>) -> String {
    pid.map_or_else(|| "another process".to_string(), |pid| format!("process {pid}"))
}

/// Checks if a process is still alive.
///
/// Uses `kill(pid, 0)`, which performs the permission and existence checks
/// without delivering a signal. `EPERM` means the process exists but belongs to
/// someone else.
#[must_use]
pub fn is_process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid <= 0 {
        return false;
    }
    // SAFETY: signal 0 only probes the target, nothing is delivered.
    if unsafe { libc::kill(pid, 0) } == 0 {
        return true;
    }
    io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// Reads the owner pid recorded in the lock at `path`.
///
/// # Errors
///
/// Returns the IO error if the file cannot be read, or `InvalidData` if it
/// does not contain a positive decimal pid.
pub fn read_owner(path: &Path) -> io::Result<u32> {
    let contents = fs::read_to_string(path)?;
    contents
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|pid| *pid > 0)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "lock owner is not a pid"))
}

/// Removes the lock at `path` if it still records `stale_pid`.
///
/// Another process may have reclaimed the lock between our liveness check and
/// now; its fresh lock is left alone.
///
/// # Errors
///
/// Returns any IO error other than `NotFound`.
pub fn remove_stale(path: &Path, stale_pid: u32) -> io::Result<()> {
    match read_owner(path) {
        Ok(pid) if pid == stale_pid => match fs::remove_file(path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        },
        Ok(_) => Ok(()),
        Err(err) => match err.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::InvalidData => Ok(()),
            _ => Err(err),
        },
    }
}

/// Removes the lock file at `path`.
///
/// Removing a lock that does not exist is not an error.
pub fn release(path: &Path) {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove lock file");
        }
        _ => {}
    }
}

/// Acquires locks at a fixed path on behalf of the current process.
#[derive(Debug, Clone)]
pub struct LockManager {
    path: PathBuf,
}

impl LockManager {
    /// Creates a manager for the lock at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    /// Returns the lock file path.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    /// Attempts to take the lock without blocking.
    ///
    /// # Errors
    ///
    /// - [`LockError::Held`] if a live process owns the lock, or the lock was
    ///   still taken after reclaiming a stale owner once.
    /// - [`LockError::Unreadable`] if the existing lock records no valid pid.
    /// - [`LockError::Io`] on any other filesystem failure.
    pub fn acquire(&self) -> Result<LockHandle, LockError> {
        let mut reclaimed = 0;

        loop {
            match self.try_create() {
                Ok(()) => {
                    tracing::debug!(path = %self.path.display(), "lock acquired");
                    return Ok(LockHandle { path: self.path.clone(), released: false });
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
                Err(source) => return Err(LockError::Io { path: self.path.clone(), source }),
            }

            let pid = match read_owner(&self.path) {
                Ok(pid) => pid,
                // Released between our create attempt and the read.
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    if reclaimed >= MAX_RECLAIM_RETRIES {
                        return Err(LockError::Held { path: self.path.clone(), pid: None });
                    }
                    reclaimed += 1;
                    continue;
                }
                Err(_) => return Err(LockError::Unreadable { path: self.path.clone() }),
            };

            if is_process_alive(pid) || reclaimed >= MAX_RECLAIM_RETRIES {
                return Err(LockError::Held { path: self.path.clone(), pid: Some(pid) });
            }

            tracing::warn!(path = %self.path.display(), pid, "reclaiming stale lock");
            remove_stale(&self.path, pid)
                .map_err(|source| LockError::Io { path: self.path.clone(), source })?;
            reclaimed += 1;
        }
    }

    fn try_create(&self) -> io::Result<()> {
        let mut file =
            OpenOptions::new().write(true).create_new(true).mode(0o644).open(&self.path)?;

        if let Err(err) = write!(file, "{}", std::process::id()) {
            drop(file);
            let _ = fs::remove_file(&self.path);
            return Err(err);
        }

        Ok(())
    }
}

/// An acquired lock. The lock file is removed when the handle is released or dropped.
#[derive(Debug)]
#[must_use = "the lock is released as soon as the handle is dropped"]
pub struct LockHandle {
    path: PathBuf,
    released: bool,
}

impl LockHandle {
    /// Returns the lock file path.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    /// Releases the lock now.
    pub fn release(mut self) { self.release_inner(); }

    fn release_inner(&mut self) {
        if !self.released {
            self.released = true;
            release(&self.path);
        }
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) { self.release_inner(); }
}

#[cfg(test)]
mod tests {
    use std::process::Command;

    use tempfile::TempDir;

    use super::*;

    /// Returns the pid of a process that has already exited and been reaped.
    fn dead_pid() -> u32 {
        let mut child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        pid
    }

    fn manager() -> (TempDir, LockManager) {
        let dir = TempDir::new().unwrap();
        let manager = LockManager::new(dir.path().join("uiviz.lock"));
        (dir, manager)
    }

    #[test]
    fn test_is_process_alive_current_process() {
        assert!(is_process_alive(std::process::id()));
    }

    #[test]
    fn test_is_process_alive_reaped_child() {
        assert!(!is_process_alive(dead_pid()));
    }

    #[test]
    fn test_is_process_alive_rejects_invalid_pids() {
        assert!(!is_process_alive(0));
        assert!(!is_process_alive(u32::MAX));
    }

    #[test]
    fn test_acquire_records_own_pid() {
        let (_dir, manager) = manager();
        let handle = manager.acquire().unwrap();
        assert_eq!(read_owner(handle.path()).unwrap(), std::process::id());
    }

    #[test]
    fn test_second_acquire_is_held() {
        let (_dir, manager) = manager();
        let _handle = manager.acquire().unwrap();

        let err = manager.acquire().unwrap_err();
        assert!(matches!(err, LockError::Held { pid: Some(pid), .. } if pid == std::process::id()));
    }

    #[test]
    fn test_release_allows_reacquire() {
        let (_dir, manager) = manager();
        manager.acquire().unwrap().release();
        assert!(!manager.path().exists());
        assert!(manager.acquire().is_ok());
    }

    #[test]
    fn test_drop_releases_lock() {
        let (_dir, manager) = manager();
        {
            let _handle = manager.acquire().unwrap();
            assert!(manager.path().exists());
        }
        assert!(!manager.path().exists());
    }

    #[test]
    fn test_stale_lock_is_reclaimed() {
        let (_dir, manager) = manager();
        fs::write(manager.path(), dead_pid().to_string()).unwrap();

        let handle = manager.acquire().unwrap();
        assert_eq!(read_owner(handle.path()).unwrap(), std::process::id());
    }

    #[test]
    fn test_garbage_lock_is_unreadable() {
        let (_dir, manager) = manager();
        fs::write(manager.path(), "not-a-pid").unwrap();

        let err = manager.acquire().unwrap_err();
        assert!(matches!(err, LockError::Unreadable { .. }));
        // Ambiguous locks are never removed.
        assert!(manager.path().exists());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let manager = LockManager::new(dir.path().join("nope").join("uiviz.lock"));
        assert!(matches!(manager.acquire().unwrap_err(), LockError::Io { .. }));
    }

    #[test]
    fn test_release_missing_lock_is_noop() {
        let (_dir, manager) = manager();
        release(manager.path());
        release(manager.path());
    }

    #[test]
    fn test_held_error_message() {
        let err = LockError::Held { path: PathBuf::from("/tmp/uiviz.lock"), pid: Some(7) };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/uiviz.lock"));
        assert!(msg.contains("process 7"));
    }

    #[test]
    fn test_held_error_without_owner() {
        let err = LockError::Held { path: PathBuf::from("/tmp/uiviz.lock"), pid: None };
        assert!(err.to_string().contains("held by another process"));
    }

    #[test]
    fn test_remove_stale_keeps_reclaimed_lock() {
        let (_dir, manager) = manager();
        let stale = dead_pid();
        // Another process reclaimed the stale lock first.
        fs::write(manager.path(), std::process::id().to_string()).unwrap();

        remove_stale(manager.path(), stale).unwrap();

        assert_eq!(read_owner(manager.path()).unwrap(), std::process::id());
    }

    #[test]
    fn test_remove_stale_deletes_matching_lock() {
        let (_dir, manager) = manager();
        let stale = dead_pid();
        fs::write(manager.path(), stale.to_string()).unwrap();

        remove_stale(manager.path(), stale).unwrap();
        remove_stale(manager.path(), stale).unwrap();

        assert!(!manager.path().exists());
    }

    #[test]
    fn test_remove_stale_keeps_unreadable_lock() {
        let (_dir, manager) = manager();
        fs::write(manager.path(), "garbage").unwrap();

        remove_stale(manager.path(), 42).unwrap();

        assert!(manager.path().exists());
    }
}
