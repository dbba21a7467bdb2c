//! Atomic persistence of desired UI state.
//!
//! Every state file holds a single newline-terminated scalar. Writes go to a
//! sibling temporary file which is then renamed over the target, so a reader in
//! another process observes either the previous value or the new one, never a
//! partial line. Reads never fail: anything missing or malformed degrades to the
//! subsystem's documented default.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{StateValue, Subsystem};
use crate::core::constants::files::TEMP_SUFFIX;

/// Errors raised while committing a state file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The temporary file could not be created or written.
    #[error("Cannot write state file {}: {source}", path.display())]
    Write {
        /// Temporary file that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The temporary file could not be renamed onto the state file.
    #[error("Cannot update state file {}: {source}", path.display())]
    Commit {
        /// State file that was left untouched.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Returns the sibling temporary path used while writing `path`.
#[must_use]
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Reads the value persisted at `path` for `subsystem`.
///
/// Returns the subsystem's default when the file is missing, unreadable,
/// unparsable or out of range.
#[must_use]
pub fn read_value(path: &Path, subsystem: Subsystem) -> StateValue {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %err, "state file unreadable");
            }
            return subsystem.default_value();
        }
    };

    StateValue::decode(subsystem.kind(), &contents).unwrap_or_else(|| {
        tracing::debug!(
            path = %path.display(),
            contents = contents.trim(),
            "state file malformed, using default"
        );
        subsystem.default_value()
    })
}

/// Atomically replaces the contents of `path` with `value`.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed. The
/// temporary file is removed and `path` keeps its previous contents.
pub fn write_value(path: &Path, value: StateValue) -> Result<(), PersistenceError> {
    let tmp = temp_path(path);

    if let Err(source) = write_temp(&tmp, &value.encode()) {
        let _ = fs::remove_file(&tmp);
        return Err(PersistenceError::Write { path: tmp, source });
    }

    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(PersistenceError::Commit { path: path.to_path_buf(), source });
    }

    Ok(())
}

/// Writes `contents` to a freshly created `tmp`.
///
/// Whatever sits at `tmp` is unlinked first, and the new file is created
/// exclusively without following symlinks, so a link planted in a shared state
/// directory is never written through.
fn write_temp(tmp: &Path, contents: &str) -> io::Result<()> {
    remove_if_present(tmp)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .custom_flags(libc::O_NOFOLLOW)
        .mode(0o644)
        .open(tmp)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// State files of every subsystem, rooted in one directory.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    /// Returns the state file path for `subsystem`.
    #[must_use]
    pub fn path(&self, subsystem: Subsystem) -> PathBuf { self.dir.join(subsystem.file_name()) }

    /// Reads the persisted value of `subsystem`, falling back to its default.
    #[must_use]
    pub fn read(&self, subsystem: Subsystem) -> StateValue {
        read_value(&self.path(subsystem), subsystem)
    }

    /// Commits `value` for `subsystem`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be committed atomically.
    pub fn write(&self, subsystem: Subsystem, value: StateValue) -> Result<(), PersistenceError> {
        debug_assert_eq!(value.kind(), subsystem.kind());
        write_value(&self.path(subsystem), value)
    }

    /// Removes the state file of `subsystem` and any leftover temporary file.
    /// Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns any IO error other than `NotFound`.
    pub fn remove(&self, subsystem: Subsystem) -> io::Result<()> {
        let path = self.path(subsystem);
        remove_if_present(&temp_path(&path))?;
        remove_if_present(&path)
    }
}
