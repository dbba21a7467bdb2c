//! Restoration on SIGINT/SIGTERM.
//!
//! Everything the signal handler needs is prepared up front in a
//! [`Restoration`] plan: file paths as C strings, our own pid as decimal bytes,
//! and the controller's restore hook. The handler itself only calls
//! async-signal-safe functions (`open`, `read`, `close`, `unlink`, `write`,
//! `_exit`) and never allocates, locks, or unwinds.

use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr;
use std::sync::OnceLock;

use crate::effect::RestoreHook;

const RESTORING_MESSAGE: &[u8] = b"\nRestoring UI and exiting...\n";

static PLAN: OnceLock<Restoration> = OnceLock::new();

/// What to undo when the daemon is asked to terminate.
#[derive(Debug)]
pub struct Restoration {
    hook: RestoreHook,
    owned_files: Vec<CString>,
    shared_lock: CString,
    pid_digits: Vec<u8>,
}

fn c_path(path: &Path) -> io::Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"))
}

impl Restoration {
    /// Creates a plan.
    ///
    /// `owned_files` are always removed. `shared_lock` is removed only while it
    /// records this process as its owner.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a path cannot be represented as a C string.
    pub fn new(hook: RestoreHook, owned_files: &[&Path], shared_lock: &Path) -> io::Result<Self> {
        Ok(Self {
            hook,
            owned_files: owned_files.iter().map(|path| c_path(path)).collect::<io::Result<_>>()?,
            shared_lock: c_path(shared_lock)?,
            pid_digits: std::process::id().to_string().into_bytes(),
        })
    }

    /// Restores the environment and removes our files.
    ///
    /// Async-signal-safe: performs no allocation and takes no locks.
    pub fn run(&self) {
        (self.hook)();

        if self.holds_shared_lock() {
            // SAFETY: `shared_lock` is a valid NUL-terminated path.
            unsafe { libc::unlink(self.shared_lock.as_ptr()) };
        }
        for path in &self.owned_files {
            // SAFETY: `path` is a valid NUL-terminated path.
            unsafe { libc::unlink(path.as_ptr()) };
        }
    }

    fn holds_shared_lock(&self) -> bool {
        // SAFETY: plain syscalls on a valid path and a stack buffer.
        unsafe {
            let fd = libc::open(self.shared_lock.as_ptr(), libc::O_RDONLY);
            if fd < 0 {
                return false;
            }
            let mut buf = [0u8; 32];
            let read = libc::read(fd, buf.as_mut_ptr().cast(), buf.len());
            libc::close(fd);

            let Ok(read) = usize::try_from(read) else {
                return false;
            };
            buf[..read].trim_ascii() == self.pid_digits.as_slice()
        }
    }
}

extern "C" fn on_termination_signal(_signal: libc::c_int) {
    // SAFETY: write(2) on stderr with a static buffer.
    unsafe {
        libc::write(libc::STDERR_FILENO, RESTORING_MESSAGE.as_ptr().cast(), RESTORING_MESSAGE.len());
    }

    if let Some(plan) = PLAN.get() {
        plan.run();
    }

    // SAFETY: terminates immediately, without running atexit handlers or unwinding.
    unsafe { libc::_exit(0) };
}

/// Stores `plan` and routes SIGINT and SIGTERM to it.
///
/// Each termination signal is blocked while the handler runs, so a second
/// Ctrl+C cannot interrupt a restoration in progress.
///
/// # Errors
///
/// Returns `AlreadyExists` if a plan was installed before, or the OS error of
/// `sigaction`.
pub fn install(plan: Restoration) -> io::Result<()> {
    PLAN.set(plan).map_err(|_| {
        io::Error::new(io::ErrorKind::AlreadyExists, "termination handler already installed")
    })?;

    for signal in [libc::SIGINT, libc::SIGTERM] {
        // SAFETY: the action is fully initialized before being registered and the
        // handler only performs async-signal-safe work.
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction =
                on_termination_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
            libc::sigemptyset(&raw mut action.sa_mask);
            libc::sigaddset(&raw mut action.sa_mask, libc::SIGINT);
            libc::sigaddset(&raw mut action.sa_mask, libc::SIGTERM);
            action.sa_flags = 0;

            if libc::sigaction(signal, &raw const action, ptr::null_mut()) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
    }

    tracing::debug!("termination handlers installed");
    Ok(())
}
