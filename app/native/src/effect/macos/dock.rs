//! Dock auto-hide control through `defaults` and a Dock restart.
//!
//! "Hidden" keeps auto-hide enabled with a very long reveal delay, so the Dock
//! never shows up. "Visible" keeps auto-hide with an instant reveal.

use std::ffi::{CStr, c_char};
use std::process::Command;
use std::ptr;
use std::thread;
use std::time::Duration;

const DEFAULTS: &str = "/usr/bin/defaults";
const KILLALL: &str = "/usr/bin/killall";
const DOCK_DOMAIN: &str = "com.apple.dock";

fn run(program: &str, args: &[&str]) -> Result<(), String> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|err| format!("failed to run {program}: {err}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{program} {} exited with {status}", args.join(" ")))
    }
}

fn write_pref(key: &str, kind: &str, value: &str) -> Result<(), String> {
    run(DEFAULTS, &["write", DOCK_DOMAIN, key, kind, value])
}

/// Applies the hidden or visible Dock behaviour and restarts the Dock.
///
/// # Errors
///
/// Returns a description of the first command that failed.
pub fn apply(hidden: bool, settle: Duration) -> Result<(), String> {
    let (delay, modifier) = if hidden { ("1000", "0") } else { ("0.0", "0.1") };

    write_pref("autohide", "-bool", "true")?;
    write_pref("autohide-delay", "-float", delay)?;
    write_pref("autohide-time-modifier", "-float", modifier)?;
    run(KILLALL, &["Dock"])?;

    if !hidden {
        thread::sleep(settle);
    }
    Ok(())
}

/// Runs `argv` (null-terminated) and waits for it, using only
/// async-signal-safe calls.
unsafe fn spawn_and_wait(argv: &[*const c_char]) {
    unsafe {
        let pid = libc::fork();
        if pid == 0 {
            libc::execv(argv[0], argv.as_ptr());
            libc::_exit(127);
        }
        if pid > 0 {
            let mut status = 0;
            libc::waitpid(pid, &raw mut status, 0);
        }
    }
}

const fn arg(value: &'static CStr) -> *const c_char { value.as_ptr() }

/// Restores the default Dock reveal delay while keeping auto-hide.
///
/// Async-signal-safe: no allocation, only `fork`/`execv`/`waitpid`.
pub fn restore() {
    unsafe {
        spawn_and_wait(&[
            arg(c"/usr/bin/defaults"),
            arg(c"delete"),
            arg(c"com.apple.dock"),
            arg(c"autohide-delay"),
            ptr::null(),
        ]);
        spawn_and_wait(&[
            arg(c"/usr/bin/defaults"),
            arg(c"write"),
            arg(c"com.apple.dock"),
            arg(c"autohide"),
            arg(c"-bool"),
            arg(c"true"),
            ptr::null(),
        ]);
        spawn_and_wait(&[arg(c"/usr/bin/killall"), arg(c"Dock"), ptr::null()]);
    }
}
