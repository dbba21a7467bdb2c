//! Safe wrappers for the `SkyLight` private framework calls controlling the menu bar.
//!
#![allow(clippy::doc_markdown)] // Allow SkyLight, SLS, etc. without backticks
//!
//! # Safety
//!
//! These APIs are private and undocumented. They work without SIP disabled but
//! may change between macOS versions. All unsafe code is encapsulated here.

use std::sync::OnceLock;

/// Process serial number as filled in by `_SLPSGetFrontProcess`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSerialNumber {
    pub high: u32,
    pub low: u32,
}

#[link(name = "SkyLight", kind = "framework")]
unsafe extern "C" {
    /// Returns the main connection ID to the window server.
    fn SLSMainConnectionID() -> i32;

    /// Forces the menu bar hidden (`true`) or releases the override.
    fn SLSSetMenuBarVisibilityOverrideOnDisplay(cid: i32, did: i32, enabled: bool);

    /// Sets the menu bar inset and opacity.
    fn SLSSetMenuBarInsetAndAlpha(cid: i32, u1: f64, u2: f64, alpha: f32);

    fn _SLPSGetFrontProcess(psn: *mut ProcessSerialNumber);
    fn SLSGetConnectionIDForPSN(cid: i32, psn: *mut ProcessSerialNumber, cid_out: *mut i32);
    fn SLSConnectionGetPID(cid: i32, pid_out: *mut libc::pid_t);
}

/// Cached connection ID to the window server.
static CONNECTION_ID: OnceLock<i32> = OnceLock::new();

/// Returns the cached window server connection ID.
#[inline]
pub fn connection_id() -> i32 {
    *CONNECTION_ID.get_or_init(|| {
        let cid = unsafe { SLSMainConnectionID() };
        if cid == 0 {
            tracing::error!("skylight: failed to get connection ID");
        }
        cid
    })
}

/// Hides or shows the menu bar on the main display.
pub fn set_menu_bar_hidden(hidden: bool) {
    let cid = connection_id();
    let alpha = if hidden { 0.0 } else { 1.0 };
    unsafe {
        SLSSetMenuBarVisibilityOverrideOnDisplay(cid, 0, hidden);
        SLSSetMenuBarInsetAndAlpha(cid, 0.0, 1.0, alpha);
    }
}

/// Sets the menu bar opacity without touching the visibility override.
pub fn set_menu_bar_alpha(alpha: f32) {
    unsafe { SLSSetMenuBarInsetAndAlpha(connection_id(), 0.0, 1.0, alpha.clamp(0.0, 1.0)) };
}

/// Re-applies the hidden override, which the system drops on some app switches.
pub fn reassert_hidden_override() {
    unsafe { SLSSetMenuBarVisibilityOverrideOnDisplay(connection_id(), 0, true) };
}

/// Shows the menu bar at full opacity.
///
/// Async-signal-safe: bypasses the connection cache, whose initialization may
/// have been interrupted by the signal.
pub fn restore_menu_bar() {
    unsafe {
        let cid = SLSMainConnectionID();
        SLSSetMenuBarVisibilityOverrideOnDisplay(cid, 0, false);
        SLSSetMenuBarInsetAndAlpha(cid, 0.0, 1.0, 1.0);
    }
}

/// Returns the pid of the frontmost application.
pub fn frontmost_pid() -> Option<libc::pid_t> {
    let cid = connection_id();
    let mut psn = ProcessSerialNumber::default();
    let mut target_cid = 0;
    let mut pid: libc::pid_t = 0;
    unsafe {
        _SLPSGetFrontProcess(&raw mut psn);
        SLSGetConnectionIDForPSN(cid, &raw mut psn, &raw mut target_cid);
        SLSConnectionGetPID(target_cid, &raw mut pid);
    }
    (pid > 0).then_some(pid)
}
