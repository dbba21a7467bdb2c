//! Menu bar enumeration and selection through the macOS Accessibility API.
//!
//! Reads the top-level items of the frontmost application's menu bar and
//! presses them with `AXPress`.

use std::ffi::c_void;
use std::ptr;

use core_foundation::base::TCFType;
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
use core_foundation::string::{CFString, CFStringRef};

use super::skylight;
use crate::effect::{EffectError, Target};

type AXUIElementRef = *mut c_void;
type AXError = i32;

const K_AX_ERROR_SUCCESS: AXError = 0;

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    static kAXTrustedCheckOptionPrompt: CFStringRef;
    fn AXIsProcessTrustedWithOptions(options: CFDictionaryRef) -> bool;
    fn AXUIElementCreateApplication(pid: i32) -> AXUIElementRef;
    fn AXUIElementCopyAttributeValue(
        element: AXUIElementRef,
        attribute: *const c_void,
        value: *mut *mut c_void,
    ) -> AXError;
    fn AXUIElementPerformAction(element: AXUIElementRef, action: *const c_void) -> AXError;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFGetTypeID(cf: *const c_void) -> u64;
    fn CFArrayGetCount(array: *const c_void) -> i64;
    fn CFArrayGetValueAtIndex(array: *const c_void, idx: i64) -> *const c_void;
    fn CFRelease(cf: *const c_void);
}

/// A Core Foundation object we own, released on drop.
struct Owned(*mut c_void);

impl Owned {
    fn as_ptr(&self) -> *mut c_void { self.0 }
}

impl Drop for Owned {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { CFRelease(self.0) };
        }
    }
}

fn attribute(element: AXUIElementRef, name: &'static str) -> Option<Owned> {
    let name = CFString::from_static_string(name);
    let mut value: *mut c_void = ptr::null_mut();
    let result = unsafe {
        AXUIElementCopyAttributeValue(element, name.as_concrete_TypeRef().cast(), &raw mut value)
    };
    (result == K_AX_ERROR_SUCCESS && !value.is_null()).then_some(Owned(value))
}

fn title(element: AXUIElementRef) -> Option<String> {
    let value = attribute(element, "AXTitle")?;
    if unsafe { CFGetTypeID(value.as_ptr()) } != CFString::type_id() as u64 {
        return None;
    }
    // The copied reference is ours; hand it over to CFString.
    let string = unsafe { CFString::wrap_under_create_rule(value.as_ptr().cast_const().cast()) };
    std::mem::forget(value);
    Some(string.to_string())
}

/// Options asking the system to show the Accessibility permission prompt.
fn prompt_options() -> CFDictionary<CFString, CFBoolean> {
    let key = unsafe { CFString::wrap_under_get_rule(kAXTrustedCheckOptionPrompt) };
    CFDictionary::from_CFType_pairs(&[(key, CFBoolean::true_value())])
}

/// Fails unless this process was granted Accessibility access.
///
/// When access is missing, the system prompts the user to grant it.
///
/// # Errors
///
/// Returns [`EffectError::Permission`] when access is missing.
pub fn ensure_trusted() -> Result<(), EffectError> {
    let options = prompt_options();
    if unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef()) } {
        Ok(())
    } else {
        Err(EffectError::Permission("Accessibility"))
    }
}

/// The frontmost application's menu bar and its top-level children.
struct MenuBar {
    _app: Owned,
    _menu_bar: Owned,
    children: Owned,
}

impl MenuBar {
    fn frontmost() -> Result<Self, EffectError> {
        ensure_trusted()?;

        let pid = skylight::frontmost_pid()
            .ok_or_else(|| EffectError::Enumerate("no frontmost application".to_string()))?;
        let app = Owned(unsafe { AXUIElementCreateApplication(pid) });
        if app.as_ptr().is_null() {
            return Err(EffectError::Enumerate(format!("cannot inspect process {pid}")));
        }

        let menu_bar = attribute(app.as_ptr(), "AXMenuBar")
            .ok_or_else(|| EffectError::Enumerate("failed to get menu bar".to_string()))?;
        let children = attribute(menu_bar.as_ptr(), "AXChildren")
            .ok_or_else(|| EffectError::Enumerate("failed to get menu children".to_string()))?;

        Ok(Self { _app: app, _menu_bar: menu_bar, children })
    }

    fn len(&self) -> usize {
        usize::try_from(unsafe { CFArrayGetCount(self.children.as_ptr()) }).unwrap_or(0)
    }

    fn item(&self, index: usize) -> Option<AXUIElementRef> {
        if index >= self.len() {
            return None;
        }
        let index = i64::try_from(index).ok()?;
        let item = unsafe { CFArrayGetValueAtIndex(self.children.as_ptr(), index) };
        (!item.is_null()).then_some(item.cast_mut())
    }
}

/// Lists the titled top-level menu items of the frontmost application.
///
/// # Errors
///
/// Returns an error if Accessibility access is missing or the menu bar cannot be read.
pub fn list_menu_items() -> Result<Vec<Target>, EffectError> {
    let menu_bar = MenuBar::frontmost()?;
    Ok((0..menu_bar.len())
        .filter_map(|index| {
            let item = menu_bar.item(index)?;
            title(item).map(|label| Target::new(index, label))
        })
        .collect())
}

/// Presses the top-level menu item at `index` of the frontmost application.
///
/// # Errors
///
/// Returns an error if the index is out of range or the press was rejected.
pub fn press_menu_item(index: usize) -> Result<(), EffectError> {
    let menu_bar = MenuBar::frontmost()?;
    let item = menu_bar
        .item(index)
        .ok_or(EffectError::TargetOutOfRange { index, count: menu_bar.len() })?;

    let press = CFString::from_static_string("AXPress");
    let result = unsafe { AXUIElementPerformAction(item, press.as_concrete_TypeRef().cast()) };
    if result == K_AX_ERROR_SUCCESS {
        Ok(())
    } else {
        Err(EffectError::Invoke { index, reason: format!("AXError {result}") })
    }
}
