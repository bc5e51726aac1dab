//! String marshalling helpers for the libudev FFI boundary.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::error::{HotplugError, Result};

/// Convert a borrowed C string to an owned `String`, treating a null
/// pointer as absence. libudev reports "no value" as NULL, which the
/// wrapper surfaces as an empty string rather than an error.
pub(crate) unsafe fn string_or_empty(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

/// Marshal an argument string for FFI, rejecting interior NUL bytes.
pub(crate) fn cstring(value: &str, what: &'static str) -> Result<CString> {
    CString::new(value).map_err(|_| HotplugError::InvalidString { what })
}

/// Marshal an argument used by an infallible accessor, `None` on interior
/// NUL bytes. Such a string cannot name anything in the registry, so the
/// lookup is absent by definition.
pub(crate) fn cstring_opt(value: &str) -> Option<CString> {
    CString::new(value).ok()
}
