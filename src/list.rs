//! Materialized snapshot collections.
//!
//! Scans and list-valued device accessors return full, immutable snapshots
//! taken in a single locked pass over a libudev-owned list; insertion order
//! is not meaningful and keys are unique. Callers must not assume live
//! updates; re-run the query for a fresh snapshot.

use std::collections::{HashMap, HashSet};

use crate::device::Device;
use crate::ffi::string_or_empty;

/// An unordered, deduplicated set of registry strings (syspaths, tags,
/// sysattr names, device links).
pub type Set = HashSet<String>;

/// A key/value map of registry strings (device properties).
pub type Map = HashMap<String, String>;

/// A map from canonical syspath to the hydrated [`Device`].
pub type DeviceMap = HashMap<String, Device>;

/// Collect the names of a `udev_list_entry` chain into a [`Set`].
///
/// # Safety
///
/// `entry` must be the head of a live libudev list (or null), and the
/// caller must hold the registry lock for the duration of the walk.
pub(crate) unsafe fn set_from_entries(mut entry: *mut udev_sys::udev_list_entry) -> Set {
    let mut set = Set::new();
    while !entry.is_null() {
        set.insert(string_or_empty(udev_sys::udev_list_entry_get_name(entry)));
        entry = udev_sys::udev_list_entry_get_next(entry);
    }
    set
}

/// Collect the name/value pairs of a `udev_list_entry` chain into a [`Map`].
///
/// # Safety
///
/// Same contract as [`set_from_entries`].
pub(crate) unsafe fn map_from_entries(mut entry: *mut udev_sys::udev_list_entry) -> Map {
    let mut map = Map::new();
    while !entry.is_null() {
        let name = string_or_empty(udev_sys::udev_list_entry_get_name(entry));
        let value = string_or_empty(udev_sys::udev_list_entry_get_value(entry));
        map.insert(name, value);
        entry = udev_sys::udev_list_entry_get_next(entry);
    }
    map
}
