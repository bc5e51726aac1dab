//! Typed, locked view over one device registry entry.
//!
//! A [`Device`] owns exactly one counted reference to the underlying
//! `udev_device` and releases it exactly once on drop. Every accessor
//! acquires the global registry lock for the duration of its single FFI
//! call; missing values come back as empty strings, zero, or `false`
//! rather than errors, matching native libudev semantics.

use std::ptr::NonNull;

use crate::devnum::Devnum;
use crate::error::{HotplugError, Result};
use crate::ffi::{cstring, cstring_opt, string_or_empty};
use crate::list::{self, Map, Set};
use crate::registry;

/// One entry in the device registry.
pub struct Device {
    ptr: NonNull<udev_sys::udev_device>,
}

// SAFETY: the udev_device handle is not internally synchronized, but every
// operation on it (including Drop and Clone) serializes through the global
// registry lock.
unsafe impl Send for Device {}
unsafe impl Sync for Device {}

impl Device {
    /// Wrap a raw device pointer, taking ownership of one reference.
    /// A null pointer is lookup absence, not an error.
    pub(crate) unsafe fn from_raw(ptr: *mut udev_sys::udev_device) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    pub(crate) fn as_ptr(&self) -> *mut udev_sys::udev_device {
        self.ptr.as_ptr()
    }

    /// Kernel device path below `/sys`, e.g. `/devices/virtual/mem/zero`.
    pub fn devpath(&self) -> String {
        let _guard = registry::shared_lock();
        unsafe { string_or_empty(udev_sys::udev_device_get_devpath(self.as_ptr())) }
    }

    /// Subsystem the device belongs to, e.g. `block` or `mem`.
    pub fn subsystem(&self) -> String {
        let _guard = registry::shared_lock();
        unsafe { string_or_empty(udev_sys::udev_device_get_subsystem(self.as_ptr())) }
    }

    /// Device type within its subsystem, e.g. `disk` or `partition`.
    pub fn devtype(&self) -> String {
        let _guard = registry::shared_lock();
        unsafe { string_or_empty(udev_sys::udev_device_get_devtype(self.as_ptr())) }
    }

    /// Canonical absolute path identifying the device, e.g.
    /// `/sys/devices/virtual/mem/zero`.
    pub fn syspath(&self) -> String {
        let _guard = registry::shared_lock();
        unsafe { string_or_empty(udev_sys::udev_device_get_syspath(self.as_ptr())) }
    }

    /// Kernel device name, the last component of the syspath.
    pub fn sysname(&self) -> String {
        let _guard = registry::shared_lock();
        unsafe { string_or_empty(udev_sys::udev_device_get_sysname(self.as_ptr())) }
    }

    /// Trailing instance number of the sysname, as a string.
    pub fn sysnum(&self) -> String {
        let _guard = registry::shared_lock();
        unsafe { string_or_empty(udev_sys::udev_device_get_sysnum(self.as_ptr())) }
    }

    /// Device node path below `/dev`, empty if the device has none.
    pub fn devnode(&self) -> String {
        let _guard = registry::shared_lock();
        unsafe { string_or_empty(udev_sys::udev_device_get_devnode(self.as_ptr())) }
    }

    /// Kernel driver bound to the device, empty if none.
    pub fn driver(&self) -> String {
        let _guard = registry::shared_lock();
        unsafe { string_or_empty(udev_sys::udev_device_get_driver(self.as_ptr())) }
    }

    /// Hot-plug action for devices received from a monitor: `add`,
    /// `remove`, `change`, `online`, `offline`, `bind`, or `unbind`.
    /// Empty for devices obtained by lookup or enumeration.
    pub fn action(&self) -> String {
        let _guard = registry::shared_lock();
        unsafe { string_or_empty(udev_sys::udev_device_get_action(self.as_ptr())) }
    }

    /// Kernel event sequence number, zero outside a monitor event.
    pub fn seqnum(&self) -> u64 {
        let _guard = registry::shared_lock();
        unsafe { udev_sys::udev_device_get_seqnum(self.as_ptr()) }
    }

    /// Microseconds since the registry finished initializing the device,
    /// zero if not yet initialized.
    pub fn usec_since_initialized(&self) -> u64 {
        let _guard = registry::shared_lock();
        unsafe { udev_sys::udev_device_get_usec_since_initialized(self.as_ptr()) }
    }

    /// Whether the registry has finished applying rules to the device.
    pub fn is_initialized(&self) -> bool {
        let _guard = registry::shared_lock();
        unsafe { udev_sys::udev_device_get_is_initialized(self.as_ptr()) != 0 }
    }

    /// The device's (major, minor) number; `0:0` if it has none.
    pub fn devnum(&self) -> Devnum {
        let _guard = registry::shared_lock();
        Devnum::from(unsafe { udev_sys::udev_device_get_devnum(self.as_ptr()) })
    }

    /// Whether the registry attached the given tag to this device.
    pub fn has_tag(&self, tag: &str) -> bool {
        let Some(tag) = cstring_opt(tag) else {
            return false;
        };
        let _guard = registry::shared_lock();
        unsafe { udev_sys::udev_device_has_tag(self.as_ptr(), tag.as_ptr()) != 0 }
    }

    /// Value of a registry property, empty if the key is absent.
    pub fn property_value(&self, key: &str) -> String {
        let Some(key) = cstring_opt(key) else {
            return String::new();
        };
        let _guard = registry::shared_lock();
        unsafe {
            string_or_empty(udev_sys::udev_device_get_property_value(
                self.as_ptr(),
                key.as_ptr(),
            ))
        }
    }

    /// Current value of a sysattr, empty if absent or unreadable.
    pub fn sysattr_value(&self, sysattr: &str) -> String {
        let Some(sysattr) = cstring_opt(sysattr) else {
            return String::new();
        };
        let _guard = registry::shared_lock();
        unsafe {
            string_or_empty(udev_sys::udev_device_get_sysattr_value(
                self.as_ptr(),
                sysattr.as_ptr(),
            ))
        }
    }

    /// Write a sysattr value. The only mutating operation on a device;
    /// fails if the attribute is read-only, the device is gone, or the
    /// caller lacks permission.
    pub fn set_sysattr_value(&self, sysattr: &str, value: &str) -> Result<()> {
        let c_sysattr = cstring(sysattr, "sysattr name")?;
        let c_value = cstring(value, "sysattr value")?;
        let _guard = registry::shared_lock();
        let ret = unsafe {
            udev_sys::udev_device_set_sysattr_value(
                self.as_ptr(),
                c_sysattr.as_ptr(),
                c_value.as_ptr(),
            )
        };
        if ret < 0 {
            return Err(HotplugError::SysattrWrite {
                sysattr: sysattr.to_string(),
                source: std::io::Error::from_raw_os_error(-ret),
            });
        }
        Ok(())
    }

    /// Snapshot of all device properties.
    pub fn properties(&self) -> Map {
        let _guard = registry::shared_lock();
        unsafe {
            list::map_from_entries(udev_sys::udev_device_get_properties_list_entry(
                self.as_ptr(),
            ))
        }
    }

    /// Snapshot of all tags attached to the device.
    pub fn tags(&self) -> Set {
        let _guard = registry::shared_lock();
        unsafe { list::set_from_entries(udev_sys::udev_device_get_tags_list_entry(self.as_ptr())) }
    }

    /// Snapshot of all sysattr names exposed by the device.
    pub fn sysattrs(&self) -> Set {
        let _guard = registry::shared_lock();
        unsafe {
            list::set_from_entries(udev_sys::udev_device_get_sysattr_list_entry(self.as_ptr()))
        }
    }

    /// Snapshot of all device-node symlinks.
    pub fn devlinks(&self) -> Set {
        let _guard = registry::shared_lock();
        unsafe {
            list::set_from_entries(udev_sys::udev_device_get_devlinks_list_entry(self.as_ptr()))
        }
    }

    /// The immediate ancestor device, or `None` at the top of the tree.
    ///
    /// libudev hands out parents as references borrowed from the child, so
    /// the wrapper takes an explicit extra reference: the returned
    /// [`Device`] owns its lifetime independently.
    pub fn parent(&self) -> Option<Device> {
        let _guard = registry::shared_lock();
        unsafe {
            let ptr = udev_sys::udev_device_get_parent(self.as_ptr());
            if !ptr.is_null() {
                udev_sys::udev_device_ref(ptr);
            }
            Device::from_raw(ptr)
        }
    }

    /// The nearest ancestor matching the given subsystem (and devtype, if
    /// provided), or `None` if no ancestor matches.
    pub fn parent_with_subsystem_devtype(
        &self,
        subsystem: &str,
        devtype: Option<&str>,
    ) -> Option<Device> {
        let subsystem = cstring_opt(subsystem)?;
        let devtype = match devtype {
            Some(d) => Some(cstring_opt(d)?),
            None => None,
        };
        let _guard = registry::shared_lock();
        unsafe {
            let ptr = udev_sys::udev_device_get_parent_with_subsystem_devtype(
                self.as_ptr(),
                subsystem.as_ptr(),
                devtype.as_ref().map_or(std::ptr::null(), |d| d.as_ptr()),
            );
            if !ptr.is_null() {
                udev_sys::udev_device_ref(ptr);
            }
            Device::from_raw(ptr)
        }
    }
}

impl Clone for Device {
    /// Duplicating a device acquires a fresh counted reference to the same
    /// registry entry; the two values release independently.
    fn clone(&self) -> Self {
        let _guard = registry::shared_lock();
        unsafe {
            udev_sys::udev_device_ref(self.as_ptr());
        }
        Self { ptr: self.ptr }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        // Must not run while the caller holds the registry lock.
        let _guard = registry::shared_lock();
        unsafe {
            udev_sys::udev_device_unref(self.as_ptr());
        }
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("syspath", &self.syspath())
            .finish()
    }
}
