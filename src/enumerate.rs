//! Predicate-accumulating registry scans.
//!
//! An [`Enumerator`] collects match/no-match predicates and executes
//! point-in-time scans against the registry. Predicate composition is
//! delegated to libudev and preserved exactly: repeated predicates of the
//! same kind OR together, distinct kinds AND together, and explicitly
//! added syspaths are always included regardless of the other predicates.
//! Scans are repeatable: each call takes a fresh snapshot, nothing is
//! cached.

use std::ptr::NonNull;

use tracing::debug;

use crate::device::Device;
use crate::error::{HotplugError, Result};
use crate::ffi::cstring;
use crate::list::{self, DeviceMap, Set};
use crate::registry;

/// A registry scan under construction.
///
/// # Example
///
/// ```no_run
/// use hotplug::Udev;
///
/// # fn example() -> hotplug::Result<()> {
/// let mut e = Udev::new().enumerator()?;
/// e.match_subsystem("block")?;
/// e.match_is_initialized()?;
/// for (syspath, device) in e.devices()? {
///     println!("{syspath}: {}", device.devnode());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Enumerator {
    ptr: NonNull<udev_sys::udev_enumerate>,
}

// SAFETY: all operations on the udev_enumerate handle, including Drop,
// serialize through the global registry lock.
unsafe impl Send for Enumerator {}
unsafe impl Sync for Enumerator {}

impl Enumerator {
    pub(crate) fn new() -> Result<Self> {
        let guard = registry::lock()?;
        let ptr = unsafe { udev_sys::udev_enumerate_new(guard.handle()) };
        NonNull::new(ptr)
            .map(|ptr| Self { ptr })
            .ok_or(HotplugError::NullPointer {
                function: "udev_enumerate_new",
            })
    }

    fn as_ptr(&self) -> *mut udev_sys::udev_enumerate {
        self.ptr.as_ptr()
    }

    fn check(ret: i32, predicate: impl Into<String>) -> Result<()> {
        if ret < 0 {
            return Err(HotplugError::filter(predicate, ret));
        }
        Ok(())
    }

    /// Restrict the scan to devices of the given subsystem. Repeated calls
    /// OR together.
    pub fn match_subsystem(&mut self, subsystem: &str) -> Result<()> {
        let c = cstring(subsystem, "subsystem")?;
        let _guard = registry::shared_lock();
        let ret = unsafe { udev_sys::udev_enumerate_add_match_subsystem(self.as_ptr(), c.as_ptr()) };
        Self::check(ret, format!("match_subsystem({subsystem})"))
    }

    /// Exclude devices of the given subsystem.
    pub fn nomatch_subsystem(&mut self, subsystem: &str) -> Result<()> {
        let c = cstring(subsystem, "subsystem")?;
        let _guard = registry::shared_lock();
        let ret =
            unsafe { udev_sys::udev_enumerate_add_nomatch_subsystem(self.as_ptr(), c.as_ptr()) };
        Self::check(ret, format!("nomatch_subsystem({subsystem})"))
    }

    /// Restrict the scan to devices whose sysattr matches the given value.
    pub fn match_sysattr(&mut self, sysattr: &str, value: &str) -> Result<()> {
        let c_sysattr = cstring(sysattr, "sysattr name")?;
        let c_value = cstring(value, "sysattr value")?;
        let _guard = registry::shared_lock();
        let ret = unsafe {
            udev_sys::udev_enumerate_add_match_sysattr(
                self.as_ptr(),
                c_sysattr.as_ptr(),
                c_value.as_ptr(),
            )
        };
        Self::check(ret, format!("match_sysattr({sysattr}={value})"))
    }

    /// Exclude devices whose sysattr matches the given value.
    pub fn nomatch_sysattr(&mut self, sysattr: &str, value: &str) -> Result<()> {
        let c_sysattr = cstring(sysattr, "sysattr name")?;
        let c_value = cstring(value, "sysattr value")?;
        let _guard = registry::shared_lock();
        let ret = unsafe {
            udev_sys::udev_enumerate_add_nomatch_sysattr(
                self.as_ptr(),
                c_sysattr.as_ptr(),
                c_value.as_ptr(),
            )
        };
        Self::check(ret, format!("nomatch_sysattr({sysattr}={value})"))
    }

    /// Restrict the scan to devices carrying the given property value.
    pub fn match_property(&mut self, property: &str, value: &str) -> Result<()> {
        let c_property = cstring(property, "property name")?;
        let c_value = cstring(value, "property value")?;
        let _guard = registry::shared_lock();
        let ret = unsafe {
            udev_sys::udev_enumerate_add_match_property(
                self.as_ptr(),
                c_property.as_ptr(),
                c_value.as_ptr(),
            )
        };
        Self::check(ret, format!("match_property({property}={value})"))
    }

    /// Restrict the scan to devices whose sysname matches the given glob.
    pub fn match_sysname(&mut self, sysname: &str) -> Result<()> {
        let c = cstring(sysname, "sysname")?;
        let _guard = registry::shared_lock();
        let ret = unsafe { udev_sys::udev_enumerate_add_match_sysname(self.as_ptr(), c.as_ptr()) };
        Self::check(ret, format!("match_sysname({sysname})"))
    }

    /// Restrict the scan to devices carrying the given tag.
    pub fn match_tag(&mut self, tag: &str) -> Result<()> {
        let c = cstring(tag, "tag")?;
        let _guard = registry::shared_lock();
        let ret = unsafe { udev_sys::udev_enumerate_add_match_tag(self.as_ptr(), c.as_ptr()) };
        Self::check(ret, format!("match_tag({tag})"))
    }

    /// Restrict the scan to descendants of the given device.
    pub fn match_parent(&mut self, parent: &Device) -> Result<()> {
        let _guard = registry::shared_lock();
        let ret =
            unsafe { udev_sys::udev_enumerate_add_match_parent(self.as_ptr(), parent.as_ptr()) };
        Self::check(ret, "match_parent")
    }

    /// Restrict the scan to devices the registry has finished initializing.
    pub fn match_is_initialized(&mut self) -> Result<()> {
        let _guard = registry::shared_lock();
        let ret = unsafe { udev_sys::udev_enumerate_add_match_is_initialized(self.as_ptr()) };
        Self::check(ret, "match_is_initialized")
    }

    /// Unconditionally include the device at the given syspath in the scan
    /// results, regardless of the other predicates.
    pub fn add_syspath(&mut self, syspath: &str) -> Result<()> {
        let c = cstring(syspath, "syspath")?;
        let _guard = registry::shared_lock();
        let ret = unsafe { udev_sys::udev_enumerate_add_syspath(self.as_ptr(), c.as_ptr()) };
        Self::check(ret, format!("add_syspath({syspath})"))
    }

    /// Run a device scan and return the matching canonical syspaths.
    pub fn device_syspaths(&mut self) -> Result<Set> {
        let _guard = registry::shared_lock();
        let ret = unsafe { udev_sys::udev_enumerate_scan_devices(self.as_ptr()) };
        if ret < 0 {
            return Err(HotplugError::scan("scan_devices", ret));
        }
        let paths =
            unsafe { list::set_from_entries(udev_sys::udev_enumerate_get_list_entry(self.as_ptr())) };
        debug!(matches = paths.len(), "device scan complete");
        Ok(paths)
    }

    /// Run a subsystem scan and return the matching subsystem and driver
    /// syspaths.
    pub fn subsystem_syspaths(&mut self) -> Result<Set> {
        let _guard = registry::shared_lock();
        let ret = unsafe { udev_sys::udev_enumerate_scan_subsystems(self.as_ptr()) };
        if ret < 0 {
            return Err(HotplugError::scan("scan_subsystems", ret));
        }
        let paths =
            unsafe { list::set_from_entries(udev_sys::udev_enumerate_get_list_entry(self.as_ptr())) };
        debug!(matches = paths.len(), "subsystem scan complete");
        Ok(paths)
    }

    /// Run a device scan and hydrate every matched syspath into a
    /// [`Device`], keyed by canonical syspath, in one locked pass.
    ///
    /// A path whose device disappears between the scan and hydration is
    /// skipped; absence is not an error.
    pub fn devices(&mut self) -> Result<DeviceMap> {
        let guard = registry::lock()?;
        let ret = unsafe { udev_sys::udev_enumerate_scan_devices(self.as_ptr()) };
        if ret < 0 {
            return Err(HotplugError::scan("scan_devices", ret));
        }

        // Hydrate into a Vec first: inserting into the map could drop a
        // replaced Device while the registry lock is still held.
        let mut hydrated = Vec::new();
        unsafe {
            let mut entry = udev_sys::udev_enumerate_get_list_entry(self.as_ptr());
            while !entry.is_null() {
                let name = udev_sys::udev_list_entry_get_name(entry);
                let device =
                    Device::from_raw(udev_sys::udev_device_new_from_syspath(guard.handle(), name));
                if let Some(device) = device {
                    hydrated.push((crate::ffi::string_or_empty(name), device));
                }
                entry = udev_sys::udev_list_entry_get_next(entry);
            }
        }
        drop(guard);

        let map: DeviceMap = hydrated.into_iter().collect();
        debug!(matches = map.len(), "device scan hydrated");
        Ok(map)
    }
}

impl Drop for Enumerator {
    fn drop(&mut self) {
        let _guard = registry::shared_lock();
        unsafe {
            udev_sys::udev_enumerate_unref(self.as_ptr());
        }
    }
}
