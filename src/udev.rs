//! Entry point to the device registry.
//!
//! [`Udev`] is a zero-sized handle to the process-wide udev context; the
//! context itself is created lazily on first use and shared by every
//! `Udev` value in the process (see [`crate::registry`]). Lookups that
//! find nothing return `Ok(None)`; absence is not a fault.

use tracing::debug;

use crate::device::Device;
use crate::devnum::{DeviceType, Devnum};
use crate::enumerate::Enumerator;
use crate::error::Result;
use crate::ffi::cstring;
use crate::monitor::Monitor;
use crate::registry;

/// Handle to the process-wide device registry.
///
/// Cheap to create and copy; all instances share one underlying udev
/// context and one global lock. Operations on devices, enumerators, and
/// monitors derived from any `Udev` are serialized against each other.
///
/// # Example
///
/// ```no_run
/// use hotplug::Udev;
///
/// # fn example() -> hotplug::Result<()> {
/// let udev = Udev::new();
/// if let Some(device) = udev.device_from_syspath("/sys/devices/virtual/mem/zero")? {
///     println!("{} on {}", device.devnode(), device.subsystem());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Udev;

impl Udev {
    /// Create a registry handle. The underlying context is not created
    /// until the first operation that needs it.
    pub fn new() -> Self {
        Self
    }

    /// Look up a device by its canonical syspath, e.g.
    /// `/sys/devices/virtual/mem/zero`.
    pub fn device_from_syspath(&self, syspath: &str) -> Result<Option<Device>> {
        let c_syspath = cstring(syspath, "syspath")?;
        let guard = registry::lock()?;
        let device = unsafe {
            Device::from_raw(udev_sys::udev_device_new_from_syspath(
                guard.handle(),
                c_syspath.as_ptr(),
            ))
        };
        debug!(syspath, found = device.is_some(), "syspath lookup");
        Ok(device)
    }

    /// Look up a device by its device number and character/block
    /// discriminator.
    pub fn device_from_devnum(&self, devtype: DeviceType, devnum: Devnum) -> Result<Option<Device>> {
        let guard = registry::lock()?;
        let device = unsafe {
            Device::from_raw(udev_sys::udev_device_new_from_devnum(
                guard.handle(),
                devtype.as_char() as libc::c_char,
                devnum.as_raw(),
            ))
        };
        debug!(%devnum, found = device.is_some(), "devnum lookup");
        Ok(device)
    }

    /// Look up a device by its subsystem and kernel device name, e.g.
    /// `("mem", "zero")`.
    pub fn device_from_subsystem_sysname(
        &self,
        subsystem: &str,
        sysname: &str,
    ) -> Result<Option<Device>> {
        let c_subsystem = cstring(subsystem, "subsystem")?;
        let c_sysname = cstring(sysname, "sysname")?;
        let guard = registry::lock()?;
        let device = unsafe {
            Device::from_raw(udev_sys::udev_device_new_from_subsystem_sysname(
                guard.handle(),
                c_subsystem.as_ptr(),
                c_sysname.as_ptr(),
            ))
        };
        debug!(subsystem, sysname, found = device.is_some(), "subsystem/sysname lookup");
        Ok(device)
    }

    /// Look up a device by its composite device id, e.g. `"c1:5"` for the
    /// character device 1:5 or `"b8:0"` for a whole disk.
    pub fn device_from_device_id(&self, id: &str) -> Result<Option<Device>> {
        let c_id = cstring(id, "device id")?;
        let guard = registry::lock()?;
        let device = unsafe {
            Device::from_raw(udev_sys::udev_device_new_from_device_id(
                guard.handle(),
                c_id.as_ptr(),
            ))
        };
        debug!(id, found = device.is_some(), "device id lookup");
        Ok(device)
    }

    /// Create a fresh enumerator for building and running registry scans.
    pub fn enumerator(&self) -> Result<Enumerator> {
        Enumerator::new()
    }

    /// Create a monitor bound to the named netlink notification group,
    /// `"udev"` for post-processing events (the usual choice) or
    /// `"kernel"` for raw kernel uevents.
    pub fn monitor_from_netlink(&self, name: &str) -> Result<Monitor> {
        Monitor::from_netlink(name)
    }
}
