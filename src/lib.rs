//! Safe interface to the Linux udev device registry and hot-plug events.
//!
//! This crate wraps the low-level FFI bindings from `udev-sys` with proper
//! error handling, RAII reference management, and an async event stream.
//! It covers the three ways of consuming the registry:
//!
//! - **Lookup**: resolve a single [`Device`] by syspath, device number,
//!   subsystem + sysname, or composite device id ([`Udev`]).
//! - **Enumeration**: build a predicate set and take point-in-time
//!   snapshots of matching devices ([`Enumerator`]).
//! - **Monitoring**: subscribe to a live, cancellable stream of
//!   add/remove/change events ([`Monitor`] / [`EventStream`]).
//!
//! # Thread Safety
//!
//! libudev is not thread-safe: it forbids concurrent calls that share a
//! context, even read-only calls on independent derived objects. The crate
//! therefore serializes every registry-touching operation through one
//! process-wide lock, created together with the context on first use. All
//! public types are `Send + Sync`; the cost is that any two registry
//! operations in the process are serialized, and the monitor worker is
//! careful to wait for events and publish them outside the lock.
//!
//! # Features
//!
//! - `hardware`: link against the system libudev. Without it the crate
//!   compiles against panic stubs, which is enough to build and run the
//!   hardware-independent unit tests on machines without libudev.
//!
//! # Example
//!
//! ```no_run
//! use hotplug::{DeviceType, Devnum, Udev};
//!
//! # fn example() -> hotplug::Result<()> {
//! let udev = Udev::new();
//!
//! // Lookup by device number: /dev/zero is the character device 1:5.
//! if let Some(zero) = udev.device_from_devnum(DeviceType::Character, Devnum::new(1, 5))? {
//!     println!("{} is {}", zero.devnode(), zero.syspath());
//! }
//!
//! // Enumerate initialized block devices.
//! let mut e = udev.enumerator()?;
//! e.match_subsystem("block")?;
//! e.match_is_initialized()?;
//! for syspath in e.device_syspaths()? {
//!     println!("{syspath}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod devnum;
pub mod enumerate;
pub mod error;
pub mod list;
pub mod monitor;
pub mod udev;

mod ffi;
mod registry;

pub use device::Device;
pub use devnum::{DeviceType, Devnum};
pub use enumerate::Enumerator;
pub use error::{HotplugError, Result};
pub use list::{DeviceMap, Map, Set};
pub use monitor::{EventStream, Monitor};
pub use udev::Udev;
