//! Live-registry lookup tests.
//!
//! These tests query the real udev registry and therefore require
//! the `hardware` feature (linking libudev) plus an explicit opt-in:
//!
//! ```bash
//! export HOTPLUG_HARDWARE_TEST=1
//! cargo test --features hardware --test registry_lookup
//! ```
//!
//! They rely only on `/dev/zero` (character device 1:5), which exists on
//! every Linux system.

#![cfg(feature = "hardware")]

use hotplug::{DeviceType, Devnum, Udev};
use serial_test::serial;
use std::env;

fn hardware_test_enabled() -> bool {
    env::var("HOTPLUG_HARDWARE_TEST")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

macro_rules! skip_if_disabled {
    () => {
        if !hardware_test_enabled() {
            eprintln!("skipping: set HOTPLUG_HARDWARE_TEST=1 to enable");
            return;
        }
    };
}

const ZERO_SYSPATH: &str = "/sys/devices/virtual/mem/zero";
const ZERO_DEVPATH: &str = "/devices/virtual/mem/zero";

#[test]
#[serial]
fn lookup_by_syspath() {
    skip_if_disabled!();
    let udev = Udev::new();
    let device = udev
        .device_from_syspath(ZERO_SYSPATH)
        .expect("registry available")
        .expect("/dev/zero present");
    assert_eq!(device.devpath(), ZERO_DEVPATH);
    assert_eq!(device.subsystem(), "mem");
    assert_eq!(device.devnum(), Devnum::new(1, 5));
}

#[test]
#[serial]
fn lookup_by_devnum() {
    skip_if_disabled!();
    let udev = Udev::new();
    let device = udev
        .device_from_devnum(DeviceType::Character, Devnum::new(1, 5))
        .expect("registry available")
        .expect("/dev/zero present");
    assert_eq!(device.devpath(), ZERO_DEVPATH);
    assert_eq!(device.devnum().major(), 1);
    assert_eq!(device.devnum().minor(), 5);
}

#[test]
#[serial]
fn lookup_by_subsystem_sysname() {
    skip_if_disabled!();
    let udev = Udev::new();
    let device = udev
        .device_from_subsystem_sysname("mem", "zero")
        .expect("registry available")
        .expect("/dev/zero present");
    assert_eq!(device.devpath(), ZERO_DEVPATH);
    assert_eq!(device.sysname(), "zero");
}

#[test]
#[serial]
fn lookup_by_device_id() {
    skip_if_disabled!();
    let udev = Udev::new();
    let device = udev
        .device_from_device_id("c1:5")
        .expect("registry available")
        .expect("/dev/zero present");
    assert_eq!(device.devpath(), ZERO_DEVPATH);
    assert_eq!(device.devnum(), Devnum::new(1, 5));
}

/// All four lookup means must agree on identity.
#[test]
#[serial]
fn lookup_means_agree() {
    skip_if_disabled!();
    let udev = Udev::new();

    let devices = [
        udev.device_from_syspath(ZERO_SYSPATH).unwrap().unwrap(),
        udev.device_from_devnum(DeviceType::Character, Devnum::new(1, 5))
            .unwrap()
            .unwrap(),
        udev.device_from_subsystem_sysname("mem", "zero")
            .unwrap()
            .unwrap(),
        udev.device_from_device_id("c1:5").unwrap().unwrap(),
    ];

    for device in &devices {
        assert_eq!(device.devpath(), ZERO_DEVPATH);
        assert_eq!(device.subsystem(), "mem");
        assert_eq!(device.devnum(), Devnum::new(1, 5));
        assert_eq!(device.syspath(), ZERO_SYSPATH);
    }
}

#[test]
#[serial]
fn lookup_absence_is_none_not_error() {
    skip_if_disabled!();
    let udev = Udev::new();
    let missing = udev
        .device_from_syspath("/sys/devices/virtual/mem/no-such-device")
        .expect("registry available");
    assert!(missing.is_none());
}

#[test]
#[serial]
fn concrete_mem_zero_scenario() {
    skip_if_disabled!();
    let udev = Udev::new();
    let device = udev
        .device_from_device_id("c1:5")
        .expect("registry available")
        .expect("/dev/zero present");
    assert_eq!(device.subsystem(), "mem");
    assert_eq!(device.syspath(), ZERO_SYSPATH);
    assert_eq!(device.devnode(), "/dev/zero");
    assert!(device.is_initialized());
}

#[test]
#[serial]
fn cloned_device_is_independent() {
    skip_if_disabled!();
    let udev = Udev::new();
    let original = udev
        .device_from_syspath(ZERO_SYSPATH)
        .unwrap()
        .expect("/dev/zero present");
    let copy = original.clone();
    drop(original);
    // The clone holds its own reference; the original's release must not
    // invalidate it.
    assert_eq!(copy.syspath(), ZERO_SYSPATH);
}

#[test]
#[serial]
fn parent_walks_agree() {
    skip_if_disabled!();
    let udev = Udev::new();
    let device = udev
        .device_from_syspath(ZERO_SYSPATH)
        .unwrap()
        .expect("/dev/zero present");

    if let Some(parent) = device.parent() {
        let filtered = device.parent_with_subsystem_devtype(&parent.subsystem(), None);
        if let Some(filtered) = filtered {
            // When the filtered walk matches the immediate parent's
            // subsystem, both walks land on the same entry.
            if filtered.syspath() == parent.syspath() {
                assert_eq!(filtered.devpath(), parent.devpath());
            }
        }
    }
}

#[test]
#[serial]
fn properties_and_tags_snapshots() {
    skip_if_disabled!();
    let udev = Udev::new();
    let device = udev
        .device_from_syspath(ZERO_SYSPATH)
        .unwrap()
        .expect("/dev/zero present");

    let properties = device.properties();
    assert_eq!(properties.get("SUBSYSTEM").map(String::as_str), Some("mem"));
    assert_eq!(device.property_value("SUBSYSTEM"), "mem");

    // Sysattr snapshot and point read must agree on what exists.
    for sysattr in device.sysattrs() {
        let _ = device.sysattr_value(&sysattr);
    }

    for tag in device.tags() {
        assert!(device.has_tag(&tag));
    }
}
