//! Build script for udev-sys.
//!
//! With the `udev-sdk` feature the crate links against the system libudev,
//! probed through pkg-config with a fallback to the standard library
//! directories. Without the feature no library is linked; the crate
//! provides panic stubs instead.

fn main() {
    println!("cargo:rerun-if-env-changed=UDEV_LIB_DIR");

    #[cfg(feature = "udev-sdk")]
    link_libudev();
}

#[cfg(feature = "udev-sdk")]
fn link_libudev() {
    if let Ok(dir) = std::env::var("UDEV_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir);
        println!("cargo:rustc-link-lib=udev");
        return;
    }

    // Try pkg-config first
    if pkg_config::probe_library("libudev").is_ok() {
        return;
    }

    // Fallback to standard locations
    println!("cargo:rustc-link-lib=udev");

    let lib_paths = [
        "/usr/local/lib",
        "/usr/lib",
        "/usr/lib/x86_64-linux-gnu",
        "/usr/lib/aarch64-linux-gnu",
        "/lib/x86_64-linux-gnu",
    ];

    for path in lib_paths {
        if std::path::Path::new(path).join("libudev.so").exists()
            || std::path::Path::new(path).join("libudev.a").exists()
        {
            println!("cargo:rustc-link-search=native={}", path);
            break;
        }
    }
}
