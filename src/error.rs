//! Error types for registry, enumeration, and monitor operations.
//!
//! Lookup absence is deliberately not an error: a query that finds nothing
//! returns `Ok(None)` (or an empty collection). The variants here cover the
//! failure modes that carry a cause: context creation, rejected
//! predicates, failed scans, rejected sysattr writes, and monitor socket
//! failures.

use std::io;

use thiserror::Error;

/// Result type alias for hotplug operations.
pub type Result<T> = std::result::Result<T, HotplugError>;

/// Errors that can occur when working with the udev device registry.
#[derive(Error, Debug)]
pub enum HotplugError {
    /// The process-wide udev context could not be created. Creation is
    /// retried on the next registry access.
    #[error("failed to create udev context: {source}")]
    Context {
        #[source]
        source: io::Error,
    },

    /// A libudev constructor returned a null pointer for a derived object
    /// (enumerator or monitor), which indicates allocation failure rather
    /// than lookup absence.
    #[error("null pointer returned from {function}")]
    NullPointer { function: &'static str },

    /// A match/no-match predicate or monitor filter was rejected by the
    /// registry. Recoverable; the caller may adjust the predicate and retry.
    #[error("udev rejected predicate '{predicate}': {source}")]
    Filter {
        predicate: String,
        #[source]
        source: io::Error,
    },

    /// An enumeration scan failed at the I/O or permission level.
    #[error("udev scan '{operation}' failed: {source}")]
    Scan {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// A sysattr write was rejected (read-only attribute, absent device,
    /// or insufficient permissions).
    #[error("failed to write sysattr '{sysattr}': {source}")]
    SysattrWrite {
        sysattr: String,
        #[source]
        source: io::Error,
    },

    /// The monitor socket receive buffer size could not be applied. This
    /// must be configured before the event stream is started.
    #[error("failed to set monitor receive buffer size to {bytes} bytes: {source}")]
    ReceiveBuffer {
        bytes: usize,
        #[source]
        source: io::Error,
    },

    /// `listen` was called on a monitor whose event stream is already
    /// running. A monitor socket can only be enabled once; create a new
    /// monitor instead.
    #[error("monitor is already listening")]
    AlreadyListening,

    /// The monitor socket or its readiness registration failed, or a
    /// receive reported a genuine error. Terminates that monitor's stream
    /// without affecting other monitors or the registry.
    #[error("monitor stream operation '{operation}' failed: {source}")]
    Stream {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// An argument contained an interior NUL byte and cannot cross the FFI
    /// boundary.
    #[error("invalid {what}: string contains an interior NUL byte")]
    InvalidString { what: &'static str },
}

impl HotplugError {
    /// Build an error from a libudev return code that encodes a negative
    /// errno, attaching the operation it came from as a filter failure.
    pub(crate) fn filter(predicate: impl Into<String>, code: i32) -> Self {
        Self::Filter {
            predicate: predicate.into(),
            source: io::Error::from_raw_os_error(-code),
        }
    }

    /// Build a scan error from a negative-errno return code.
    pub(crate) fn scan(operation: &'static str, code: i32) -> Self {
        Self::Scan {
            operation,
            source: io::Error::from_raw_os_error(-code),
        }
    }

    /// Check if this is a rejected-predicate error.
    pub fn is_filter(&self) -> bool {
        matches!(self, Self::Filter { .. })
    }

    /// Check if this error terminated a monitor stream.
    pub fn is_stream_fatal(&self) -> bool {
        matches!(self, Self::Stream { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_error_carries_predicate_and_errno() {
        let err = HotplugError::filter("match_subsystem(block)", -libc::EINVAL);
        let text = err.to_string();
        assert!(text.contains("match_subsystem(block)"));
        assert!(err.is_filter());
    }

    #[test]
    fn scan_error_carries_operation() {
        let err = HotplugError::scan("scan_devices", -libc::EACCES);
        assert!(err.to_string().contains("scan_devices"));
        assert!(!err.is_filter());
    }

    #[test]
    fn sysattr_write_error_names_the_attribute() {
        let err = HotplugError::SysattrWrite {
            sysattr: "queue/scheduler".to_string(),
            source: io::Error::from_raw_os_error(libc::EPERM),
        };
        assert!(err.to_string().contains("queue/scheduler"));
    }

    #[test]
    fn stream_error_is_fatal_to_the_stream_only() {
        let err = HotplugError::Stream {
            operation: "enable_receiving",
            source: io::Error::from_raw_os_error(libc::EBADF),
        };
        assert!(err.is_stream_fatal());
        assert!(err.to_string().contains("enable_receiving"));
    }
}
