//! Process-wide udev context and the global lock serializing access to it.
//!
//! libudev forbids concurrent calls that share a `struct udev` context,
//! even read-only calls on independent derived objects. Everything in this
//! crate therefore routes through one global mutex: the creating lock path
//! ([`lock`]) used by constructors, and the non-creating path
//! ([`shared_lock`]) used by operations and `Drop` impls on objects that
//! already exist (their existence implies the context is live).
//!
//! The context is created lazily on first use and is never released; it
//! lives until process exit. Creation failure is not permanent: the next
//! access retries.

use std::io;
use std::ptr::NonNull;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::error::{HotplugError, Result};

/// Lifecycle of the process-wide context handle.
#[derive(Clone, Copy)]
enum State {
    Uninitialized,
    Ready(NonNull<udev_sys::udev>),
    Failed,
}

struct Registry {
    state: Mutex<State>,
}

// SAFETY: the raw context pointer inside State is only ever dereferenced
// while the mutex is held, and libudev contexts have no thread affinity.
unsafe impl Send for Registry {}
unsafe impl Sync for Registry {}

static REGISTRY: Registry = Registry {
    state: Mutex::new(State::Uninitialized),
};

/// Exclusive access to the udev context. FFI calls that need the context
/// pointer go through [`RegistryGuard::handle`]; the guard's lifetime
/// bounds the critical section.
pub(crate) struct RegistryGuard<'a> {
    _state: MutexGuard<'a, State>,
    handle: NonNull<udev_sys::udev>,
}

impl RegistryGuard<'_> {
    pub(crate) fn handle(&self) -> *mut udev_sys::udev {
        self.handle.as_ptr()
    }
}

/// Serialization-only guard for operations on already-derived objects,
/// which carry their own handle and only need the global lock.
pub(crate) struct SharedGuard<'a> {
    _state: MutexGuard<'a, State>,
}

/// Acquire the global lock, creating the udev context on first use.
///
/// A `Failed` state is retried rather than poisoned: `udev_new` fails only
/// on resource exhaustion, and a transient failure should not disable
/// device access for the rest of the process lifetime.
pub(crate) fn lock() -> Result<RegistryGuard<'static>> {
    let mut state = REGISTRY.state.lock();

    if let State::Ready(handle) = *state {
        return Ok(RegistryGuard {
            _state: state,
            handle,
        });
    }

    let retrying = matches!(*state, State::Failed);
    let ptr = unsafe { udev_sys::udev_new() };
    match NonNull::new(ptr) {
        Some(handle) => {
            debug!(retried = retrying, "created udev context");
            *state = State::Ready(handle);
            Ok(RegistryGuard {
                _state: state,
                handle,
            })
        }
        None => {
            let source = io::Error::last_os_error();
            warn!(retried = retrying, error = %source, "udev context creation failed");
            *state = State::Failed;
            Err(HotplugError::Context { source })
        }
    }
}

/// Acquire the global lock without touching the context state.
///
/// Callers inside the crate must not drop a [`crate::Device`] (or any other
/// derived object) while holding this guard; release runs under the same
/// non-reentrant lock.
pub(crate) fn shared_lock() -> SharedGuard<'static> {
    SharedGuard {
        _state: REGISTRY.state.lock(),
    }
}
