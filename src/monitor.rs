//! Live hot-plug event monitoring.
//!
//! A [`Monitor`] wraps a udev netlink socket. Kernel-side filters may be
//! installed before or after the stream starts; [`Monitor::listen`] spawns
//! one background worker that polls the socket edge-triggered and publishes
//! each received device into an [`EventStream`].
//!
//! # Architecture
//!
//! The worker waits for readiness with a bounded timeout **outside** the
//! registry lock, so an idle monitor never starves other registry users.
//! On readiness it drains the socket completely (edge-triggered polling
//! delivers one wakeup per readiness edge, which may cover several pending
//! events), taking the lock only around each non-blocking receive and
//! publishing outside it. The channel holds a single event: a slow
//! consumer blocks the drain, backpressure reaches the kernel socket, and
//! the socket drops events if its receive buffer overflows. That is the
//! only loss mode; the wrapper itself never drops or reorders events.
//!
//! Cancellation is cooperative: the token is checked once per wait cycle,
//! so it is observed within one poll interval when idle, but an
//! uninterrupted event burst is drained before cancellation takes effect.
//!
//! # Example
//!
//! ```no_run
//! use hotplug::Udev;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> hotplug::Result<()> {
//! let monitor = Udev::new().monitor_from_netlink("udev")?;
//! monitor.filter_add_match_subsystem_devtype("block", Some("disk"))?;
//!
//! let cancel = CancellationToken::new();
//! let mut stream = monitor.listen(cancel.clone())?;
//! while let Some(event) = stream.recv().await {
//!     let device = event?;
//!     println!("{} {}", device.action(), device.syspath());
//! }
//! # Ok(())
//! # }
//! ```

use std::io;
use std::os::raw::c_int;
use std::pin::Pin;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::device::Device;
use crate::error::{HotplugError, Result};
use crate::ffi::cstring;
use crate::registry;

/// Readiness-wait timeout; bounds cancellation latency when no events flow.
const POLL_INTERVAL_MS: c_int = 1000;
const MAX_EPOLL_EVENTS: usize = 32;

struct MonitorInner {
    ptr: NonNull<udev_sys::udev_monitor>,
    receiving: AtomicBool,
}

// SAFETY: all operations on the udev_monitor handle, including Drop,
// serialize through the global registry lock.
unsafe impl Send for MonitorInner {}
unsafe impl Sync for MonitorInner {}

impl Drop for MonitorInner {
    fn drop(&mut self) {
        debug!("releasing udev monitor socket");
        let _guard = registry::shared_lock();
        unsafe {
            udev_sys::udev_monitor_unref(self.ptr.as_ptr());
        }
    }
}

/// A live subscription to device hot-plug notifications.
///
/// Cloning shares the underlying socket, which is how the caller keeps
/// adjusting filters while the background worker receives; the socket is
/// released when the last clone drops.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

impl Monitor {
    pub(crate) fn from_netlink(name: &str) -> Result<Self> {
        let c_name = cstring(name, "netlink group")?;
        let guard = registry::lock()?;
        let ptr = unsafe { udev_sys::udev_monitor_new_from_netlink(guard.handle(), c_name.as_ptr()) };
        drop(guard);
        let inner = NonNull::new(ptr)
            .map(|ptr| MonitorInner {
                ptr,
                receiving: AtomicBool::new(false),
            })
            .ok_or(HotplugError::NullPointer {
                function: "udev_monitor_new_from_netlink",
            })?;
        info!(group = name, "created udev monitor");
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    fn as_ptr(&self) -> *mut udev_sys::udev_monitor {
        self.inner.ptr.as_ptr()
    }

    /// Set the kernel receive buffer size for the monitor socket. Must be
    /// called before [`listen`](Self::listen); once the stream is
    /// receiving the size is fixed.
    pub fn set_receive_buffer_size(&self, bytes: usize) -> Result<()> {
        let size = buffer_size(bytes)?;
        // The receiving flag is checked under the registry lock so a
        // concurrent listen on another clone cannot enable the socket
        // between the check and the call: enable_receiving takes the same
        // lock.
        let _guard = registry::shared_lock();
        if self.inner.receiving.load(Ordering::SeqCst) {
            return Err(HotplugError::ReceiveBuffer {
                bytes,
                source: io::Error::from_raw_os_error(libc::EBUSY),
            });
        }
        let ret = unsafe { udev_sys::udev_monitor_set_receive_buffer_size(self.as_ptr(), size) };
        if ret < 0 {
            return Err(HotplugError::ReceiveBuffer {
                bytes,
                source: io::Error::from_raw_os_error(-ret),
            });
        }
        Ok(())
    }

    /// Accumulate a kernel-side subsystem (and optional devtype) filter.
    /// Same-kind filters OR together; distinct kinds AND together. Usable
    /// before or after the stream starts; after, call
    /// [`filter_update`](Self::filter_update) to apply.
    pub fn filter_add_match_subsystem_devtype(
        &self,
        subsystem: &str,
        devtype: Option<&str>,
    ) -> Result<()> {
        let c_subsystem = cstring(subsystem, "subsystem")?;
        let c_devtype = match devtype {
            Some(d) => Some(cstring(d, "devtype")?),
            None => None,
        };
        let _guard = registry::shared_lock();
        let ret = unsafe {
            udev_sys::udev_monitor_filter_add_match_subsystem_devtype(
                self.as_ptr(),
                c_subsystem.as_ptr(),
                c_devtype.as_ref().map_or(std::ptr::null(), |d| d.as_ptr()),
            )
        };
        if ret < 0 {
            return Err(HotplugError::filter(
                format!(
                    "filter_subsystem_devtype({subsystem}, {})",
                    devtype.unwrap_or("*")
                ),
                ret,
            ));
        }
        Ok(())
    }

    /// Accumulate a kernel-side tag filter.
    pub fn filter_add_match_tag(&self, tag: &str) -> Result<()> {
        let c_tag = cstring(tag, "tag")?;
        let _guard = registry::shared_lock();
        let ret =
            unsafe { udev_sys::udev_monitor_filter_add_match_tag(self.as_ptr(), c_tag.as_ptr()) };
        if ret < 0 {
            return Err(HotplugError::filter(format!("filter_tag({tag})"), ret));
        }
        Ok(())
    }

    /// Install the accumulated filter program on the socket. Takes effect
    /// on events received after the call returns.
    pub fn filter_update(&self) -> Result<()> {
        let _guard = registry::shared_lock();
        let ret = unsafe { udev_sys::udev_monitor_filter_update(self.as_ptr()) };
        if ret < 0 {
            return Err(HotplugError::filter("filter_update", ret));
        }
        Ok(())
    }

    /// Remove all installed filters; subsequent events arrive unfiltered
    /// until [`filter_update`](Self::filter_update) installs a new set.
    pub fn filter_remove(&self) -> Result<()> {
        let _guard = registry::shared_lock();
        let ret = unsafe { udev_sys::udev_monitor_filter_remove(self.as_ptr()) };
        if ret < 0 {
            return Err(HotplugError::filter("filter_remove", ret));
        }
        Ok(())
    }

    /// Start receiving and return the event stream.
    ///
    /// Spawns one background worker that owns the polling resources and
    /// forwards devices in kernel (seqnum) order. The stream closes when
    /// `cancel` is triggered (observed within one poll interval, a second
    /// trigger is a no-op), when the stream is dropped, or when a receive
    /// reports a genuine error; in that last case the cause arrives as
    /// the final `Err` item.
    ///
    /// A monitor socket can only be enabled once; a second `listen` fails
    /// with [`HotplugError::AlreadyListening`], and a monitor whose
    /// `listen` returned an error should be discarded.
    pub fn listen(&self, cancel: CancellationToken) -> Result<EventStream> {
        if self.inner.receiving.swap(true, Ordering::SeqCst) {
            return Err(HotplugError::AlreadyListening);
        }

        let fd = {
            let _guard = registry::shared_lock();
            let ret = unsafe { udev_sys::udev_monitor_enable_receiving(self.as_ptr()) };
            if ret < 0 {
                return Err(HotplugError::Stream {
                    operation: "enable_receiving",
                    source: io::Error::from_raw_os_error(-ret),
                });
            }
            let fd = unsafe { udev_sys::udev_monitor_get_fd(self.as_ptr()) };
            if fd < 0 {
                return Err(HotplugError::Stream {
                    operation: "monitor_get_fd",
                    source: io::Error::from_raw_os_error(-fd),
                });
            }
            set_nonblocking(fd).map_err(|source| HotplugError::Stream {
                operation: "set_nonblocking",
                source,
            })?;
            fd
        };

        let poller = Poller::new().map_err(|source| HotplugError::Stream {
            operation: "epoll_create",
            source,
        })?;
        poller.add(fd).map_err(|source| HotplugError::Stream {
            operation: "epoll_ctl_add",
            source,
        })?;

        let (tx, rx) = mpsc::channel(1);
        let worker = Worker {
            monitor: self.clone(),
            poller,
            fd,
            tx,
            cancel,
        };
        thread::Builder::new()
            .name("hotplug-monitor".into())
            .spawn(move || worker.run())
            .map_err(|source| HotplugError::Stream {
                operation: "spawn_worker",
                source,
            })?;

        info!(fd, "monitor event stream started");
        Ok(EventStream {
            inner: ReceiverStream::new(rx),
        })
    }
}

/// The background worker owning the polling resources for one stream.
struct Worker {
    monitor: Monitor,
    poller: Poller,
    fd: c_int,
    tx: mpsc::Sender<Result<Device>>,
    cancel: CancellationToken,
}

impl Worker {
    fn run(self) {
        let mut events = [libc::epoll_event { events: 0, u64: 0 }; MAX_EPOLL_EVENTS];

        'poll: loop {
            let ready = match self.poller.wait(&mut events, POLL_INTERVAL_MS) {
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => 0,
                Err(source) => {
                    warn!(error = %source, "monitor poll failed");
                    let _ = self.tx.blocking_send(Err(HotplugError::Stream {
                        operation: "epoll_wait",
                        source,
                    }));
                    break;
                }
            };

            for event in &events[..ready] {
                if event.u64 == self.fd as u64 && event.events & libc::EPOLLIN as u32 != 0
                    && !self.drain()
                {
                    break 'poll;
                }
            }

            // Cancellation is observed between wait cycles: events already
            // signaled are drained and delivered, never dropped mid-pass.
            if self.cancel.is_cancelled() {
                debug!("monitor stream cancelled");
                break;
            }
            if self.tx.is_closed() {
                debug!("event stream dropped");
                break;
            }
        }

        debug!("monitor worker exiting");
    }

    /// Drain every buffered event for one readiness edge. Returns `false`
    /// when the worker should exit (consumer gone or hard receive error).
    fn drain(&self) -> bool {
        loop {
            // The lock covers only the non-blocking receive; publishing may
            // block on the consumer and must happen outside it.
            let received = {
                let _guard = registry::shared_lock();
                let ptr = unsafe { udev_sys::udev_monitor_receive_device(self.monitor.as_ptr()) };
                match unsafe { Device::from_raw(ptr) } {
                    Some(device) => Ok(device),
                    None => Err(io::Error::last_os_error()),
                }
            };

            match received {
                Ok(device) => {
                    if self.tx.blocking_send(Ok(device)).is_err() {
                        debug!("event stream dropped mid-drain");
                        return false;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return true,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    warn!(error = %source, "monitor receive failed");
                    let _ = self.tx.blocking_send(Err(HotplugError::Stream {
                        operation: "receive_device",
                        source,
                    }));
                    return false;
                }
            }
        }
    }
}

/// The stream of devices produced by [`Monitor::listen`].
///
/// Yields `Ok(Device)` per hot-plug event in kernel order; a fatal worker
/// error arrives as a final `Err` item. The stream ends after cancellation
/// or a fatal error; dropping it also stops the worker.
#[derive(Debug)]
pub struct EventStream {
    inner: ReceiverStream<Result<Device>>,
}

impl EventStream {
    /// Receive the next event, or `None` once the stream has closed.
    pub async fn recv(&mut self) -> Option<Result<Device>> {
        self.inner.next().await
    }
}

impl Stream for EventStream {
    type Item = Result<Device>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Validate a receive buffer size for the C interface, which takes a
/// signed int; larger requests are rejected rather than wrapped.
fn buffer_size(bytes: usize) -> Result<c_int> {
    c_int::try_from(bytes).map_err(|_| HotplugError::ReceiveBuffer {
        bytes,
        source: io::Error::from_raw_os_error(libc::EINVAL),
    })
}

fn set_nonblocking(fd: c_int) -> io::Result<()> {
    // SAFETY: fd is a valid descriptor owned by the monitor socket.
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags < 0 {
            return Err(io::Error::last_os_error());
        }
        if libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) < 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// RAII wrapper over an epoll instance with the monitor fd registered
/// edge-triggered.
struct Poller {
    epfd: c_int,
}

impl Poller {
    fn new() -> io::Result<Self> {
        // SAFETY: plain syscall, no pointers involved.
        let epfd = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if epfd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { epfd })
    }

    fn add(&self, fd: c_int) -> io::Result<()> {
        let mut event = libc::epoll_event {
            events: libc::EPOLLIN as u32 | libc::EPOLLET as u32,
            u64: fd as u64,
        };
        // SAFETY: event points to a live epoll_event for the call duration.
        if unsafe { libc::epoll_ctl(self.epfd, libc::EPOLL_CTL_ADD, fd, &mut event) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn wait(&self, events: &mut [libc::epoll_event], timeout_ms: c_int) -> io::Result<usize> {
        // SAFETY: events is a live, writable slice for the call duration.
        let n = unsafe {
            libc::epoll_wait(
                self.epfd,
                events.as_mut_ptr(),
                events.len() as c_int,
                timeout_ms,
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        // SAFETY: epfd is a valid descriptor we own.
        unsafe {
            libc::close(self.epfd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn buffer_size_rejects_values_beyond_c_int() {
        assert_eq!(buffer_size(128 * 1024).unwrap(), 128 * 1024);
        assert_eq!(buffer_size(c_int::MAX as usize).unwrap(), c_int::MAX);
        let err = buffer_size(c_int::MAX as usize + 1).unwrap_err();
        assert!(matches!(err, HotplugError::ReceiveBuffer { .. }));
    }

    #[test]
    fn poller_times_out_with_no_events() {
        let poller = Poller::new().unwrap();
        let mut events = [libc::epoll_event { events: 0, u64: 0 }; MAX_EPOLL_EVENTS];
        let start = Instant::now();
        let n = poller.wait(&mut events, 50).unwrap();
        assert_eq!(n, 0);
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn poller_reports_readiness_for_registered_fd() {
        let mut fds = [0 as c_int; 2];
        // SAFETY: fds is a live two-element array.
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        let (read_fd, write_fd) = (fds[0], fds[1]);

        let poller = Poller::new().unwrap();
        poller.add(read_fd).unwrap();

        // SAFETY: write_fd is open and the buffer outlives the call.
        assert_eq!(unsafe { libc::write(write_fd, b"x".as_ptr().cast(), 1) }, 1);

        let mut events = [libc::epoll_event { events: 0, u64: 0 }; MAX_EPOLL_EVENTS];
        let n = poller.wait(&mut events, 1000).unwrap();
        assert_eq!(n, 1);
        // Copy out of the packed struct before asserting.
        let (token, flags) = (events[0].u64, events[0].events);
        assert_eq!(token, read_fd as u64);
        assert!(flags & libc::EPOLLIN as u32 != 0);

        // SAFETY: both descriptors are open and owned by this test.
        unsafe {
            libc::close(read_fd);
            libc::close(write_fd);
        }
    }
}
