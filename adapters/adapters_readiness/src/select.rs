//! `select(2)` backend with a relative timer
//!
//! Used where `poll(2)` on sockets is unreliable. Descriptors at or above
//! `FD_SETSIZE` cannot be represented in an `fd_set` and fail up front.

use crate::backend::{Interest, RawDescriptor, WaitBackend, WaitOutcome};
use entities_net_error::{is_interrupted, last_platform_error};
use std::{mem, ptr, time::Duration};

/// Readiness wait through `select(2)`
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectBackend;

impl SelectBackend {
    pub fn new() -> Self {
        SelectBackend
    }
}

impl WaitBackend for SelectBackend {
    fn name(&self) -> &'static str {
        "select"
    }

    fn wait_once(&self, fd: RawDescriptor, interest: Interest, timeout: Option<Duration>) -> WaitOutcome {
        if fd < 0 || fd as usize >= libc::FD_SETSIZE as usize {
            return WaitOutcome::Failed(libc::EINVAL);
        }

        // SAFETY: an all-zero fd_set is empty; FD_ZERO/FD_SET only touch the set.
        let mut set: libc::fd_set = unsafe { mem::zeroed() };
        unsafe {
            libc::FD_ZERO(&mut set);
            libc::FD_SET(fd, &mut set);
        }

        // SAFETY: all-zero is a valid timeval.
        let mut tv: libc::timeval = unsafe { mem::zeroed() };
        let tv_ptr = match timeout {
            Some(d) => {
                tv.tv_sec = d.as_secs().min(libc::time_t::MAX as u64) as libc::time_t;
                tv.tv_usec = d.subsec_micros() as libc::suseconds_t;
                &mut tv as *mut libc::timeval
            }
            None => ptr::null_mut(),
        };

        let set_ptr = &mut set as *mut libc::fd_set;
        let (read_set, write_set) = match interest {
            Interest::Readable => (set_ptr, ptr::null_mut()),
            Interest::Writable => (ptr::null_mut(), set_ptr),
        };

        // SAFETY: every pointer is either null or points to a live local.
        let rc = unsafe { libc::select(fd + 1, read_set, write_set, ptr::null_mut(), tv_ptr) };
        match rc {
            0 => WaitOutcome::TimedOut,
            n if n > 0 => WaitOutcome::Ready,
            _ => {
                let code = last_platform_error();
                if is_interrupted(code) {
                    WaitOutcome::Interrupted
                } else {
                    WaitOutcome::Failed(code)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::UdpSocket;
    use std::os::unix::io::AsRawFd;

    #[test]
    fn test_select_readiness() {
        let sock = UdpSocket::bind("127.0.0.1:0").unwrap();
        let backend = SelectBackend::new();
        let fd = sock.as_raw_fd();

        assert_eq!(
            backend.wait_once(fd, Interest::Writable, Some(Duration::from_millis(100))),
            WaitOutcome::Ready
        );
        assert_eq!(
            backend.wait_once(fd, Interest::Readable, Some(Duration::from_millis(10))),
            WaitOutcome::TimedOut
        );

        sock.send_to(b"ping", sock.local_addr().unwrap()).unwrap();
        assert_eq!(
            backend.wait_once(fd, Interest::Readable, Some(Duration::from_secs(1))),
            WaitOutcome::Ready
        );
    }

    #[test]
    fn test_select_rejects_out_of_range() {
        let backend = SelectBackend::new();
        assert_eq!(
            backend.wait_once(-1, Interest::Readable, None),
            WaitOutcome::Failed(libc::EINVAL)
        );
        assert_eq!(
            backend.wait_once(libc::FD_SETSIZE as RawDescriptor, Interest::Readable, None),
            WaitOutcome::Failed(libc::EINVAL)
        );
    }
}
