//! Single-descriptor `poll(2)` backend

use crate::backend::{ceil_millis, Interest, RawDescriptor, WaitBackend, WaitOutcome};
use entities_net_error::{is_interrupted, last_platform_error};
use std::time::Duration;

/// Readiness wait through `poll(2)`
#[derive(Debug, Default, Clone, Copy)]
pub struct PollBackend;

impl PollBackend {
    pub fn new() -> Self {
        PollBackend
    }
}

impl WaitBackend for PollBackend {
    fn name(&self) -> &'static str {
        "poll"
    }

    fn wait_once(&self, fd: RawDescriptor, interest: Interest, timeout: Option<Duration>) -> WaitOutcome {
        let mut pfd = libc::pollfd {
            fd,
            events: match interest {
                Interest::Readable => libc::POLLIN,
                Interest::Writable => libc::POLLOUT,
            },
            revents: 0,
        };
        let timeout_ms = match timeout {
            Some(d) => ceil_millis(d).min(libc::c_int::MAX as u64) as libc::c_int,
            None => -1,
        };

        // SAFETY: `pfd` is a valid single-element array for the duration of the call.
        let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
        match rc {
            0 => WaitOutcome::TimedOut,
            // error and hang-up conditions count as ready; the next I/O call reports them
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
