//! Winsock event-object backend
//!
//! Associates the socket with a WSA event for the requested network events,
//! waits on the event, then clears the association again.

use crate::backend::{ceil_millis, Interest, RawDescriptor, WaitBackend, WaitOutcome};
use entities_net_error::{Result, SocketError};
use std::time::Duration;
use tracing::warn;
use windows_sys::Win32::Foundation::HANDLE;
use windows_sys::Win32::Networking::WinSock as ws;

/// Readiness wait through `WSAEventSelect` + `WSAWaitForMultipleEvents`
#[derive(Debug)]
pub struct EventBackend {
    event: HANDLE,
}

impl EventBackend {
    /// Create the backend and its event object
    pub fn new() -> Result<Self> {
        // SAFETY: plain FFI constructor.
        let event = unsafe { ws::WSACreateEvent() };
        if event == 0 {
            return Err(SocketError::last_os("Failed to call WSACreateEvent() on socket"));
        }
        Ok(Self { event })
    }
}

/// Network events that wake a wait for `interest`
///
/// A graceful close or a reset posts only `FD_CLOSE`, so both masks carry it.
pub(crate) fn network_events(interest: Interest) -> i32 {
    let mask = match interest {
        Interest::Readable => ws::FD_READ | ws::FD_ACCEPT | ws::FD_CLOSE,
        Interest::Writable => ws::FD_WRITE | ws::FD_CONNECT | ws::FD_CLOSE,
    };
    mask as i32
}

impl WaitBackend for EventBackend {
    fn name(&self) -> &'static str {
        "WSAWaitForMultipleEvents"
    }

    fn wait_once(&self, fd: RawDescriptor, interest: Interest, timeout: Option<Duration>) -> WaitOutcome {
        let network_events = network_events(interest);
        let socket = fd as ws::SOCKET;

        // SAFETY: `self.event` stays valid until drop; `socket` is a live handle.
        unsafe {
            ws::WSAResetEvent(self.event);
            if ws::WSAEventSelect(socket, self.event, network_events) != 0 {
                return WaitOutcome::Failed(ws::WSAGetLastError());
            }
        }

        let timeout_ms = match timeout {
            Some(d) => ceil_millis(d).min(u64::from(ws::WSA_INFINITE - 1)) as u32,
            None => ws::WSA_INFINITE,
        };
        // SAFETY: one valid event handle, non-alertable wait.
        let rc = unsafe { ws::WSAWaitForMultipleEvents(1, &self.event, 1, timeout_ms, 0) };
        let outcome = if rc == ws::WSA_WAIT_EVENT_0 as u32 {
            WaitOutcome::Ready
        } else if rc == ws::WSA_WAIT_TIMEOUT {
            WaitOutcome::TimedOut
        } else {
            // SAFETY: plain FFI getter.
            WaitOutcome::Failed(unsafe { ws::WSAGetLastError() })
        };

        // SAFETY: detaching the event from a live socket.
        unsafe {
            ws::WSAEventSelect(socket, 0, 0);
        }
        outcome
    }
}

impl Drop for EventBackend {
    fn drop(&mut self) {
        // SAFETY: the event was created in `new` and is closed exactly once.
        if unsafe { ws::WSACloseEvent(self.event) } == 0 {
            warn!("failed to close WSA event object");
        }
    }
}
