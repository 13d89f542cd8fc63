//! Process Lifecycle Facades
//!
//! One-time process setup for socket use. On Unix a write to a socket whose
//! peer has gone away raises `SIGPIPE`, which kills the process by default;
//! [`init_once`] ignores it so the write fails with a broken-pipe error
//! instead. Winsock startup is handled by `socket2` on first use.

use entities_net_error::Result;
use std::sync::OnceLock;
use tracing::debug;

static INIT: OnceLock<Result<()>> = OnceLock::new();

/// Prepare the process for socket use
///
/// Safe to call any number of times from any thread; the first call does the
/// work and every later call returns its outcome.
pub fn init_once() -> Result<()> {
    INIT.get_or_init(platform_init).clone()
}

/// Matching teardown for [`init_once`]
///
/// Signal dispositions are left in place, so this only logs.
pub fn close_once() {
    if INIT.get().is_some() {
        debug!("socket library closed");
    }
}

#[cfg(unix)]
fn platform_init() -> Result<()> {
    use entities_net_error::SocketError;

    // SAFETY: installing SIG_IGN for SIGPIPE has no preconditions.
    let previous = unsafe { libc::signal(libc::SIGPIPE, libc::SIG_IGN) };
    if previous == libc::SIG_ERR {
        return Err(SocketError::last_os("Failed to ignore SIGPIPE"));
    }
    debug!("socket library initialised, SIGPIPE ignored");
    Ok(())
}

#[cfg(windows)]
fn platform_init() -> Result<()> {
    debug!("socket library initialised");
    Ok(())
}
