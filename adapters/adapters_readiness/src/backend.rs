//! Wait Backend Module
//!
//! The capability interface every readiness primitive implements. One call of
//! [`WaitBackend::wait_once`] issues the platform primitive exactly once; the
//! looping, deadline and interrupt handling live in [`crate::wait`].

use std::time::Duration;

/// Raw OS handle of a socket
#[cfg(unix)]
pub type RawDescriptor = std::os::unix::io::RawFd;
/// Raw OS handle of a socket
#[cfg(windows)]
pub type RawDescriptor = std::os::windows::io::RawSocket;

/// Direction a caller waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interest {
    /// Data (or a pending connection) can be read
    Readable,
    /// Data can be written, or a pending connect finished
    Writable,
}

/// Result of a single primitive call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready,
    TimedOut,
    /// A signal interrupted the call; the caller restarts it
    Interrupted,
    /// The primitive failed with this native error code
    Failed(i32),
}

/// A platform readiness primitive
#[cfg_attr(test, mockall::automock)]
pub trait WaitBackend {
    /// Name of the native call, used in error messages
    fn name(&self) -> &'static str;

    /// Block until `fd` satisfies `interest` or `timeout` elapses
    ///
    /// # Arguments
    ///
    /// * `fd` - live socket descriptor
    /// * `interest` - direction to wait for
    /// * `timeout` - `None` waits indefinitely
    fn wait_once(&self, fd: RawDescriptor, interest: Interest, timeout: Option<Duration>) -> WaitOutcome;
}

/// Whole milliseconds covering `timeout`, rounded up so short remainders
/// don't turn into a zero-length poll
pub(crate) fn ceil_millis(timeout: Duration) -> u64 {
    let micros = timeout.as_micros();
    let millis = (micros + 999) / 1000;
    u64::try_from(millis).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceil_millis() {
        assert_eq!(ceil_millis(Duration::ZERO), 0);
        assert_eq!(ceil_millis(Duration::from_micros(1)), 1);
        assert_eq!(ceil_millis(Duration::from_millis(250)), 250);
        assert_eq!(ceil_millis(Duration::from_micros(250_001)), 251);
    }
}
