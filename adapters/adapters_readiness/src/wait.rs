//! Wait Module
//!
//! The blocking emulation shared by every socket operation.
//!
//! ## Overview
//!
//! Sockets are always non-blocking at the OS level. A *logically* blocking
//! socket is emulated in two steps:
//! - [`wait_until_ready`] suspends the caller until the descriptor is ready,
//!   restarting after signal interrupts and honouring an overall deadline
//! - [`retry_blocked`] wraps a single non-blocking syscall, retrying on
//!   `EINTR` and, for blocking handles, on would-block
//!
//! ## Timeout semantics
//!
//! A timeout of `0` waits indefinitely. A positive timeout is a deadline for
//! the whole wait: time spent before an interrupt is not given back.

use crate::backend::{Interest, RawDescriptor, WaitBackend, WaitOutcome};
use entities_net_error::{ErrorKind, Result, SocketError};
use std::io;
use std::time::{Duration, Instant};
use tracing::trace;

const TIMED_OUT_MESSAGE: &str = "Timed out while waiting socket condition";

/// Wait until `fd` satisfies `interest`
///
/// # Arguments
///
/// * `backend` - the platform primitive
/// * `fd` - live socket descriptor
/// * `interest` - read or write readiness
/// * `timeout_ms` - overall timeout in milliseconds, 0 waits indefinitely
///
/// # Returns
///
/// `Ok(())` once ready, [`ErrorKind::TimedOut`] when the deadline passes, or
/// the classified failure of the primitive
pub fn wait_until_ready<B>(backend: &B, fd: RawDescriptor, interest: Interest, timeout_ms: u32) -> Result<()>
where
    B: WaitBackend + ?Sized,
{
    let deadline = (timeout_ms > 0).then(|| Instant::now() + Duration::from_millis(u64::from(timeout_ms)));

    loop {
        let remaining = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(timed_out());
                }
                Some(deadline - now)
            }
            None => None,
        };

        match backend.wait_once(fd, interest, remaining) {
            WaitOutcome::Ready => return Ok(()),
            WaitOutcome::TimedOut => return Err(timed_out()),
            WaitOutcome::Interrupted => {
                trace!(fd = ?fd, backend = backend.name(), "readiness wait interrupted, restarting");
            }
            WaitOutcome::Failed(code) => {
                return Err(SocketError::from_native(
                    code,
                    format!("Failed to call {}() on socket", backend.name()),
                ));
            }
        }
    }
}

fn timed_out() -> SocketError {
    SocketError::new(ErrorKind::TimedOut, TIMED_OUT_MESSAGE)
}

/// Run a non-blocking syscall with the blocking-emulation retry policy
///
/// Before each attempt a blocking handle waits for readiness through `wait`.
/// Interrupted attempts are always retried; would-block is retried only for
/// blocking handles and surfaced otherwise. Anything else is classified and
/// returned with the message `Failed to call <call>() on socket`.
///
/// # Arguments
///
/// * `blocking` - whether the handle is logically blocking
/// * `call` - native call name for the error message
/// * `wait` - readiness wait for the relevant direction
/// * `attempt` - the non-blocking syscall
pub fn retry_blocked<T, W, A>(blocking: bool, call: &str, mut wait: W, mut attempt: A) -> Result<T>
where
    W: FnMut() -> Result<()>,
    A: FnMut() -> io::Result<T>,
{
    loop {
        if blocking {
            wait()?;
        }

        let err = match attempt() {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if err.kind() == io::ErrorKind::Interrupted {
            trace!(call, "interrupted, retrying");
            continue;
        }

        let err = SocketError::from_io(&err, format!("Failed to call {}() on socket", call));
        if blocking && err.is_would_block() {
            trace!(call, "spurious wakeup, waiting again");
            continue;
        }
        return Err(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockWaitBackend;
    use mockall::Sequence;
    use std::cell::Cell;

    fn mock() -> MockWaitBackend {
        let mut backend = MockWaitBackend::new();
        backend.expect_name().return_const("mockwait");
        backend
    }

    #[test]
    fn test_ready_first_try() {
        let mut backend = mock();
        backend
            .expect_wait_once()
            .withf(|_, interest, timeout| *interest == Interest::Readable && timeout.is_none())
            .times(1)
            .returning(|_, _, _| WaitOutcome::Ready);
        assert!(wait_until_ready(&backend, 7, Interest::Readable, 0).is_ok());
    }

    #[test]
    fn test_interrupt_restarts_wait() {
        let mut backend = mock();
        let mut seq = Sequence::new();
        backend
            .expect_wait_once()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _, _| WaitOutcome::Interrupted);
        backend
            .expect_wait_once()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| WaitOutcome::Ready);
        assert!(wait_until_ready(&backend, 7, Interest::Writable, 0).is_ok());
    }

    #[test]
    fn test_remaining_time_shrinks_after_interrupt() {
        let mut backend = mock();
        let mut seq = Sequence::new();
        backend
            .expect_wait_once()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|_, _, timeout| timeout.is_some_and(|t| t <= Duration::from_millis(5_000)))
            .returning(|_, _, _| {
                std::thread::sleep(Duration::from_millis(20));
                WaitOutcome::Interrupted
            });
        backend
            .expect_wait_once()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|_, _, timeout| timeout.is_some_and(|t| t < Duration::from_millis(4_990)))
            .returning(|_, _, _| WaitOutcome::Ready);
        assert!(wait_until_ready(&backend, 7, Interest::Readable, 5_000).is_ok());
    }

    #[test]
    fn test_interrupt_past_deadline_times_out() {
        let mut backend = mock();
        backend.expect_wait_once().times(1).returning(|_, _, _| {
            std::thread::sleep(Duration::from_millis(20));
            WaitOutcome::Interrupted
        });
        let err = wait_until_ready(&backend, 7, Interest::Readable, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
        assert_eq!(err.message(), TIMED_OUT_MESSAGE);
    }

    #[test]
    fn test_timeout_and_failure() {
        let mut backend = mock();
        backend
            .expect_wait_once()
            .times(1)
            .returning(|_, _, _| WaitOutcome::TimedOut);
        let err = wait_until_ready(&backend, 7, Interest::Readable, 100).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);

        let mut backend = mock();
        backend
            .expect_wait_once()
            .times(1)
            .returning(|_, _, _| WaitOutcome::Failed(123_456));
        let err = wait_until_ready(&backend, 7, Interest::Readable, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Failed);
        assert_eq!(err.native_code(), 123_456);
        assert_eq!(err.message(), "Failed to call mockwait() on socket");
    }

    #[test]
    fn test_retry_blocked_non_blocking_surfaces_would_block() {
        let waits = Cell::new(0);
        let err = retry_blocked::<usize, _, _>(
            false,
            "recv",
            || {
                waits.set(waits.get() + 1);
                Ok(())
            },
            || Err(io::Error::from(io::ErrorKind::WouldBlock)),
        )
        .unwrap_err();
        assert!(err.is_would_block());
        assert_eq!(err.message(), "Failed to call recv() on socket");
        assert_eq!(waits.get(), 0);
    }

    #[test]
    fn test_retry_blocked_blocking_retries() {
        let waits = Cell::new(0);
        let attempts = Cell::new(0);
        let value = retry_blocked(
            true,
            "send",
            || {
                waits.set(waits.get() + 1);
                Ok(())
            },
            || {
                attempts.set(attempts.get() + 1);
                match attempts.get() {
                    1 => Err(io::Error::from(io::ErrorKind::Interrupted)),
                    2 => Err(io::Error::from(io::ErrorKind::WouldBlock)),
                    _ => Ok(42usize),
                }
            },
        )
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(attempts.get(), 3);
        assert_eq!(waits.get(), 3);
    }

    #[test]
    fn test_retry_blocked_propagates_wait_error() {
        let err = retry_blocked::<(), _, _>(
            true,
            "accept",
            || Err(SocketError::new(ErrorKind::TimedOut, TIMED_OUT_MESSAGE)),
            || Ok(()),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimedOut);
    }
}
