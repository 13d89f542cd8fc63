//! Adapters Layer: Readiness Wait
//!
//! Provides the primitive that turns an always-non-blocking descriptor into a
//! logically blocking one.
//!
//! ## Overview
//!
//! The `adapters_readiness` crate provides:
//! - **Backends**: [`PollBackend`], [`SelectBackend`] (Unix) and
//!   `EventBackend` (Windows) behind the [`WaitBackend`] trait
//! - **Platform default**: [`PlatformWait`] / [`platform_backend`]
//! - **Wait loop**: [`wait_until_ready`] with deadline tracking and
//!   restart-on-interrupt
//! - **Retry policy**: [`retry_blocked`], shared by accept, send and receive
//!
//! ## Architecture
//!
//! This crate is part of the Adapters layer. It depends on
//! `entities_net_error` for classifying primitive failures.
//!
//! ## See Also
//!
//! - [`adapters_socket`](../adapters_socket/index.html): the socket handle

pub mod backend;
#[cfg(windows)]
pub mod event;
#[cfg(unix)]
pub mod poll;
#[cfg(unix)]
pub mod select;
pub mod wait;

pub use backend::{Interest, RawDescriptor, WaitBackend, WaitOutcome};
#[cfg(windows)]
pub use event::EventBackend;
#[cfg(unix)]
pub use poll::PollBackend;
#[cfg(unix)]
pub use select::SelectBackend;
pub use wait::{retry_blocked, wait_until_ready};

use entities_net_error::Result;

/// Default backend for this target
#[cfg(target_vendor = "apple")]
pub type PlatformWait = SelectBackend;
/// Default backend for this target
#[cfg(all(unix, not(target_vendor = "apple")))]
pub type PlatformWait = PollBackend;
/// Default backend for this target
#[cfg(windows)]
pub type PlatformWait = EventBackend;

/// Construct the default backend for this target
pub fn platform_backend() -> Result<PlatformWait> {
    #[cfg(unix)]
    {
        Ok(PlatformWait::new())
    }
    #[cfg(windows)]
    {
        EventBackend::new()
    }
}
