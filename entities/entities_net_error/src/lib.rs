//! Entities Layer: Portable Socket Errors
//!
//! Provides the error taxonomy shared by every socket operation. Platform error
//! numbers (errno on Unix, Winsock codes on Windows) are folded into a single
//! portable [`ErrorKind`] so that callers can write retry logic once.
//!
//! ## Overview
//!
//! The `entities_net_error` crate provides:
//! - **Error kinds**: the 23 portable classifications ([`ErrorKind`])
//! - **Classification**: [`classify`], a pure and total mapping from native codes
//! - **Error values**: [`SocketError`], returned by every fallible operation
//! - **Last-error mirror**: a process-wide record of the most recent failure
//!   ([`state`]) for callers that poll for errors after the fact
//!
//! ## Architecture
//!
//! This crate is the innermost layer. It depends on `libc` (Unix) or
//! `windows-sys` (Windows) only for the numeric error constants and the
//! OS last-error slot.
//!
//! ## See Also
//!
//! - [`entities_socket_address`](../entities_socket_address/index.html): address values
//! - [`adapters_socket`](../adapters_socket/index.html): the socket handle

pub mod classify;
pub mod error;
pub mod kind;
pub mod state;

pub use classify::{classify, is_interrupted, last_io_kind, last_platform_error, set_last_platform_error};
pub use error::{Result, SocketError};
pub use kind::ErrorKind;
pub use state::{clear, last_code, last_error, last_message, last_native_code, record, set_error, ErrorState};
