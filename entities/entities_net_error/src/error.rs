//! Socket Error Module
//!
//! The error value returned by every fallible socket and address operation.

use crate::classify::{classify, last_platform_error};
use crate::kind::ErrorKind;
use std::io;

/// Failure of a socket operation
///
/// Carries the portable [`ErrorKind`], the raw platform code it was derived
/// from (0 when the failure did not come from the OS) and a human-readable
/// message naming the failed operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}: {kind}")]
pub struct SocketError {
    kind: ErrorKind,
    native_code: i32,
    message: String,
}

/// Result alias used across the socket crates
pub type Result<T> = std::result::Result<T, SocketError>;

impl SocketError {
    /// Create an error that did not originate from an OS call
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            native_code: 0,
            message: message.into(),
        }
    }

    /// Create an error from a native platform code
    ///
    /// # Arguments
    ///
    /// * `native_code` - errno / Winsock error number
    /// * `message` - description of the operation that failed
    pub fn from_native(native_code: i32, message: impl Into<String>) -> Self {
        Self {
            kind: classify(native_code),
            native_code,
            message: message.into(),
        }
    }

    /// Create an error with an explicit kind and native code
    pub fn with_parts(kind: ErrorKind, native_code: i32, message: impl Into<String>) -> Self {
        Self {
            kind,
            native_code,
            message: message.into(),
        }
    }

    /// Capture the OS last-error slot right now
    pub fn last_os(message: impl Into<String>) -> Self {
        Self::from_native(last_platform_error(), message)
    }

    /// Convert an `io::Error`, preferring its raw OS code when present
    pub fn from_io(err: &io::Error, message: impl Into<String>) -> Self {
        match err.raw_os_error() {
            Some(code) => Self::from_native(code, message),
            None => Self::new(kind_from_io(err.kind()), message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn native_code(&self) -> i32 {
        self.native_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this is a would-block failure from a non-blocking handle
    pub fn is_would_block(&self) -> bool {
        self.kind == ErrorKind::WouldBlock
    }
}

fn kind_from_io(kind: io::ErrorKind) -> ErrorKind {
    match kind {
        io::ErrorKind::WouldBlock => ErrorKind::WouldBlock,
        io::ErrorKind::TimedOut => ErrorKind::TimedOut,
        io::ErrorKind::ConnectionRefused => ErrorKind::ConnectionRefused,
        io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset => ErrorKind::Aborted,
        io::ErrorKind::AddrInUse => ErrorKind::AddressInUse,
        io::ErrorKind::AddrNotAvailable => ErrorKind::NotAvailable,
        io::ErrorKind::NotConnected => ErrorKind::NotConnected,
        io::ErrorKind::PermissionDenied => ErrorKind::AccessDenied,
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => ErrorKind::InvalidArgument,
        io::ErrorKind::AlreadyExists => ErrorKind::Exists,
        io::ErrorKind::NotFound => ErrorKind::NotExists,
        io::ErrorKind::Unsupported => ErrorKind::NotSupported,
        io::ErrorKind::OutOfMemory => ErrorKind::NoResources,
        io::ErrorKind::UnexpectedEof => ErrorKind::NoMore,
        _ => ErrorKind::Failed,
    }
}

impl From<SocketError> for io::Error {
    fn from(err: SocketError) -> Self {
        let kind = match err.kind {
            ErrorKind::WouldBlock => io::ErrorKind::WouldBlock,
            ErrorKind::TimedOut => io::ErrorKind::TimedOut,
            ErrorKind::ConnectionRefused => io::ErrorKind::ConnectionRefused,
            ErrorKind::AddressInUse => io::ErrorKind::AddrInUse,
            ErrorKind::NotConnected => io::ErrorKind::NotConnected,
            ErrorKind::AccessDenied => io::ErrorKind::PermissionDenied,
            ErrorKind::InvalidArgument => io::ErrorKind::InvalidInput,
            ErrorKind::Exists => io::ErrorKind::AlreadyExists,
            ErrorKind::NotExists => io::ErrorKind::NotFound,
            ErrorKind::NotSupported | ErrorKind::NotImplemented => io::ErrorKind::Unsupported,
            ErrorKind::Aborted => io::ErrorKind::ConnectionAborted,
            ErrorKind::NotAvailable => io::ErrorKind::AddrNotAvailable,
            ErrorKind::NoResources => io::ErrorKind::OutOfMemory,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
