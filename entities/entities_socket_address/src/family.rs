//! Socket Family Module
//!
//! Address families understood by the socket layer. The native values are
//! the platform's own `AF_INET` / `AF_INET6` so they can be handed straight
//! to OS calls.

use crate::native;

/// Address family of a socket or address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SocketFamily {
    #[default]
    Unknown,
    /// IPv4
    Inet,
    /// IPv6
    Inet6,
}

impl SocketFamily {
    /// Platform `AF_*` value, 0 for [`SocketFamily::Unknown`]
    pub fn native(self) -> i32 {
        match self {
            SocketFamily::Unknown => 0,
            SocketFamily::Inet => native::AF_INET,
            SocketFamily::Inet6 => native::AF_INET6,
        }
    }

    /// Map a platform `AF_*` value back to a family
    pub fn from_native(value: i32) -> Self {
        match value {
            v if v == native::AF_INET => SocketFamily::Inet,
            v if v == native::AF_INET6 => SocketFamily::Inet6,
            _ => SocketFamily::Unknown,
        }
    }
}
