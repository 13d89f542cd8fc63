//! Socket Address Module
//!
//! Provides [`SocketAddress`], an owned IPv4 or IPv6 endpoint value.
//!
//! ## Overview
//!
//! A socket address is built from one of four sources:
//! - a native `sockaddr` buffer returned by the OS ([`SocketAddress::from_native`])
//! - a numeric literal plus port ([`SocketAddress::parse`]); no name resolution
//! - the wildcard address of a family ([`SocketAddress::any`])
//! - the loopback address of a family ([`SocketAddress::loopback`])
//!
//! and written back with [`SocketAddress::to_native`], which produces the
//! byte-exact platform structure consumed by bind/connect/sendto.
//!
//! ## Examples
//!
//! ```rust
//! use entities_socket_address::{SocketAddress, SocketFamily};
//!
//! let addr = SocketAddress::parse("127.0.0.1", 8080).unwrap();
//! assert!(addr.is_loopback());
//! assert_eq!(addr.family(), SocketFamily::Inet);
//!
//! let mut buf = [0u8; 128];
//! let len = addr.to_native(&mut buf).unwrap();
//! assert_eq!(SocketAddress::from_native(&buf[..len]), Some(addr));
//! ```

use crate::family::SocketFamily;
use crate::native::{self, Decoded};
use entities_net_error::{ErrorKind, SocketError};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::str::FromStr;
use tracing::warn;

/// Address construction and conversion failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// Text is not a numeric IPv4 or IPv6 literal
    #[error("invalid socket address literal `{0}`")]
    Parse(String),
    /// Destination buffer cannot hold the native structure
    #[error("native buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
}

impl From<AddressError> for SocketError {
    fn from(err: AddressError) -> Self {
        SocketError::new(ErrorKind::InvalidArgument, err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Endpoint {
    V4 {
        ip: [u8; 4],
        port: u16,
    },
    V6 {
        ip: [u8; 16],
        port: u16,
        flow_info: u32,
        scope_id: u32,
    },
}

/// IPv4 or IPv6 endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SocketAddress {
    endpoint: Endpoint,
}

impl SocketAddress {
    fn v4(ip: [u8; 4], port: u16) -> Self {
        Self { endpoint: Endpoint::V4 { ip, port } }
    }

    fn v6(ip: [u8; 16], port: u16, flow_info: u32, scope_id: u32) -> Self {
        Self {
            endpoint: Endpoint::V6 { ip, port, flow_info, scope_id },
        }
    }

    /// Build an address from a native `sockaddr` buffer
    ///
    /// # Arguments
    ///
    /// * `bytes` - a `sockaddr_in` or `sockaddr_in6` as filled in by the OS
    ///
    /// # Returns
    ///
    /// `None` when the buffer is empty, truncated, or of an unknown family
    pub fn from_native(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        match native::decode(bytes) {
            Decoded::Endpoint(endpoint) => Some(Self { endpoint }),
            Decoded::Truncated { family, needed } => {
                warn!(
                    family,
                    needed,
                    got = bytes.len(),
                    "native socket address is shorter than its structure"
                );
                None
            }
            Decoded::UnknownFamily(family) => {
                warn!(family, "native socket address has an unsupported family");
                None
            }
        }
    }

    /// Parse a numeric address literal
    ///
    /// Text containing a colon is parsed as IPv6 only; anything else is tried
    /// as IPv4 and then IPv6. An IPv6 literal may carry a numeric `%scope`
    /// suffix which becomes the scope id.
    ///
    /// # Arguments
    ///
    /// * `text` - numeric address, e.g. `"192.168.0.1"` or `"fe80::1%2"`
    /// * `port` - port in host byte order
    pub fn parse(text: &str, port: u16) -> Result<Self, AddressError> {
        if text.contains(':') {
            return parse_v6(text, port);
        }
        if let Ok(ip) = text.parse::<Ipv4Addr>() {
            return Ok(Self::v4(ip.octets(), port));
        }
        parse_v6(text, port)
    }

    /// Wildcard address (`0.0.0.0` / `::`) of `family`
    pub fn any(family: SocketFamily, port: u16) -> Option<Self> {
        match family {
            SocketFamily::Inet => Some(Self::v4(Ipv4Addr::UNSPECIFIED.octets(), port)),
            SocketFamily::Inet6 => Some(Self::v6(Ipv6Addr::UNSPECIFIED.octets(), port, 0, 0)),
            SocketFamily::Unknown => None,
        }
    }

    /// Loopback address (`127.0.0.1` / `::1`) of `family`
    pub fn loopback(family: SocketFamily, port: u16) -> Option<Self> {
        match family {
            SocketFamily::Inet => Some(Self::v4(Ipv4Addr::LOCALHOST.octets(), port)),
            SocketFamily::Inet6 => Some(Self::v6(Ipv6Addr::LOCALHOST.octets(), port, 0, 0)),
            SocketFamily::Unknown => None,
        }
    }

    /// Write the native structure into the front of `dest`
    ///
    /// The first [`native_size`](Self::native_size) bytes of `dest` are zeroed
    /// before the structure is written, so no stale bytes reach the OS.
    ///
    /// # Returns
    ///
    /// Number of bytes written (always `native_size()`)
    pub fn to_native(&self, dest: &mut [u8]) -> Result<usize, AddressError> {
        let needed = self.native_size();
        if dest.len() < needed {
            warn!(needed, got = dest.len(), "buffer too small for native socket address");
            return Err(AddressError::BufferTooSmall {
                needed,
                got: dest.len(),
            });
        }
        dest[..needed].fill(0);
        Ok(native::encode(&self.endpoint, &mut dest[..needed]))
    }

    /// Size in bytes of the native structure for this address's family
    pub fn native_size(&self) -> usize {
        match self.endpoint {
            Endpoint::V4 { .. } => native::SIZE_INET,
            Endpoint::V6 { .. } => native::SIZE_INET6,
        }
    }

    pub fn family(&self) -> SocketFamily {
        match self.endpoint {
            Endpoint::V4 { .. } => SocketFamily::Inet,
            Endpoint::V6 { .. } => SocketFamily::Inet6,
        }
    }

    /// Canonical textual form of the address part (no port)
    pub fn address(&self) -> String {
        self.ip().to_string()
    }

    pub fn ip(&self) -> IpAddr {
        match self.endpoint {
            Endpoint::V4 { ip, .. } => IpAddr::V4(Ipv4Addr::from(ip)),
            Endpoint::V6 { ip, .. } => IpAddr::V6(Ipv6Addr::from(ip)),
        }
    }

    pub fn port(&self) -> u16 {
        match self.endpoint {
            Endpoint::V4 { port, .. } | Endpoint::V6 { port, .. } => port,
        }
    }

    /// IPv6 flow information, 0 for IPv4
    pub fn flow_info(&self) -> u32 {
        match self.endpoint {
            Endpoint::V6 { flow_info, .. } => flow_info,
            Endpoint::V4 { .. } => 0,
        }
    }

    /// IPv6 scope id, 0 for IPv4
    pub fn scope_id(&self) -> u32 {
        match self.endpoint {
            Endpoint::V6 { scope_id, .. } => scope_id,
            Endpoint::V4 { .. } => 0,
        }
    }

    /// Set the IPv6 flow information; no-op for IPv4
    pub fn set_flow_info(&mut self, value: u32) {
        if let Endpoint::V6 { flow_info, .. } = &mut self.endpoint {
            *flow_info = value;
        }
    }

    /// Set the IPv6 scope id; no-op for IPv4
    pub fn set_scope_id(&mut self, value: u32) {
        if let Endpoint::V6 { scope_id, .. } = &mut self.endpoint {
            *scope_id = value;
        }
    }

    /// `0.0.0.0` or `::`
    pub fn is_any(&self) -> bool {
        match self.endpoint {
            Endpoint::V4 { ip, .. } => ip == [0; 4],
            Endpoint::V6 { ip, .. } => ip == [0; 16],
        }
    }

    /// `127.0.0.0/8` or `::1`
    pub fn is_loopback(&self) -> bool {
        match self.endpoint {
            Endpoint::V4 { ip, .. } => ip[0] == 127,
            Endpoint::V6 { ip, .. } => Ipv6Addr::from(ip) == Ipv6Addr::LOCALHOST,
        }
    }

    /// Convert into the standard library representation
    pub fn to_std(&self) -> SocketAddr {
        match self.endpoint {
            Endpoint::V4 { ip, port } => SocketAddr::V4(SocketAddrV4::new(ip.into(), port)),
            Endpoint::V6 { ip, port, flow_info, scope_id } => {
                SocketAddr::V6(SocketAddrV6::new(ip.into(), port, flow_info, scope_id))
            }
        }
    }
}

fn parse_v6(text: &str, port: u16) -> Result<SocketAddress, AddressError> {
    let bad = || AddressError::Parse(text.to_owned());
    let (host, scope) = match text.split_once('%') {
        Some((host, scope)) => (host, Some(scope)),
        None => (text, None),
    };
    let ip = host.parse::<Ipv6Addr>().map_err(|_| bad())?;
    let scope_id = match scope {
        Some(s) => s.parse::<u32>().map_err(|_| bad())?,
        None => 0,
    };
    Ok(SocketAddress::v6(ip.octets(), port, 0, scope_id))
}

impl From<SocketAddr> for SocketAddress {
    fn from(addr: SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(v4) => Self::v4(v4.ip().octets(), v4.port()),
            SocketAddr::V6(v6) => Self::v6(v6.ip().octets(), v6.port(), v6.flowinfo(), v6.scope_id()),
        }
    }
}

impl From<SocketAddress> for SocketAddr {
    fn from(addr: SocketAddress) -> Self {
        addr.to_std()
    }
}

impl FromStr for SocketAddress {
    type Err = AddressError;

    /// Parse `"a.b.c.d:port"` or `"[v6%scope]:port"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<SocketAddr>()
            .map(Self::from)
            .map_err(|_| AddressError::Parse(s.to_owned()))
    }
}

impl fmt::Display for SocketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_std(), f)
    }
}

/// IPv6 sockets can be created on this platform
pub fn is_ipv6_supported() -> bool {
    true
}

/// The native IPv6 structure carries a flow-info field
pub fn is_flow_info_supported() -> bool {
    true
}

/// The native IPv6 structure carries a scope-id field
pub fn is_scope_id_supported() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4() {
        let addr = SocketAddress::parse("192.168.10.20", 5000).unwrap();
        assert_eq!(addr.family(), SocketFamily::Inet);
        assert_eq!(addr.address(), "192.168.10.20");
        assert_eq!(addr.port(), 5000);
        assert!(!addr.is_any());
        assert!(!addr.is_loopback());
    }

    #[test]
    fn test_parse_ipv6_with_scope() {
        let addr = SocketAddress::parse("fe80::1%3", 80).unwrap();
        assert_eq!(addr.family(), SocketFamily::Inet6);
        assert_eq!(addr.scope_id(), 3);
        assert_eq!(addr.address(), "fe80::1");
        assert!(SocketAddress::parse("fe80::1%eth0", 80).is_err());
    }

    #[test]
    fn test_parse_rejects_names_and_garbage() {
        assert!(SocketAddress::parse("localhost", 80).is_err());
        assert!(SocketAddress::parse("not-an-address", 80).is_err());
        assert!(SocketAddress::parse("1.2.3", 80).is_err());
        assert!(SocketAddress::parse("1.2.3.4:80", 80).is_err());
        assert!(SocketAddress::parse("", 80).is_err());
    }

    #[test]
    fn test_any_and_loopback() {
        let any = SocketAddress::any(SocketFamily::Inet6, 9).unwrap();
        assert!(any.is_any());
        assert_eq!(any.address(), "::");
        let lo = SocketAddress::loopback(SocketFamily::Inet, 9).unwrap();
        assert!(lo.is_loopback());
        assert_eq!(lo.address(), "127.0.0.1");
        assert!(SocketAddress::any(SocketFamily::Unknown, 1).is_none());
        assert!(SocketAddress::loopback(SocketFamily::Unknown, 1).is_none());
    }

    #[test]
    fn test_loopback_covers_whole_block() {
        assert!(SocketAddress::parse("127.255.0.9", 1).unwrap().is_loopback());
        assert!(!SocketAddress::parse("128.0.0.1", 1).unwrap().is_loopback());
    }

    #[test]
    fn test_ipv6_fields_are_noops_on_ipv4() {
        let mut addr = SocketAddress::parse("10.0.0.1", 1).unwrap();
        addr.set_flow_info(7);
        addr.set_scope_id(9);
        assert_eq!(addr.flow_info(), 0);
        assert_eq!(addr.scope_id(), 0);

        let mut addr6 = SocketAddress::parse("::1", 1).unwrap();
        addr6.set_flow_info(7);
        addr6.set_scope_id(9);
        assert_eq!(addr6.flow_info(), 7);
        assert_eq!(addr6.scope_id(), 9);
    }

    #[test]
    fn test_native_roundtrip_ipv6() {
        let mut addr = SocketAddress::parse("2001:db8::42", 443).unwrap();
        addr.set_flow_info(0x1234);
        addr.set_scope_id(5);
        let mut buf = [0xAAu8; 256];
        let len = addr.to_native(&mut buf).unwrap();
        assert_eq!(len, addr.native_size());
        assert_eq!(SocketAddress::from_native(&buf[..len]), Some(addr.clone()));

        let mut again = [0u8; 256];
        let len2 = SocketAddress::from_native(&buf[..len]).unwrap().to_native(&mut again).unwrap();
        assert_eq!(&buf[..len], &again[..len2]);
    }

    #[test]
    fn test_to_native_buffer_too_small() {
        let addr = SocketAddress::loopback(SocketFamily::Inet6, 1).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(
            addr.to_native(&mut buf),
            Err(AddressError::BufferTooSmall {
                needed: addr.native_size(),
                got: 8
            })
        );
    }

    #[test]
    fn test_from_native_rejects_empty() {
        assert_eq!(SocketAddress::from_native(&[]), None);
    }

    #[test]
    fn test_std_interop_and_display() {
        let addr: SocketAddress = "[::1]:8080".parse().unwrap();
        assert_eq!(addr.to_string(), "[::1]:8080");
        let v4: SocketAddress = "10.1.1.1:22".parse().unwrap();
        assert_eq!(v4.to_string(), "10.1.1.1:22");
        assert_eq!(SocketAddress::from(v4.to_std()), v4);
        assert!("10.1.1.1".parse::<SocketAddress>().is_err());
    }

    #[test]
    fn test_address_error_into_socket_error() {
        let err: SocketError = AddressError::Parse("x".into()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err: SocketError = AddressError::BufferTooSmall { needed: 16, got: 4 }.into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.message(), "native buffer too small: need 16 bytes, got 4");
    }
}
