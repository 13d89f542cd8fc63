//! Entities Layer: Socket Addresses
//!
//! Provides the address value type used by bind, connect, accept and the
//! datagram calls.
//!
//! ## Overview
//!
//! The `entities_socket_address` crate provides:
//! - **Families**: [`SocketFamily`] with the platform's own `AF_*` values
//! - **Addresses**: [`SocketAddress`], an owned IPv4/IPv6 endpoint with
//!   optional IPv6 flow-info and scope-id
//! - **Native marshaling**: byte-exact conversion to and from `sockaddr_in` /
//!   `sockaddr_in6`
//!
//! ## Architecture
//!
//! This crate is part of the Entities layer. It depends only on
//! `entities_net_error` for converting [`AddressError`] into the shared
//! socket error type, and on `libc` / `windows-sys` for structure layouts.
//!
//! ## See Also
//!
//! - [`entities_net_error`](../entities_net_error/index.html): error taxonomy
//! - [`adapters_socket`](../adapters_socket/index.html): socket handle

pub mod address;
pub mod family;
pub mod native;

pub use address::{
    is_flow_info_supported, is_ipv6_supported, is_scope_id_supported, AddressError, SocketAddress,
};
pub use family::SocketFamily;
pub use native::{SIZE_INET, SIZE_INET6};
