//! Adapters Layer: Portable Socket
//!
//! Provides a portable socket handle with uniform blocking and timeout
//! semantics on every supported platform.
//!
//! ## Overview
//!
//! The `adapters_socket` crate provides:
//! - **Socket handle**: [`Socket`] with create, adopt, bind, listen, accept,
//!   connect, send/receive, shutdown and close
//! - **Configuration**: [`SocketConfig`] for the logical blocking, timeout,
//!   backlog and keepalive flags
//! - **Typed wrappers**: [`TcpSocket`] (with `Read`/`Write`) and [`UdpSocket`]
//!
//! Descriptors are kept non-blocking at the OS level; blocking behaviour is
//! emulated with readiness waits from `adapters_readiness`, bounded by the
//! per-socket timeout.
//!
//! ## Architecture
//!
//! This crate is part of the Adapters layer. It depends on:
//! - `entities_net_error`: error kinds and the last-error mirror
//! - `entities_socket_address`: addresses and families
//! - `adapters_readiness`: readiness waits and the retry loop
//!
//! ## See Also
//!
//! - [`adapters_readiness`](../adapters_readiness/index.html): readiness wait
//! - [`entities_socket_address`](../entities_socket_address/index.html): addresses

pub mod config;
pub mod socket;
mod sys;
pub mod tcp;
pub mod udp;

pub use adapters_readiness::{Interest, RawDescriptor};
pub use config::{SocketConfig, DEFAULT_BACKLOG};
pub use entities_net_error::{ErrorKind, Result, SocketError};
pub use entities_socket_address::{SocketAddress, SocketFamily};
pub use socket::{Socket, SocketDirection, SocketProtocol, SocketType};
pub use tcp::TcpSocket;
pub use udp::UdpSocket;
