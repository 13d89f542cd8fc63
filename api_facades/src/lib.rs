//! API Facades Layer
//!
//! Single entry point for callers of the socket library. Re-exports the
//! public surface of every inner layer and adds the process-wide lifecycle
//! hooks ([`init_once`] / [`close_once`]).
//!
//! ```rust,no_run
//! use api_facades::{init_once, Socket, SocketAddress, SocketFamily, SocketProtocol, SocketType};
//!
//! init_once()?;
//! let mut sock = Socket::new(SocketFamily::Inet, SocketType::Stream, SocketProtocol::Tcp)?;
//! sock.connect(&SocketAddress::parse("127.0.0.1", 8888)?)?;
//! # Ok::<(), api_facades::SocketError>(())
//! ```

pub mod lifecycle;

pub use lifecycle::{close_once, init_once};

pub use adapters_readiness::{platform_backend, wait_until_ready, Interest, PlatformWait, RawDescriptor, WaitBackend};
pub use adapters_socket::{
    Socket, SocketConfig, SocketDirection, SocketProtocol, SocketType, TcpSocket, UdpSocket, DEFAULT_BACKLOG,
};
pub use entities_net_error::{
    classify, clear, last_code, last_error, last_message, last_native_code, ErrorKind, ErrorState, Result, SocketError,
};
pub use entities_socket_address::{
    is_flow_info_supported, is_ipv6_supported, is_scope_id_supported, AddressError, SocketAddress, SocketFamily,
};
