//! Socket Module
//!
//! Provides [`Socket`], a portable socket handle. The OS descriptor is always
//! non-blocking; a *logically* blocking handle waits for readiness through
//! `adapters_readiness` before each attempt, so timeouts work the same on
//! every platform.
//!
//! ## State machine
//!
//! `Created -> Bound -> Listening` for servers, `Created -> Connected` for
//! clients, and `Closed` from anywhere. Accepted children start connected.
//! A closed handle rejects every operation with [`ErrorKind::NotAvailable`].
//!
//! ## Errors
//!
//! Every failure is returned as a [`SocketError`] and also recorded in the
//! process-wide last-error mirror of `entities_net_error`.

use crate::config::{SocketConfig, DEFAULT_BACKLOG};
use crate::sys;
use adapters_readiness::{platform_backend, retry_blocked, wait_until_ready, Interest, PlatformWait, RawDescriptor};
use entities_net_error::{record, ErrorKind, Result, SocketError};
use entities_socket_address::{SocketAddress, SocketFamily};
use socket2::{Domain, Protocol, Socket as Socket2, Type};
use std::net::Shutdown;
use tracing::{debug, trace, warn};

/// Socket type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SocketType {
    #[default]
    Unknown,
    /// Connection-oriented byte stream
    Stream,
    /// Connectionless datagrams
    Datagram,
    /// Connection-oriented, record-preserving
    SeqPacket,
}

impl SocketType {
    fn to_socket2(self) -> Option<Type> {
        match self {
            SocketType::Stream => Some(Type::STREAM),
            SocketType::Datagram => Some(Type::DGRAM),
            SocketType::SeqPacket => Some(Type::SEQPACKET),
            SocketType::Unknown => None,
        }
    }

    fn from_socket2(ty: Type) -> Self {
        if ty == Type::STREAM {
            SocketType::Stream
        } else if ty == Type::DGRAM {
            SocketType::Datagram
        } else if ty == Type::SEQPACKET {
            SocketType::SeqPacket
        } else {
            SocketType::Unknown
        }
    }
}

/// Transport protocol, carrying IANA protocol numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SocketProtocol {
    Unknown,
    /// Let the OS pick the protocol for the socket type
    #[default]
    Default,
    Tcp,
    Udp,
    Sctp,
}

impl SocketProtocol {
    /// IANA protocol number, -1 for [`SocketProtocol::Unknown`]
    pub fn number(self) -> i32 {
        match self {
            SocketProtocol::Unknown => -1,
            SocketProtocol::Default => 0,
            SocketProtocol::Tcp => 6,
            SocketProtocol::Udp => 17,
            SocketProtocol::Sctp => 132,
        }
    }

    /// Protocol implied by a socket type on an IP family
    fn implied_by(socket_type: SocketType) -> Self {
        match socket_type {
            SocketType::Stream => SocketProtocol::Tcp,
            SocketType::Datagram => SocketProtocol::Udp,
            SocketType::SeqPacket => SocketProtocol::Sctp,
            SocketType::Unknown => SocketProtocol::Default,
        }
    }
}

/// Buffer direction for [`Socket::set_buffer_size`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketDirection {
    Send,
    Receive,
}

/// Record `err` in the last-error mirror and hand it back
fn recorded(err: SocketError) -> SocketError {
    trace!(kind = ?err.kind(), native = err.native_code(), message = err.message(), "socket operation failed");
    record(&err);
    err
}

fn invalid_argument() -> SocketError {
    recorded(SocketError::new(ErrorKind::InvalidArgument, "Invalid input argument"))
}

fn address_failure(message: &str) -> SocketError {
    recorded(SocketError::new(ErrorKind::Failed, message))
}

/// What introspection of a live descriptor recovers
struct Details {
    family: SocketFamily,
    socket_type: SocketType,
    protocol: SocketProtocol,
    keepalive: bool,
    connected: bool,
}

/// Portable socket handle
///
/// Owns its descriptor exclusively; dropping the handle closes it.
///
/// # Examples
///
/// ```rust,no_run
/// use adapters_socket::{Socket, SocketProtocol, SocketType};
/// use entities_socket_address::{SocketAddress, SocketFamily};
///
/// let mut server = Socket::new(SocketFamily::Inet, SocketType::Stream, SocketProtocol::Tcp)?;
/// server.bind(&SocketAddress::loopback(SocketFamily::Inet, 8080).unwrap(), true)?;
/// server.listen()?;
/// let client = server.accept()?;
/// client.send(b"hello")?;
/// # Ok::<(), entities_net_error::SocketError>(())
/// ```
#[derive(Debug)]
pub struct Socket {
    inner: Option<Socket2>,
    family: SocketFamily,
    socket_type: SocketType,
    protocol: SocketProtocol,
    listen_backlog: i32,
    timeout_ms: u32,
    blocking: bool,
    keepalive: bool,
    connected: bool,
    listening: bool,
    waiter: PlatformWait,
}

impl Socket {
    /// Create a new socket
    ///
    /// The descriptor is created close-on-exec and non-blocking; the handle
    /// starts logically blocking with the default backlog and no timeout.
    ///
    /// # Arguments
    ///
    /// * `family` - IPv4 or IPv6
    /// * `socket_type` - stream, datagram or seqpacket
    /// * `protocol` - transport protocol, or `Default` to let the OS choose
    ///
    /// # Returns
    ///
    /// The new handle, or an invalid-argument error for any `Unknown` input
    pub fn new(family: SocketFamily, socket_type: SocketType, protocol: SocketProtocol) -> Result<Self> {
        let ty = match socket_type.to_socket2() {
            Some(ty) if family != SocketFamily::Unknown && protocol != SocketProtocol::Unknown => ty,
            _ => {
                return Err(recorded(SocketError::new(
                    ErrorKind::InvalidArgument,
                    "Invalid input socket family, type or protocol",
                )))
            }
        };
        let domain = Domain::from(family.native());
        let proto = match protocol {
            SocketProtocol::Default => None,
            other => Some(Protocol::from(other.number())),
        };

        let sock = Socket2::new(domain, ty, proto)
            .map_err(|e| recorded(SocketError::from_io(&e, "Failed to call socket() to create socket")))?;
        let waiter = Self::prepare(&sock)?;

        debug!(?family, ?socket_type, ?protocol, "socket created");
        Ok(Self {
            inner: Some(sock),
            family,
            socket_type,
            protocol,
            listen_backlog: DEFAULT_BACKLOG,
            timeout_ms: 0,
            blocking: true,
            keepalive: false,
            connected: false,
            listening: false,
            waiter,
        })
    }

    /// Create a new socket and apply `config`
    pub fn with_config(
        family: SocketFamily,
        socket_type: SocketType,
        protocol: SocketProtocol,
        config: SocketConfig,
    ) -> Result<Self> {
        let mut sock = Self::new(family, socket_type, protocol)?;
        sock.set_blocking(config.blocking);
        sock.timeout_ms = config.timeout_ms;
        sock.set_listen_backlog(config.listen_backlog);
        sock.set_keepalive(config.keepalive);
        Ok(sock)
    }

    /// Take ownership of an existing socket descriptor
    ///
    /// Family, type, protocol, keepalive and connection state are read back
    /// from the descriptor, which is then switched to non-blocking mode.
    ///
    /// # Safety
    ///
    /// `fd` must be an open socket descriptor owned by the caller. On success
    /// ownership moves into the returned handle. On failure the descriptor is
    /// left open and still belongs to the caller.
    pub unsafe fn from_descriptor(fd: RawDescriptor) -> Result<Self> {
        if sys::is_invalid(fd) {
            return Err(recorded(SocketError::new(
                ErrorKind::InvalidArgument,
                "Unable to create socket from bad fd",
            )));
        }
        let sock = std::mem::ManuallyDrop::new(sys::adopt(fd));
        let details = Self::inspect(&sock)?;
        let waiter = Self::prepare(&sock)?;
        Ok(Self::assemble(std::mem::ManuallyDrop::into_inner(sock), details, waiter))
    }

    /// Wrap a freshly accepted descriptor; it is closed if wrapping fails
    fn adopt_accepted(sock: Socket2) -> Result<Self> {
        let details = Self::inspect(&sock)?;
        let waiter = Self::prepare(&sock)?;
        Ok(Self::assemble(sock, details, waiter))
    }

    fn inspect(sock: &Socket2) -> Result<Details> {
        let ty = sock.r#type().map_err(|e| {
            recorded(SocketError::from_io(&e, "Failed to call getsockopt() to get socket info for fd"))
        })?;
        let socket_type = SocketType::from_socket2(ty);

        let local = sock.local_addr().map_err(|e| {
            recorded(SocketError::from_io(&e, "Failed to call getsockname() to get socket address info"))
        })?;
        let family = SocketFamily::from_native(i32::from(local.domain()));

        let (protocol, connected) = match family {
            SocketFamily::Unknown => (SocketProtocol::Default, false),
            _ => (SocketProtocol::implied_by(socket_type), sock.peer_addr().is_ok()),
        };
        // unreadable keepalive is treated as off
        let keepalive = sock.keepalive().unwrap_or(false);

        Ok(Details {
            family,
            socket_type,
            protocol,
            keepalive,
            connected,
        })
    }

    /// Put a descriptor into the state every handle relies on
    fn prepare(sock: &Socket2) -> Result<PlatformWait> {
        sock.set_nonblocking(true)
            .map_err(|e| recorded(SocketError::from_io(&e, "Failed to set socket non-blocking mode")))?;

        #[cfg(all(unix, not(target_os = "vita")))]
        {
            if let Err(err) = sock.set_cloexec(true) {
                warn!(error = %err, "setsockopt() with FD_CLOEXEC failed");
            }
        }
        #[cfg(windows)]
        {
            if let Err(err) = sock.set_no_inherit(true) {
                warn!(error = %err, "SetHandleInformation() with HANDLE_FLAG_INHERIT failed");
            }
        }
        #[cfg(target_vendor = "apple")]
        {
            if let Err(err) = sock.set_nosigpipe(true) {
                warn!(error = %err, "setsockopt() with SO_NOSIGPIPE failed");
            }
        }

        platform_backend().map_err(recorded)
    }

    fn assemble(sock: Socket2, details: Details, waiter: PlatformWait) -> Self {
        Self {
            inner: Some(sock),
            family: details.family,
            socket_type: details.socket_type,
            protocol: details.protocol,
            listen_backlog: DEFAULT_BACKLOG,
            timeout_ms: 0,
            blocking: true,
            keepalive: details.keepalive,
            connected: details.connected,
            listening: false,
            waiter,
        }
    }

    /// The open descriptor, or a not-available error once closed
    fn check(&self) -> Result<&Socket2> {
        self.inner
            .as_ref()
            .ok_or_else(|| recorded(SocketError::new(ErrorKind::NotAvailable, "Socket is already closed")))
    }

    fn native_address(address: &SocketAddress) -> Result<socket2::SockAddr> {
        sys::to_sockaddr(address)
            .map_err(|_| address_failure("Failed to convert socket address to native structure"))
    }

    /// Raw OS descriptor, `None` once closed
    pub fn descriptor(&self) -> Option<RawDescriptor> {
        self.inner.as_ref().map(sys::raw)
    }

    pub fn family(&self) -> SocketFamily {
        self.family
    }

    pub fn socket_type(&self) -> SocketType {
        self.socket_type
    }

    pub fn protocol(&self) -> SocketProtocol {
        self.protocol
    }

    pub fn keepalive(&self) -> bool {
        self.keepalive
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn listen_backlog(&self) -> i32 {
        self.listen_backlog
    }

    /// Readiness timeout in milliseconds, 0 means no timeout
    pub fn timeout(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Snapshot of the logical flags
    pub fn config(&self) -> SocketConfig {
        SocketConfig {
            blocking: self.blocking,
            timeout_ms: self.timeout_ms,
            listen_backlog: self.listen_backlog,
            keepalive: self.keepalive,
        }
    }

    /// Address the socket is bound to
    pub fn local_address(&self) -> Result<SocketAddress> {
        let addr = self.check()?.local_addr().map_err(|e| {
            recorded(SocketError::from_io(&e, "Failed to call getsockname() to get local socket address"))
        })?;
        sys::from_sockaddr(&addr)
            .ok_or_else(|| address_failure("Failed to create socket address from native structure"))
    }

    /// Address of the connected peer
    pub fn remote_address(&self) -> Result<SocketAddress> {
        let addr = self.check()?.peer_addr().map_err(|e| {
            recorded(SocketError::from_io(&e, "Failed to call getpeername() to get remote socket address"))
        })?;
        sys::from_sockaddr(&addr)
            .ok_or_else(|| address_failure("Failed to create socket address from native structure"))
    }

    /// Resolve a pending non-blocking connect
    ///
    /// Reads `SO_ERROR`; zero marks the socket connected, anything else is
    /// classified and returned.
    pub fn check_connect_result(&mut self) -> Result<()> {
        let pending = self.check()?.take_error().map_err(|e| {
            recorded(SocketError::from_io(&e, "Failed to call getsockopt() to get connection status"))
        })?;
        match pending {
            None => {
                self.connected = true;
                Ok(())
            }
            Some(err) => {
                self.connected = false;
                Err(recorded(SocketError::from_io(&err, "Error in socket layer")))
            }
        }
    }

    /// Enable or disable `SO_KEEPALIVE`
    ///
    /// The flag only changes when the OS accepts the option; a failure is
    /// logged and otherwise ignored.
    pub fn set_keepalive(&mut self, keepalive: bool) {
        if self.keepalive == keepalive {
            return;
        }
        let applied = match &self.inner {
            Some(sock) => sock.set_keepalive(keepalive),
            None => Err(std::io::Error::from(std::io::ErrorKind::NotConnected)),
        };
        match applied {
            Ok(()) => self.keepalive = keepalive,
            Err(err) => warn!(error = %err, "setsockopt() with SO_KEEPALIVE failed"),
        }
    }

    /// Switch between emulated blocking and non-blocking I/O
    pub fn set_blocking(&mut self, blocking: bool) {
        self.blocking = blocking;
    }

    /// Set the backlog used by [`listen`](Self::listen); ignored once listening
    pub fn set_listen_backlog(&mut self, backlog: i32) {
        if self.listening {
            debug!(backlog, "listen backlog change ignored on listening socket");
            return;
        }
        self.listen_backlog = backlog;
    }

    /// Set the readiness timeout in milliseconds; negative values become 0
    pub fn set_timeout(&mut self, timeout_ms: i32) {
        self.timeout_ms = timeout_ms.max(0) as u32;
    }

    /// Bind to a local address
    ///
    /// # Arguments
    ///
    /// * `address` - local address
    /// * `allow_reuse` - best-effort `SO_REUSEADDR` (and `SO_REUSEPORT` for
    ///   datagram sockets); option failures are only logged
    pub fn bind(&self, address: &SocketAddress, allow_reuse: bool) -> Result<()> {
        let sock = self.check()?;
        let datagram = self.socket_type == SocketType::Datagram;

        // Windows lets SO_REUSEADDR steal a port from an active TCP listener
        let reuse_address = if cfg!(windows) { allow_reuse && datagram } else { allow_reuse };
        if let Err(err) = sock.set_reuse_address(reuse_address) {
            warn!(error = %err, "setsockopt() with SO_REUSEADDR failed");
        }
        #[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos", target_os = "cygwin"))))]
        {
            if let Err(err) = sock.set_reuse_port(allow_reuse && datagram) {
                warn!(error = %err, "setsockopt() with SO_REUSEPORT failed");
            }
        }

        let native = Self::native_address(address)?;
        sock.bind(&native)
            .map_err(|e| recorded(SocketError::from_io(&e, "Failed to call bind() on socket")))?;
        debug!(%address, "socket bound");
        Ok(())
    }

    /// Connect to a remote address
    ///
    /// A blocking handle waits for the connection to complete (bounded by the
    /// timeout). A non-blocking handle returns a would-block / in-progress
    /// error; finish with [`io_condition_wait`](Self::io_condition_wait) and
    /// [`check_connect_result`](Self::check_connect_result).
    pub fn connect(&mut self, address: &SocketAddress) -> Result<()> {
        let native = Self::native_address(address)?;
        let failure = loop {
            match self.check()?.connect(&native) {
                Ok(()) => {
                    self.connected = true;
                    debug!(%address, "socket connected");
                    return Ok(());
                }
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => break SocketError::from_io(&err, "Failed to call connect() on socket"),
            }
        };

        if !failure.kind().is_transient() {
            return Err(recorded(failure));
        }
        if !self.blocking {
            return Err(recorded(SocketError::with_parts(
                failure.kind(),
                failure.native_code(),
                "Couldn't block non-blocking socket",
            )));
        }

        self.io_condition_wait(Interest::Writable)?;
        self.check_connect_result()?;
        debug!(%address, "socket connected");
        Ok(())
    }

    /// Start listening with the configured backlog
    pub fn listen(&mut self) -> Result<()> {
        self.check()?
            .listen(self.listen_backlog)
            .map_err(|e| recorded(SocketError::from_io(&e, "Failed to call listen() on socket")))?;
        self.listening = true;
        debug!(backlog = self.listen_backlog, "socket listening");
        Ok(())
    }

    /// Accept a pending connection
    ///
    /// # Returns
    ///
    /// A connected child handle inheriting this socket's protocol, with
    /// default flags (blocking, no timeout)
    pub fn accept(&self) -> Result<Socket> {
        let sock = self.check()?;
        let (child, _) = retry_blocked(
            self.blocking,
            "accept",
            || self.io_condition_wait(Interest::Readable),
            || sock.accept(),
        )
        .map_err(recorded)?;

        let mut child = Self::adopt_accepted(child)?;
        child.protocol = self.protocol;
        debug!(fd = ?child.descriptor(), "connection accepted");
        Ok(child)
    }

    /// Receive into `buf`
    ///
    /// # Returns
    ///
    /// Bytes received; `Ok(0)` means the peer shut down its side
    pub fn receive(&self, buf: &mut [u8]) -> Result<usize> {
        let sock = self.check()?;
        if buf.is_empty() {
            return Err(invalid_argument());
        }
        retry_blocked(
            self.blocking,
            "recv",
            || self.io_condition_wait(Interest::Readable),
            || sock.recv(sys::as_uninit(buf)),
        )
        .map_err(recorded)
    }

    /// Receive a datagram and the address it came from
    ///
    /// The sender address is `None` when the OS reports one that cannot be
    /// represented.
    pub fn receive_from(&self, buf: &mut [u8]) -> Result<(usize, Option<SocketAddress>)> {
        let sock = self.check()?;
        if buf.is_empty() {
            return Err(invalid_argument());
        }
        let (len, from) = retry_blocked(
            self.blocking,
            "recvfrom",
            || self.io_condition_wait(Interest::Readable),
            || sock.recv_from(sys::as_uninit(buf)),
        )
        .map_err(recorded)?;
        Ok((len, sys::from_sockaddr(&from)))
    }

    /// Send `buf` on a connected socket
    ///
    /// # Returns
    ///
    /// Bytes actually sent, which may be fewer than `buf.len()`
    pub fn send(&self, buf: &[u8]) -> Result<usize> {
        let sock = self.check()?;
        if buf.is_empty() {
            return Err(invalid_argument());
        }
        retry_blocked(
            self.blocking,
            "send",
            || self.io_condition_wait(Interest::Writable),
            || sock.send_with_flags(buf, sys::SEND_FLAGS),
        )
        .map_err(recorded)
    }

    /// Send a datagram to `address`
    pub fn send_to(&self, address: &SocketAddress, buf: &[u8]) -> Result<usize> {
        let sock = self.check()?;
        if buf.is_empty() {
            return Err(invalid_argument());
        }
        let native = Self::native_address(address)?;
        retry_blocked(
            self.blocking,
            "sendto",
            || self.io_condition_wait(Interest::Writable),
            || sock.send_to_with_flags(buf, &native, sys::SEND_FLAGS),
        )
        .map_err(recorded)
    }

    /// Close the descriptor
    ///
    /// Idempotent. The handle is unusable afterwards even if the OS reports a
    /// close failure, which is still returned.
    pub fn close(&mut self) -> Result<()> {
        let Some(sock) = self.inner.take() else {
            return Ok(());
        };
        self.connected = false;
        self.listening = false;
        debug!(fd = ?sys::raw(&sock), "closing socket");
        sys::close(sock).map_err(recorded)
    }

    /// Shut down one or both directions
    ///
    /// Passing `false` for both is a no-op. `connected` is cleared only when
    /// both directions are shut down.
    pub fn shutdown(&mut self, read: bool, write: bool) -> Result<()> {
        let sock = self.check()?;
        let how = match (read, write) {
            (false, false) => return Ok(()),
            (true, true) => Shutdown::Both,
            (true, false) => Shutdown::Read,
            (false, true) => Shutdown::Write,
        };
        sock.shutdown(how)
            .map_err(|e| recorded(SocketError::from_io(&e, "Failed to call shutdown() on socket")))?;
        if read && write {
            self.connected = false;
        }
        Ok(())
    }

    /// Close if still open and release every resource held by the handle
    pub fn free(mut self) {
        if let Err(err) = self.close() {
            debug!(error = %err, "close failed while freeing socket");
        }
    }

    /// Set the OS send or receive buffer size
    pub fn set_buffer_size(&self, direction: SocketDirection, size: usize) -> Result<()> {
        let sock = self.check()?;
        let applied = match direction {
            SocketDirection::Send => sock.set_send_buffer_size(size),
            SocketDirection::Receive => sock.set_recv_buffer_size(size),
        };
        applied.map_err(|e| {
            recorded(SocketError::from_io(&e, "Failed to call setsockopt() on socket to set buffer size"))
        })
    }

    /// Wait until the socket is readable or writable, bounded by the timeout
    pub fn io_condition_wait(&self, interest: Interest) -> Result<()> {
        let fd = sys::raw(self.check()?);
        wait_until_ready(&self.waiter, fd, interest, self.timeout_ms).map_err(recorded)
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            debug!(error = %err, "close failed while dropping socket");
        }
    }
}
