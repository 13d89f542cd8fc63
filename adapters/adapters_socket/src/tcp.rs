//! TCP Socket Module
//!
//! Stream wrapper over [`Socket`] for callers that only ever speak TCP.
//! Implements [`Read`] and [`Write`] so it plugs into `std::io` helpers.

use crate::socket::{Socket, SocketProtocol, SocketType};
use entities_net_error::{ErrorKind, Result, SocketError};
use entities_socket_address::{SocketAddress, SocketFamily};
use std::io::{self, Read, Write};

/// TCP Socket
pub struct TcpSocket {
    socket: Socket,
}

impl TcpSocket {
    /// Create a new TCP socket
    ///
    /// # Arguments
    ///
    /// * `family` - Address family (IPv4 or IPv6)
    ///
    /// # Returns
    ///
    /// * `Ok(TcpSocket)` - Created socket
    /// * `Err(SocketError)` - Error creating socket
    pub fn new(family: SocketFamily) -> Result<Self> {
        let socket = Socket::new(family, SocketType::Stream, SocketProtocol::Tcp)?;
        Ok(Self { socket })
    }

    /// Bind to `addr` with address reuse enabled
    pub fn bind(&self, addr: &SocketAddress) -> Result<()> {
        self.socket.bind(addr, true)
    }

    /// Listen for incoming connections
    ///
    /// # Arguments
    ///
    /// * `backlog` - Maximum number of pending connections
    pub fn listen(&mut self, backlog: i32) -> Result<()> {
        self.socket.set_listen_backlog(backlog);
        self.socket.listen()
    }

    /// Accept an incoming connection
    ///
    /// # Returns
    ///
    /// * `Ok((TcpSocket, SocketAddress))` - Accepted connection and peer address
    /// * `Err(SocketError)` - Error accepting connection
    pub fn accept(&self) -> Result<(TcpSocket, SocketAddress)> {
        let socket = self.socket.accept()?;
        let peer = socket.remote_address()?;
        Ok((TcpSocket { socket }, peer))
    }

    pub fn connect(&mut self, addr: &SocketAddress) -> Result<()> {
        self.socket.connect(addr)
    }

    pub fn send(&self, buf: &[u8]) -> Result<usize> {
        self.socket.send(buf)
    }

    pub fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        self.socket.receive(buf)
    }

    pub fn local_addr(&self) -> Result<SocketAddress> {
        self.socket.local_address()
    }

    pub fn peer_addr(&self) -> Result<SocketAddress> {
        self.socket.remote_address()
    }

    /// Set the readiness timeout for blocking calls, in milliseconds
    pub fn set_timeout(&mut self, timeout_ms: i32) {
        self.socket.set_timeout(timeout_ms);
    }

    /// Get the underlying socket
    pub fn inner(&self) -> &Socket {
        &self.socket
    }

    pub fn inner_mut(&mut self) -> &mut Socket {
        &mut self.socket
    }
}

impl From<Socket> for TcpSocket {
    fn from(socket: Socket) -> Self {
        Self { socket }
    }
}

/// Empty buffers are a no-op here, unlike [`Socket::receive`] / [`Socket::send`]
impl Read for TcpSocket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        Ok(self.socket.receive(buf)?)
    }
}

impl Write for TcpSocket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        Ok(self.socket.send(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.socket.is_closed() {
            return Err(SocketError::new(ErrorKind::NotAvailable, "Socket is already closed").into());
        }
        Ok(())
    }
}
