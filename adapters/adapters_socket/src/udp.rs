//! UDP Socket Module
//!
//! Datagram wrapper over [`Socket`].

use crate::socket::{Socket, SocketProtocol, SocketType};
use entities_net_error::Result;
use entities_socket_address::{SocketAddress, SocketFamily};

/// UDP Socket
pub struct UdpSocket {
    socket: Socket,
}

impl UdpSocket {
    /// Create a new UDP socket
    ///
    /// # Arguments
    ///
    /// * `family` - Address family (IPv4 or IPv6)
    pub fn new(family: SocketFamily) -> Result<Self> {
        let socket = Socket::new(family, SocketType::Datagram, SocketProtocol::Udp)?;
        Ok(Self { socket })
    }

    /// Bind to `addr`
    ///
    /// # Arguments
    ///
    /// * `addr` - Local address
    /// * `allow_reuse` - Share the port with other sockets (`SO_REUSEADDR`/`SO_REUSEPORT`)
    pub fn bind(&self, addr: &SocketAddress, allow_reuse: bool) -> Result<()> {
        self.socket.bind(addr, allow_reuse)
    }

    /// Set the default peer for [`send`](Self::send) and filter incoming datagrams
    pub fn connect(&mut self, addr: &SocketAddress) -> Result<()> {
        self.socket.connect(addr)
    }

    /// Send a datagram to `addr`
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of bytes sent
    /// * `Err(SocketError)` - Error sending
    pub fn send_to(&self, buf: &[u8], addr: &SocketAddress) -> Result<usize> {
        self.socket.send_to(addr, buf)
    }

    /// Receive a datagram
    ///
    /// # Returns
    ///
    /// * `Ok((usize, Option<SocketAddress>))` - Bytes received and the sender,
    ///   when the OS reported one that can be represented
    /// * `Err(SocketError)` - Error receiving
    pub fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, Option<SocketAddress>)> {
        self.socket.receive_from(buf)
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

    pub fn set_blocking(&mut self, blocking: bool) {
        self.socket.set_blocking(blocking);
    }

    /// Get the underlying socket
    pub fn inner(&self) -> &Socket {
        &self.socket
    }

    pub fn inner_mut(&mut self) -> &mut Socket {
        &mut self.socket
    }
}

impl From<Socket> for UdpSocket {
    fn from(socket: Socket) -> Self {
        Self { socket }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entities_net_error::ErrorKind;

    fn bound() -> (UdpSocket, SocketAddress) {
        let sock = UdpSocket::new(SocketFamily::Inet).unwrap();
        sock.bind(&SocketAddress::loopback(SocketFamily::Inet, 0).unwrap(), false)
            .unwrap();
        let addr = sock.local_addr().unwrap();
        (sock, addr)
    }

    #[test]
    fn test_udp_socket_creation() {
        let sock = UdpSocket::new(SocketFamily::Inet).unwrap();
        assert_eq!(sock.inner().socket_type(), SocketType::Datagram);
        assert_eq!(sock.inner().protocol(), SocketProtocol::Udp);
    }

    #[test]
    fn test_udp_socket_send_to_recv_from() {
        let (receiver, receiver_addr) = bound();
        let (sender, sender_addr) = bound();

        assert_eq!(sender.send_to(b"datagram", &receiver_addr).unwrap(), 8);

        let mut buf = [0u8; 32];
        let (len, from) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"datagram");
        assert_eq!(from, Some(sender_addr));
    }

    #[test]
    fn test_udp_socket_connected_send() {
        let (receiver, receiver_addr) = bound();
        let (mut sender, _) = bound();
        sender.connect(&receiver_addr).unwrap();
        assert!(sender.inner().is_connected());
        assert_eq!(sender.peer_addr().unwrap(), receiver_addr);

        sender.send(b"hi").unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(receiver.recv(&mut buf).unwrap(), 2);
    }

    #[test]
    fn test_udp_socket_non_blocking_empty() {
        let (mut sock, _) = bound();
        sock.set_blocking(false);
        let mut buf = [0u8; 8];
        let err = sock.recv_from(&mut buf).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WouldBlock);
        assert_eq!(err.message(), "Failed to call recvfrom() on socket");
    }

    #[test]
    fn test_udp_socket_receive_timeout() {
        let (mut sock, _) = bound();
        sock.set_timeout(20);
        let mut buf = [0u8; 8];
        assert_eq!(sock.recv(&mut buf).unwrap_err().kind(), ErrorKind::TimedOut);
    }
}
