//! Fetch Client Module

use crate::send_all;
use api_facades::{ErrorKind, Interest, Result, Socket, SocketAddress, SocketProtocol, SocketType};
use tracing::{debug, info};

const BUF_SIZE: usize = 512;

/// Connect to `address`, send `request` if given, and read until the peer
/// closes the connection
///
/// Connecting blocks for at most `timeout_ms`. Reading switches the handle
/// to non-blocking mode and waits for readability between reads.
///
/// # Returns
///
/// Every byte the server sent
pub fn fetch(address: &SocketAddress, timeout_ms: u32, request: Option<&[u8]>) -> Result<Vec<u8>> {
    let mut sock = Socket::new(address.family(), SocketType::Stream, SocketProtocol::Tcp)?;
    sock.set_timeout(i32::try_from(timeout_ms).unwrap_or(i32::MAX));
    sock.connect(address)?;
    info!(%address, "connected");

    sock.set_blocking(false);
    if let Some(request) = request {
        send_all(&sock, request)?;
    }

    let mut received = Vec::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        match sock.receive(&mut buf) {
            Ok(0) => break,
            Ok(len) => {
                debug!(len, "received");
                received.extend_from_slice(&buf[..len]);
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => sock.io_condition_wait(Interest::Readable)?,
            Err(err) => return Err(err),
        }
    }
    sock.free();
    Ok(received)
}
