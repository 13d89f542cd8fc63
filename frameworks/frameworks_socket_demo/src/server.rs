//! HTTP Responder Module
//!
//! Accepts clients on a listening socket, drains each request and answers
//! with [`RESPONSE`].

use crate::send_all;
use api_facades::{ErrorKind, Interest, Result, Socket, SocketAddress, SocketFamily, SocketProtocol, SocketType};
use tracing::{error, info, warn};

/// Fixed reply sent to every client
pub const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\nContent-type: text/plain\r\nContent-length: 12\r\n\r\nhttp example\r\n";

const BUF_SIZE: usize = 512;
const HEADER_END: &[u8] = b"\r\n\r\n";

/// Create a listening stream socket on the any address of `family`
///
/// # Arguments
///
/// * `family` - IPv4 or IPv6
/// * `port` - port to bind, 0 for an ephemeral one
pub fn bind_server(family: SocketFamily, port: u16) -> Result<Socket> {
    let mut server = Socket::new(family, SocketType::Stream, SocketProtocol::Tcp)?;
    let address = SocketAddress::any(family, port).ok_or_else(|| {
        api_facades::SocketError::new(ErrorKind::InvalidArgument, "Invalid input socket family")
    })?;
    server.bind(&address, true)?;
    server.listen()?;
    Ok(server)
}

/// Serve one accepted client and free it
///
/// The request is read without blocking the handle; whenever nothing is
/// pending the client waits for readability, bounded by `timeout_ms`.
///
/// # Returns
///
/// Number of request bytes read
pub fn serve_client(mut client: Socket, timeout_ms: u32) -> Result<usize> {
    client.set_blocking(false);
    client.set_timeout(i32::try_from(timeout_ms).unwrap_or(i32::MAX));

    match client.remote_address() {
        Ok(peer) => info!(address = %peer.address(), port = peer.port(), "new connection"),
        Err(err) => warn!(error = %err, "peer address unavailable"),
    }

    let mut request = Vec::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        match client.receive(&mut buf) {
            Ok(0) => break,
            Ok(len) => {
                request.extend_from_slice(&buf[..len]);
                if request.windows(HEADER_END.len()).any(|w| w == HEADER_END) {
                    break;
                }
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => client.io_condition_wait(Interest::Readable)?,
            Err(err) => return Err(err),
        }
    }

    send_all(&client, RESPONSE)?;
    client.free();
    Ok(request.len())
}

/// Accept clients until `once` is satisfied or accepting fails
pub fn serve(server: &Socket, once: bool, timeout_ms: u32) -> Result<()> {
    loop {
        let client = server.accept()?;
        if let Err(err) = serve_client(client, timeout_ms) {
            error!(error = %err, "client failed");
        }
        if once {
            return Ok(());
        }
    }
}
