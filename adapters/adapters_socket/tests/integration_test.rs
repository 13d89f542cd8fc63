//! Integration tests for adapters_socket crate
//!
//! End-to-end workflows over loopback: stream exchange, shutdown, timeouts,
//! datagrams and descriptor adoption.

use adapters_socket::*;
use entities_net_error::{last_error, last_message};
use std::thread;
use std::time::{Duration, Instant};

fn listener(family: SocketFamily) -> (Socket, SocketAddress) {
    let mut server = Socket::new(family, SocketType::Stream, SocketProtocol::Tcp).unwrap();
    server
        .bind(&SocketAddress::loopback(family, 0).unwrap(), true)
        .unwrap();
    server.listen().unwrap();
    let addr = server.local_address().unwrap();
    (server, addr)
}

#[test]
fn test_stream_exchange_over_loopback() {
    let (server, addr) = listener(SocketFamily::Inet);
    assert!(addr.is_loopback());
    assert_ne!(addr.port(), 0);

    let client_thread = thread::spawn(move || {
        let mut client = Socket::new(SocketFamily::Inet, SocketType::Stream, SocketProtocol::Tcp).unwrap();
        client.set_timeout(5_000);
        client.connect(&addr).unwrap();
        assert_eq!(client.send(b"hello").unwrap(), 5);

        let mut buf = [0u8; 16];
        let len = client.receive(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"world");
        client.local_address().unwrap()
    });

    let child = server.accept().unwrap();
    let mut buf = [0u8; 16];
    let len = child.receive(&mut buf).unwrap();
    assert_eq!(&buf[..len], b"hello");
    child.send(b"world").unwrap();

    let client_addr = client_thread.join().unwrap();
    assert_eq!(child.remote_address().unwrap().port(), client_addr.port());
}

#[test]
fn test_stream_exchange_over_ipv6() {
    let mut server = match Socket::new(SocketFamily::Inet6, SocketType::Stream, SocketProtocol::Tcp) {
        Ok(sock) => sock,
        Err(_) => return,
    };
    // hosts without an IPv6 loopback are skipped
    if server
        .bind(&SocketAddress::loopback(SocketFamily::Inet6, 0).unwrap(), true)
        .is_err()
    {
        return;
    }
    server.listen().unwrap();
    let addr = server.local_address().unwrap();
    assert_eq!(addr.family(), SocketFamily::Inet6);

    let mut client = Socket::new(SocketFamily::Inet6, SocketType::Stream, SocketProtocol::Tcp).unwrap();
    client.connect(&addr).unwrap();
    let child = server.accept().unwrap();
    assert_eq!(child.family(), SocketFamily::Inet6);
}

#[test]
fn test_receive_after_peer_shutdown_returns_zero() {
    let (server, addr) = listener(SocketFamily::Inet);
    let mut client = Socket::new(SocketFamily::Inet, SocketType::Stream, SocketProtocol::Tcp).unwrap();
    client.connect(&addr).unwrap();
    let child = server.accept().unwrap();

    client.shutdown(false, true).unwrap();
    let mut buf = [0u8; 8];
    assert_eq!(child.receive(&mut buf).unwrap(), 0);
}

#[test]
fn test_receive_after_full_shutdown_returns_zero_on_both_sides() {
    let (server, addr) = listener(SocketFamily::Inet);
    let mut client = Socket::new(SocketFamily::Inet, SocketType::Stream, SocketProtocol::Tcp).unwrap();
    client.connect(&addr).unwrap();
    let child = server.accept().unwrap();

    client.shutdown(true, true).unwrap();
    assert!(!client.is_connected());
    assert!(!client.is_closed());

    let mut buf = [0u8; 8];
    assert_eq!(child.receive(&mut buf).unwrap(), 0);
    assert_eq!(client.receive(&mut buf).unwrap(), 0);
}

#[test]
fn test_receive_timeout() {
    let (server, addr) = listener(SocketFamily::Inet);
    let mut client = Socket::new(SocketFamily::Inet, SocketType::Stream, SocketProtocol::Tcp).unwrap();
    client.connect(&addr).unwrap();
    let _child = server.accept().unwrap();

    client.set_timeout(100);
    let started = Instant::now();
    let mut buf = [0u8; 8];
    let err = client.receive(&mut buf).unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err.kind(), ErrorKind::TimedOut);
    assert!(elapsed >= Duration::from_millis(90), "returned too early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(5));
    assert!(!client.is_closed());
}

#[test]
fn test_errors_are_mirrored() {
    let mut sock = Socket::new(SocketFamily::Inet, SocketType::Stream, SocketProtocol::Tcp).unwrap();
    sock.close().unwrap();
    let err = sock.listen().unwrap_err();

    // the mirror is process-wide, so other tests may overwrite it; only check
    // that something was recorded
    assert!(last_error().is_some());
    assert!(last_message().is_some());
    assert_eq!(err.kind(), ErrorKind::NotAvailable);
}

#[test]
fn test_double_close_and_free() {
    let mut sock = Socket::new(SocketFamily::Inet, SocketType::Datagram, SocketProtocol::Udp).unwrap();
    assert!(sock.close().is_ok());
    assert!(sock.close().is_ok());
    sock.free();

    let open = Socket::new(SocketFamily::Inet, SocketType::Datagram, SocketProtocol::Udp).unwrap();
    open.free();
}

#[test]
fn test_datagram_round_trip() {
    let receiver = UdpSocket::new(SocketFamily::Inet).unwrap();
    receiver
        .bind(&SocketAddress::loopback(SocketFamily::Inet, 0).unwrap(), true)
        .unwrap();
    let target = receiver.local_addr().unwrap();

    let sender = UdpSocket::new(SocketFamily::Inet).unwrap();
    sender.send_to(b"payload", &target).unwrap();

    let mut buf = [0u8; 64];
    let (len, from) = receiver.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..len], b"payload");
    let from = from.unwrap();
    assert!(from.is_loopback());
    assert_eq!(from.port(), sender.local_addr().unwrap().port());
}

#[test]
fn test_tcp_wrapper_echo() {
    use std::io::{Read, Write};

    let mut listener = TcpSocket::new(SocketFamily::Inet).unwrap();
    listener
        .bind(&SocketAddress::loopback(SocketFamily::Inet, 0).unwrap())
        .unwrap();
    listener.listen(8).unwrap();
    let target = listener.local_addr().unwrap();

    let echo = thread::spawn(move || {
        let (mut conn, _) = listener.accept().unwrap();
        let mut buf = [0u8; 5];
        conn.read_exact(&mut buf).unwrap();
        conn.write_all(&buf).unwrap();
    });

    let mut client = TcpSocket::new(SocketFamily::Inet).unwrap();
    client.set_timeout(5_000);
    client.connect(&target).unwrap();
    client.write_all(b"12345").unwrap();
    let mut buf = [0u8; 5];
    client.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"12345");
    echo.join().unwrap();
}

#[cfg(unix)]
#[test]
fn test_adopt_connected_descriptor() {
    use std::net::{TcpListener, TcpStream};
    use std::os::unix::io::IntoRawFd;

    let std_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let stream = TcpStream::connect(std_listener.local_addr().unwrap()).unwrap();
    let (_peer, _) = std_listener.accept().unwrap();

    let sock = unsafe { Socket::from_descriptor(stream.into_raw_fd()) }.unwrap();
    assert_eq!(sock.family(), SocketFamily::Inet);
    assert_eq!(sock.socket_type(), SocketType::Stream);
    assert_eq!(sock.protocol(), SocketProtocol::Tcp);
    assert!(sock.is_connected());
    assert!(sock.is_blocking());
    assert_eq!(sock.listen_backlog(), DEFAULT_BACKLOG);
}

#[cfg(unix)]
#[test]
fn test_adopt_rejects_bad_descriptor() {
    let err = unsafe { Socket::from_descriptor(-1) }.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.message(), "Unable to create socket from bad fd");
}
