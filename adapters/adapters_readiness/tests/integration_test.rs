//! Integration tests for adapters_readiness crate
//!
//! These tests run the platform backend against real loopback sockets.

use adapters_readiness::*;
use entities_net_error::ErrorKind;
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::time::{Duration, Instant};

#[cfg(unix)]
fn raw<T: std::os::unix::io::AsRawFd>(s: &T) -> RawDescriptor {
    s.as_raw_fd()
}

#[cfg(windows)]
fn raw<T: std::os::windows::io::AsRawSocket>(s: &T) -> RawDescriptor {
    s.as_raw_socket()
}

#[test]
fn test_platform_backend_times_out() {
    let backend = platform_backend().unwrap();
    let sock = UdpSocket::bind("127.0.0.1:0").unwrap();

    let started = Instant::now();
    let err = wait_until_ready(&backend, raw(&sock), Interest::Readable, 50).unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err.kind(), ErrorKind::TimedOut);
    assert!(elapsed >= Duration::from_millis(40), "returned too early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(5));
}

#[test]
fn test_listener_becomes_readable_on_connect() {
    let backend = platform_backend().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let _client = TcpStream::connect(addr).unwrap();
    wait_until_ready(&backend, raw(&listener), Interest::Readable, 2_000).unwrap();
    assert!(listener.accept().is_ok());
}

#[test]
fn test_connected_stream_is_writable() {
    let backend = platform_backend().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    wait_until_ready(&backend, raw(&client), Interest::Writable, 0).unwrap();
}
