//! Platform glue for the socket handle
//!
//! Raw descriptor access, the checked close, send flags, and conversion
//! between [`SocketAddress`] and `socket2::SockAddr`.

use adapters_readiness::RawDescriptor;
use entities_net_error::{Result, SocketError};
use entities_socket_address::SocketAddress;
use socket2::{SockAddr, Socket as Socket2};
use std::mem::{self, MaybeUninit};
use std::{io, slice};

/// Flags for every send call; suppresses SIGPIPE where the platform can
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "solaris",
    target_os = "illumos"
))]
pub(crate) const SEND_FLAGS: i32 = libc::MSG_NOSIGNAL;
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "solaris",
    target_os = "illumos"
)))]
pub(crate) const SEND_FLAGS: i32 = 0;

#[cfg(unix)]
pub(crate) fn raw(sock: &Socket2) -> RawDescriptor {
    use std::os::unix::io::AsRawFd;
    sock.as_raw_fd()
}

#[cfg(windows)]
pub(crate) fn raw(sock: &Socket2) -> RawDescriptor {
    use std::os::windows::io::AsRawSocket;
    sock.as_raw_socket()
}

#[cfg(unix)]
pub(crate) fn is_invalid(fd: RawDescriptor) -> bool {
    fd < 0
}

#[cfg(windows)]
pub(crate) fn is_invalid(fd: RawDescriptor) -> bool {
    fd == windows_sys::Win32::Networking::WinSock::INVALID_SOCKET as RawDescriptor
}

/// Wrap a raw descriptor without any checks
///
/// # Safety
///
/// `fd` must be an open socket the caller owns.
#[cfg(unix)]
pub(crate) unsafe fn adopt(fd: RawDescriptor) -> Socket2 {
    use std::os::unix::io::FromRawFd;
    Socket2::from_raw_fd(fd)
}

/// Wrap a raw descriptor without any checks
///
/// # Safety
///
/// `fd` must be an open socket the caller owns.
#[cfg(windows)]
pub(crate) unsafe fn adopt(fd: RawDescriptor) -> Socket2 {
    use std::os::windows::io::FromRawSocket;
    Socket2::from_raw_socket(fd)
}

/// Release the descriptor and report whether the OS accepted the close
///
/// The descriptor is gone afterwards either way.
pub(crate) fn close(sock: Socket2) -> Result<()> {
    #[cfg(unix)]
    let rc = {
        use std::os::unix::io::IntoRawFd;
        // SAFETY: `into_raw_fd` hands over sole ownership of the open descriptor.
        unsafe { libc::close(sock.into_raw_fd()) }
    };
    #[cfg(windows)]
    let rc = {
        use std::os::windows::io::IntoRawSocket;
        // SAFETY: `into_raw_socket` hands over sole ownership of the open socket.
        unsafe { windows_sys::Win32::Networking::WinSock::closesocket(sock.into_raw_socket() as usize) }
    };

    if rc == 0 {
        Ok(())
    } else {
        Err(SocketError::last_os("Failed to close socket"))
    }
}

/// Build a `SockAddr` from the native form of `address`
pub(crate) fn to_sockaddr(address: &SocketAddress) -> io::Result<SockAddr> {
    // SAFETY: `try_init` passes zeroed storage; we write at most its size and
    // report exactly the number of bytes written.
    let (_, addr) = unsafe {
        SockAddr::try_init(|storage, len| {
            let buf = slice::from_raw_parts_mut(storage.cast::<u8>(), mem::size_of_val(&*storage));
            let written = address
                .to_native(buf)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
            *len = written as _;
            Ok(())
        })
    }?;
    Ok(addr)
}

/// Decode a `SockAddr` returned by the OS
pub(crate) fn from_sockaddr(addr: &SockAddr) -> Option<SocketAddress> {
    // SAFETY: `as_ptr` points at storage with at least `len` initialised bytes.
    let bytes = unsafe { slice::from_raw_parts(addr.as_ptr().cast::<u8>(), addr.len() as usize) };
    SocketAddress::from_native(bytes)
}

/// View an initialised buffer as the uninitialised type socket2 reads into
pub(crate) fn as_uninit(buf: &mut [u8]) -> &mut [MaybeUninit<u8>] {
    // SAFETY: same layout; socket2 only ever writes initialised bytes into it.
    unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entities_socket_address::SocketFamily;

    #[test]
    fn test_sockaddr_conversion_roundtrip() {
        let address = SocketAddress::parse("10.9.8.7", 6543).unwrap();
        let native = to_sockaddr(&address).unwrap();
        assert_eq!(native.len() as usize, address.native_size());
        assert_eq!(native.as_socket(), Some(address.to_std()));
        assert_eq!(from_sockaddr(&native), Some(address));
    }

    #[test]
    fn test_sockaddr_conversion_ipv6() {
        let mut address = SocketAddress::loopback(SocketFamily::Inet6, 80).unwrap();
        address.set_scope_id(4);
        let native = to_sockaddr(&address).unwrap();
        assert!(native.is_ipv6());
        assert_eq!(from_sockaddr(&native), Some(address));
    }

    #[test]
    fn test_as_uninit_preserves_length() {
        let mut buf = [1u8; 12];
        assert_eq!(as_uninit(&mut buf).len(), 12);
    }
}
