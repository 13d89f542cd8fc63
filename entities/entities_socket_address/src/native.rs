//! Native sockaddr marshaling
//!
//! Byte-exact conversion between [`Endpoint`] and the platform's
//! `sockaddr_in` / `sockaddr_in6` layouts. Callers check buffer sizes; the
//! functions here only copy structures in and out.

use crate::address::Endpoint;
use std::{mem, ptr};

#[cfg(unix)]
mod sys {
    pub(crate) type Storage = libc::sockaddr_storage;
    pub(crate) type V4 = libc::sockaddr_in;
    pub(crate) type V6 = libc::sockaddr_in6;

    pub(crate) const AF_INET: i32 = libc::AF_INET;
    pub(crate) const AF_INET6: i32 = libc::AF_INET6;

    pub(crate) fn storage_family(storage: &Storage) -> i32 {
        storage.ss_family as i32
    }

    pub(crate) fn write_v4(sin: &mut V4, ip: [u8; 4], port: u16) {
        sin.sin_family = libc::AF_INET as libc::sa_family_t;
        sin.sin_port = port.to_be();
        sin.sin_addr.s_addr = u32::from_ne_bytes(ip);
        #[cfg(any(
            target_vendor = "apple",
            target_os = "freebsd",
            target_os = "dragonfly",
            target_os = "openbsd",
            target_os = "netbsd"
        ))]
        {
            sin.sin_len = std::mem::size_of::<V4>() as u8;
        }
    }

    pub(crate) fn write_v6(sin6: &mut V6, ip: [u8; 16], port: u16, flow_info: u32, scope_id: u32) {
        sin6.sin6_family = libc::AF_INET6 as libc::sa_family_t;
        sin6.sin6_port = port.to_be();
        sin6.sin6_flowinfo = flow_info;
        sin6.sin6_addr.s6_addr = ip;
        sin6.sin6_scope_id = scope_id;
        #[cfg(any(
            target_vendor = "apple",
            target_os = "freebsd",
            target_os = "dragonfly",
            target_os = "openbsd",
            target_os = "netbsd"
        ))]
        {
            sin6.sin6_len = std::mem::size_of::<V6>() as u8;
        }
    }

    pub(crate) fn read_v4(sin: &V4) -> ([u8; 4], u16) {
        (sin.sin_addr.s_addr.to_ne_bytes(), u16::from_be(sin.sin_port))
    }

    pub(crate) fn read_v6(sin6: &V6) -> ([u8; 16], u16, u32, u32) {
        (
            sin6.sin6_addr.s6_addr,
            u16::from_be(sin6.sin6_port),
            sin6.sin6_flowinfo,
            sin6.sin6_scope_id,
        )
    }
}

#[cfg(windows)]
mod sys {
    use windows_sys::Win32::Networking::WinSock as ws;

    pub(crate) type Storage = ws::SOCKADDR_STORAGE;
    pub(crate) type V4 = ws::SOCKADDR_IN;
    pub(crate) type V6 = ws::SOCKADDR_IN6;

    pub(crate) const AF_INET: i32 = ws::AF_INET as i32;
    pub(crate) const AF_INET6: i32 = ws::AF_INET6 as i32;

    pub(crate) fn storage_family(storage: &Storage) -> i32 {
        storage.ss_family as i32
    }

    pub(crate) fn write_v4(sin: &mut V4, ip: [u8; 4], port: u16) {
        sin.sin_family = ws::AF_INET;
        sin.sin_port = port.to_be();
        sin.sin_addr.S_un.S_addr = u32::from_ne_bytes(ip);
    }

    pub(crate) fn write_v6(sin6: &mut V6, ip: [u8; 16], port: u16, flow_info: u32, scope_id: u32) {
        sin6.sin6_family = ws::AF_INET6;
        sin6.sin6_port = port.to_be();
        sin6.sin6_flowinfo = flow_info;
        sin6.sin6_addr.u.Byte = ip;
        sin6.Anonymous.sin6_scope_id = scope_id;
    }

    pub(crate) fn read_v4(sin: &V4) -> ([u8; 4], u16) {
        // SAFETY: every view of the IN_ADDR union covers the same 4 bytes.
        let raw = unsafe { sin.sin_addr.S_un.S_addr };
        (raw.to_ne_bytes(), u16::from_be(sin.sin_port))
    }

    pub(crate) fn read_v6(sin6: &V6) -> ([u8; 16], u16, u32, u32) {
        // SAFETY: both unions are plain integer views of the same storage.
        let (ip, scope_id) = unsafe { (sin6.sin6_addr.u.Byte, sin6.Anonymous.sin6_scope_id) };
        (ip, u16::from_be(sin6.sin6_port), sin6.sin6_flowinfo, scope_id)
    }
}

pub(crate) const AF_INET: i32 = sys::AF_INET;
pub(crate) const AF_INET6: i32 = sys::AF_INET6;

/// Size of the native IPv4 structure
pub const SIZE_INET: usize = mem::size_of::<sys::V4>();
/// Size of the native IPv6 structure
pub const SIZE_INET6: usize = mem::size_of::<sys::V6>();

/// Outcome of decoding a native buffer
pub(crate) enum Decoded {
    Endpoint(Endpoint),
    Truncated { family: i32, needed: usize },
    UnknownFamily(i32),
}

/// Copy `value` byte-for-byte to the front of `dest`
fn put<T>(value: &T, dest: &mut [u8]) -> usize {
    let size = mem::size_of::<T>();
    debug_assert!(dest.len() >= size);
    // SAFETY: `T` is a plain C struct, `dest` holds at least `size` bytes.
    unsafe {
        ptr::copy_nonoverlapping((value as *const T).cast::<u8>(), dest.as_mut_ptr(), size);
    }
    size
}

/// Write `endpoint` as a native structure; `dest` must be at least the
/// endpoint's native size and already zeroed.
pub(crate) fn encode(endpoint: &Endpoint, dest: &mut [u8]) -> usize {
    match *endpoint {
        Endpoint::V4 { ip, port } => {
            // SAFETY: all-zero is a valid sockaddr_in.
            let mut sin: sys::V4 = unsafe { mem::zeroed() };
            sys::write_v4(&mut sin, ip, port);
            put(&sin, dest)
        }
        Endpoint::V6 { ip, port, flow_info, scope_id } => {
            // SAFETY: all-zero is a valid sockaddr_in6.
            let mut sin6: sys::V6 = unsafe { mem::zeroed() };
            sys::write_v6(&mut sin6, ip, port, flow_info, scope_id);
            put(&sin6, dest)
        }
    }
}

/// Decode a native buffer of arbitrary length
pub(crate) fn decode(bytes: &[u8]) -> Decoded {
    // SAFETY: all-zero is a valid sockaddr_storage.
    let mut storage: sys::Storage = unsafe { mem::zeroed() };
    let copied = bytes.len().min(mem::size_of::<sys::Storage>());
    // SAFETY: `copied` fits both the source slice and the storage.
    unsafe {
        ptr::copy_nonoverlapping(
            bytes.as_ptr(),
            (&mut storage as *mut sys::Storage).cast::<u8>(),
            copied,
        );
    }

    let family = sys::storage_family(&storage);
    let base = &storage as *const sys::Storage;
    if family == AF_INET {
        if bytes.len() < SIZE_INET {
            return Decoded::Truncated { family, needed: SIZE_INET };
        }
        // SAFETY: storage is large and aligned enough for any sockaddr.
        let sin = unsafe { ptr::read(base.cast::<sys::V4>()) };
        let (ip, port) = sys::read_v4(&sin);
        Decoded::Endpoint(Endpoint::V4 { ip, port })
    } else if family == AF_INET6 {
        if bytes.len() < SIZE_INET6 {
            return Decoded::Truncated { family, needed: SIZE_INET6 };
        }
        // SAFETY: as above.
        let sin6 = unsafe { ptr::read(base.cast::<sys::V6>()) };
        let (ip, port, flow_info, scope_id) = sys::read_v6(&sin6);
        Decoded::Endpoint(Endpoint::V6 { ip, port, flow_info, scope_id })
    } else {
        Decoded::UnknownFamily(family)
    }
}
