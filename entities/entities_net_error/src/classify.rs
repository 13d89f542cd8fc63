//! Classification Module
//!
//! Maps platform error numbers onto [`ErrorKind`] and gives access to the OS
//! last-error slot (errno on Unix, `WSAGetLastError` on Windows).
//!
//! The mapping is pure and total: zero is [`ErrorKind::None`], every unknown
//! code is [`ErrorKind::Failed`]. Aliased constants (EAGAIN/EWOULDBLOCK,
//! ENOTSUP/EOPNOTSUPP) are matched with guards so platforms where they share a
//! value and platforms where they differ both classify correctly.

use crate::kind::ErrorKind;

/// Classify a native platform error number
pub fn classify(native: i32) -> ErrorKind {
    if native == 0 {
        return ErrorKind::None;
    }
    sys::classify(native)
}

/// Read the OS last-error slot used by socket calls
pub fn last_platform_error() -> i32 {
    sys::last_error()
}

/// Overwrite the OS last-error slot used by socket calls
pub fn set_last_platform_error(code: i32) {
    sys::set_last_error(code)
}

/// Classify whatever the OS last-error slot currently holds
pub fn last_io_kind() -> ErrorKind {
    classify(last_platform_error())
}

/// Whether `native` reports a call interrupted by a signal
pub fn is_interrupted(native: i32) -> bool {
    native == sys::INTERRUPTED
}

#[cfg(unix)]
mod sys {
    use crate::kind::ErrorKind;

    pub(super) const INTERRUPTED: i32 = libc::EINTR;

    pub(super) fn classify(e: i32) -> ErrorKind {
        match e {
            e if e == libc::EACCES || e == libc::EPERM => ErrorKind::AccessDenied,
            e if e == libc::ENOMEM
                || e == libc::ENOBUFS
                || e == libc::ENFILE
                || e == libc::ENOSPC
                || e == libc::EMFILE =>
            {
                ErrorKind::NoResources
            }
            #[cfg(any(target_os = "linux", target_os = "android", target_vendor = "apple"))]
            e if e == libc::ENOSR => ErrorKind::NoResources,
            e if e == libc::EINVAL
                || e == libc::EBADF
                || e == libc::ENOTSOCK
                || e == libc::EFAULT
                || e == libc::EPROTOTYPE =>
            {
                ErrorKind::InvalidArgument
            }
            e if e == libc::ENOTSUP
                || e == libc::EOPNOTSUPP
                || e == libc::ENOPROTOOPT
                || e == libc::EPROTONOSUPPORT
                || e == libc::EAFNOSUPPORT =>
            {
                ErrorKind::NotSupported
            }
            e if e == libc::EADDRNOTAVAIL
                || e == libc::ENETUNREACH
                || e == libc::ENETDOWN
                || e == libc::EHOSTDOWN
                || e == libc::EHOSTUNREACH =>
            {
                ErrorKind::NotAvailable
            }
            #[cfg(any(target_os = "linux", target_os = "android"))]
            e if e == libc::ENONET => ErrorKind::NotAvailable,
            e if e == libc::EINPROGRESS || e == libc::EALREADY => ErrorKind::InProgress,
            e if e == libc::EISCONN => ErrorKind::Connected,
            e if e == libc::ECONNREFUSED => ErrorKind::ConnectionRefused,
            e if e == libc::ENOTCONN => ErrorKind::NotConnected,
            e if e == libc::ECONNABORTED => ErrorKind::Aborted,
            e if e == libc::EADDRINUSE => ErrorKind::AddressInUse,
            e if e == libc::ETIMEDOUT => ErrorKind::TimedOut,
            e if e == libc::EDQUOT => ErrorKind::Quota,
            e if e == libc::EISDIR => ErrorKind::IsDirectory,
            e if e == libc::ENOTDIR => ErrorKind::NotDirectory,
            e if e == libc::EEXIST => ErrorKind::Exists,
            e if e == libc::ENOENT => ErrorKind::NotExists,
            e if e == libc::ENAMETOOLONG => ErrorKind::NameTooLong,
            e if e == libc::ENOSYS => ErrorKind::NotImplemented,
            e if e == libc::EAGAIN || e == libc::EWOULDBLOCK => ErrorKind::WouldBlock,
            _ => ErrorKind::Failed,
        }
    }

    pub(super) fn last_error() -> i32 {
        std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
    }

    pub(super) fn set_last_error(code: i32) {
        // SAFETY: the errno location is thread-local and always valid for writes.
        unsafe {
            *errno_location() = code;
        }
    }

    #[cfg(any(target_os = "linux", target_os = "emscripten", target_os = "fuchsia"))]
    unsafe fn errno_location() -> *mut libc::c_int {
        libc::__errno_location()
    }

    #[cfg(any(target_os = "android", target_os = "netbsd", target_os = "openbsd"))]
    unsafe fn errno_location() -> *mut libc::c_int {
        libc::__errno()
    }

    #[cfg(any(target_vendor = "apple", target_os = "freebsd", target_os = "dragonfly"))]
    unsafe fn errno_location() -> *mut libc::c_int {
        libc::__error()
    }

    #[cfg(any(target_os = "solaris", target_os = "illumos"))]
    unsafe fn errno_location() -> *mut libc::c_int {
        libc::___errno()
    }
}

#[cfg(windows)]
mod sys {
    use crate::kind::ErrorKind;
    use windows_sys::Win32::Foundation as win;
    use windows_sys::Win32::Networking::WinSock as ws;

    pub(super) const INTERRUPTED: i32 = ws::WSAEINTR;

    pub(super) fn classify(e: i32) -> ErrorKind {
        match e {
            e if e == ws::WSAEADDRINUSE => ErrorKind::AddressInUse,
            e if e == ws::WSAEWOULDBLOCK => ErrorKind::WouldBlock,
            e if e == ws::WSAEACCES || e == win::ERROR_ACCESS_DENIED as i32 => ErrorKind::AccessDenied,
            e if e == ws::WSA_INVALID_HANDLE
                || e == ws::WSA_INVALID_PARAMETER
                || e == ws::WSAEBADF
                || e == ws::WSAENOTSOCK
                || e == ws::WSAEINVAL
                || e == ws::WSAEFAULT
                || e == ws::WSAEPROTOTYPE
                || e == win::ERROR_INVALID_HANDLE as i32
                || e == win::ERROR_INVALID_PARAMETER as i32 =>
            {
                ErrorKind::InvalidArgument
            }
            e if e == ws::WSAESOCKTNOSUPPORT
                || e == ws::WSAEOPNOTSUPP
                || e == ws::WSAEPFNOSUPPORT
                || e == ws::WSAEAFNOSUPPORT
                || e == ws::WSAEPROTONOSUPPORT
                || e == ws::WSAENOPROTOOPT
                || e == win::ERROR_NOT_SUPPORTED as i32 =>
            {
                ErrorKind::NotSupported
            }
            e if e == ws::WSAECANCELLED || e == ws::WSAECONNABORTED => ErrorKind::Aborted,
            e if e == ws::WSAEADDRNOTAVAIL
                || e == ws::WSAENETUNREACH
                || e == ws::WSAENETDOWN
                || e == ws::WSAEHOSTDOWN
                || e == ws::WSAEHOSTUNREACH =>
            {
                ErrorKind::NotAvailable
            }
            e if e == ws::WSAEINPROGRESS || e == ws::WSAEALREADY => ErrorKind::InProgress,
            e if e == ws::WSAEISCONN => ErrorKind::Connected,
            e if e == ws::WSAECONNREFUSED => ErrorKind::ConnectionRefused,
            e if e == ws::WSAENOTCONN => ErrorKind::NotConnected,
            e if e == ws::WSAETIMEDOUT => ErrorKind::TimedOut,
            e if e == ws::WSAEDQUOT => ErrorKind::Quota,
            e if e == ws::WSAENAMETOOLONG => ErrorKind::NameTooLong,
            e if e == ws::WSAENOBUFS
                || e == ws::WSAEMFILE
                || e == ws::WSA_NOT_ENOUGH_MEMORY
                || e == win::ERROR_OUTOFMEMORY as i32
                || e == win::ERROR_NOT_ENOUGH_MEMORY as i32 =>
            {
                ErrorKind::NoResources
            }
            e if e == win::ERROR_ALREADY_EXISTS as i32 => ErrorKind::Exists,
            e if e == win::ERROR_FILE_NOT_FOUND as i32 => ErrorKind::NotExists,
            e if e == win::ERROR_NO_MORE_FILES as i32 => ErrorKind::NoMore,
            _ => ErrorKind::Failed,
        }
    }

    pub(super) fn last_error() -> i32 {
        // SAFETY: plain FFI getter without arguments.
        unsafe { ws::WSAGetLastError() }
    }

    pub(super) fn set_last_error(code: i32) {
        // SAFETY: plain FFI setter.
        unsafe { ws::WSASetLastError(code) }
    }
}
