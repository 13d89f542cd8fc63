//! Error Kind Module
//!
//! Portable I/O error classifications. Every platform error number maps to
//! exactly one of these kinds (see [`crate::classify`]).

use std::fmt;

/// Portable classification of an I/O failure
///
/// The discriminants are stable numeric codes (500-522) that callers may log
/// or persist; [`ErrorKind::code`] and [`ErrorKind::from_code`] convert.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorKind {
    /// No error
    #[default]
    None = 500,
    /// Operating system hasn't enough resources
    NoResources = 501,
    /// Resource isn't available
    NotAvailable = 502,
    /// Access denied
    AccessDenied = 503,
    /// Already connected
    Connected = 504,
    /// Operation in progress
    InProgress = 505,
    /// Operation aborted
    Aborted = 506,
    /// Invalid argument specified
    InvalidArgument = 507,
    /// Operation not supported
    NotSupported = 508,
    /// Operation timed out
    TimedOut = 509,
    /// Operation cannot be completed immediately
    WouldBlock = 510,
    /// Address is already under usage
    AddressInUse = 511,
    /// Connection refused
    ConnectionRefused = 512,
    /// Connection required first
    NotConnected = 513,
    /// User quota exceeded
    Quota = 514,
    /// Trying to open directory for writing
    IsDirectory = 515,
    /// Component of the path prefix is not a directory
    NotDirectory = 516,
    /// Specified name is too long
    NameTooLong = 517,
    /// Specified entry already exists
    Exists = 518,
    /// Specified entry doesn't exist
    NotExists = 519,
    /// No more data left
    NoMore = 520,
    /// Operation is not implemented
    NotImplemented = 521,
    /// General error
    Failed = 522,
}

impl ErrorKind {
    /// Every kind, in code order
    pub const ALL: [ErrorKind; 23] = [
        ErrorKind::None,
        ErrorKind::NoResources,
        ErrorKind::NotAvailable,
        ErrorKind::AccessDenied,
        ErrorKind::Connected,
        ErrorKind::InProgress,
        ErrorKind::Aborted,
        ErrorKind::InvalidArgument,
        ErrorKind::NotSupported,
        ErrorKind::TimedOut,
        ErrorKind::WouldBlock,
        ErrorKind::AddressInUse,
        ErrorKind::ConnectionRefused,
        ErrorKind::NotConnected,
        ErrorKind::Quota,
        ErrorKind::IsDirectory,
        ErrorKind::NotDirectory,
        ErrorKind::NameTooLong,
        ErrorKind::Exists,
        ErrorKind::NotExists,
        ErrorKind::NoMore,
        ErrorKind::NotImplemented,
        ErrorKind::Failed,
    ];

    /// Stable numeric code of this kind
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Look up a kind by its numeric code
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.code() == code)
    }

    /// Fixed, locale-independent description of this kind
    pub const fn describe(self) -> &'static str {
        match self {
            ErrorKind::None => "No error.",
            ErrorKind::NoResources => "Operating system hasn't enough resources.",
            ErrorKind::NotAvailable => "Resource isn't available.",
            ErrorKind::AccessDenied => "Access denied.",
            ErrorKind::Connected => "Already connected.",
            ErrorKind::InProgress => "Operation in progress.",
            ErrorKind::Aborted => "Operation aborted.",
            ErrorKind::InvalidArgument => "Invalid argument specified.",
            ErrorKind::NotSupported => "Operation not supported.",
            ErrorKind::TimedOut => "Operation timed out.",
            ErrorKind::WouldBlock => "Operation cannot be completed immediately.",
            ErrorKind::AddressInUse => "Address is already under usage.",
            ErrorKind::ConnectionRefused => "Connection refused.",
            ErrorKind::NotConnected => "Connection required first.",
            ErrorKind::Quota => "User quota exceeded.",
            ErrorKind::IsDirectory => "Trying to open directory for writing.",
            ErrorKind::NotDirectory => "Component of the path prefix is not a directory.",
            ErrorKind::NameTooLong => "Specified name is too long.",
            ErrorKind::Exists => "Specified entry already exists.",
            ErrorKind::NotExists => "Specified entry doesn't exist.",
            ErrorKind::NoMore => "No more data left.",
            ErrorKind::NotImplemented => "Operation is not implemented.",
            ErrorKind::Failed => "General error.",
        }
    }

    /// Whether a blocking caller may retry after waiting for readiness
    pub const fn is_transient(self) -> bool {
        matches!(self, ErrorKind::WouldBlock | ErrorKind::InProgress)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_contiguous() {
        for (offset, kind) in ErrorKind::ALL.iter().enumerate() {
            assert_eq!(kind.code(), 500 + offset as i32);
        }
    }

    #[test]
    fn test_from_code_roundtrip() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ErrorKind::from_code(499), None);
        assert_eq!(ErrorKind::from_code(523), None);
    }

    #[test]
    fn test_descriptions_unique_and_non_empty() {
        let mut seen = HashSet::new();
        for kind in ErrorKind::ALL {
            let text = kind.describe();
            assert!(!text.is_empty());
            assert!(seen.insert(text), "duplicate description for {:?}", kind);
        }
    }

    #[test]
    fn test_display_uses_description() {
        assert_eq!(ErrorKind::TimedOut.to_string(), "Operation timed out.");
        assert_eq!(ErrorKind::default(), ErrorKind::None);
    }

    #[test]
    fn test_transient_kinds() {
        assert!(ErrorKind::WouldBlock.is_transient());
        assert!(ErrorKind::InProgress.is_transient());
        assert!(!ErrorKind::TimedOut.is_transient());
    }
}
