//! Last-Error State Module
//!
//! A process-wide mirror of the most recent socket failure. Every operation
//! already returns its error directly; this record exists for callers that
//! inspect failures after the fact (the classic "get last error" pattern).
//!
//! The record is guarded by a mutex and reads never fail: a poisoned lock is
//! recovered because the stored value is always complete.

use crate::error::SocketError;
use crate::kind::ErrorKind;
use std::sync::{Mutex, MutexGuard};

static CURRENT: Mutex<Option<SocketError>> = Mutex::new(None);

fn current() -> MutexGuard<'static, Option<SocketError>> {
    CURRENT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Snapshot of the last recorded failure
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorState {
    pub code: i32,
    pub native_code: i32,
    pub message: Option<String>,
}

/// Store `err` as the most recent failure
pub fn record(err: &SocketError) {
    *current() = Some(err.clone());
}

/// Store a failure from its parts
///
/// # Arguments
///
/// * `kind` - portable classification
/// * `native_code` - raw platform code, 0 if none
/// * `message` - description, `None` for an empty message
pub fn set_error(kind: ErrorKind, native_code: i32, message: Option<&str>) {
    record(&SocketError::with_parts(
        kind,
        native_code,
        message.unwrap_or_default(),
    ));
}

/// The most recent failure, if any
pub fn last_error() -> Option<SocketError> {
    current().clone()
}

/// Numeric code of the most recent failure, 0 when nothing was recorded
pub fn last_code() -> i32 {
    current().as_ref().map_or(0, |e| e.kind().code())
}

/// Native code of the most recent failure, 0 when nothing was recorded
pub fn last_native_code() -> i32 {
    current().as_ref().map_or(0, SocketError::native_code)
}

/// Message of the most recent failure
pub fn last_message() -> Option<String> {
    current()
        .as_ref()
        .map(|e| e.message().to_owned())
        .filter(|m| !m.is_empty())
}

/// Forget the recorded failure
pub fn clear() {
    *current() = None;
}

impl ErrorState {
    /// Capture the current record
    pub fn capture() -> Self {
        match last_error() {
            Some(err) => Self {
                code: err.kind().code(),
                native_code: err.native_code(),
                message: Some(err.message().to_owned()).filter(|m| !m.is_empty()),
            },
            None => Self::default(),
        }
    }
}
