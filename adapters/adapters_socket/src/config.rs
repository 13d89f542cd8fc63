//! Socket Configuration Module
//!
//! The logical flags layered over every socket's always-non-blocking
//! descriptor, bundled so they can be applied at creation time.

/// Backlog applied to new sockets until changed
pub const DEFAULT_BACKLOG: i32 = 5;

/// Logical socket settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketConfig {
    /// Emulate blocking I/O through readiness waits
    pub blocking: bool,
    /// Readiness wait timeout in milliseconds, 0 waits indefinitely
    pub timeout_ms: u32,
    /// Pending-connection queue length passed to `listen`
    pub listen_backlog: i32,
    /// `SO_KEEPALIVE`
    pub keepalive: bool,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            blocking: true,
            timeout_ms: 0,
            listen_backlog: DEFAULT_BACKLOG,
            keepalive: false,
        }
    }
}

impl SocketConfig {
    /// Non-blocking variant of the defaults
    pub fn non_blocking() -> Self {
        Self {
            blocking: false,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_backlog(mut self, backlog: i32) -> Self {
        self.listen_backlog = backlog;
        self
    }

    pub fn with_keepalive(mut self, keepalive: bool) -> Self {
        self.keepalive = keepalive;
        self
    }
}
