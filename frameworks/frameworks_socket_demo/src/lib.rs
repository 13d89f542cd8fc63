//! Frameworks Layer: Socket Demonstration Programs
//!
//! Small programs that exercise the socket library end to end.
//!
//! ## Overview
//!
//! - **Server** ([`server`]): fixed-response HTTP responder that drains each
//!   request with non-blocking reads
//! - **Client** ([`client`]): connects, optionally sends a request, and reads
//!   until the peer closes
//! - **Arguments** ([`args`]): `clap` definitions for the `sockdemo` binary
//!
//! ## Architecture
//!
//! Outermost layer. Depends only on `api_facades`.

pub mod args;
pub mod client;
pub mod server;

pub use args::{Command, DemoArgs, FamilyArg};
pub use client::fetch;
pub use server::{bind_server, serve, serve_client, RESPONSE};

use api_facades::{ErrorKind, Interest, Result, Socket};

/// Send all of `buf`, waiting for writability whenever the socket is full
pub(crate) fn send_all(sock: &Socket, mut buf: &[u8]) -> Result<()> {
    while !buf.is_empty() {
        match sock.send(buf) {
            Ok(sent) => buf = &buf[sent..],
            Err(err) if err.kind() == ErrorKind::WouldBlock => sock.io_condition_wait(Interest::Writable)?,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
