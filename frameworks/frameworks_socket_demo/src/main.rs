//! Socket Demonstration Binary Entry Point
//!
//! `sockdemo serve` runs the HTTP responder, `sockdemo fetch` the client.

use std::io::Write;
use std::process;

use api_facades::{close_once, init_once, SocketAddress, SocketFamily};
use clap::Parser;
use frameworks_socket_demo::{bind_server, fetch, serve, Command, DemoArgs};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = DemoArgs::parse();

    if let Err(e) = init_once() {
        error!(error = %e, "failed to initialize");
        process::exit(1);
    }

    let code = match args.command {
        Command::Serve {
            port,
            family,
            once,
            timeout_ms,
        } => run_serve(family.into(), port, once, timeout_ms),
        Command::Fetch {
            host,
            port,
            timeout_ms,
            request,
        } => run_fetch(&host, port, timeout_ms, request),
    };

    close_once();
    process::exit(code);
}

fn run_serve(family: SocketFamily, port: u16, once: bool, timeout_ms: u32) -> i32 {
    let server = match bind_server(family, port) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "failed to start server");
            return 1;
        }
    };
    info!(port, ?family, "serving http");

    match serve(&server, once, timeout_ms) {
        Ok(()) => 0,
        Err(e) => {
            error!(error = %e, "accept failed");
            1
        }
    }
}

fn run_fetch(host: &str, port: u16, timeout_ms: u32, request: Option<String>) -> i32 {
    let address = match SocketAddress::parse(host, port) {
        Ok(address) => address,
        Err(e) => {
            error!(error = %e, host, "invalid host address");
            return 2;
        }
    };

    // request lines are sent with an HTTP-style blank line terminator
    let request = request.map(|line| format!("{}\r\n\r\n", line));
    match fetch(&address, timeout_ms, request.as_deref().map(str::as_bytes)) {
        Ok(data) => {
            let mut stdout = std::io::stdout().lock();
            if stdout.write_all(&data).and_then(|_| stdout.flush()).is_err() {
                return 1;
            }
            0
        }
        Err(e) => {
            error!(error = %e, %address, "fetch failed");
            1
        }
    }
}
