//! Command-Line Argument Parsing Module

use api_facades::SocketFamily;
use clap::{Parser, Subcommand, ValueEnum};

/// Socket library demonstration programs
#[derive(Parser, Debug)]
#[command(name = "sockdemo")]
#[command(about = "Portable socket demonstration programs")]
pub struct DemoArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Answer every connection with a fixed HTTP response
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 8888)]
        port: u16,

        /// Address family of the listening socket
        #[arg(long, value_enum, default_value_t = FamilyArg::Inet)]
        family: FamilyArg,

        /// Exit after the first client
        #[arg(long)]
        once: bool,

        /// Per-client read timeout in milliseconds (0 waits forever)
        #[arg(long, default_value_t = 5_000)]
        timeout_ms: u32,
    },

    /// Connect to a server and print everything it sends
    Fetch {
        /// Literal IPv4 or IPv6 address of the server
        #[arg(long)]
        host: String,

        /// Server port
        #[arg(long)]
        port: u16,

        /// Connect and read timeout in milliseconds (0 waits forever)
        #[arg(long, default_value_t = 5_000)]
        timeout_ms: u32,

        /// Request line sent after connecting, e.g. "GET / HTTP/1.0"
        #[arg(long)]
        request: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyArg {
    Inet,
    Inet6,
}

impl From<FamilyArg> for SocketFamily {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Inet => SocketFamily::Inet,
            FamilyArg::Inet6 => SocketFamily::Inet6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_defaults() {
        let args = DemoArgs::try_parse_from(["sockdemo", "serve"]).unwrap();
        assert_eq!(
            args.command,
            Command::Serve {
                port: 8888,
                family: FamilyArg::Inet,
                once: false,
                timeout_ms: 5_000,
            }
        );
    }

    #[test]
    fn test_parse_fetch() {
        let args = DemoArgs::try_parse_from([
            "sockdemo", "fetch", "--host", "::1", "--port", "13", "--timeout-ms", "250",
        ])
        .unwrap();
        match args.command {
            Command::Fetch { host, port, timeout_ms, request } => {
                assert_eq!(host, "::1");
                assert_eq!(port, 13);
                assert_eq!(timeout_ms, 250);
                assert!(request.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_fetch_requires_host() {
        assert!(DemoArgs::try_parse_from(["sockdemo", "fetch", "--port", "80"]).is_err());
    }

    #[test]
    fn test_family_conversion() {
        assert_eq!(SocketFamily::from(FamilyArg::Inet6), SocketFamily::Inet6);
        let args = DemoArgs::try_parse_from(["sockdemo", "serve", "--family", "inet6", "--once"]).unwrap();
        assert!(matches!(args.command, Command::Serve { family: FamilyArg::Inet6, once: true, .. }));
    }
}
