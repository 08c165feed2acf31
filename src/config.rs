//! Command-line and environment configuration.
//!
//! Every flag can also be set through the environment, so the binary runs
//! unchanged under a container platform that only injects `PORT`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

use crate::speedtest::garbage::ChunkLimit;

/// Default listening port when neither `--port` nor `PORT` is given.
pub const DEFAULT_PORT: u16 = 8080;

/// Resolved server configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "speedtest-backend")]
#[command(version)]
#[command(about = "LibreSpeed-compatible speed-test backend", long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Largest `ckSize` (in MiB) the download endpoint will honour
    #[arg(
        long,
        env = "MAX_CHUNK_MB",
        default_value_t = ChunkLimit::DEFAULT_MAX_MB,
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub max_chunk_mb: u64,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn chunk_limit(&self) -> ChunkLimit {
        ChunkLimit::new(self.max_chunk_mb)
    }
}
