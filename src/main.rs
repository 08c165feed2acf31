//! speedtest-backend: LibreSpeed-compatible speed-test server.
//!
//! Configuration comes from flags or the environment (`PORT`,
//! `MAX_CHUNK_MB`, `LOG_LEVEL`); see `--help`.

use std::process::ExitCode;

use clap::Parser;
use speedtest_backend::{Config, Server, speedtest};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let addr = config.socket_addr();
    info!(
        %addr,
        max_chunk_mb = config.max_chunk_mb,
        "starting speedtest backend"
    );

    let server = match Server::bind(addr).await {
        Ok(server) => server,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let app = speedtest::routes(config.chunk_limit());
    if let Err(e) = server.serve(app).await {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
