//! # speedtest-backend
//!
//! A backend for the [LibreSpeed](https://github.com/librespeed/speedtest)
//! browser speed test. The client measures latency, upload and download
//! throughput against three fixed endpoints and asks for its own public
//! address:
//!
//! | Path | Answer |
//! |---|---|
//! | `/backend/empty.php` | `200`, empty body (ping, upload sink) |
//! | `/backend/garbage.php?ckSize=N` | `N × 4` MiB of random bytes (default 4 MiB) |
//! | `/backend/getIP.php` | `{"processedString": "<ip>", "rawIspInfo": ""}` |
//!
//! Every answer carries the same permissive CORS and no-cache headers, and
//! every endpoint answers `OPTIONS` preflights with those headers alone.
//!
//! What a reverse proxy already owns is left to it: TLS, rate limiting,
//! authentication.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use speedtest_backend::{Server, speedtest, speedtest::garbage::ChunkLimit};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), speedtest_backend::Error> {
//!     let app = speedtest::routes(ChunkLimit::default());
//!     Server::bind("0.0.0.0:8080".parse().unwrap()).await?.serve(app).await
//! }
//! ```

mod body;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod config;
pub mod middleware;
pub mod speedtest;

pub use body::Body;
pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use request::{BoxError, Request};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
