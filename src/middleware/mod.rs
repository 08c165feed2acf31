//! Middleware layer.
//!
//! Cross-cutting concerns that wrap every endpoint:
//! - [`cors`]: the cross-origin and no-cache header policy the browser
//!   client relies on, including preflight answers
//! - `trace`: per-request span with method, path, peer, status, latency

pub mod cors;
pub(crate) mod trace;
