//! Per-request tracing.

use std::time::Instant;

use tracing::{Instrument, info, info_span};

use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Routes `req` inside a `request` span and records the outcome.
///
/// Latency covers the time until the response head is ready. Streaming the
/// body happens afterwards inside hyper and is not included.
pub(crate) async fn traced(router: &Router, req: Request) -> Response {
    let span = info_span!(
        "request",
        method = %req.method(),
        path = req.path(),
        peer = %req.remote_addr(),
    );
    let started = Instant::now();

    let res = router.call(req).instrument(span.clone()).await;

    span.in_scope(|| {
        info!(
            status = res.status_code().as_u16(),
            latency_us = started.elapsed().as_micros() as u64,
            "served"
        );
    });
    res
}
