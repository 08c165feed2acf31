//! Ping and upload sink.
//!
//! The client times round trips against this endpoint: empty GETs for
//! latency and jitter, large POSTs for upload throughput. The body content is
//! never inspected.

use http::Method;
use tracing::debug;

use crate::request::Request;
use crate::response::Response;

/// `200 OK` with no body once any request body has been fully received.
pub async fn empty(req: Request) -> Response {
    let res = Response::builder().cors();

    if req.method() == Method::OPTIONS {
        return res.no_body();
    }

    if req.method() == Method::POST {
        // The upload measurement ends when the response arrives, so the
        // answer must wait for the last byte.
        match req.discard_body().await {
            Ok(bytes) => debug!(bytes, "upload received"),
            Err(e) => debug!("upload ended early: {e}"),
        }
    }

    res.no_body()
}
