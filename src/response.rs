//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it. Handlers that serve
//! browsers call [`ResponseBuilder::cors`] first so the cross-origin policy
//! is in place before anything endpoint-specific is written.

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};

use crate::body::Body;
use crate::middleware::cors;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content-type values used by the speed-test endpoints.
#[derive(Clone, Copy, Debug)]
pub enum ContentType {
    Json,         // application/json
    OctetStream,  // application/octet-stream  (binary / file download)
}

impl ContentType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use http::StatusCode;
/// use speedtest_backend::Response;
///
/// Response::json(r#"{"ok":true}"#);
/// Response::status(StatusCode::NO_CONTENT);
/// ```
///
/// # Builder (CORS, custom status or headers)
///
/// ```rust
/// use http::StatusCode;
/// use speedtest_backend::{ContentType, Response};
///
/// Response::builder()
///     .cors()
///     .status(StatusCode::BAD_REQUEST)
///     .no_body();
///
/// Response::builder()
///     .repeat(ContentType::OctetStream, vec![0u8; 16].into(), 4);
/// ```
#[derive(Debug)]
pub struct Response {
    inner: http::Response<Body>,
}

impl Response {
    /// `200 OK`: `application/json`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().json(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self::builder().status(code).no_body()
    }

    /// Builder for responses that need CORS, a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    pub fn status_code(&self) -> StatusCode { self.inner.status() }
    pub fn headers(&self) -> &HeaderMap { self.inner.headers() }
    pub fn body(&self) -> &Body { self.inner.body() }

    /// Hands the response to the transport.
    pub fn into_inner(self) -> http::Response<Body> { self.inner }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method, so you always know what you're sending.
#[derive(Debug)]
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Sets `name`, replacing any earlier value.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Applies the cross-origin and no-cache policy. See [`cors::apply`].
    pub fn cors(mut self) -> Self {
        cors::apply(&mut self.headers);
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish(ContentType::Json, Body::full(body))
    }

    /// Terminate with `chunk` written `count` times back to back.
    ///
    /// The chunk is shared between writes, never copied or regenerated.
    pub fn repeat(self, content_type: ContentType, chunk: Bytes, count: usize) -> Response {
        self.finish(content_type, Body::repeat(chunk, count))
    }

    /// Terminate with the framing headers of a `content_length`-byte body
    /// but no body (answers to `HEAD`).
    pub fn head_only(mut self, content_type: ContentType, content_length: u64) -> Response {
        self.headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));
        self.finish(content_type, Body::empty())
    }

    /// Terminate with no body (preflight answers, bare status codes).
    pub fn no_body(self) -> Response {
        self.build(Body::empty())
    }

    fn finish(mut self, content_type: ContentType, body: Body) -> Response {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
        self.build(body)
    }

    fn build(self, body: Body) -> Response {
        let mut inner = http::Response::new(body);
        *inner.status_mut() = self.status;
        *inner.headers_mut() = self.headers;
        Response { inner }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

/// Return a status directly from a handler: `return StatusCode::NOT_FOUND`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
    use hyper::body::Body as _;

    #[test]
    fn builder_sets_status_headers_and_content_type() {
        let res = Response::builder()
            .status(StatusCode::CREATED)
            .header(HeaderName::from_static("x-test"), HeaderValue::from_static("1"))
            .json("{}");
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(res.headers()["x-test"], "1");
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(res.body().size_hint().exact(), Some(2));
    }

    #[test]
    fn cors_headers_survive_the_terminator() {
        let res = Response::builder().cors().no_body();
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(res.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(res.body().remaining(), 0);
    }

    #[test]
    fn repeat_reports_total_length() {
        let res = Response::builder().repeat(ContentType::OctetStream, Bytes::from_static(&[1; 10]), 4);
        assert_eq!(res.body().size_hint().exact(), Some(40));
        assert_eq!(res.headers()[CONTENT_TYPE], "application/octet-stream");
    }

    #[test]
    fn head_only_carries_length_but_no_body() {
        let res = Response::builder().head_only(ContentType::OctetStream, 4096);
        assert_eq!(res.headers()[CONTENT_LENGTH], "4096");
        assert_eq!(res.headers()[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(res.body().remaining(), 0);
    }

    #[test]
    fn status_code_converts_into_empty_response() {
        let res = StatusCode::NOT_FOUND.into_response();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.body().remaining(), 0);
    }
}
