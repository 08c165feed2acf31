//! Incoming HTTP request type.

use std::net::SocketAddr;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;

/// Boxed error produced by a request body stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type RequestBody = UnsyncBoxBody<Bytes, BoxError>;

/// An incoming HTTP request.
///
/// The body is left unread: handlers decide whether to drain it
/// ([`discard_body`](Request::discard_body)) or drop it.
pub struct Request {
    parts: http::request::Parts,
    body: RequestBody,
    remote_addr: SocketAddr,
}

impl Request {
    /// Wraps any `http::Request` whose body yields [`Bytes`].
    ///
    /// The server calls this with hyper's `Incoming`; tests call it with
    /// `http_body_util::Full` or `Empty`.
    pub fn from_http<B>(req: http::Request<B>, remote_addr: SocketAddr) -> Self
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        Self {
            parts,
            body: body.map_err(Into::<BoxError>::into).boxed_unsync(),
            remote_addr,
        }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }

    /// Address of the TCP peer. Behind a proxy this is the proxy.
    pub fn remote_addr(&self) -> SocketAddr { self.remote_addr }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name)?.to_str().ok()
    }

    /// First value of query parameter `key`, percent-decoded.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.parts.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Reads the body to the end without keeping it and returns its length.
    ///
    /// Frames are dropped as they arrive, so memory use is bounded by one
    /// frame regardless of upload size.
    pub async fn discard_body(self) -> Result<u64, BoxError> {
        let mut body = self.body;
        let mut total = 0u64;
        while let Some(frame) = body.frame().await {
            if let Ok(data) = frame?.into_data() {
                total += data.len() as u64;
            }
        }
        Ok(total)
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("remote_addr", &self.remote_addr)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{Empty, Full};

    fn peer() -> SocketAddr {
        "192.0.2.1:54321".parse().unwrap()
    }

    #[test]
    fn query_returns_first_decoded_value() {
        let req = http::Request::get("/backend/garbage.php?ckSize=2&ckSize=9&x=a%20b")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let req = Request::from_http(req, peer());
        assert_eq!(req.query("ckSize").as_deref(), Some("2"));
        assert_eq!(req.query("x").as_deref(), Some("a b"));
        assert_eq!(req.query("chunks"), None);
        assert_eq!(req.path(), "/backend/garbage.php");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = http::Request::get("/")
            .header("X-Forwarded-For", "203.0.113.5")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let req = Request::from_http(req, peer());
        assert_eq!(req.header("x-forwarded-for"), Some("203.0.113.5"));
        assert_eq!(req.header("X-FORWARDED-FOR"), Some("203.0.113.5"));
        assert_eq!(req.remote_addr(), peer());
    }

    #[tokio::test]
    async fn discard_body_counts_bytes() {
        let req = http::Request::post("/backend/empty.php")
            .body(Full::new(Bytes::from(vec![7u8; 4096])))
            .unwrap();
        let n = Request::from_http(req, peer()).discard_body().await.unwrap();
        assert_eq!(n, 4096);
    }
}
