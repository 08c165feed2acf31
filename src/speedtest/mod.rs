//! The three LibreSpeed backend endpoints.
//!
//! | Path | Purpose |
//! |---|---|
//! | [`EMPTY_PATH`] | ping and upload sink |
//! | [`GARBAGE_PATH`] | random download payload |
//! | [`GET_IP_PATH`] | caller's address as JSON |
//!
//! The `.php` suffixes are part of the client protocol: the stock LibreSpeed
//! front-end requests exactly these paths.

pub mod empty;
pub mod garbage;
pub mod ip;

use crate::router::Router;

use self::garbage::ChunkLimit;

pub const EMPTY_PATH: &str = "/backend/empty.php";
pub const GARBAGE_PATH: &str = "/backend/garbage.php";
pub const GET_IP_PATH: &str = "/backend/getIP.php";

/// Builds the router serving all three endpoints.
pub fn routes(limit: ChunkLimit) -> Router {
    Router::new()
        .route(EMPTY_PATH, empty::empty)
        .route(GARBAGE_PATH, move |req| garbage::download(req, limit))
        .route(GET_IP_PATH, ip::get_ip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::cors;
    use crate::request::Request;
    use bytes::Bytes;
    use http::Method;
    use http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CACHE_CONTROL, PRAGMA};
    use http::StatusCode;
    use http_body_util::Empty;
    use hyper::body::Body as _;

    fn options(path: &str) -> Request {
        let req = http::Request::builder()
            .method(Method::OPTIONS)
            .uri(path)
            .header("origin", "https://speed.example")
            .header("access-control-request-method", "POST")
            .body(Empty::<Bytes>::new())
            .unwrap();
        Request::from_http(req, "198.51.100.7:40000".parse().unwrap())
    }

    #[tokio::test]
    async fn preflight_on_every_endpoint_is_empty_with_cors() {
        let router = routes(ChunkLimit::default());
        for path in [EMPTY_PATH, GARBAGE_PATH, GET_IP_PATH] {
            let res = router.call(options(path)).await;
            assert_eq!(res.status_code(), StatusCode::OK, "{path}");
            assert_eq!(res.body().size_hint().exact(), Some(0), "{path}");
            assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*", "{path}");
            assert_eq!(res.headers()[ACCESS_CONTROL_MAX_AGE], "86400", "{path}");
            assert_eq!(res.headers()[CACHE_CONTROL], cors::NO_CACHE, "{path}");
            assert_eq!(res.headers()[PRAGMA], "no-cache", "{path}");
        }
    }
}
