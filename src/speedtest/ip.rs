//! Client address echo.
//!
//! Behind a load balancer the TCP peer is the balancer, so the forwarded
//! header wins when present. No ISP or geolocation lookup is done;
//! `rawIspInfo` is always empty.

use http::Method;

use crate::request::Request;
use crate::response::Response;

/// Header a proxy sets to the original client address.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Best-effort public address of the caller.
///
/// The forwarded header is returned verbatim (a comma-separated proxy chain
/// stays a chain). Without it, or when it is empty, the TCP peer is
/// rendered as `ip:port`.
pub fn client_address(req: &Request) -> String {
    match req.header(FORWARDED_FOR) {
        Some(forwarded) if !forwarded.is_empty() => forwarded.to_owned(),
        _ => req.remote_addr().to_string(),
    }
}

/// Renders the LibreSpeed `getIP` payload.
pub fn ip_payload(address: &str) -> String {
    // Serializing through serde_json escapes anything a proxy header could
    // smuggle in (quotes, backslashes, control characters).
    let address = serde_json::Value::from(address);
    format!(r#"{{"processedString": {address}, "rawIspInfo": ""}}"#)
}

/// Handler for the IP endpoint.
pub async fn get_ip(req: Request) -> Response {
    let res = Response::builder().cors();

    if req.method() == Method::OPTIONS {
        return res.no_body();
    }

    res.json(ip_payload(&client_address(&req)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http::header::CONTENT_TYPE;
    use http_body_util::{BodyExt, Empty};

    fn request(forwarded: Option<&str>) -> Request {
        let mut builder = http::Request::get("/backend/getIP.php");
        if let Some(value) = forwarded {
            builder = builder.header("X-Forwarded-For", value);
        }
        let req = builder.body(Empty::<Bytes>::new()).unwrap();
        Request::from_http(req, "198.51.100.23:41000".parse().unwrap())
    }

    async fn body_of(res: Response) -> String {
        let bytes = res.into_inner().into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn forwarded_header_is_echoed() {
        let res = get_ip(request(Some("203.0.113.5"))).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            body_of(res).await,
            r#"{"processedString": "203.0.113.5", "rawIspInfo": ""}"#
        );
    }

    #[tokio::test]
    async fn peer_address_is_the_fallback() {
        let res = get_ip(request(None)).await;
        let body: serde_json::Value = serde_json::from_str(&body_of(res).await).unwrap();
        assert_eq!(body["processedString"], "198.51.100.23:41000");
        assert_eq!(body["rawIspInfo"], "");
    }

    #[test]
    fn empty_forwarded_header_falls_back() {
        assert_eq!(client_address(&request(Some(""))), "198.51.100.23:41000");
    }

    #[test]
    fn proxy_chain_is_kept_verbatim() {
        assert_eq!(
            client_address(&request(Some("203.0.113.5, 10.0.0.2"))),
            "203.0.113.5, 10.0.0.2"
        );
    }

    #[test]
    fn payload_escapes_hostile_values() {
        let payload = ip_payload(r#"1.2.3.4", "rawIspInfo": "x"#);
        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed["processedString"], r#"1.2.3.4", "rawIspInfo": "x"#);
        assert_eq!(parsed["rawIspInfo"], "");
    }
}
