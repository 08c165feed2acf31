//! Cross-origin policy.
//!
//! The speed-test page is usually served from a different origin than the
//! backend, and every measurement must bypass caches. The policy is the same
//! for all endpoints and all methods, preflight included.

use http::HeaderMap;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, CACHE_CONTROL, HeaderValue, PRAGMA,
};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, HEAD, OPTIONS, PUT, DELETE";
pub const ALLOW_HEADERS: &str = "Accept, Accept-Language, Content-Language, Content-Type, \
    Content-Encoding, Content-Length, Cache-Control, Pragma, Origin, X-Requested-With";
pub const EXPOSE_HEADERS: &str = "Content-Length, Content-Type, Content-Encoding";
/// Preflight results may be cached by the browser for one day.
pub const MAX_AGE: &str = "86400";
pub const NO_CACHE: &str = "no-store, no-cache, must-revalidate, max-age=0";

/// Sets the full policy on `headers`, replacing any value already present.
pub fn apply(headers: &mut HeaderMap) {
    let policy = [
        (ACCESS_CONTROL_ALLOW_ORIGIN,   ALLOW_ORIGIN),
        (ACCESS_CONTROL_ALLOW_METHODS,  ALLOW_METHODS),
        (ACCESS_CONTROL_ALLOW_HEADERS,  ALLOW_HEADERS),
        (ACCESS_CONTROL_EXPOSE_HEADERS, EXPOSE_HEADERS),
        (ACCESS_CONTROL_MAX_AGE,        MAX_AGE),
        (CACHE_CONTROL,                 NO_CACHE),
        (PRAGMA,                        "no-cache"),
    ];
    for (name, value) in policy {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_every_policy_header() {
        let mut headers = HeaderMap::new();
        apply(&mut headers);

        assert_eq!(headers.len(), 7);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, HEAD, OPTIONS, PUT, DELETE");
        assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "86400");
        assert_eq!(headers[PRAGMA], "no-cache");

        let allowed = headers[ACCESS_CONTROL_ALLOW_HEADERS].to_str().unwrap();
        for name in ["Content-Type", "Content-Encoding", "Content-Length", "Cache-Control", "Origin"] {
            assert!(allowed.contains(name), "missing {name} in {allowed}");
        }
    }

    #[test]
    fn replaces_existing_values() {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=600"));
        apply(&mut headers);
        apply(&mut headers);

        assert_eq!(headers.get_all(CACHE_CONTROL).iter().count(), 1);
        assert_eq!(headers[CACHE_CONTROL], NO_CACHE);
    }
}
