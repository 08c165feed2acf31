//! Radix-tree request router.
//!
//! A path maps to one handler, whatever the method: every speed-test endpoint
//! answers GET, POST, OPTIONS and the rest itself. Lookup is O(path-length)
//! via [`matchit`]. The router is an ordinary value built at startup and
//! handed to [`Server::serve`](crate::Server::serve); nothing is registered
//! globally.

use std::sync::Arc;

use http::StatusCode;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// The application router.
pub struct Router {
    routes: MatchitRouter<BoxedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: MatchitRouter::new() }
    }

    /// Register `handler` for every method on `path`. Returns `self` for chaining.
    ///
    /// Paths are matched exactly and case-sensitively.
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or already registered. Routes are fixed
    /// at startup, so this is a programming error.
    pub fn route(mut self, path: &str, handler: impl Handler) -> Self {
        self.routes
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(&self, path: &str) -> Option<BoxedHandler> {
        let matched = self.routes.at(path).ok()?;
        Some(Arc::clone(matched.value))
    }

    /// Routes one request. Unknown paths get `404 Not Found` with no body.
    pub async fn call(&self, req: Request) -> Response {
        match self.lookup(req.path()) {
            Some(handler) => handler.call(req).await,
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}
