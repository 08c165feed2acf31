//! Handler trait and type erasure.
//!
//! Endpoints are plain async functions (or closures that capture their
//! configuration). The router stores them side by side in one radix tree,
//! which needs a single concrete type, so each one is wrapped and hidden
//! behind `Arc<dyn ErasedHandler>`:
//!
//! ```text
//! async fn empty(req: Request) -> Response { … }      ← endpoint
//!        ↓ Router::route("/backend/empty.php", empty)
//! empty.into_boxed_handler()                          ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(empty))                          ← stored as BoxedHandler
//!        ↓ at request time
//! Box::pin(async { empty(req).await.into_response() })  ← BoxFuture
//! ```
//!
//! Per request that costs one `Arc` clone and one virtual call.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A boxed future resolving to a [`Response`]. `Send + 'static` so tokio can
/// move it between worker threads.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Object-safe dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in [`Handler::into_boxed_handler`].
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared by every connection task.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid endpoint.
///
/// Satisfied automatically by anything shaped like
///
/// ```text
/// Fn(Request) -> impl Future<Output = impl IntoResponse>
/// ```
///
/// which includes `async fn` items and `move` closures such as
/// `move |req| garbage::download(req, limit)`. The trait is sealed; the
/// blanket impl below is the only implementation.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete `F` to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Empty;

    fn request() -> Request {
        let req = http::Request::get("/").body(Empty::<Bytes>::new()).unwrap();
        Request::from_http(req, "127.0.0.1:1".parse().unwrap())
    }

    async fn teapot(_req: Request) -> StatusCode {
        StatusCode::IM_A_TEAPOT
    }

    #[tokio::test]
    async fn async_fn_is_a_handler() {
        let handler = teapot.into_boxed_handler();
        let res = handler.call(request()).await;
        assert_eq!(res.status_code(), StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn capturing_closure_is_a_handler() {
        let code = StatusCode::ACCEPTED;
        let handler = (move |_req: Request| async move { code }).into_boxed_handler();
        let res = handler.call(request()).await;
        assert_eq!(res.status_code(), StatusCode::ACCEPTED);
    }
}
