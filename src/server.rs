//! HTTP server and graceful shutdown.
//!
//! Each accepted connection runs in its own task. Handlers share nothing
//! mutable, so the only shared value is the read-only [`Router`].
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`: no new connections are made.
//! 2. Tells every open connection to shut down gracefully. Idle keep-alive
//!    connections close at once; a download that is mid-stream finishes its
//!    response first.
//! 3. Waits up to [`DRAIN_TIMEOUT`] for those connections, aborts whatever
//!    is left, and returns from [`Server::serve`] so `main` exits cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::body::Body;
use crate::error::Error;
use crate::middleware::trace;
use crate::request::Request;
use crate::router::Router;

/// Longest time shutdown waits for in-flight responses before aborting them.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// The HTTP server.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
}

impl Server {
    /// Binds the listening socket.
    ///
    /// Binding happens here rather than in [`serve`](Server::serve) so a port
    /// conflict is reported before anything else starts.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn run() -> Result<(), speedtest_backend::Error> {
    /// use speedtest_backend::Server;
    /// let server = Server::bind("0.0.0.0:8080".parse().unwrap()).await?;
    /// # Ok(()) }
    /// ```
    pub async fn bind(addr: SocketAddr) -> Result<Self, Error> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        Ok(Self { listener })
    }

    /// The address actually bound. Useful after binding port `0`.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then drains in-flight
    /// connections.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves `router` until `signal` resolves, then drains in-flight
    /// connections.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let addr = self.local_addr()?;
        let listener = self.listener;
        let router = Arc::new(router);

        info!(%addr, "speedtest backend listening");

        let builder = ConnBuilder::new(TokioExecutor::new());
        // Every connection is registered here so shutdown can ask hyper to
        // close it once the current response, if any, is done.
        let graceful = GracefulShutdown::new();
        // JoinSet owns the connection tasks so stragglers can be aborted.
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { dispatch(&router, req, remote_addr).await }
                    });
                    let conn = builder
                        .serve_connection(TokioIo::new(stream), svc)
                        .into_owned();
                    let conn = graceful.watch(conn);

                    tasks.spawn(async move {
                        // A client that hangs up mid-download ends up here.
                        // That is how a speed test normally stops, not a fault.
                        if let Err(e) = conn.await {
                            info!(peer = %remote_addr, "connection closed: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        drop(listener);

        if tokio::time::timeout(DRAIN_TIMEOUT, graceful.shutdown()).await.is_err() {
            warn!(
                remaining = tasks.len(),
                timeout_s = DRAIN_TIMEOUT.as_secs(),
                "drain timed out, aborting connections"
            );
        }
        tasks.shutdown().await;

        info!("speedtest backend stopped");
        Ok(())
    }
}

/// Routes one request. Failures are already responses, so hyper never sees
/// an error.
async fn dispatch(
    router: &Router,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Body>, Infallible> {
    let req = Request::from_http(req, remote_addr);
    Ok(trace::traced(router, req).await.into_inner())
}

/// Resolves on the first shutdown signal the process receives.
///
/// SIGTERM (container runtimes) and SIGINT (Ctrl-C) on Unix; Ctrl-C only
/// elsewhere.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
