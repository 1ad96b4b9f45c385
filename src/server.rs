//! The hyper server that drives a [`Handler`].
//!
//! # Shutdown
//!
//! Orchestrators stop a service with SIGTERM and escalate to SIGKILL after a
//! grace period (30 s by default on Kubernetes). On the first signal the
//! server:
//! 1. Stops calling `listener.accept()`, so no new connection is taken.
//! 2. Waits for every open connection task to finish its requests.
//! 3. Returns the [`Signal`] from [`Server::serve`] so `main` can write the
//!    stop record with [`Logger::log_app_stop`](crate::Logger::log_app_stop).
//!
//! # Request bodies
//!
//! The body is read in full before the handler runs. If reading it fails
//! (the client disconnects mid-body, or the framing is invalid) the server
//! answers `400 Bad Request` itself and the handler is never called. Such a
//! request therefore gets no correlation headers and no access record; the
//! failure is only reported as a `tracing` debug event with the peer address.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::handler::Handler;
use crate::lifecycle::Signal;
use crate::request::Request;
use crate::response::{Response, ResponseWriter};

/// Listens on one address and serves every connection with one handler.
#[derive(Clone, Copy, Debug)]
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Parses `addr`. Nothing is bound until [`serve`](Server::serve).
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqtrail::Server;
    /// let server = Server::bind("0.0.0.0:3000").unwrap();
    /// assert!(Server::bind("not an address").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr = addr.parse::<SocketAddr>().map_err(|source| Error::InvalidAddress {
            addr: addr.to_owned(),
            source,
        })?;
        Ok(Self { addr })
    }

    pub fn from_addr(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Starts accepting connections and dispatching them to `handler`.
    ///
    /// Resolves with the signal that stopped the server, once every open
    /// connection has drained.
    pub async fn serve<H: Handler>(self, handler: H) -> Result<Signal, Error> {
        self.serve_with_shutdown(handler, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but shuts down when `shutdown` resolves
    /// instead of on a process signal.
    pub async fn serve_with_shutdown<H, F>(self, handler: H, shutdown: F) -> Result<Signal, Error>
    where
        H: Handler,
        F: Future<Output = Signal>,
    {
        let listener = TcpListener::bind(self.addr).await?;

        // Shared across connection tasks without copying the routing table.
        let handler = Arc::new(handler);

        info!(addr = %self.addr, "reqtrail listening");

        // Connection tasks, kept so shutdown can drain them.
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(shutdown);

        let signal = loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM immediately stops
                // accepting new connections, even if more are queued.
                biased;

                signal = &mut shutdown => {
                    info!(%signal, in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break signal;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let handler = Arc::clone(&handler);
                            async move { dispatch(handler, req, remote_addr).await }
                        });

                        // HTTP/1.1 or HTTP/2, whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            debug!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap completed connections.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        };

        // Drain.
        while tasks.join_next().await.is_some() {}

        info!("reqtrail stopped");
        Ok(signal)
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Reads the body, runs the handler against a fresh [`Response`], and hands
/// the result to hyper.
///
/// The error type is [`Infallible`]: a body that cannot be read becomes a
/// `400`, so hyper never sees an error.
async fn dispatch<H: Handler>(
    handler: Arc<H>,
    req: hyper::Request<Incoming>,
    remote_addr: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let mut response = Response::new();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!(peer = %remote_addr, "failed to read request body: {e}");
            response.write_header(StatusCode::BAD_REQUEST);
            return Ok(response.into_http());
        }
    };

    let mut request = Request::from_parts(parts, body, remote_addr.to_string());
    handler.serve(&mut response, &mut request).await;

    Ok(response.into_http())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves with the first shutdown signal the process receives.
///
/// On Unix this listens for **SIGTERM** (sent by `kubectl` and the
/// Kubernetes control plane), **SIGINT** (Ctrl-C, for local dev), and
/// SIGHUP / SIGQUIT from process supervisors. On Windows only Ctrl-C is
/// available. A listener that cannot be installed is reported and never fires.
async fn shutdown_signal() -> Signal {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::SignalKind;

        tokio::select! {
            () = ctrl_c => Signal::Interrupt,
            () = unix_signal(SignalKind::terminate(), "SIGTERM") => Signal::Terminate,
            () = unix_signal(SignalKind::hangup(), "SIGHUP") => Signal::Hangup,
            () = unix_signal(SignalKind::quit(), "SIGQUIT") => Signal::Quit,
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        Signal::Interrupt
    }
}

#[cfg(unix)]
async fn unix_signal(kind: tokio::signal::unix::SignalKind, name: &str) {
    match tokio::signal::unix::signal(kind) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            error!("failed to install {name} handler: {e}");
            std::future::pending::<()>().await;
        }
    }
}
