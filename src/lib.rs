//! # reqtrail
//!
//! Structured JSON logging and request instrumentation for HTTP services.
//! One record per line on stdout, one access record per request, and a
//! correlation ID on every request that passes through.
//!
//! ## The contract
//!
//! Log shipping, rotation, sampling and tracing spans belong to the platform:
//! a collector tails stdout and does the rest. reqtrail does not try.
//!
//! What's left for reqtrail:
//!
//! - **Leveled JSON records**: `message`, `level`, `time` plus your fields
//! - **Access records**: method, path, status, client IP, correlation IDs
//! - **Correlation IDs**: `X-Correlation-Id` / `X-User-Correlation-Id`,
//!   minted when missing, echoed on the response
//! - **Lifecycle records**: start (with your startup config) and stop
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::{Method, StatusCode};
//! use reqtrail::middleware::{access_log, correlate};
//! use reqtrail::{CorrelationIds, Level, ResponseWriter, Router, Server, route_fn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), reqtrail::Error> {
//!     reqtrail::configure(Level::Info);
//!     let logger = reqtrail::global();
//!
//!     let router = Router::new().on(Method::GET, "/users/{id}", route_fn(|rw, req, params| {
//!         Box::pin(async move {
//!             let ids = CorrelationIds::from_request(req);
//!             let _ = reqtrail::global().log_with_correlation_ids(
//!                 Level::Debug, "loading user", &ids.correlation_id, &ids.user_correlation_id,
//!             );
//!             let id = params.get("id").unwrap_or("unknown");
//!             rw.json(StatusCode::OK, format!(r#"{{"id":"{id}"}}"#).as_bytes());
//!         })
//!     }));
//!
//!     logger.log_app_start("users", &());
//!     let signal = Server::bind("0.0.0.0:3000")?
//!         .serve(correlate(access_log(router)))
//!         .await?;
//!     logger.log_app_stop("users", signal, None);
//!     Ok(())
//! }
//! ```

mod access;
mod error;
mod field;
mod handler;
mod interceptor;
mod level;
mod lifecycle;
mod logger;
mod record;
mod request;
mod response;
mod router;
mod server;
mod sink;

pub mod config;
pub mod middleware;

pub use access::{CLUSTER_CLIENT_IP, REAL_IP, remote_ip};
pub use error::Error;
pub use field::Field;
pub use handler::{BoxFuture, Handler, HandlerFn, Params, RouteFn, RouteHandler, handler_fn, route_fn};
pub use interceptor::ResponseInterceptor;
pub use level::Level;
pub use lifecycle::Signal;
pub use logger::{Escalation, Logger, configure, configure_from_str, global, set_global};
pub use middleware::CorrelationIds;
pub use record::{LEVEL_KEY, MESSAGE_KEY, TIME_KEY};
pub use request::Request;
pub use response::{ContentType, Response, ResponseWriter};
pub use router::Router;
pub use server::Server;
pub use sink::{MemorySink, Sink};
