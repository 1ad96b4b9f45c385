//! Middleware layer.
//!
//! Middleware wraps a handler and is the right place for cross-cutting
//! concerns. Each middleware here is itself a [`Handler`](crate::Handler), so
//! a pipeline is plain nesting, outermost first:
//!
//! ```rust,no_run
//! use reqtrail::middleware::{access_log, correlate};
//! use reqtrail::{Router, Server};
//!
//! # async fn run(router: Router) -> Result<(), reqtrail::Error> {
//! let app = correlate(access_log(router));
//! Server::bind("0.0.0.0:3000")?.serve(app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Order matters only for what each layer can see. With correlation outside
//! the access log, as above, access records carry the request's correlation
//! IDs.

pub mod access_log;
pub mod correlation;

pub use access_log::{AccessLog, access_log};
pub use correlation::{
    CORRELATION_ID, Correlation, CorrelationIds, USER_CORRELATION_ID, correlate,
};
