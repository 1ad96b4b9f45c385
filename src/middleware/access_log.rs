//! Access-log middleware.
//!
//! [`AccessLog`] substitutes a [`ResponseInterceptor`] for the real writer,
//! awaits the wrapped handler, then writes one access record with the status
//! the handler set. The record is written only after the handler's future has
//! completed, so it always reflects the final recorded status.
//!
//! The same wrapper serves both handler shapes: wrap a [`Handler`] to get a
//! `Handler`, wrap a [`RouteHandler`] to get a `RouteHandler` whose path
//! parameters are passed through untouched.

use std::sync::Arc;

use crate::handler::{BoxFuture, Handler, Params, RouteHandler};
use crate::interceptor::ResponseInterceptor;
use crate::logger::{self, Logger};
use crate::request::Request;
use crate::response::ResponseWriter;

/// Access-log middleware. See the module docs.
#[derive(Clone, Debug)]
pub struct AccessLog<H> {
    inner: H,
    logger: Option<Arc<Logger>>,
}

/// Wraps `inner` with access logging to the process-wide logger.
///
/// The process-wide logger is looked up per request, so a later
/// [`configure`](crate::configure) takes effect immediately.
pub fn access_log<H>(inner: H) -> AccessLog<H> {
    AccessLog { inner, logger: None }
}

impl<H> AccessLog<H> {
    /// Writes records to `logger` instead of the process-wide logger.
    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    fn logger(&self) -> Arc<Logger> {
        self.logger.clone().unwrap_or_else(logger::global)
    }
}

impl<H: Handler> Handler for AccessLog<H> {
    fn serve<'a>(&'a self, rw: &'a mut dyn ResponseWriter, req: &'a mut Request) -> BoxFuture<'a> {
        Box::pin(async move {
            let mut interceptor = ResponseInterceptor::new(rw);
            self.inner.serve(&mut interceptor, req).await;
            self.logger().log_request(req, interceptor.status());
        })
    }
}

impl<H: RouteHandler> RouteHandler for AccessLog<H> {
    fn serve<'a>(
        &'a self,
        rw: &'a mut dyn ResponseWriter,
        req: &'a mut Request,
        params: &'a Params,
    ) -> BoxFuture<'a> {
        Box::pin(async move {
            let mut interceptor = ResponseInterceptor::new(rw);
            self.inner.serve(&mut interceptor, req, params).await;
            self.logger().log_request(req, interceptor.status());
        })
    }
}
