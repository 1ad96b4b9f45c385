//! Handler traits and closure adapters.
//!
//! # Shape of a handler
//!
//! A handler borrows the response writer and the request for the duration of
//! one call and returns a boxed future tied to those borrows:
//!
//! ```text
//! fn serve<'a>(&'a self, rw: &'a mut dyn ResponseWriter, req: &'a mut Request) -> BoxFuture<'a>
//! ```
//!
//! Borrowing (rather than taking ownership and returning a response) is what
//! makes middleware composable: a middleware can mutate the request, wrap the
//! writer, await the next handler, and still look at both afterwards.
//!
//! Closures are adapted with [`handler_fn`] and [`route_fn`]:
//!
//! ```rust
//! use http::StatusCode;
//! use reqtrail::{ResponseWriter, handler_fn};
//!
//! let not_found = handler_fn(|rw, _req| Box::pin(async move {
//!     rw.write_header(StatusCode::NOT_FOUND);
//! }));
//! ```
//!
//! Named `async fn`s work the same way through a one-line closure:
//! `handler_fn(|rw, req| Box::pin(my_handler(rw, req)))`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::ResponseWriter;

/// A heap-allocated future borrowing from one handler call.
///
/// `Send` so tokio can move the request's task across worker threads.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

// ── Handler ───────────────────────────────────────────────────────────────────

/// Serves one request by writing to `rw`.
///
/// Implemented by the [`Router`](crate::Router), by every middleware, and by
/// closures wrapped in [`handler_fn`].
pub trait Handler: Send + Sync + 'static {
    fn serve<'a>(&'a self, rw: &'a mut dyn ResponseWriter, req: &'a mut Request) -> BoxFuture<'a>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve<'a>(&'a self, rw: &'a mut dyn ResponseWriter, req: &'a mut Request) -> BoxFuture<'a> {
        (**self).serve(rw, req)
    }
}

/// Adapter returned by [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F>(F);

/// Turns a closure into a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(&'a mut dyn ResponseWriter, &'a mut Request) -> BoxFuture<'a> + Send + Sync + 'static,
{
    HandlerFn(f)
}

impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(&'a mut dyn ResponseWriter, &'a mut Request) -> BoxFuture<'a> + Send + Sync + 'static,
{
    fn serve<'a>(&'a self, rw: &'a mut dyn ResponseWriter, req: &'a mut Request) -> BoxFuture<'a> {
        (self.0)(rw, req)
    }
}

// ── RouteHandler ──────────────────────────────────────────────────────────────

/// Path parameters captured by the router, in pattern order.
///
/// For a route `/users/{id}`, `params.get("id")` on `/users/42` returns `Some("42")`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A handler registered on a [`Router`](crate::Router) route. Receives the
/// route's path parameters alongside the request.
pub trait RouteHandler: Send + Sync + 'static {
    fn serve<'a>(
        &'a self,
        rw: &'a mut dyn ResponseWriter,
        req: &'a mut Request,
        params: &'a Params,
    ) -> BoxFuture<'a>;
}

impl<H: RouteHandler + ?Sized> RouteHandler for Arc<H> {
    fn serve<'a>(
        &'a self,
        rw: &'a mut dyn ResponseWriter,
        req: &'a mut Request,
        params: &'a Params,
    ) -> BoxFuture<'a> {
        (**self).serve(rw, req, params)
    }
}

/// Adapter returned by [`route_fn`].
#[derive(Clone)]
pub struct RouteFn<F>(F);

/// Turns a closure into a [`RouteHandler`].
pub fn route_fn<F>(f: F) -> RouteFn<F>
where
    F: for<'a> Fn(&'a mut dyn ResponseWriter, &'a mut Request, &'a Params) -> BoxFuture<'a>
        + Send
        + Sync
        + 'static,
{
    RouteFn(f)
}

impl<F> RouteHandler for RouteFn<F>
where
    F: for<'a> Fn(&'a mut dyn ResponseWriter, &'a mut Request, &'a Params) -> BoxFuture<'a>
        + Send
        + Sync
        + 'static,
{
    fn serve<'a>(
        &'a self,
        rw: &'a mut dyn ResponseWriter,
        req: &'a mut Request,
        params: &'a Params,
    ) -> BoxFuture<'a> {
        (self.0)(rw, req, params)
    }
}

/// A type-erased route handler, as stored in the router's trees.
pub(crate) type BoxedRouteHandler = Arc<dyn RouteHandler>;
