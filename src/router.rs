//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. A router is a
//! [`Handler`], so it drops into a middleware pipeline like any other.

use std::collections::HashMap;
use std::sync::Arc;

use http::header::{ALLOW, HeaderValue};
use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedRouteHandler, Handler, Params, RouteHandler};
use crate::request::Request;
use crate::response::ResponseWriter;

/// The application router.
///
/// Build it once at startup and hand it to [`Server::serve`](crate::Server::serve),
/// usually wrapped in middleware. Each [`Router::on`] call returns `self` so
/// registrations chain naturally.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedRouteHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax and arrive in [`Params`]:
    ///
    /// ```rust
    /// use http::{Method, StatusCode};
    /// use reqtrail::middleware::access_log;
    /// use reqtrail::{ResponseWriter, Router, route_fn};
    ///
    /// let router = Router::new()
    ///     .on(Method::GET, "/users/{id}", access_log(route_fn(|rw, _req, params| Box::pin(async move {
    ///         rw.text(StatusCode::OK, params.get("id").unwrap_or("unknown"));
    ///     }))));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid pattern or conflicts with an existing
    /// route. Routes are registered at startup; use [`Router::try_on`] when
    /// they come from data.
    pub fn on(self, method: Method, path: &str, handler: impl RouteHandler) -> Self {
        self.try_on(method, path, handler)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_on(mut self, method: Method, path: &str, handler: impl RouteHandler) -> Result<Self, Error> {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Arc::new(handler))
            .map_err(|source| Error::Route { path: path.to_owned(), source })?;
        Ok(self)
    }

    pub(crate) fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedRouteHandler, Params)> {
        let matched = self.routes.get(method)?.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter().collect();
        Some((handler, params))
    }

    /// Methods that have a route matching `path`, for the `Allow` header.
    fn allowed(&self, path: &str) -> Vec<&Method> {
        let mut methods: Vec<_> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(method, _)| method)
            .collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }
}

impl Handler for Router {
    fn serve<'a>(&'a self, rw: &'a mut dyn ResponseWriter, req: &'a mut Request) -> BoxFuture<'a> {
        Box::pin(async move {
            if let Some((handler, params)) = self.lookup(req.method(), req.path()) {
                return RouteHandler::serve(&*handler, rw, req, &params).await;
            }

            let allowed = self.allowed(req.path());
            if allowed.is_empty() {
                rw.write_header(StatusCode::NOT_FOUND);
                return;
            }

            let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
            if let Ok(value) = HeaderValue::from_str(&allow) {
                rw.headers_mut().insert(ALLOW, value);
            }
            rw.write_header(StatusCode::METHOD_NOT_ALLOWED);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::route_fn;
    use crate::response::Response;

    fn echo_id() -> impl RouteHandler {
        route_fn(|rw, req, params| {
            Box::pin(async move {
                let body = format!("{} {}", req.method(), params.get("id").unwrap_or("-"));
                rw.text(StatusCode::OK, &body);
            })
        })
    }

    async fn call(router: &Router, method: Method, uri: &str) -> Response {
        let mut res = Response::new();
        let mut req = Request::new(method, uri.parse().unwrap());
        router.serve(&mut res, &mut req).await;
        res
    }

    #[tokio::test]
    async fn dispatches_by_method_and_path() {
        let router = Router::new()
            .on(Method::GET, "/users/{id}", echo_id())
            .on(Method::DELETE, "/users/{id}", echo_id());

        assert_eq!(call(&router, Method::GET, "/users/42").await.body(), b"GET 42");
        assert_eq!(call(&router, Method::DELETE, "/users/7").await.body(), b"DELETE 7");
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let router = Router::new().on(Method::GET, "/users/{id}", echo_id());
        assert_eq!(call(&router, Method::GET, "/nope").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_lists_allowed_ones() {
        let router = Router::new()
            .on(Method::GET, "/users/{id}", echo_id())
            .on(Method::DELETE, "/users/{id}", echo_id());

        let res = call(&router, Method::POST, "/users/1").await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[ALLOW], "DELETE, GET");
    }

    #[test]
    fn conflicting_routes_are_rejected() {
        let result = Router::new()
            .on(Method::GET, "/users/{id}", echo_id())
            .try_on(Method::GET, "/users/{name}", echo_id());
        assert!(matches!(result, Err(Error::Route { ref path, .. }) if path == "/users/{name}"));
    }
}
