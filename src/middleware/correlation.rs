//! Correlation-ID propagation.
//!
//! Every request leaving [`Correlation`] carries two identifiers:
//!
//! | Header | Meaning |
//! |---|---|
//! | `X-Correlation-Id` | Groups every record produced while serving one call chain. |
//! | `X-User-Correlation-Id` | Groups records across the calls one user action triggered. |
//!
//! Values arriving from upstream are kept as they are; missing ones are
//! minted as UUID v4. Both are written back onto the request (so handlers and
//! the access log see them) and onto the response (so the caller can quote
//! them).

use http::header::{HeaderName, HeaderValue};
use uuid::Uuid;

use crate::field::Field;
use crate::handler::{BoxFuture, Handler};
use crate::level::Level;
use crate::logger::{Escalation, Logger};
use crate::request::Request;
use crate::response::ResponseWriter;

pub const CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");
pub const USER_CORRELATION_ID: HeaderName = HeaderName::from_static("x-user-correlation-id");

/// The identifiers attached to one request.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CorrelationIds {
    pub correlation_id: String,
    pub user_correlation_id: String,
}

impl CorrelationIds {
    /// Reads both identifiers from the request headers; absent ones are empty.
    pub fn from_request(req: &Request) -> Self {
        let read = |name: &HeaderName| req.header(name.as_str()).unwrap_or_default().to_owned();
        Self {
            correlation_id: read(&CORRELATION_ID),
            user_correlation_id: read(&USER_CORRELATION_ID),
        }
    }
}

// ── Middleware ────────────────────────────────────────────────────────────────

/// Middleware that guarantees both correlation headers. See the module docs.
#[derive(Clone, Debug)]
pub struct Correlation<H> {
    inner: H,
}

/// Wraps `inner` with correlation-ID propagation.
pub fn correlate<H: Handler>(inner: H) -> Correlation<H> {
    Correlation { inner }
}

impl<H: Handler> Handler for Correlation<H> {
    fn serve<'a>(&'a self, rw: &'a mut dyn ResponseWriter, req: &'a mut Request) -> BoxFuture<'a> {
        let id = ensure(req, CORRELATION_ID);
        let user_id = ensure(req, USER_CORRELATION_ID);

        let headers = rw.headers_mut();
        headers.insert(CORRELATION_ID, id);
        headers.insert(USER_CORRELATION_ID, user_id);

        self.inner.serve(rw, req)
    }
}

/// Returns the request's value for `name`, minting and storing a UUID when
/// it is missing, empty, or not valid visible ASCII.
fn ensure(req: &mut Request, name: HeaderName) -> HeaderValue {
    if let Some(value) = req.headers().get(&name) {
        if !value.is_empty() && value.to_str().is_ok() {
            return value.clone();
        }
    }

    let minted = HeaderValue::from_str(&Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static(""));
    req.headers_mut().insert(name, minted.clone());
    minted
}

// ── Correlated records ────────────────────────────────────────────────────────

impl Logger {
    /// Emits `message` at `level` with both correlation IDs attached.
    ///
    /// Handlers usually pass the values from [`CorrelationIds::from_request`].
    pub fn log_with_correlation_ids(
        &self,
        level: Level,
        message: &str,
        correlation_id: &str,
        user_correlation_id: &str,
    ) -> Escalation {
        self.log(level, message, &[
            Field::string("correlation_id", correlation_id),
            Field::string("user_correlation_id", user_correlation_id),
        ])
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::handler::handler_fn;
    use crate::response::Response;
    use crate::sink::MemorySink;

    /// Echoes the IDs the handler saw into the body as `id|user_id`.
    fn echo() -> impl Handler {
        handler_fn(|rw, req| {
            Box::pin(async move {
                let ids = CorrelationIds::from_request(req);
                let body = format!("{}|{}", ids.correlation_id, ids.user_correlation_id);
                rw.text(StatusCode::OK, &body);
            })
        })
    }

    fn response_header(res: &Response, name: &HeaderName) -> String {
        res.headers()[name].to_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn mints_distinct_ids_when_missing() {
        let handler = correlate(echo());
        let mut res = Response::new();
        let mut req = Request::new(Method::GET, "/".parse().unwrap());

        handler.serve(&mut res, &mut req).await;

        let id = response_header(&res, &CORRELATION_ID);
        let user_id = response_header(&res, &USER_CORRELATION_ID);
        assert!(Uuid::parse_str(&id).is_ok());
        assert!(Uuid::parse_str(&user_id).is_ok());
        assert_ne!(id, user_id);

        // Downstream saw the same values that went back to the caller.
        assert_eq!(res.body(), format!("{id}|{user_id}").as_bytes());
        assert_eq!(req.header("x-correlation-id"), Some(id.as_str()));
    }

    #[tokio::test]
    async fn passes_existing_ids_through() {
        let handler = correlate(echo());
        let mut res = Response::new();
        let mut req = Request::new(Method::GET, "/".parse().unwrap())
            .with_header(CORRELATION_ID, HeaderValue::from_static("abc"))
            .with_header(USER_CORRELATION_ID, HeaderValue::from_static("def"));

        handler.serve(&mut res, &mut req).await;

        assert_eq!(response_header(&res, &CORRELATION_ID), "abc");
        assert_eq!(response_header(&res, &USER_CORRELATION_ID), "def");
        assert_eq!(res.body(), b"abc|def");
    }

    #[tokio::test]
    async fn replaces_empty_ids_only() {
        let handler = correlate(echo());
        let mut res = Response::new();
        let mut req = Request::new(Method::GET, "/".parse().unwrap())
            .with_header(CORRELATION_ID, HeaderValue::from_static(""))
            .with_header(USER_CORRELATION_ID, HeaderValue::from_static("kept"));

        handler.serve(&mut res, &mut req).await;

        assert!(!response_header(&res, &CORRELATION_ID).is_empty());
        assert_eq!(response_header(&res, &USER_CORRELATION_ID), "kept");
    }

    #[tokio::test]
    async fn fresh_ids_per_request() {
        let handler = correlate(echo());
        let mut seen = Vec::new();
        for _ in 0..3 {
            let mut res = Response::new();
            let mut req = Request::new(Method::GET, "/".parse().unwrap());
            handler.serve(&mut res, &mut req).await;
            seen.push(response_header(&res, &CORRELATION_ID));
        }
        seen.dedup();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn from_request_defaults_to_empty() {
        let req = Request::new(Method::GET, "/".parse().unwrap());
        assert_eq!(CorrelationIds::from_request(&req), CorrelationIds::default());
    }

    #[test]
    fn correlated_records_at_every_level() {
        let memory = MemorySink::new();
        let logger = Logger::with_writer(Level::Debug, memory.clone());

        for level in Level::ALL {
            let escalation = logger.log_with_correlation_ids(level, "test message", "TEST-ID", "TEST-USER-ID");
            match level {
                Level::Panic => assert!(matches!(escalation, Escalation::Abort(_))),
                Level::Fatal => assert_eq!(escalation, Escalation::Terminate),
                _ => assert!(escalation.is_continue()),
            }
        }

        let records = memory.records();
        assert_eq!(records.len(), Level::ALL.len());
        for (record, level) in records.iter().zip(Level::ALL) {
            assert_eq!(record["level"], json!(level.as_str()));
            assert_eq!(record["message"], json!("test message"));
            assert_eq!(record["correlation_id"], json!("TEST-ID"));
            assert_eq!(record["user_correlation_id"], json!("TEST-USER-ID"));
        }
    }
}
