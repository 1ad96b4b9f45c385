//! The response-writing capability and its buffered implementation.
//!
//! Handlers never build a response value. They receive a
//! `&mut dyn ResponseWriter` and write to it: headers, a status, body bytes.
//! That indirection is what lets middleware slip a wrapper such as
//! [`ResponseInterceptor`](crate::ResponseInterceptor) between the handler and
//! the real response.

use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use tracing::warn;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseWriter::bytes`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Csv,          // text/csv
    EventStream,  // text/event-stream  (SSE)
    FormData,     // application/x-www-form-urlencoded
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    MsgPack,      // application/msgpack
    OctetStream,  // application/octet-stream  (binary / file download)
    Pdf,          // application/pdf
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::EventStream => "text/event-stream",
            Self::FormData    => "application/x-www-form-urlencoded",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::MsgPack     => "application/msgpack",
            Self::OctetStream => "application/octet-stream",
            Self::Pdf         => "application/pdf",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// Everything a handler can do to a response.
///
/// Semantics follow the wire: the first status written is the one sent, and
/// writing body bytes without a status implies `200 OK`. Header changes made
/// after the status is written are not guaranteed to be sent.
pub trait ResponseWriter: Send {
    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Sets the response status.
    fn write_header(&mut self, status: StatusCode);

    /// Appends body bytes.
    fn write(&mut self, chunk: &[u8]);

    /// Status, content type and body in one call.
    fn bytes(&mut self, status: StatusCode, content_type: ContentType, body: &[u8]) {
        self.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
        self.write_header(status);
        self.write(body);
    }

    /// `application/json` body. Pass bytes straight from your serialiser.
    fn json(&mut self, status: StatusCode, body: &[u8]) {
        self.bytes(status, ContentType::Json, body);
    }

    /// `text/plain; charset=utf-8` body.
    fn text(&mut self, status: StatusCode, body: &str) {
        self.bytes(status, ContentType::Text, body.as_bytes());
    }
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for &mut W {
    fn headers(&self) -> &HeaderMap { (**self).headers() }
    fn headers_mut(&mut self) -> &mut HeaderMap { (**self).headers_mut() }
    fn write_header(&mut self, status: StatusCode) { (**self).write_header(status) }
    fn write(&mut self, chunk: &[u8]) { (**self).write(chunk) }
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for Box<W> {
    fn headers(&self) -> &HeaderMap { (**self).headers() }
    fn headers_mut(&mut self) -> &mut HeaderMap { (**self).headers_mut() }
    fn write_header(&mut self, status: StatusCode) { (**self).write_header(status) }
    fn write(&mut self, chunk: &[u8]) { (**self).write(chunk) }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// A buffered response: the writer the server hands to the outermost handler.
///
/// Also the natural recorder for tests: drive a handler with a fresh
/// `Response`, then inspect [`status`](Response::status),
/// [`headers`](ResponseWriter::headers) and [`body`](Response::body).
#[derive(Debug, Default)]
pub struct Response {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// The status that will be sent. `200 OK` if nothing set one.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let status = self.status();
        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for Response {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(sent) => warn!(%sent, ignored = %status, "superfluous write_header call"),
        }
    }

    fn write(&mut self, chunk: &[u8]) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(chunk);
    }
}
