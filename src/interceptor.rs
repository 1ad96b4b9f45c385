//! Status-capturing response wrapper.

use http::{HeaderMap, StatusCode};

use crate::response::ResponseWriter;

/// Wraps a [`ResponseWriter`] and remembers the status handed to it.
///
/// Every call is forwarded unchanged to the wrapped writer. The recorded
/// status starts at `200 OK` (what a handler that only writes a body ends up
/// sending) and each `write_header` call overwrites it, so it reflects the
/// last status the wrapper observed.
#[derive(Debug)]
pub struct ResponseInterceptor<W> {
    inner: W,
    status: StatusCode,
}

impl<W: ResponseWriter> ResponseInterceptor<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, status: StatusCode::OK }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: ResponseWriter> ResponseWriter for ResponseInterceptor<W> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        self.status = status;
        self.inner.write_header(status);
    }

    fn write(&mut self, chunk: &[u8]) {
        self.inner.write(chunk);
    }
}
