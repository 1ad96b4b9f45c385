//! Output sinks for records.
//!
//! A [`Sink`] is a cheaply cloneable handle around one writer. Every record is
//! written and flushed while holding the sink's lock, so concurrent requests
//! never interleave partial lines.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::error;

type BoxedWriter = Box<dyn Write + Send + 'static>;

/// Shared destination for JSON record lines.
#[derive(Clone)]
pub struct Sink {
    writer: Arc<Mutex<BoxedWriter>>,
}

impl Sink {
    /// Writes to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self { writer: Arc::new(Mutex::new(Box::new(writer))) }
    }

    /// Writes one complete line. Failures are reported as diagnostics and
    /// otherwise ignored: logging never fails the caller.
    pub(crate) fn write_line(&self, line: &[u8]) {
        let mut writer = self.writer.lock();
        if let Err(e) = writer.write_all(line).and_then(|()| writer.flush()) {
            error!(error = %e, "failed to write log record");
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").finish_non_exhaustive()
    }
}

// ── MemorySink ────────────────────────────────────────────────────────────────

/// In-memory writer for asserting on emitted records.
///
/// Clones share the same buffer: hand one clone to [`Sink::new`] and keep
/// another to read what was written.
///
/// ```rust
/// use reqtrail::{Level, Logger, MemorySink};
///
/// let memory = MemorySink::new();
/// let logger = Logger::with_writer(Level::Debug, memory.clone());
/// logger.info("hello", &[]);
///
/// assert_eq!(memory.records()[0]["message"], "hello");
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Parses every captured line as a JSON record. Lines that are not valid
    /// JSON are skipped.
    pub fn records(&self) -> Vec<Value> {
        self.contents()
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

impl Write for MemorySink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
