//! The leveled JSON logger and the process-wide handle.
//!
//! # Owned loggers first
//!
//! A [`Logger`] is an ordinary value: build one at startup, wrap it in an
//! `Arc`, and hand it to whatever needs it (middleware included, see
//! [`AccessLog::with_logger`](crate::middleware::AccessLog::with_logger)).
//!
//! # The process-wide logger
//!
//! For code that cannot thread a handle through, [`global`] returns the
//! current process-wide logger. It starts as an `Info` logger on stdout.
//! [`configure`] and [`set_global`] replace it with a single atomic pointer
//! swap, so a request that already took a snapshot finishes on the old
//! logger and the next one sees the new logger. Nothing ever observes a
//! half-built logger.
//!
//! # Panic and Fatal
//!
//! Logging at `Panic` or `Fatal` does not unwind or exit by itself. The call
//! returns an [`Escalation`] and the caller decides where to act on it:
//!
//! ```rust,no_run
//! let logger = reqtrail::global();
//! logger.fatal("database unreachable", &[]).enforce(); // exits with status 1
//! ```

use std::io::Write;
use std::process;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use chrono::Local;

use crate::error::Error;
use crate::field::Field;
use crate::level::Level;
use crate::record::Record;
use crate::sink::Sink;

// ── Escalation ────────────────────────────────────────────────────────────────

/// What the caller must do after a log call returns.
#[must_use = "a Panic or Fatal record only escalates when `enforce` is called"]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Escalation {
    /// Nothing; carry on.
    Continue,
    /// A `Panic` record was logged; unwind with this message.
    Abort(String),
    /// A `Fatal` record was logged; terminate the process.
    Terminate,
}

impl Escalation {
    /// Performs the escalation: panics for `Abort`, exits with status 1 for
    /// `Terminate`, returns for `Continue`.
    ///
    /// The record has already been flushed to the sink when this runs.
    pub fn enforce(self) {
        match self {
            Self::Continue => {}
            Self::Abort(message) => panic!("{message}"),
            Self::Terminate => process::exit(1),
        }
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }
}

// ── Logger ────────────────────────────────────────────────────────────────────

/// A structured logger writing one JSON object per line.
///
/// Cloning is cheap and clones share the sink. A `Logger` is `Send + Sync`;
/// concurrent calls are serialized per record by the sink.
#[derive(Clone, Debug)]
pub struct Logger {
    level: Level,
    sink: Sink,
    context: Vec<Field>,
}

impl Logger {
    /// A logger writing to stdout.
    pub fn new(level: Level) -> Self {
        Self::with_sink(level, Sink::stdout())
    }

    pub fn with_writer(level: Level, writer: impl Write + Send + 'static) -> Self {
        Self::with_sink(level, Sink::new(writer))
    }

    pub fn with_sink(level: Level, sink: Sink) -> Self {
        Self { level, sink, context: Vec::new() }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    /// A child logger that adds `fields` to every record it writes.
    ///
    /// The child shares the sink and threshold of its parent.
    pub fn with(&self, fields: impl IntoIterator<Item = Field>) -> Logger {
        let mut child = self.clone();
        child.context.extend(fields);
        child
    }

    /// Emits one record at `level` if it passes the threshold.
    ///
    /// `Panic` and `Fatal` escalate even when the record itself is filtered
    /// out, so raising the threshold never silences a termination.
    pub fn log(&self, level: Level, message: &str, fields: &[Field]) -> Escalation {
        if self.enabled(level) {
            let record = Record {
                level,
                time: Local::now(),
                message,
                context: &self.context,
                fields,
            };
            self.sink.write_line(&record.to_line());
        }

        match level {
            Level::Panic => Escalation::Abort(message.to_owned()),
            Level::Fatal => Escalation::Terminate,
            _ => Escalation::Continue,
        }
    }

    pub fn debug(&self, message: &str, fields: &[Field]) {
        let _ = self.log(Level::Debug, message, fields);
    }

    pub fn info(&self, message: &str, fields: &[Field]) {
        let _ = self.log(Level::Info, message, fields);
    }

    pub fn warn(&self, message: &str, fields: &[Field]) {
        let _ = self.log(Level::Warn, message, fields);
    }

    pub fn error(&self, message: &str, fields: &[Field]) {
        let _ = self.log(Level::Error, message, fields);
    }

    pub fn dpanic(&self, message: &str, fields: &[Field]) {
        let _ = self.log(Level::DPanic, message, fields);
    }

    /// Always returns [`Escalation::Abort`].
    pub fn panic(&self, message: &str, fields: &[Field]) -> Escalation {
        self.log(Level::Panic, message, fields)
    }

    /// Always returns [`Escalation::Terminate`].
    pub fn fatal(&self, message: &str, fields: &[Field]) -> Escalation {
        self.log(Level::Fatal, message, fields)
    }
}

// ── Process-wide handle ───────────────────────────────────────────────────────

static GLOBAL: LazyLock<ArcSwap<Logger>> =
    LazyLock::new(|| ArcSwap::from_pointee(Logger::new(Level::Info)));

/// A snapshot of the process-wide logger.
pub fn global() -> Arc<Logger> {
    GLOBAL.load_full()
}

/// Replaces the process-wide logger with a stdout logger at `level`.
pub fn configure(level: Level) {
    set_global(Logger::new(level));
}

/// Like [`configure`], for level names read from configuration.
pub fn configure_from_str(level: &str) -> Result<(), Error> {
    configure(level.parse()?);
    Ok(())
}

/// Installs `logger` as the process-wide logger and returns the previous one.
pub fn set_global(logger: Logger) -> Arc<Logger> {
    GLOBAL.swap(Arc::new(logger))
}
