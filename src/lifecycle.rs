//! Application lifecycle records.
//!
//! ```rust,no_run
//! use reqtrail::{Level, Logger, Signal};
//! # #[derive(serde::Serialize)] struct Args { port: u16 }
//!
//! let logger = Logger::new(Level::Info);
//! logger.log_app_start("billing", &Args { port: 3000 });
//! // … serve until a signal arrives …
//! logger.log_app_stop("billing", Signal::Terminate, None);
//! ```

use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::field::Field;
use crate::logger::Logger;

/// Keys that mark a record as a lifecycle event. Startup args cannot override them.
const LIFECYCLE_KEYS: [&str; 2] = ["type", "event"];

/// A shutdown signal, named the way the operating system reports it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Signal {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM, sent by Kubernetes and most process supervisors.
    Terminate,
    Hangup,
    Quit,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interrupt => "interrupt",
            Self::Terminate => "terminated",
            Self::Hangup    => "hangup",
            Self::Quit      => "quit",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Logger {
    /// Emits the `start` lifecycle record.
    ///
    /// `args` is typically the parsed startup configuration. Its top-level
    /// members become record fields, except `type` and `event`, which always
    /// read `lifecycle` and `start`. If `args` does not serialize to a JSON
    /// object, a `parse_error` field describes why and the record is still
    /// written.
    pub fn log_app_start<A: Serialize + ?Sized>(&self, name: &str, args: &A) {
        let mut fields = vec![
            Field::string("type", "lifecycle"),
            Field::string("event", "start"),
        ];

        match arg_fields(args) {
            Ok(members) => fields.extend(
                members
                    .into_iter()
                    .filter(|(key, _)| !LIFECYCLE_KEYS.contains(&key.as_str()))
                    .map(|(key, value)| Field::new(key, value)),
            ),
            Err(e) => fields.push(Field::string("parse_error", e.to_string())),
        }

        self.info(&format!("starting application: {name}"), &fields);
    }

    /// Emits the `stop` lifecycle record.
    ///
    /// With `err`, the record is at `Error` and names the error instead of
    /// the signal.
    pub fn log_app_stop(&self, name: &str, signal: Signal, err: Option<&dyn StdError>) {
        let fields = [
            Field::string("type", "lifecycle"),
            Field::string("event", "stop"),
        ];

        match err {
            Some(err) => self.error(&format!("stopping application: {name} ({err})"), &fields),
            None => self.info(&format!("stopping application: {name} ({signal})"), &fields),
        }
    }
}

fn arg_fields<A: Serialize + ?Sized>(args: &A) -> serde_json::Result<Map<String, Value>> {
    match serde_json::to_value(args)? {
        Value::Null => Ok(Map::new()),
        value => serde_json::from_value(value),
    }
}
