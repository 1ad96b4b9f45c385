//! Unified error type.

use thiserror::Error;

/// The error type returned by reqtrail's fallible operations.
///
/// Logging itself never fails: a record that cannot be written is reported
/// through `tracing` and dropped. `Error` surfaces configuration mistakes
/// (an unknown level name, a bad address, an invalid route) and
/// infrastructure failures such as binding to a port.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid log level `{0}` (expected debug, info, warn, error, dpanic, panic or fatal)")]
    InvalidLevel(String),

    #[error("invalid socket address `{addr}`: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("invalid route `{path}`: {source}")]
    Route {
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("configuration: {0}")]
    Config(String),
}
