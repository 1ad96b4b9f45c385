//! Severity levels as a typed enum.
//!
//! Levels are ordered: `Debug < Info < Warn < Error < DPanic < Panic < Fatal`.
//! A [`Logger`](crate::Logger) drops every record below its threshold before
//! the record is built.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A record severity.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    /// Reported like `Error`. Never escalates.
    DPanic,
    /// The record is followed by an unwind; see [`Escalation`](crate::Escalation).
    Panic,
    /// The record is followed by process exit; see [`Escalation`](crate::Escalation).
    Fatal,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::DPanic,
        Level::Panic,
        Level::Fatal,
    ];

    /// Returns the capitalized name written to the `level` key (e.g. `"INFO"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug  => "DEBUG",
            Self::Info   => "INFO",
            Self::Warn   => "WARN",
            Self::Error  => "ERROR",
            Self::DPanic => "DPANIC",
            Self::Panic  => "PANIC",
            Self::Fatal  => "FATAL",
        }
    }

    /// Parses a level name, falling back to `Info` for anything unknown.
    ///
    /// Only for call sites that still hold unvalidated strings; configuration
    /// goes through [`FromStr`], which rejects unknown names.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Self::Info)
    }
}

/// Parses a level name, ignoring case and surrounding whitespace.
impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug"  => Ok(Self::Debug),
            "info"   => Ok(Self::Info),
            "warn"   => Ok(Self::Warn),
            "error"  => Ok(Self::Error),
            "dpanic" => Ok(Self::DPanic),
            "panic"  => Ok(Self::Panic),
            "fatal"  => Ok(Self::Fatal),
            _        => Err(Error::InvalidLevel(s.to_owned())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered_by_severity() {
        for pair in Level::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} should be below {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("DEBUG".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("Warn".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("dpanic".parse::<Level>().unwrap(), Level::DPanic);
        assert_eq!(" fatal ".parse::<Level>().unwrap(), Level::Fatal);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "verbose".parse::<Level>().unwrap_err();
        assert!(matches!(err, Error::InvalidLevel(ref s) if s == "verbose"));
    }

    #[test]
    fn lenient_parse_defaults_to_info() {
        assert_eq!(Level::parse_lenient("nonsense"), Level::Info);
        assert_eq!(Level::parse_lenient("error"), Level::Error);
    }

    #[test]
    fn round_trips_through_display() {
        for level in Level::ALL {
            assert_eq!(level.to_string().parse::<Level>().unwrap(), level);
        }
    }
}
