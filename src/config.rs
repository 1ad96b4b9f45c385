//! Environment-driven settings for services built on reqtrail.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `LOG_LEVEL` | `info` | Threshold for the process-wide logger. |
//! | `HTTP_ADDR` | `0.0.0.0:3000` | Listen address. |
//! | `APP_NAME` | `reqtrail` | Name used in lifecycle records. |

use std::env;
use std::net::SocketAddr;

use serde::Serialize;

use crate::error::Error;
use crate::level::Level;

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_APP_NAME: &str = "reqtrail";

/// Startup settings. Serializable so they can be passed straight to
/// [`Logger::log_app_start`](crate::Logger::log_app_start).
#[derive(Clone, Debug, Serialize)]
pub struct Settings {
    pub app_name: String,
    #[serde(serialize_with = "serialize_level")]
    pub log_level: Level,
    pub http_addr: SocketAddr,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, which returns `None` for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let read = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let log_level: Level = read("LOG_LEVEL", DEFAULT_LEVEL).parse()?;

        let addr = read("HTTP_ADDR", DEFAULT_ADDR);
        let http_addr = addr
            .parse::<SocketAddr>()
            .map_err(|source| Error::InvalidAddress { addr, source })?;

        let settings = Self {
            app_name: read("APP_NAME", DEFAULT_APP_NAME),
            log_level,
            http_addr,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.app_name.trim().is_empty() {
            return Err(Error::Config("APP_NAME cannot be empty".into()));
        }
        if self.http_addr.port() == 0 {
            return Err(Error::Config("HTTP_ADDR port cannot be 0".into()));
        }
        Ok(())
    }
}

fn serialize_level<S: serde::Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&level.as_str().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.log_level, Level::Info);
        assert_eq!(settings.http_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(settings.app_name, "reqtrail");
    }

    #[test]
    fn overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("LOG_LEVEL", "WARN"),
            ("HTTP_ADDR", "127.0.0.1:8080"),
            ("APP_NAME", "billing"),
        ]))
        .unwrap();
        assert_eq!(settings.log_level, Level::Warn);
        assert_eq!(settings.http_addr.port(), 8080);
        assert_eq!(settings.app_name, "billing");
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = Settings::from_lookup(lookup(&[("LOG_LEVEL", "loud")])).unwrap_err();
        assert!(matches!(err, Error::InvalidLevel(_)));
    }

    #[test]
    fn bad_address_and_port_zero_are_rejected() {
        let err = Settings::from_lookup(lookup(&[("HTTP_ADDR", "localhost")])).unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));

        let err = Settings::from_lookup(lookup(&[("HTTP_ADDR", "127.0.0.1:0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn serializes_for_the_start_record() {
        let settings = Settings::from_lookup(lookup(&[("LOG_LEVEL", "debug")])).unwrap();
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["log_level"], "debug");
        assert_eq!(value["http_addr"], "0.0.0.0:3000");
    }
}
