//! The JSON record written for every emitted log call.
//!
//! Layout, in order:
//!
//! ```text
//! {"level":"INFO","time":"2026-10-16T09:15:02.123+0200","message":"…", <fields…>}
//! ```
//!
//! Field keys are unique within a record. A later field replaces an earlier
//! one with the same key in place, and fields that would shadow `level`,
//! `time` or `message` are dropped.

use chrono::{DateTime, Local};
use serde_json::{Map, Value};

use crate::field::Field;
use crate::level::Level;

pub const MESSAGE_KEY: &str = "message";
pub const LEVEL_KEY: &str = "level";
pub const TIME_KEY: &str = "time";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// A single log record, built per call and dropped once written.
pub(crate) struct Record<'a> {
    pub level: Level,
    pub time: DateTime<Local>,
    pub message: &'a str,
    pub context: &'a [Field],
    pub fields: &'a [Field],
}

impl Record<'_> {
    pub fn to_object(&self) -> Map<String, Value> {
        let mut object = Map::with_capacity(3 + self.context.len() + self.fields.len());
        object.insert(LEVEL_KEY.to_owned(), Value::from(self.level.as_str()));
        object.insert(TIME_KEY.to_owned(), Value::from(self.time.format(TIME_FORMAT).to_string()));
        object.insert(MESSAGE_KEY.to_owned(), Value::from(self.message));

        for field in self.context.iter().chain(self.fields) {
            if is_reserved(&field.key) {
                continue;
            }
            object.insert(field.key.to_string(), field.value.clone());
        }
        object
    }

    /// Serializes the record as one JSON line, newline included.
    pub fn to_line(&self) -> Vec<u8> {
        // A map of string keys to `Value`s always serializes.
        let mut line = serde_json::to_vec(&self.to_object()).unwrap_or_default();
        line.push(b'\n');
        line
    }
}

fn is_reserved(key: &str) -> bool {
    matches!(key, MESSAGE_KEY | LEVEL_KEY | TIME_KEY)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 9, 15, 2).single().unwrap()
    }

    #[test]
    fn core_keys_come_first() {
        let fields = [Field::string("type", "access")];
        let record = Record {
            level: Level::Warn,
            time: fixed_time(),
            message: "hello",
            context: &[],
            fields: &fields,
        };

        let keys: Vec<_> = record.to_object().keys().cloned().collect();
        assert_eq!(keys, ["level", "time", "message", "type"]);
    }

    #[test]
    fn time_is_iso8601_with_millis_and_offset() {
        let record = Record { level: Level::Info, time: fixed_time(), message: "", context: &[], fields: &[] };
        let object = record.to_object();
        let time = object["time"].as_str().unwrap();

        assert!(time.starts_with("2026-10-16T09:15:02.000"), "{time}");
        assert!(DateTime::parse_from_str(time, TIME_FORMAT).is_ok());
    }

    #[test]
    fn later_fields_replace_earlier_ones_in_place() {
        let context = [Field::string("correlation_id", "a"), Field::int("n", 1)];
        let fields = [Field::string("correlation_id", "b")];
        let record = Record { level: Level::Info, time: fixed_time(), message: "m", context: &context, fields: &fields };

        let object = record.to_object();
        let keys: Vec<_> = object.keys().cloned().collect();
        assert_eq!(keys, ["level", "time", "message", "correlation_id", "n"]);
        assert_eq!(object["correlation_id"], json!("b"));
    }

    #[test]
    fn reserved_keys_cannot_be_shadowed() {
        let fields = [Field::string("message", "spoofed"), Field::string("level", "FATAL")];
        let record = Record { level: Level::Debug, time: fixed_time(), message: "real", context: &[], fields: &fields };

        let object = record.to_object();
        assert_eq!(object["message"], json!("real"));
        assert_eq!(object["level"], json!("DEBUG"));
        assert_eq!(object.len(), 3);
    }

    #[test]
    fn line_is_newline_terminated_json() {
        let record = Record { level: Level::Error, time: fixed_time(), message: "boom", context: &[], fields: &[] };
        let line = record.to_line();

        assert_eq!(line.last(), Some(&b'\n'));
        let value: Value = serde_json::from_slice(&line).unwrap();
        assert_eq!(value["level"], json!("ERROR"));
    }
}
