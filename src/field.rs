//! Structured key/value attributes attached to a record.

use std::borrow::Cow;

use serde::Serialize;
use serde_json::Value;

/// One structured attribute.
///
/// Keys are usually `&'static str` literals; owned keys are accepted for
/// attributes whose names come from data (startup arguments, for example).
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub(crate) key: Cow<'static, str>,
    pub(crate) value: Value,
}

impl Field {
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    pub fn string(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        Self::new(key, value)
    }

    pub fn uint(key: impl Into<Cow<'static, str>>, value: u64) -> Self {
        Self::new(key, value)
    }

    /// Non-finite floats have no JSON form and are written as `null`.
    pub fn float(key: impl Into<Cow<'static, str>>, value: f64) -> Self {
        Self::new(key, value)
    }

    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Self {
        Self::new(key, value)
    }

    /// Serializes any value into the attribute, nested structures included.
    ///
    /// If serialization fails the attribute is replaced by `<key>Error`
    /// holding the error text, so the record is still written.
    pub fn any<T: Serialize + ?Sized>(key: impl Into<Cow<'static, str>>, value: &T) -> Self {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => Self { key, value },
            Err(e) => Self::string(format!("{key}Error"), e.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}
