//! Ordered request parameters and their wire encoding.

use std::borrow::Cow;

use log::trace;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::error::Error;
use crate::input::InputFile;

/// Characters left as-is in query strings (RFC 3986 unreserved)
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A single parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Nested object, sent as compact JSON
    Json(Value),
    /// List of structured values, sent as a JSON array
    JsonList(Vec<Value>),
    File(InputFile),
}

impl ParamValue {
    /// Text representation on the wire; `None` for byte content
    pub fn wire_value(&self) -> Option<Cow<'_, str>> {
        match self {
            ParamValue::Text(s) => Some(Cow::Borrowed(s)),
            ParamValue::Integer(n) => Some(Cow::Owned(n.to_string())),
            ParamValue::Float(n) => Some(Cow::Owned(n.to_string())),
            ParamValue::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            ParamValue::Json(Value::String(s)) => Some(Cow::Borrowed(s)),
            ParamValue::Json(v) => Some(Cow::Owned(v.to_string())),
            ParamValue::JsonList(items) => Some(Cow::Owned(Value::Array(items.clone()).to_string())),
            ParamValue::File(file) => file.as_text().map(Cow::Borrowed),
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, ParamValue::File(file) if file.is_bytes())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(value as i64)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(value as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::Json(value)
    }
}

impl From<Vec<Value>> for ParamValue {
    fn from(value: Vec<Value>) -> Self {
        ParamValue::JsonList(value)
    }
}

impl From<InputFile> for ParamValue {
    fn from(value: InputFile) -> Self {
        ParamValue::File(value)
    }
}

/// The ordered key/value payload of one API call.
///
/// Keys are unique. Adding an existing key replaces its value and keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Params::default()
    }

    /// Insert or overwrite a parameter. Fails only on an empty key.
    pub fn add_param<K, V>(&mut self, key: K, value: V) -> Result<&mut Self, Error>
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::invalid_argument("parameter key must not be empty"));
        }

        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => {
                trace!("Overwriting parameter '{}'", key);
                entry.1 = value;
            }
            None => self.entries.push((key, value)),
        }
        Ok(self)
    }

    /// Builder form of [`Params::add_param`]
    pub fn with<K, V>(mut self, key: K, value: V) -> Result<Self, Error>
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.add_param(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Copy every pair of `other` into this set, overwriting on collision
    pub fn merge(&mut self, other: &Params) {
        for (key, value) in &other.entries {
            match self.entries.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = value.clone(),
                None => self.entries.push((key.clone(), value.clone())),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether any value is byte content that needs a multipart body
    pub fn has_binary(&self) -> bool {
        self.entries.iter().any(|(_, v)| v.is_binary())
    }

    /// Serialize into `key=value&...` in insertion order.
    ///
    /// Byte content is skipped; it can only travel in a multipart body.
    pub fn create_query_string(&self) -> String {
        self.entries
            .iter()
            .filter_map(|(key, value)| {
                value.wire_value().map(|wire| {
                    format!(
                        "{}={}",
                        utf8_percent_encode(key, QUERY_ENCODE_SET),
                        utf8_percent_encode(&wire, QUERY_ENCODE_SET)
                    )
                })
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Decode a query string produced by [`Params::create_query_string`]
    pub fn parse_query_string(query: &str) -> Result<Vec<(String, String)>, Error> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        query
            .split('&')
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                let key = percent_decode_str(key)
                    .decode_utf8()
                    .map_err(|e| Error::invalid_argument(format!("invalid query key: {}", e)))?;
                let value = percent_decode_str(value)
                    .decode_utf8()
                    .map_err(|e| Error::invalid_argument(format!("invalid query value: {}", e)))?;
                Ok((key.into_owned(), value.into_owned()))
            })
            .collect()
    }
}
