use crate::error::Error;
use log::{error, trace};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Shape a caller wants the response in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnFormat {
    /// Typed value decoded from the `result` field
    #[default]
    DomainObject,
    /// The whole body as a generic JSON tree
    JsonStructure,
    /// The body exactly as received
    RawString,
}

/// A decoded response in the shape that was asked for
#[derive(Debug, Clone, PartialEq)]
pub enum Formatted<T> {
    Domain(T),
    Json(Value),
    Raw(String),
}

impl<T> Formatted<T> {
    pub fn format(&self) -> ReturnFormat {
        match self {
            Formatted::Domain(_) => ReturnFormat::DomainObject,
            Formatted::Json(_) => ReturnFormat::JsonStructure,
            Formatted::Raw(_) => ReturnFormat::RawString,
        }
    }

    pub fn into_domain(self) -> Option<T> {
        match self {
            Formatted::Domain(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Formatted::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_raw(self) -> Option<String> {
        match self {
            Formatted::Raw(body) => Some(body),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Formatted<U> {
        match self {
            Formatted::Domain(value) => Formatted::Domain(f(value)),
            Formatted::Json(value) => Formatted::Json(value),
            Formatted::Raw(body) => Formatted::Raw(body),
        }
    }
}

/// Error parameters attached to some failures
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseParameters {
    #[serde(default)]
    pub migrate_to_chat_id: Option<i64>,
    #[serde(default)]
    pub retry_after: Option<i64>,
}

/// The `"ok": false` envelope of a failed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    pub error_code: Option<i64>,
    pub description: Option<String>,
    pub parameters: Option<ResponseParameters>,
}

impl ApiErrorResponse {
    /// Parse `body` as an error envelope; `None` unless it is JSON with `"ok": false`
    pub fn detect(body: &str) -> Option<ApiErrorResponse> {
        let value: Value = serde_json::from_str(body).ok()?;
        Self::from_value(&value)
    }

    /// Read an envelope out of a parsed body.
    ///
    /// Only `"ok": false` decides; the other fields are read leniently so an
    /// oddly typed one never hides the failure.
    pub fn from_value(value: &Value) -> Option<ApiErrorResponse> {
        if value.get("ok").and_then(Value::as_bool) != Some(false) {
            return None;
        }

        let error_code = value.get("error_code").and_then(|code| match code {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });
        let description = value.get("description").and_then(|d| match d {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        });
        let parameters = value
            .get("parameters")
            .and_then(|p| serde_json::from_value(p.clone()).ok());

        Some(ApiErrorResponse {
            error_code,
            description,
            parameters,
        })
    }

    pub fn description_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.description.as_deref().unwrap_or(default)
    }

    pub fn to_error(&self) -> Error {
        Error::api(
            self.error_code,
            self.description_or("Unknown API error"),
        )
    }
}

/// Decodes raw response bodies into the requested [`ReturnFormat`].
///
/// Formatting is a pure function of its inputs.
pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Format `body` with an explicit decoder for the `result` field
    pub fn format<T, D>(body: &str, format: ReturnFormat, decoder: D) -> Result<Formatted<T>, Error>
    where
        D: FnOnce(Value) -> Result<T, serde_json::Error>,
    {
        match format {
            ReturnFormat::RawString => Ok(Formatted::Raw(body.to_string())),
            ReturnFormat::JsonStructure => Self::parse(body).map(Formatted::Json),
            ReturnFormat::DomainObject => {
                let mut value = Self::parse(body)?;

                if let Some(envelope) = ApiErrorResponse::from_value(&value) {
                    return Err(envelope.to_error());
                }

                let result = value
                    .get_mut("result")
                    .map(Value::take)
                    .ok_or_else(|| {
                        error!("Response has no result field");
                        Error::malformed("response has no result field")
                    })?;

                trace!("Decoding result: {}", result);
                decoder(result)
                    .map(Formatted::Domain)
                    .map_err(|e| Error::malformed(format!("unexpected result shape: {}", e)))
            }
        }
    }

    /// Format `body`, decoding the `result` field with serde
    pub fn format_as<T: DeserializeOwned>(
        body: &str,
        format: ReturnFormat,
    ) -> Result<Formatted<T>, Error> {
        Self::format(body, format, serde_json::from_value::<T>)
    }

    fn parse(body: &str) -> Result<Value, Error> {
        serde_json::from_str(body).map_err(|e| {
            error!("Failed to parse API response: {}", e);
            Error::malformed(format!("response is not valid JSON: {}", e))
        })
    }
}
