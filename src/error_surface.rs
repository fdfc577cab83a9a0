//! The last failure seen by a manager.

use log::error;

use crate::error::Error;
use crate::formatter::ApiErrorResponse;

/// Most recent failure artifacts. Replaced on every call, never accumulated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorRecord {
    body: Option<String>,
    response: Option<ApiErrorResponse>,
    failure: Option<String>,
}

impl ErrorRecord {
    pub fn clear(&mut self) {
        *self = ErrorRecord::default();
    }

    /// Record an API error envelope together with the raw body
    pub fn record_api(&mut self, body: &str, response: ApiErrorResponse) {
        *self = ErrorRecord {
            failure: response.description.clone(),
            body: Some(body.to_string()),
            response: Some(response),
        };
    }

    /// Record a body that could not be decoded
    pub fn record_body(&mut self, body: &str, err: &Error) {
        *self = ErrorRecord {
            body: Some(body.to_string()),
            response: None,
            failure: Some(err.to_string()),
        };
    }

    /// Record a failure that produced no body
    pub fn record_failure(&mut self, err: &Error) {
        *self = ErrorRecord {
            body: None,
            response: None,
            failure: Some(err.to_string()),
        };
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_none() && self.response.is_none() && self.failure.is_none()
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn response(&self) -> Option<&ApiErrorResponse> {
        self.response.as_ref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Log the record, falling back to `default_message` when empty
    pub fn print(&self, default_message: &str) {
        match (&self.response, &self.body) {
            (Some(response), Some(body)) => error!(
                "Last API error ({}): {} | body: {}",
                response
                    .error_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                response.description_or(default_message),
                body
            ),
            (None, Some(body)) => error!(
                "Last error: {} | body: {}",
                self.failure.as_deref().unwrap_or(default_message),
                body
            ),
            _ => error!("Last error: {}", self.failure.as_deref().unwrap_or(default_message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAILURE: &str = r#"{"ok":false,"error_code":400,"description":"bad request"}"#;

    #[test]
    fn test_new_record_is_empty() {
        let record = ErrorRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.body(), None);
        assert_eq!(record.response(), None);
    }

    #[test]
    fn test_record_overwrites_previous() {
        let mut record = ErrorRecord::default();
        record.record_api(FAILURE, ApiErrorResponse::detect(FAILURE).unwrap());
        assert_eq!(record.body(), Some(FAILURE));
        assert_eq!(record.failure(), Some("bad request"));

        record.record_failure(&Error::configuration("no token"));
        assert_eq!(record.body(), None);
        assert!(record.response().is_none());
        assert_eq!(record.failure(), Some("Configuration error: no token"));

        record.clear();
        assert!(record.is_empty());
    }

    #[test]
    fn test_record_body_keeps_raw_text() {
        let mut record = ErrorRecord::default();
        record.record_body("<html>502</html>", &Error::malformed("not json"));
        assert_eq!(record.body(), Some("<html>502</html>"));
        assert!(record.response().is_none());
    }
}
