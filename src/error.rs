use thiserror::Error;

/// Error types for tgcore operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed local input; never sent over the wire
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error (missing or invalid settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport failure: connection refused, timeout, unreadable body
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local I/O failure (reading an upload, the settings file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The body is not JSON, or lacks the shape the decoder expects
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The Bot API answered with `"ok": false`
    #[error("Telegram API error{}: {description}", .code.map(|c| format!(" ({})", c)).unwrap_or_default())]
    Api {
        code: Option<i64>,
        description: String,
    },
}

impl Error {
    /// Create a new invalid argument error
    pub fn invalid_argument<S: AsRef<str>>(message: S) -> Self {
        Error::InvalidArgument(message.as_ref().to_string())
    }

    /// Create a new configuration error
    pub fn configuration<S: AsRef<str>>(message: S) -> Self {
        Error::Configuration(message.as_ref().to_string())
    }

    /// Create a new malformed response error
    pub fn malformed<S: AsRef<str>>(message: S) -> Self {
        Error::MalformedResponse(message.as_ref().to_string())
    }

    /// Create a new API error
    pub fn api<S: AsRef<str>>(code: Option<i64>, description: S) -> Self {
        Error::Api {
            code,
            description: description.as_ref().to_string(),
        }
    }

    /// Whether the failure happened before a response was received
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    /// Whether the remote API rejected the call
    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = Error::api(Some(400), "Bad Request: chat not found");
        assert_eq!(
            err.to_string(),
            "Telegram API error (400): Bad Request: chat not found"
        );

        let err = Error::api(None, "bad request");
        assert_eq!(err.to_string(), "Telegram API error: bad request");
        assert!(err.is_api());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
