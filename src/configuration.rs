use crate::error::Error;
use std::time::Duration;

/// Default Bot API endpoint; the token is appended directly
pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org/bot";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Returned by the error accessors while no failure is recorded
pub const DEFAULT_ERROR_MESSAGE: &str = "No error";

/// Settings a manager is constructed with.
///
/// The manager only reads these, except for the default target which may be
/// changed through an explicit "set" or "set and save" call.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Telegram Bot API token
    bot_token: Option<String>,
    /// Message reported while no error is recorded
    default_error_message: String,
    /// Request timeout
    timeout: Duration,
    /// Base URL the token and endpoint name are appended to
    base_url: String,
    /// Target used when a call that needs one gets none
    default_target: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            bot_token: None,
            default_error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_target: None,
        }
    }
}

impl Configuration {
    /// Create a configuration with the given token and defaults for the rest
    pub fn new<S: AsRef<str>>(token: S) -> Self {
        let mut config = Configuration::default();
        config.set_bot_token(token);
        config
    }

    /// Set the Telegram Bot API token
    pub fn set_bot_token<S: AsRef<str>>(&mut self, token: S) {
        self.bot_token = Some(token.as_ref().to_string());
    }

    /// Get the Telegram Bot API token
    pub fn bot_token(&self) -> Result<&str, Error> {
        self.bot_token
            .as_deref()
            .ok_or_else(|| Error::configuration("Bot token not configured"))
    }

    /// Set the message reported while no error is recorded
    pub fn set_default_error_message<S: AsRef<str>>(&mut self, message: S) {
        self.default_error_message = message.as_ref().to_string();
    }

    pub fn default_error_message(&self) -> &str {
        &self.default_error_message
    }

    /// Set the request timeout
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set the base URL, e.g. a local Bot API server or a test double
    pub fn set_base_url<S: AsRef<str>>(&mut self, url: S) {
        self.base_url = url.as_ref().to_string();
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the default target identifier
    pub fn set_default_target<S: AsRef<str>>(&mut self, target: S) {
        let target = target.as_ref().to_string();
        self.default_target = if target.is_empty() { None } else { Some(target) };
    }

    pub fn default_target(&self) -> Option<&str> {
        self.default_target.as_deref()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Error> {
        let token = self.bot_token()?;
        if token.trim().is_empty() {
            return Err(Error::configuration("Bot token is empty"));
        }
        if token.contains('/') || token.chars().any(char::is_whitespace) {
            return Err(Error::configuration(
                "Bot token must not contain '/' or whitespace",
            ));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::configuration(format!(
                "Invalid base URL: '{}'. Must start with http:// or https://",
                self.base_url
            )));
        }

        if self.timeout.is_zero() {
            return Err(Error::configuration("Timeout must be greater than zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert!(config.bot_token().is_err());
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.default_error_message(), DEFAULT_ERROR_MESSAGE);
        assert_eq!(config.default_target(), None);
    }

    #[test]
    fn test_validate() {
        assert!(Configuration::default().validate().is_err());
        assert!(Configuration::new("123:ABC").validate().is_ok());
        assert!(Configuration::new("   ").validate().is_err());
        assert!(Configuration::new("123/ABC").validate().is_err());

        let mut config = Configuration::new("123:ABC");
        config.set_base_url("ftp://example.com");
        assert!(config.validate().is_err());

        let mut config = Configuration::new("123:ABC");
        config.set_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_default_target_clears_it() {
        let mut config = Configuration::new("t");
        config.set_default_target("@news");
        assert_eq!(config.default_target(), Some("@news"));
        config.set_default_target("");
        assert_eq!(config.default_target(), None);
    }
}
