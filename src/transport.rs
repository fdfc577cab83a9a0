use log::{debug, error, info};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client as ReqwestClient;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use crate::configuration::Configuration;
use crate::error::Error;
use crate::input::InputFile;
use crate::params::{ParamValue, Params};

/// HTTP method of a Bot API call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Body encoding of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// `application/x-www-form-urlencoded`
    Form,
    /// `multipart/form-data`
    Multipart,
}

/// A fully built call: endpoint name, parameters and how to send them
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    endpoint: String,
    params: Params,
    method: HttpMethod,
    content_type: Option<ContentType>,
}

impl ApiRequest {
    /// A POST request with no content type override
    pub fn new<S: Into<String>>(endpoint: S, params: Params) -> Self {
        ApiRequest {
            endpoint: endpoint.into(),
            params,
            method: HttpMethod::Post,
            content_type: None,
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The override set by the caller, if any
    pub fn content_type_override(&self) -> Option<ContentType> {
        self.content_type
    }

    /// The encoding actually used: byte content always forces multipart
    pub fn content_type(&self) -> ContentType {
        if self.params.has_binary() {
            return ContentType::Multipart;
        }
        self.content_type.unwrap_or(ContentType::Form)
    }
}

/// Sends a built request and hands back the raw response body.
///
/// Implementations report transport failures only. A body carrying an API
/// error is still a successful transport result.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<String, Error>;
}

/// Blocking HTTP transport for the Telegram Bot API
pub struct HttpTransport {
    client: ReqwestClient,
    base_url: String,
    token: String,
}

impl HttpTransport {
    /// Create a transport from a validated configuration
    pub fn new(config: &Configuration) -> Result<Self, Error> {
        config.validate()?;
        let token = config.bot_token()?.to_string();

        let client = ReqwestClient::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(HttpTransport {
            client,
            base_url: config.base_url().to_string(),
            token,
        })
    }

    /// Create a transport from explicit parts, skipping configuration checks
    pub fn with_timeout(base_url: &str, token: &str, timeout: Duration) -> Result<Self, Error> {
        let client = ReqwestClient::builder().timeout(timeout).build()?;
        Ok(HttpTransport {
            client,
            base_url: base_url.to_string(),
            token: token.to_string(),
        })
    }

    /// `base_url + token + "/" + endpoint`
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}/{}", self.base_url, self.token, endpoint)
    }

    fn multipart_form(params: &Params) -> Result<Form, Error> {
        let mut form = Form::new();
        for (key, value) in params.iter() {
            form = match value {
                ParamValue::File(InputFile::Bytes { file_name, data }) => {
                    let part = Part::bytes(data.clone())
                        .file_name(file_name.clone())
                        .mime_str("application/octet-stream")?;
                    form.part(key.to_string(), part)
                }
                other => match other.wire_value() {
                    Some(text) => form.text(key.to_string(), text.into_owned()),
                    None => form,
                },
            };
        }
        Ok(form)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<String, Error> {
        let url = self.endpoint_url(request.endpoint());
        let query = request.params().create_query_string();

        debug!(
            "Dispatching {} ({:?}, {:?}, {} params)",
            request.endpoint(),
            request.method(),
            request.content_type(),
            request.params().len()
        );

        let builder = match (request.method(), request.content_type()) {
            (_, ContentType::Multipart) => self
                .client
                .post(&url)
                .multipart(Self::multipart_form(request.params())?),
            (HttpMethod::Get, ContentType::Form) => {
                let url = if query.is_empty() {
                    url
                } else {
                    format!("{}?{}", url, query)
                };
                self.client.get(url)
            }
            (HttpMethod::Post, ContentType::Form) => self
                .client
                .post(&url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(query),
        };

        // reqwest errors carry the request URL, which embeds the token
        let response = builder.send().map_err(|e| {
            let e = e.without_url();
            error!("HTTP request to {} failed: {}", request.endpoint(), e);
            Error::Http(e)
        })?;

        info!(
            "Received response for {} with status code: {}",
            request.endpoint(),
            response.status()
        );

        response.text().map_err(|e| {
            let e = e.without_url();
            error!("Unable to read response body for {}: {}", request.endpoint(), e);
            Error::Http(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_composition() {
        let transport = HttpTransport::with_timeout(
            "https://api.telegram.org/bot",
            "123:ABC",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            transport.endpoint_url("sendMessage"),
            "https://api.telegram.org/bot123:ABC/sendMessage"
        );
    }

    #[test]
    fn test_binary_forces_multipart() {
        let params = Params::new()
            .with("document", InputFile::bytes("a.txt", b"hello".to_vec()))
            .unwrap();
        let request = ApiRequest::new("sendDocument", params);

        assert_eq!(request.content_type_override(), None);
        assert_eq!(request.content_type(), ContentType::Multipart);
    }

    #[test]
    fn test_default_request_is_form_post() {
        let request = ApiRequest::new("getMe", Params::new());
        assert_eq!(request.method(), HttpMethod::Post);
        assert_eq!(request.content_type(), ContentType::Form);

        let request = request
            .with_method(HttpMethod::Get)
            .with_content_type(ContentType::Multipart);
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.content_type(), ContentType::Multipart);
    }

    #[test]
    fn test_new_rejects_missing_token() {
        let config = Configuration::default();
        assert!(matches!(
            HttpTransport::new(&config),
            Err(Error::Configuration(_))
        ));
    }
}
