use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::configuration::Configuration;
use crate::endpoint::{self, Endpoint, TargetRule};
use crate::error::Error;
use crate::error_surface::ErrorRecord;
use crate::formatter::{ApiErrorResponse, Formatted, ResponseFormatter, ReturnFormat};
use crate::input::{InputFile, InputMedia};
use crate::params::{ParamValue, Params};
use crate::payload::{self, CHAT_ID};
use crate::store::{SettingsStore, DEFAULT_TARGET_KEY};
use crate::target::Target;
use crate::transport::{ApiRequest, ContentType, HttpTransport, Transport};
use crate::types::{Chat, ChatMember, File, Message, MessageId, Update, User};

/// Executes Bot API calls for one bot token.
///
/// Every call is one blocking HTTP round trip. The last failure is kept on
/// the instance and replaced by the next call; calls take `&mut self`, so
/// share a manager across threads only behind a lock.
pub struct Manager {
    config: Configuration,
    transport: Box<dyn Transport>,
    store: Option<Box<dyn SettingsStore>>,
    last_error: ErrorRecord,
}

impl Manager {
    /// Create a manager talking HTTP to the configured base URL
    pub fn new(config: Configuration) -> Result<Self, Error> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Box::new(transport)))
    }

    /// Create a manager on top of any transport
    pub fn with_transport(config: Configuration, transport: Box<dyn Transport>) -> Self {
        Manager {
            config,
            transport,
            store: None,
            last_error: ErrorRecord::default(),
        }
    }

    /// Attach a settings store.
    ///
    /// A default target saved in the store is used unless the configuration
    /// already names one.
    pub fn with_store(mut self, store: Box<dyn SettingsStore>) -> Result<Self, Error> {
        if self.config.default_target().is_none() {
            if let Some(saved) = store.get(DEFAULT_TARGET_KEY)? {
                debug!("Loaded default target from settings store");
                self.config.set_default_target(saved);
            }
        }
        self.store = Some(store);
        Ok(self)
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn default_target(&self) -> Option<&str> {
        self.config.default_target()
    }

    /// Change the default target for this manager only
    pub fn set_default_target<T: Into<Target>>(&mut self, target: T) {
        self.config.set_default_target(target.into().resolve());
    }

    /// Change the default target and persist it through the settings store
    pub fn save_default_target<T: Into<Target>>(&mut self, target: T) -> Result<(), Error> {
        let resolved = target.into().resolve();
        let store = self
            .store
            .as_mut()
            .ok_or_else(|| Error::configuration("No settings store attached"))?;
        store.set(DEFAULT_TARGET_KEY, &resolved)?;
        self.config.set_default_target(resolved);
        Ok(())
    }

    /// The error envelope of the last failed call, if it produced one
    pub fn last_error_response(&self) -> Option<&ApiErrorResponse> {
        self.last_error.response()
    }

    /// The raw body of the last failed call, or the default error message
    pub fn last_error_body(&self) -> &str {
        self.last_error
            .body()
            .unwrap_or_else(|| self.config.default_error_message())
    }

    /// Human-readable reason of the last failure, or the default error message
    pub fn last_error_description(&self) -> &str {
        self.last_error
            .failure()
            .unwrap_or_else(|| self.config.default_error_message())
    }

    pub fn last_error(&self) -> &ErrorRecord {
        &self.last_error
    }

    /// Log the last failure at error level
    pub fn print_last_error(&self) {
        self.last_error.print(self.config.default_error_message());
    }

    /// Build the request for `endpoint` and check it is complete.
    ///
    /// A required target falls back to the default target. Any required
    /// field missing from the final payload is an `InvalidArgument`.
    pub fn build_request(
        &self,
        endpoint: &Endpoint,
        target: Option<Target>,
        fields: Vec<(&str, ParamValue)>,
        extras: Option<&Params>,
    ) -> Result<ApiRequest, Error> {
        Self::reject_batch(endpoint)?;
        let target = self.effective_target(endpoint, target)?;
        let params = payload::build_payload(target.as_ref(), extras, fields)?;
        let mut request = ApiRequest::new(endpoint.name, params).with_method(endpoint.method);
        if endpoint.media.is_some() {
            request = request.with_content_type(ContentType::Multipart);
        }
        Self::check_complete(endpoint, &request)?;
        Ok(request)
    }

    /// Call any endpoint, decoding its result with serde
    pub fn call<T: DeserializeOwned>(
        &mut self,
        endpoint: &Endpoint,
        target: Option<Target>,
        fields: Vec<(&str, ParamValue)>,
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<T>, Error> {
        let request = self.build_request(endpoint, target, fields, extras)?;
        self.send_request(&request, format, serde_json::from_value::<T>)
    }

    /// Dispatch a built request and format the response
    pub fn send_request<T, D>(
        &mut self,
        request: &ApiRequest,
        format: ReturnFormat,
        decoder: D,
    ) -> Result<Formatted<T>, Error>
    where
        D: FnOnce(Value) -> Result<T, serde_json::Error>,
    {
        info!("Calling {}", request.endpoint());

        let body = match self.transport.send(request) {
            Ok(body) => body,
            Err(e) => {
                self.last_error.record_failure(&e);
                return Err(e);
            }
        };

        if let Some(envelope) = ApiErrorResponse::detect(&body) {
            let err = envelope.to_error();
            error!("{} failed: {}", request.endpoint(), err);
            self.last_error.record_api(&body, envelope);
            return Err(err);
        }

        match ResponseFormatter::format(&body, format, decoder) {
            Ok(formatted) => {
                self.last_error.clear();
                Ok(formatted)
            }
            Err(e) => {
                error!("{} returned an unusable response: {}", request.endpoint(), e);
                self.last_error.record_body(&body, &e);
                Err(e)
            }
        }
    }

    fn effective_target(&self, endpoint: &Endpoint, target: Option<Target>) -> Result<Option<Target>, Error> {
        match endpoint.target {
            TargetRule::None => {
                if target.is_some() {
                    return Err(Error::invalid_argument(format!(
                        "{} does not address a chat",
                        endpoint.name
                    )));
                }
                Ok(None)
            }
            TargetRule::Optional => Ok(target),
            TargetRule::Required => target
                .or_else(|| self.config.default_target().map(Target::from))
                .map(Some)
                .ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "{} needs a target and no default target is set",
                        endpoint.name
                    ))
                }),
        }
    }

    fn reject_batch(endpoint: &Endpoint) -> Result<(), Error> {
        if endpoint.batch {
            return Err(Error::invalid_argument(format!(
                "{} takes a list of media; use send_media_group",
                endpoint.name
            )));
        }
        Ok(())
    }

    fn check_complete(endpoint: &Endpoint, request: &ApiRequest) -> Result<(), Error> {
        let params = request.params();
        if endpoint.target == TargetRule::Required && !params.contains_key(CHAT_ID) {
            return Err(Error::invalid_argument(format!(
                "{} is missing {}",
                endpoint.name, CHAT_ID
            )));
        }

        let missing: Vec<&str> = endpoint
            .required
            .iter()
            .copied()
            .filter(|key| !params.contains_key(key))
            .collect();
        if !missing.is_empty() {
            return Err(Error::invalid_argument(format!(
                "{} is missing required fields: {}",
                endpoint.name,
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// Upload one file to a media endpoint such as `sendPhoto`
    pub fn send_media(
        &mut self,
        endpoint: &Endpoint,
        target: Option<Target>,
        media: InputFile,
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<Message>, Error> {
        let field = endpoint.media.ok_or_else(|| {
            Error::invalid_argument(format!("{} is not a media endpoint", endpoint.name))
        })?;
        Self::reject_batch(endpoint)?;
        let target = self.effective_target(endpoint, target)?;
        let request = payload::build_media_payload(endpoint.name, target.as_ref(), field, media, extras)?
            .with_method(endpoint.method);
        Self::check_complete(endpoint, &request)?;
        self.send_request(&request, format, serde_json::from_value::<Message>)
    }

    pub fn get_me(&mut self, format: ReturnFormat) -> Result<Formatted<User>, Error> {
        self.call(&endpoint::GET_ME, None, vec![], None, format)
    }

    pub fn get_updates(
        &mut self,
        offset: Option<i64>,
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<Vec<Update>>, Error> {
        let fields = offset
            .map(|o| vec![("offset", ParamValue::Integer(o))])
            .unwrap_or_default();
        self.call(&endpoint::GET_UPDATES, None, fields, extras, format)
    }

    /// Send a text message
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tgcore::{Configuration, Manager, ReturnFormat};
    ///
    /// let mut manager = Manager::new(Configuration::new("123:ABC")).unwrap();
    /// let sent = manager
    ///     .send_message(Some("@my_channel".into()), "Hello!", None, ReturnFormat::DomainObject)
    ///     .unwrap();
    /// println!("{:?}", sent.into_domain().map(|m| m.message_id));
    /// ```
    pub fn send_message<S: AsRef<str>>(
        &mut self,
        target: Option<Target>,
        text: S,
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<Message>, Error> {
        let fields = vec![("text", ParamValue::from(text.as_ref()))];
        self.call(&endpoint::SEND_MESSAGE, target, fields, extras, format)
    }

    pub fn send_photo(
        &mut self,
        target: Option<Target>,
        photo: InputFile,
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<Message>, Error> {
        self.send_media(&endpoint::SEND_PHOTO, target, photo, extras, format)
    }

    pub fn send_document(
        &mut self,
        target: Option<Target>,
        document: InputFile,
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<Message>, Error> {
        self.send_media(&endpoint::SEND_DOCUMENT, target, document, extras, format)
    }

    /// Send an album; the result is one message per item
    pub fn send_media_group(
        &mut self,
        target: Option<Target>,
        items: &[InputMedia],
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<Vec<Message>>, Error> {
        let endpoint = &endpoint::SEND_MEDIA_GROUP;
        let target = self.effective_target(endpoint, target)?;
        let request = payload::build_media_group_payload(endpoint.name, target.as_ref(), items, extras)?;
        Self::check_complete(endpoint, &request)?;
        self.send_request(&request, format, serde_json::from_value::<Vec<Message>>)
    }

    pub fn forward_message(
        &mut self,
        target: Option<Target>,
        from: Target,
        message_id: i64,
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<Message>, Error> {
        let fields = vec![
            ("from_chat_id", ParamValue::Text(from.resolve())),
            ("message_id", ParamValue::Integer(message_id)),
        ];
        self.call(&endpoint::FORWARD_MESSAGE, target, fields, extras, format)
    }

    /// Forward several messages of `from` at once
    pub fn forward_messages(
        &mut self,
        target: Option<Target>,
        from: Target,
        message_ids: &[i64],
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<Vec<MessageId>>, Error> {
        let fields = Self::batch_fields(&from, message_ids)?;
        self.call(&endpoint::FORWARD_MESSAGES, target, fields, extras, format)
    }

    pub fn copy_message(
        &mut self,
        target: Option<Target>,
        from: Target,
        message_id: i64,
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<MessageId>, Error> {
        let fields = vec![
            ("from_chat_id", ParamValue::Text(from.resolve())),
            ("message_id", ParamValue::Integer(message_id)),
        ];
        self.call(&endpoint::COPY_MESSAGE, target, fields, extras, format)
    }

    pub fn copy_messages(
        &mut self,
        target: Option<Target>,
        from: Target,
        message_ids: &[i64],
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<Vec<MessageId>>, Error> {
        let fields = Self::batch_fields(&from, message_ids)?;
        self.call(&endpoint::COPY_MESSAGES, target, fields, extras, format)
    }

    // `from_chat_id` always comes from the source chat, never from a message id
    fn batch_fields(from: &Target, message_ids: &[i64]) -> Result<Vec<(&'static str, ParamValue)>, Error> {
        if message_ids.is_empty() {
            return Err(Error::invalid_argument("message_ids must not be empty"));
        }
        Ok(vec![
            ("from_chat_id", ParamValue::Text(from.resolve())),
            (
                "message_ids",
                ParamValue::JsonList(message_ids.iter().map(|id| Value::from(*id)).collect()),
            ),
        ])
    }

    pub fn send_location(
        &mut self,
        target: Option<Target>,
        latitude: f64,
        longitude: f64,
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<Message>, Error> {
        let fields = vec![
            ("latitude", ParamValue::Float(latitude)),
            ("longitude", ParamValue::Float(longitude)),
        ];
        self.call(&endpoint::SEND_LOCATION, target, fields, extras, format)
    }

    pub fn send_poll<S: AsRef<str>>(
        &mut self,
        target: Option<Target>,
        question: &str,
        options: &[S],
        extras: Option<&Params>,
        format: ReturnFormat,
    ) -> Result<Formatted<Message>, Error> {
        if options.len() < 2 {
            return Err(Error::invalid_argument("a poll needs at least two options"));
        }
        let fields = vec![
            ("question", ParamValue::from(question)),
            (
                "options",
                ParamValue::JsonList(
                    options
                        .iter()
                        .map(|o| Value::String(o.as_ref().to_string()))
                        .collect(),
                ),
            ),
        ];
        self.call(&endpoint::SEND_POLL, target, fields, extras, format)
    }

    /// Show a status such as `typing` in the chat
    pub fn send_chat_action(
        &mut self,
        target: Option<Target>,
        action: &str,
        format: ReturnFormat,
    ) -> Result<Formatted<bool>, Error> {
        self.call(
            &endpoint::SEND_CHAT_ACTION,
            target,
            vec![("action", ParamValue::from(action))],
            None,
            format,
        )
    }

    pub fn delete_message(
        &mut self,
        target: Option<Target>,
        message_id: i64,
        format: ReturnFormat,
    ) -> Result<Formatted<bool>, Error> {
        self.call(
            &endpoint::DELETE_MESSAGE,
            target,
            vec![("message_id", ParamValue::Integer(message_id))],
            None,
            format,
        )
    }

    pub fn get_chat(&mut self, target: Option<Target>, format: ReturnFormat) -> Result<Formatted<Chat>, Error> {
        self.call(&endpoint::GET_CHAT, target, vec![], None, format)
    }

    pub fn get_chat_member(
        &mut self,
        target: Option<Target>,
        user_id: i64,
        format: ReturnFormat,
    ) -> Result<Formatted<ChatMember>, Error> {
        self.call(
            &endpoint::GET_CHAT_MEMBER,
            target,
            vec![("user_id", ParamValue::Integer(user_id))],
            None,
            format,
        )
    }

    pub fn get_file(&mut self, file_id: &str, format: ReturnFormat) -> Result<Formatted<File>, Error> {
        self.call(
            &endpoint::GET_FILE,
            None,
            vec![("file_id", ParamValue::from(file_id))],
            None,
            format,
        )
    }
}
