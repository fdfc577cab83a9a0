//! Payload assembly: target + caller parameters + mandatory fields.
//!
//! The caller's base set is copied, never mutated, so one set of extras can
//! be reused across calls. Mandatory fields are inserted last and therefore
//! win any key collision with the base set.

use log::trace;
use serde_json::Value;

use crate::error::Error;
use crate::input::{InputFile, InputMedia};
use crate::params::{ParamValue, Params};
use crate::target::{self, Target};
use crate::transport::{ApiRequest, ContentType};

/// Reserved key for the resolved target
pub const CHAT_ID: &str = "chat_id";

/// Reserved key of a media group's item list
pub const MEDIA: &str = "media";

/// Build the parameter set of a plain call
pub fn build_payload(
    target: Option<&Target>,
    base: Option<&Params>,
    required: Vec<(&str, ParamValue)>,
) -> Result<Params, Error> {
    let mut params = base.cloned().unwrap_or_default();

    if let Some(chat_id) = target::resolve(target) {
        params.add_param(CHAT_ID, chat_id)?;
    }

    for (key, value) in required {
        if params.contains_key(key) {
            trace!("Required field '{}' overrides caller value", key);
        }
        params.add_param(key, value)?;
    }

    Ok(params)
}

/// Build a single-media upload request, marked multipart
pub fn build_media_payload(
    endpoint: &str,
    target: Option<&Target>,
    media_field: &str,
    media: InputFile,
    base: Option<&Params>,
) -> Result<ApiRequest, Error> {
    let params = build_payload(target, base, vec![(media_field, ParamValue::File(media))])?;
    Ok(ApiRequest::new(endpoint, params).with_content_type(ContentType::Multipart))
}

/// Build a media group request.
///
/// All item descriptors travel as one JSON array under `media`. Items with
/// byte content are referenced as `attach://fileN` and attached under `fileN`.
pub fn build_media_group_payload(
    endpoint: &str,
    target: Option<&Target>,
    items: &[InputMedia],
    base: Option<&Params>,
) -> Result<ApiRequest, Error> {
    if items.is_empty() {
        return Err(Error::invalid_argument("media group must not be empty"));
    }

    let mut descriptors: Vec<Value> = Vec::with_capacity(items.len());
    let mut attachments: Vec<(String, ParamValue)> = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let attach_name = format!("file{}", index);
        descriptors.push(item.descriptor(&attach_name));
        if item.media.is_bytes() {
            attachments.push((attach_name, ParamValue::File(item.media.clone())));
        }
    }

    let mut required: Vec<(&str, ParamValue)> = vec![(MEDIA, ParamValue::JsonList(descriptors))];
    required.extend(attachments.iter().map(|(k, v)| (k.as_str(), v.clone())));

    let params = build_payload(target, base, required)?;
    Ok(ApiRequest::new(endpoint, params).with_content_type(ContentType::Multipart))
}
