//! Endpoint table.
//!
//! Each Bot API method is described by data: its name, HTTP method, whether
//! it addresses a chat, and which fields it cannot be sent without.
//! [`crate::Manager::call`] is the one function that executes any of them.

use crate::transport::HttpMethod;

/// Whether an endpoint addresses a chat through `chat_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRule {
    /// No `chat_id` at all
    None,
    /// `chat_id` is sent when given
    Optional,
    /// `chat_id` must be present; the default target fills in when omitted
    Required,
}

/// Static description of one Bot API method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: HttpMethod,
    pub target: TargetRule,
    /// Fields besides `chat_id` that must be in the final payload
    pub required: &'static [&'static str],
    /// Field carrying an upload, for media endpoints
    pub media: Option<&'static str>,
    /// The media field takes a list of `InputMedia` rather than one file
    pub batch: bool,
}

impl Endpoint {
    const fn post(name: &'static str, target: TargetRule, required: &'static [&'static str]) -> Self {
        Endpoint {
            name,
            method: HttpMethod::Post,
            target,
            required,
            media: None,
            batch: false,
        }
    }

    const fn get(name: &'static str, target: TargetRule, required: &'static [&'static str]) -> Self {
        Endpoint {
            name,
            method: HttpMethod::Get,
            target,
            required,
            media: None,
            batch: false,
        }
    }

    const fn upload(name: &'static str, field: &'static str, required: &'static [&'static str]) -> Self {
        Endpoint {
            name,
            method: HttpMethod::Post,
            target: TargetRule::Required,
            required,
            media: Some(field),
            batch: false,
        }
    }

    const fn media_group(name: &'static str, field: &'static str, required: &'static [&'static str]) -> Self {
        Endpoint {
            batch: true,
            ..Endpoint::upload(name, field, required)
        }
    }

    /// Look an endpoint up by its Bot API method name
    pub fn by_name(name: &str) -> Option<&'static Endpoint> {
        ALL.iter().copied().find(|e| e.name == name)
    }
}

pub const GET_ME: Endpoint = Endpoint::get("getMe", TargetRule::None, &[]);
pub const GET_UPDATES: Endpoint = Endpoint::get("getUpdates", TargetRule::None, &[]);
pub const SEND_MESSAGE: Endpoint = Endpoint::post("sendMessage", TargetRule::Required, &["text"]);
pub const FORWARD_MESSAGE: Endpoint =
    Endpoint::post("forwardMessage", TargetRule::Required, &["from_chat_id", "message_id"]);
pub const FORWARD_MESSAGES: Endpoint =
    Endpoint::post("forwardMessages", TargetRule::Required, &["from_chat_id", "message_ids"]);
pub const COPY_MESSAGE: Endpoint =
    Endpoint::post("copyMessage", TargetRule::Required, &["from_chat_id", "message_id"]);
pub const COPY_MESSAGES: Endpoint =
    Endpoint::post("copyMessages", TargetRule::Required, &["from_chat_id", "message_ids"]);
pub const SEND_PHOTO: Endpoint = Endpoint::upload("sendPhoto", "photo", &["photo"]);
pub const SEND_AUDIO: Endpoint = Endpoint::upload("sendAudio", "audio", &["audio"]);
pub const SEND_DOCUMENT: Endpoint = Endpoint::upload("sendDocument", "document", &["document"]);
pub const SEND_VIDEO: Endpoint = Endpoint::upload("sendVideo", "video", &["video"]);
pub const SEND_ANIMATION: Endpoint = Endpoint::upload("sendAnimation", "animation", &["animation"]);
pub const SEND_VOICE: Endpoint = Endpoint::upload("sendVoice", "voice", &["voice"]);
pub const SEND_VIDEO_NOTE: Endpoint = Endpoint::upload("sendVideoNote", "video_note", &["video_note"]);
pub const SEND_STICKER: Endpoint = Endpoint::upload("sendSticker", "sticker", &["sticker"]);
pub const SEND_MEDIA_GROUP: Endpoint = Endpoint::media_group("sendMediaGroup", "media", &["media"]);
pub const SEND_LOCATION: Endpoint =
    Endpoint::post("sendLocation", TargetRule::Required, &["latitude", "longitude"]);
pub const SEND_VENUE: Endpoint = Endpoint::post(
    "sendVenue",
    TargetRule::Required,
    &["latitude", "longitude", "title", "address"],
);
pub const SEND_CONTACT: Endpoint =
    Endpoint::post("sendContact", TargetRule::Required, &["phone_number", "first_name"]);
pub const SEND_POLL: Endpoint = Endpoint::post("sendPoll", TargetRule::Required, &["question", "options"]);
pub const SEND_DICE: Endpoint = Endpoint::post("sendDice", TargetRule::Required, &[]);
pub const SEND_CHAT_ACTION: Endpoint = Endpoint::post("sendChatAction", TargetRule::Required, &["action"]);
/// Inline messages are edited through `inline_message_id` instead of a chat
pub const EDIT_MESSAGE_TEXT: Endpoint = Endpoint::post("editMessageText", TargetRule::Optional, &["text"]);
pub const DELETE_MESSAGE: Endpoint = Endpoint::post("deleteMessage", TargetRule::Required, &["message_id"]);
pub const PIN_CHAT_MESSAGE: Endpoint = Endpoint::post("pinChatMessage", TargetRule::Required, &["message_id"]);
pub const GET_CHAT: Endpoint = Endpoint::get("getChat", TargetRule::Required, &[]);
pub const GET_CHAT_MEMBER: Endpoint = Endpoint::get("getChatMember", TargetRule::Required, &["user_id"]);
pub const LEAVE_CHAT: Endpoint = Endpoint::post("leaveChat", TargetRule::Required, &[]);
pub const GET_FILE: Endpoint = Endpoint::get("getFile", TargetRule::None, &["file_id"]);

pub const ALL: &[&Endpoint] = &[
    &GET_ME,
    &GET_UPDATES,
    &SEND_MESSAGE,
    &FORWARD_MESSAGE,
    &FORWARD_MESSAGES,
    &COPY_MESSAGE,
    &COPY_MESSAGES,
    &SEND_PHOTO,
    &SEND_AUDIO,
    &SEND_DOCUMENT,
    &SEND_VIDEO,
    &SEND_ANIMATION,
    &SEND_VOICE,
    &SEND_VIDEO_NOTE,
    &SEND_STICKER,
    &SEND_MEDIA_GROUP,
    &SEND_LOCATION,
    &SEND_VENUE,
    &SEND_CONTACT,
    &SEND_POLL,
    &SEND_DICE,
    &SEND_CHAT_ACTION,
    &EDIT_MESSAGE_TEXT,
    &DELETE_MESSAGE,
    &PIN_CHAT_MESSAGE,
    &GET_CHAT,
    &GET_CHAT_MEMBER,
    &LEAVE_CHAT,
    &GET_FILE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<&str> = ALL.iter().map(|e| e.name).collect();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn test_media_field_is_required() {
        for endpoint in ALL.iter().filter(|e| e.media.is_some()) {
            let field = endpoint.media.unwrap();
            assert!(
                endpoint.required.contains(&field),
                "{} does not require its media field",
                endpoint.name
            );
        }
    }

    #[test]
    fn test_only_media_group_is_batch() {
        let batch: Vec<&str> = ALL.iter().filter(|e| e.batch).map(|e| e.name).collect();
        assert_eq!(batch, vec!["sendMediaGroup"]);
        assert_eq!(SEND_MEDIA_GROUP.media, Some("media"));
    }

    #[test]
    fn test_by_name() {
        assert_eq!(Endpoint::by_name("sendPhoto"), Some(&SEND_PHOTO));
        assert_eq!(Endpoint::by_name("sendCarrierPigeon"), None);
    }
}
