//! Upload values: files and media-group descriptors.

use std::fmt;
use std::path::Path;

use serde_json::{json, Value};

use crate::error::Error;

/// A file sent to the Bot API.
///
/// A file id and a URL travel as plain text fields; byte content forces a
/// multipart body.
#[derive(Clone, PartialEq)]
pub enum InputFile {
    /// A `file_id` of a file already stored on Telegram servers
    FileId(String),
    /// An HTTP(S) URL Telegram fetches itself
    Url(String),
    /// Raw content uploaded with the request
    Bytes { file_name: String, data: Vec<u8> },
}

impl InputFile {
    pub fn file_id<S: Into<String>>(id: S) -> Self {
        InputFile::FileId(id.into())
    }

    pub fn url<S: Into<String>>(url: S) -> Self {
        InputFile::Url(url.into())
    }

    pub fn bytes<S: Into<String>>(file_name: S, data: Vec<u8>) -> Self {
        InputFile::Bytes {
            file_name: file_name.into(),
            data,
        }
    }

    /// Read a local file into byte content, keeping its file name
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::invalid_argument(format!("not a file path: {}", path.display())))?;
        Ok(InputFile::Bytes { file_name, data })
    }

    /// The text sent on the wire, or `None` for byte content
    pub fn as_text(&self) -> Option<&str> {
        match self {
            InputFile::FileId(id) => Some(id),
            InputFile::Url(url) => Some(url),
            InputFile::Bytes { .. } => None,
        }
    }

    pub fn is_bytes(&self) -> bool {
        matches!(self, InputFile::Bytes { .. })
    }
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFile::FileId(id) => f.debug_tuple("FileId").field(id).finish(),
            InputFile::Url(url) => f.debug_tuple("Url").field(url).finish(),
            InputFile::Bytes { file_name, data } => f
                .debug_struct("Bytes")
                .field("file_name", file_name)
                .field("len", &data.len())
                .finish(),
        }
    }
}

impl From<&str> for InputFile {
    /// Strings starting with `http://` or `https://` become URLs, anything else a file id
    fn from(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            InputFile::Url(value.to_string())
        } else {
            InputFile::FileId(value.to_string())
        }
    }
}

impl From<String> for InputFile {
    fn from(value: String) -> Self {
        InputFile::from(value.as_str())
    }
}

/// Kind of an item in a media group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
    Document,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
        }
    }
}

/// One item of a `sendMediaGroup` call
#[derive(Debug, Clone, PartialEq)]
pub struct InputMedia {
    pub kind: MediaKind,
    pub media: InputFile,
    pub caption: Option<String>,
    pub parse_mode: Option<String>,
}

impl InputMedia {
    pub fn new(kind: MediaKind, media: impl Into<InputFile>) -> Self {
        InputMedia {
            kind,
            media: media.into(),
            caption: None,
            parse_mode: None,
        }
    }

    pub fn photo(media: impl Into<InputFile>) -> Self {
        Self::new(MediaKind::Photo, media)
    }

    pub fn video(media: impl Into<InputFile>) -> Self {
        Self::new(MediaKind::Video, media)
    }

    pub fn audio(media: impl Into<InputFile>) -> Self {
        Self::new(MediaKind::Audio, media)
    }

    pub fn document(media: impl Into<InputFile>) -> Self {
        Self::new(MediaKind::Document, media)
    }

    pub fn with_caption<S: Into<String>>(mut self, caption: S) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_parse_mode<S: Into<String>>(mut self, parse_mode: S) -> Self {
        self.parse_mode = Some(parse_mode.into());
        self
    }

    /// The JSON descriptor for this item.
    ///
    /// Byte content is referenced as `attach://<attach_name>`; the caller
    /// attaches the bytes under that field name.
    pub fn descriptor(&self, attach_name: &str) -> Value {
        let media = match self.media.as_text() {
            Some(text) => text.to_string(),
            None => format!("attach://{}", attach_name),
        };

        let mut item = json!({
            "type": self.kind.as_str(),
            "media": media,
        });
        if let Some(caption) = &self.caption {
            item["caption"] = Value::String(caption.clone());
        }
        if let Some(parse_mode) = &self.parse_mode {
            item["parse_mode"] = Value::String(parse_mode.clone());
        }
        item
    }
}
