//! Target resolution: turning "where to send" into a `chat_id` wire value.

use crate::types::{Chat, User};

/// The destination of a call.
///
/// Primitive identifiers pass through unchanged; domain objects contribute
/// their own id.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Numeric chat id
    Id(i64),
    /// String identifier, usually `@channelusername`
    Username(String),
    Chat(Box<Chat>),
    User(Box<User>),
}

impl Target {
    /// Wire form of this target
    pub fn resolve(&self) -> String {
        match self {
            Target::Id(id) => id.to_string(),
            Target::Username(name) => name.clone(),
            Target::Chat(chat) => chat.id.to_string(),
            Target::User(user) => user.id.to_string(),
        }
    }
}

/// Resolve an optional target. `None` stays `None`; the caller decides
/// whether the field is required.
pub fn resolve(target: Option<&Target>) -> Option<String> {
    target.map(Target::resolve)
}

impl From<i64> for Target {
    fn from(id: i64) -> Self {
        Target::Id(id)
    }
}

impl From<i32> for Target {
    fn from(id: i32) -> Self {
        Target::Id(id as i64)
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::Username(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Target::Username(name)
    }
}

impl From<Chat> for Target {
    fn from(chat: Chat) -> Self {
        Target::Chat(Box::new(chat))
    }
}

impl From<&Chat> for Target {
    fn from(chat: &Chat) -> Self {
        Target::Chat(Box::new(chat.clone()))
    }
}

impl From<User> for Target {
    fn from(user: User) -> Self {
        Target::User(Box::new(user))
    }
}

impl From<&User> for Target {
    fn from(user: &User) -> Self {
        Target::User(Box::new(user.clone()))
    }
}
