use std::fmt;

use serde::{Deserialize, Serialize};

/// Telegram user id (numeric). This is the identity the club API correlates
/// persons with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelegramId(pub i64);

impl fmt::Display for TelegramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Remote catalog ids.
pub type WineId = u64;
pub type EventId = u64;

/// Session scope of one visitor. The storefront keys its identity cache and
/// live views by this value; for the Telegram shell it is one sender in one chat.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VisitorScope(pub String);

impl VisitorScope {
    pub fn chat(chat_id: ChatId) -> Self {
        Self(format!("chat:{}", chat_id.0))
    }

    /// Members of a group chat each get their own scope. Updates without a
    /// sender fall back to the chat.
    pub fn sender(chat_id: ChatId, user: Option<TelegramId>) -> Self {
        match user {
            Some(u) => Self(format!("chat:{}:user:{}", chat_id.0, u.0)),
            None => Self::chat(chat_id),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
