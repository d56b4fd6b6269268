use crate::domain::{ChatId, MessageRef, TelegramId};

/// Messenger-neutral incoming update.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
    Callback(CallbackQuery),
}

impl IncomingUpdate {
    pub fn chat_id(&self) -> ChatId {
        match self {
            IncomingUpdate::Command(c) => c.chat_id,
            IncomingUpdate::Text(t) => t.chat_id,
            IncomingUpdate::Callback(q) => q.chat_id,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub user: Option<TelegramId>,
    pub name: String,
    pub args: String,
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub user: Option<TelegramId>,
    pub text: String,
    /// One-to-one chat with the bot.
    pub private: bool,
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub chat_id: ChatId,
    pub user: Option<TelegramId>,
    pub callback_id: String,
    pub data: String,
    /// The message the pressed button belongs to.
    pub message: Option<MessageRef>,
}

/// Inline keyboard, row by row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub supports_edit: bool,
    pub max_message_len: usize,
    /// Longest callback payload the messenger accepts, in bytes.
    pub max_callback_data: usize,
}
