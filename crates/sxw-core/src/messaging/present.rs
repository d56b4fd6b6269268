//! Putting screens and notifications on a messenger.

use crate::{
    domain::{ChatId, MessageRef},
    formatting::split_html_lines,
    messaging::{
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard},
    },
    notify::Notification,
    views::Screen,
    Result,
};

/// Convert a screen keyboard into callback buttons.
///
/// Buttons whose payload exceeds `max_data` bytes are dropped.
pub fn keyboard(screen: &Screen, max_data: usize) -> InlineKeyboard {
    let rows = screen
        .keyboard
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|b| {
                    let data = b.action.encode();
                    if data.len() > max_data {
                        tracing::debug!(%data, "callback data too long, button dropped");
                        return None;
                    }
                    Some(InlineButton {
                        label: b.label.clone(),
                        callback_data: data,
                    })
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect();
    InlineKeyboard { rows }
}

/// Show `screen` in `chat_id`.
///
/// A single-chunk screen replaces `replace` in place when the messenger can
/// edit; otherwise (or if the edit fails) the screen is sent as new messages,
/// with the keyboard attached to the last chunk. Returns the message carrying
/// the keyboard.
pub async fn show_screen(
    messenger: &dyn MessagingPort,
    chat_id: ChatId,
    replace: Option<MessageRef>,
    screen: &Screen,
    safe_limit: usize,
) -> Result<MessageRef> {
    let caps = messenger.capabilities();
    let limit = safe_limit.min(caps.max_message_len);
    let mut chunks = split_html_lines(&screen.html, limit);
    let kb = keyboard(screen, caps.max_callback_data);

    if let (Some(msg), true, 1) = (replace, caps.supports_edit, chunks.len()) {
        let markup = (!kb.is_empty()).then(|| kb.clone());
        match messenger.edit_html(msg, &chunks[0], markup).await {
            Ok(()) => return Ok(msg),
            Err(e) => tracing::debug!("edit failed, sending a new message: {e}"),
        }
    }

    let last = chunks.pop().unwrap_or_default();
    for chunk in &chunks {
        messenger.send_html(chat_id, chunk).await?;
    }
    if kb.is_empty() {
        messenger.send_html(chat_id, &last).await
    } else {
        messenger.send_inline_keyboard(chat_id, &last, kb).await
    }
}

pub async fn show_notification(
    messenger: &dyn MessagingPort,
    chat_id: ChatId,
    n: &Notification,
) -> Result<MessageRef> {
    messenger.send_html(chat_id, &n.to_html()).await
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        domain::MessageId,
        errors::Error,
        messaging::types::MessagingCapabilities,
    };

    #[derive(Clone, Debug, PartialEq)]
    pub enum Sent {
        Html(i64, String),
        Keyboard(i64, String, InlineKeyboard),
        Edit(i32, String, Option<InlineKeyboard>),
        Answer(String, Option<String>),
    }

    /// Records everything; message ids count up from 1.
    pub struct FakeMessenger {
        pub caps: MessagingCapabilities,
        pub fail_edits: bool,
        pub sent: Mutex<Vec<Sent>>,
    }

    impl Default for FakeMessenger {
        fn default() -> Self {
            Self {
                caps: MessagingCapabilities {
                    supports_edit: true,
                    max_message_len: 4096,
                    max_callback_data: 64,
                },
                fail_edits: false,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl FakeMessenger {
        pub fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        fn push(&self, chat_id: ChatId, s: Sent) -> MessageRef {
            let mut sent = self.sent.lock().unwrap();
            sent.push(s);
            MessageRef {
                chat_id,
                message_id: MessageId(sent.len() as i32),
            }
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            self.caps
        }

        async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
            Ok(self.push(chat_id, Sent::Html(chat_id.0, html.to_string())))
        }

        async fn send_inline_keyboard(
            &self,
            chat_id: ChatId,
            html: &str,
            keyboard: InlineKeyboard,
        ) -> Result<MessageRef> {
            Ok(self.push(
                chat_id,
                Sent::Keyboard(chat_id.0, html.to_string(), keyboard),
            ))
        }

        async fn edit_html(
            &self,
            msg: MessageRef,
            html: &str,
            keyboard: Option<InlineKeyboard>,
        ) -> Result<()> {
            if self.fail_edits {
                return Err(Error::External("message can't be edited".to_string()));
            }
            self.push(
                msg.chat_id,
                Sent::Edit(msg.message_id.0, html.to_string(), keyboard),
            );
            Ok(())
        }

        async fn answer_callback_query(
            &self,
            callback_id: &str,
            text: Option<&str>,
        ) -> Result<()> {
            self.push(
                ChatId(0),
                Sent::Answer(callback_id.to_string(), text.map(str::to_string)),
            );
            Ok(())
        }
    }
}
