use sxw_core::{gate::GateState, messaging::types::TextMessage, notify::Notification};

use crate::router::AppState;

use super::{notify, submit_key, visitor};

const MSG_USE_MENU: &str = "Выберите раздел в меню или отправьте /start.";

/// In a private chat, free text is a verification key until the visitor is
/// verified. Group chatter is never read as a key.
pub async fn handle_text(state: &AppState, msg: TextMessage) {
    let chat_id = msg.chat_id;
    if !msg.private {
        tracing::trace!(chat = chat_id.0, "group text ignored");
        return;
    }
    let v = visitor(state, chat_id, msg.user);

    let gate_state = match v.gate().state() {
        GateState::Checking => v.gate().check().await,
        s => s,
    };

    if gate_state == GateState::Verified {
        notify(state, chat_id, &Notification::info(MSG_USE_MENU)).await;
        return;
    }
    submit_key(state, &v, chat_id, &msg.text).await;
}
