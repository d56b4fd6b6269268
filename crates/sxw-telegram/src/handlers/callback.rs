use sxw_core::{
    messaging::types::CallbackQuery,
    route::Action,
    storefront::Reply,
};

use crate::router::AppState;

use super::{notify, show, visitor};

const MSG_STALE_BUTTON: &str = "Кнопка устарела";

pub async fn handle_callback(state: &AppState, q: CallbackQuery) {
    let Some(action) = Action::decode(&q.data) else {
        tracing::debug!(data = %q.data, "unknown callback data");
        let _ = state
            .messenger
            .answer_callback_query(&q.callback_id, Some(MSG_STALE_BUTTON))
            .await;
        return;
    };

    // Stop the button spinner before any slow API work.
    if let Err(e) = state.messenger.answer_callback_query(&q.callback_id, None).await {
        tracing::debug!("answer_callback_query failed: {e}");
    }

    let chat_id = q.chat_id;
    let v = visitor(state, chat_id, q.user);

    match action {
        Action::Navigate(route) => {
            let screen = state.storefront.open(&v, route).await;
            show(state, chat_id, q.message, screen).await;
        }
        Action::Interest(target) => match state.storefront.express_interest(&v, target).await {
            Reply::Notice(n) => notify(state, chat_id, &n).await,
            // Verification prompt: keep the card the button was on.
            Reply::Screen(s) => show(state, chat_id, None, Ok(s)).await,
        },
        Action::ConfirmAge => {
            let screen = state.storefront.confirm_age(&v).await;
            show(state, chat_id, q.message, screen).await;
        }
    }
}
