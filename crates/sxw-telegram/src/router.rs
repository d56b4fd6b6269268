use std::{sync::Arc, time::Duration};

use tokio::time::MissedTickBehavior;

use teloxide::{
    dispatching::Dispatcher,
    dptree,
    prelude::*,
    types::{BotCommand, CallbackQuery, Message},
};

use sxw_core::{
    config::Config,
    domain::{ChatId, MessageId, MessageRef, TelegramId},
    messaging::{
        port::MessagingPort,
        types::{self, IncomingUpdate},
    },
    storefront::Storefront,
};

use crate::handlers::{self, commands::parse_command};
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub storefront: Arc<Storefront>,
    pub messenger: Arc<dyn MessagingPort>,
}

fn bot_commands() -> Vec<BotCommand> {
    [
        ("start", "Главная"),
        ("events", "Дегустации"),
        ("wines", "Коллекция вин"),
        ("producers", "Любимые производители"),
        ("profile", "Профиль"),
        ("team", "Команда"),
        ("about", "О клубе"),
        ("rules", "Правила клуба"),
        ("key", "Ввести ключ верификации"),
        ("help", "Справка"),
    ]
    .into_iter()
    .map(|(c, d)| BotCommand::new(c, d))
    .collect()
}

pub async fn run_polling(cfg: Arc<Config>, storefront: Arc<Storefront>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => tracing::info!("sxw started: @{}", me.username()),
        Err(e) => tracing::warn!("get_me failed: {e}"),
    }
    tracing::info!(api = %cfg.api_base_url, "club api");

    if let Err(e) = bot.set_my_commands(bot_commands()).await {
        tracing::warn!("set_my_commands failed: {e}");
    }

    spawn_sweeper(storefront.clone(), cfg.visitor_idle);

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState {
        cfg,
        storefront,
        messenger,
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(on_callback))
        .branch(Update::filter_message().endpoint(on_message));

    // Updates of one chat run concurrently; a newer view cancels the older one.
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .distribution_function(|_| None::<std::convert::Infallible>)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Periodically drop idle visitors and stale cached lists.
fn spawn_sweeper(storefront: Arc<Storefront>, idle: Duration) {
    let every = (idle / 2).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            storefront.sweep().await;
        }
    });
}

async fn on_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(update) = message_update(&msg) {
        handlers::dispatch(&state, update).await;
    }
    Ok(())
}

async fn on_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    match callback_update(&q) {
        Some(update) => handlers::dispatch(&state, update).await,
        None => {
            // Button on a message we can no longer see; just stop the spinner.
            let _ = state.messenger.answer_callback_query(&q.id, None).await;
        }
    }
    Ok(())
}

fn sender(user: Option<&teloxide::types::User>) -> Option<TelegramId> {
    user.map(|u| TelegramId(u.id.0 as i64))
}

/// Text messages only; other content is ignored.
pub fn message_update(msg: &Message) -> Option<IncomingUpdate> {
    let text = msg.text()?;
    let chat_id = ChatId(msg.chat.id.0);
    let user = sender(msg.from());

    if text.starts_with('/') {
        let (name, args) = parse_command(text);
        return Some(IncomingUpdate::Command(types::Command {
            chat_id,
            user,
            name,
            args,
        }));
    }
    Some(IncomingUpdate::Text(types::TextMessage {
        chat_id,
        user,
        text: text.to_string(),
        private: msg.chat.is_private(),
    }))
}

pub fn callback_update(q: &CallbackQuery) -> Option<IncomingUpdate> {
    let msg = q.message.as_ref()?;
    let chat_id = ChatId(msg.chat.id.0);
    Some(IncomingUpdate::Callback(types::CallbackQuery {
        chat_id,
        user: sender(Some(&q.from)),
        callback_id: q.id.clone(),
        data: q.data.clone().unwrap_or_default(),
        message: Some(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        }),
    }))
}
