//! Update handlers.
//!
//! Handlers work on the core `IncomingUpdate` types and talk to Telegram only
//! through the `MessagingPort` held in `AppState`.

use std::sync::Arc;

use sxw_core::{
    domain::{ChatId, MessageRef, TelegramId, VisitorScope},
    gate::GateState,
    identity::HostUser,
    messaging::{present, types::IncomingUpdate},
    notify::Notification,
    route::Route,
    storefront::Visitor,
    views::Screen,
    Result,
};

use crate::router::AppState;

mod callback;
pub mod commands;
mod text;

pub async fn dispatch(state: &AppState, update: IncomingUpdate) {
    match update {
        IncomingUpdate::Command(cmd) => commands::handle_command(state, cmd).await,
        IncomingUpdate::Text(msg) => text::handle_text(state, msg).await,
        IncomingUpdate::Callback(q) => callback::handle_callback(state, q).await,
    }
}

fn visitor(state: &AppState, chat_id: ChatId, user: Option<TelegramId>) -> Arc<Visitor> {
    state
        .storefront
        .visitor(VisitorScope::sender(chat_id, user), &HostUser(user.map(|u| u.0)))
}

/// Present a rendered screen. A cancelled view shows nothing.
async fn show(state: &AppState, chat_id: ChatId, replace: Option<MessageRef>, screen: Result<Screen>) {
    let screen = match screen {
        Ok(s) => s,
        Err(e) if e.is_cancelled() => return,
        Err(e) => {
            tracing::warn!(chat = chat_id.0, "screen failed: {e}");
            return;
        }
    };
    if let Err(e) = present::show_screen(
        state.messenger.as_ref(),
        chat_id,
        replace,
        &screen,
        state.cfg.telegram_safe_limit,
    )
    .await
    {
        tracing::warn!(chat = chat_id.0, "screen not delivered: {e}");
    }
}

async fn notify(state: &AppState, chat_id: ChatId, n: &Notification) {
    if let Err(e) = present::show_notification(state.messenger.as_ref(), chat_id, n).await {
        tracing::warn!(chat = chat_id.0, "notification not delivered: {e}");
    }
}

/// Submit a verification key and, once accepted, reopen where the visitor
/// was stopped (home if nowhere).
async fn submit_key(state: &AppState, v: &Visitor, chat_id: ChatId, key: &str) {
    let reply = state.storefront.submit_key(v, key).await;
    notify(state, chat_id, &reply.outcome.notification).await;

    if reply.outcome.requested && reply.outcome.state == GateState::Verified {
        let route = reply.resume.unwrap_or(Route::Home);
        let screen = state.storefront.open(v, route).await;
        show(state, chat_id, None, screen).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use sxw_core::{
        api::ClubApi,
        config::Config,
        domain::MessageId,
        errors::Error,
        gate::BindConfirmPolicy,
        identity::MemoryStore,
        messaging::{
            port::MessagingPort,
            types::{self, InlineKeyboard, MessagingCapabilities},
        },
        model::{BindingRequest, Event, EventInterest, PersonRecord, Wine, WineInterest},
        storefront::{Storefront, StorefrontOptions},
    };

    use super::*;

    #[derive(Default)]
    pub(super) struct StubApi {
        pub persons: Mutex<Vec<PersonRecord>>,
        pub wines: Mutex<Vec<Wine>>,
        pub binds: Mutex<Vec<BindingRequest>>,
        pub wine_interests: Mutex<Vec<WineInterest>>,
    }

    #[async_trait]
    impl ClubApi for StubApi {
        async fn list_persons(&self) -> Result<Vec<PersonRecord>> {
            Ok(self.persons.lock().unwrap().clone())
        }

        async fn list_wines(&self, interested: Option<TelegramId>) -> Result<Vec<Wine>> {
            if interested.is_some() {
                return Ok(Vec::new());
            }
            Ok(self.wines.lock().unwrap().clone())
        }

        async fn list_events(&self, _interested: Option<TelegramId>) -> Result<Vec<Event>> {
            Ok(Vec::new())
        }

        async fn bind_telegram(&self, req: &BindingRequest) -> Result<serde_json::Value> {
            if req.key != "GOOD" {
                return Err(Error::Api {
                    status: 400,
                    detail: Some("Invalid key".into()),
                });
            }
            self.binds.lock().unwrap().push(req.clone());
            self.persons.lock().unwrap().push(PersonRecord {
                id: 1,
                telegram_id: Some(req.telegram_id.0),
                firstname: Some("Анна".into()),
                ..Default::default()
            });
            Ok(serde_json::Value::Null)
        }

        async fn notify_wine_interest(&self, req: &WineInterest) -> Result<()> {
            self.wine_interests.lock().unwrap().push(req.clone());
            Ok(())
        }

        async fn notify_event_interest(&self, _req: &EventInterest) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    pub(super) enum Out {
        Html(String),
        Keyboard(String, InlineKeyboard),
        Edit(MessageId, String),
        Answer(String, Option<String>),
    }

    #[derive(Default)]
    pub(super) struct Recorder {
        pub out: Mutex<Vec<Out>>,
    }

    impl Recorder {
        pub fn out(&self) -> Vec<Out> {
            self.out.lock().unwrap().clone()
        }

        fn push(&self, o: Out) -> MessageRef {
            let mut out = self.out.lock().unwrap();
            out.push(o);
            MessageRef {
                chat_id: ChatId(5),
                message_id: MessageId(out.len() as i32),
            }
        }
    }

    #[async_trait]
    impl MessagingPort for Recorder {
        fn capabilities(&self) -> MessagingCapabilities {
            MessagingCapabilities {
                supports_edit: true,
                max_message_len: 4096,
                max_callback_data: 64,
            }
        }

        async fn send_html(&self, _chat_id: ChatId, html: &str) -> Result<MessageRef> {
            Ok(self.push(Out::Html(html.to_string())))
        }

        async fn send_inline_keyboard(
            &self,
            _chat_id: ChatId,
            html: &str,
            keyboard: InlineKeyboard,
        ) -> Result<MessageRef> {
            Ok(self.push(Out::Keyboard(html.to_string(), keyboard)))
        }

        async fn edit_html(
            &self,
            msg: MessageRef,
            html: &str,
            _keyboard: Option<InlineKeyboard>,
        ) -> Result<()> {
            self.push(Out::Edit(msg.message_id, html.to_string()));
            Ok(())
        }

        async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
            self.push(Out::Answer(callback_id.to_string(), text.map(str::to_string)));
            Ok(())
        }
    }

    pub(super) fn app() -> (AppState, Arc<StubApi>, Arc<Recorder>) {
        let cfg = Config::from_lookup(|k| (k == "TELEGRAM_BOT_TOKEN").then(|| "t".to_string()))
            .unwrap();
        let api = Arc::new(StubApi::default());
        api.wines.lock().unwrap().push(Wine {
            id: 12,
            name: "Résonance".into(),
            ..Default::default()
        });
        let options = StorefrontOptions {
            bind_confirm: BindConfirmPolicy {
                attempts: 1,
                delay: Duration::ZERO,
            },
            ..StorefrontOptions::from_config(&cfg)
        };
        let storefront = Storefront::new(api.clone(), Arc::new(MemoryStore::default()), options);
        let recorder = Arc::new(Recorder::default());
        let state = AppState {
            cfg: Arc::new(cfg),
            storefront: Arc::new(storefront),
            messenger: recorder.clone(),
        };
        (state, api, recorder)
    }

    pub(super) fn command(name: &str, args: &str) -> IncomingUpdate {
        command_from(ChatId(5), TelegramId(42), name, args)
    }

    fn command_from(chat_id: ChatId, user: TelegramId, name: &str, args: &str) -> IncomingUpdate {
        IncomingUpdate::Command(types::Command {
            chat_id,
            user: Some(user),
            name: name.to_string(),
            args: args.to_string(),
        })
    }

    fn text(body: &str) -> IncomingUpdate {
        IncomingUpdate::Text(types::TextMessage {
            chat_id: ChatId(5),
            user: Some(TelegramId(42)),
            text: body.to_string(),
            private: true,
        })
    }

    #[tokio::test]
    async fn start_sends_home_with_menu() {
        let (state, _, rec) = app();
        dispatch(&state, command("start", "")).await;

        match rec.out().as_slice() {
            [Out::Keyboard(html, kb)] => {
                assert!(html.contains("SX Wine"));
                assert!(!kb.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn profile_prompt_then_text_key_resumes_profile() {
        let (state, api, rec) = app();
        dispatch(&state, command("profile", "")).await;
        assert!(matches!(&rec.out()[0], Out::Html(h) | Out::Keyboard(h, _) if h.contains("ключ")));

        dispatch(&state, text("  GOOD ")).await;
        assert_eq!(api.binds.lock().unwrap()[0].telegram_id, TelegramId(42));

        let out = rec.out();
        assert!(matches!(&out[1], Out::Html(h) if h.contains("Успешная верификация")));
        assert!(matches!(&out[2], Out::Html(h) | Out::Keyboard(h, _) if h.contains("Анна")));
    }

    #[tokio::test]
    async fn rejected_key_reports_server_detail() {
        let (state, api, rec) = app();
        dispatch(&state, command("key", "WRONG")).await;

        assert!(api.binds.lock().unwrap().is_empty());
        match rec.out().as_slice() {
            [Out::Html(h)] => assert!(h.contains("Invalid key")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn help_lists_commands() {
        let (state, _, rec) = app();
        dispatch(&state, command("help", "")).await;
        assert!(matches!(&rec.out()[0], Out::Html(h) if h.contains("/events")));
    }

    #[tokio::test]
    async fn group_members_bind_under_their_own_ids() {
        let (state, api, rec) = app();
        let group = ChatId(-100);

        dispatch(&state, command_from(group, TelegramId(111), "profile", "")).await;
        dispatch(&state, command_from(group, TelegramId(222), "key", "GOOD")).await;

        assert_eq!(
            api.binds.lock().unwrap().clone(),
            vec![BindingRequest {
                telegram_id: TelegramId(222),
                key: "GOOD".into()
            }]
        );

        // Alice is still unverified; her profile stays behind the key prompt.
        dispatch(&state, command_from(group, TelegramId(111), "profile", "")).await;
        let last = rec.out().pop().unwrap();
        assert!(matches!(last, Out::Html(h) | Out::Keyboard(h, _) if h.contains("Верификация")));
    }
}
