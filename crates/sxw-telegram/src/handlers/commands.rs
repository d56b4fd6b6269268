use sxw_core::{messaging::types::Command, route::Route};

use crate::router::AppState;

use super::{show, submit_key, visitor};

/// Split `/cmd@botname args` into a lowercase command name and the rest.
pub fn parse_command(text: &str) -> (String, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandAction {
    Open(Route),
    Key(String),
    Help,
}

/// `/wine 12` opens `/wine/12`; without an id it opens the listing.
fn detail_or_list(kind: &str, args: &str, list: Route) -> Route {
    let id = args.split_whitespace().next().unwrap_or("");
    if id.is_empty() {
        return list;
    }
    Route::parse(&format!("/{kind}/{id}"))
}

pub fn command_action(name: &str, args: &str) -> CommandAction {
    match name {
        "start" | "home" | "menu" => CommandAction::Open(Route::Home),
        "wines" => CommandAction::Open(Route::Wines),
        "wine" => CommandAction::Open(detail_or_list("wine", args, Route::Wines)),
        "events" => CommandAction::Open(Route::Events),
        "event" => CommandAction::Open(detail_or_list("event", args, Route::Events)),
        "producers" => CommandAction::Open(Route::Producers),
        "producer" => CommandAction::Open(detail_or_list("producer", args, Route::Producers)),
        "profile" => CommandAction::Open(Route::Profile),
        "team" => CommandAction::Open(Route::Team),
        "about" => CommandAction::Open(Route::About),
        "rules" => CommandAction::Open(Route::Rules),
        "key" => CommandAction::Key(args.to_string()),
        "help" => CommandAction::Help,
        other => CommandAction::Open(Route::NotFound(format!("/{other}"))),
    }
}

fn help_text() -> String {
    [
        "🥂 <b>SX Wine</b>",
        "",
        "/start – главная",
        "/events – дегустации",
        "/event &lt;id&gt; – дегустация",
        "/wines – коллекция вин",
        "/wine &lt;id&gt; – вино",
        "/producers – производители",
        "/profile – профиль",
        "/team – команда",
        "/about – о клубе",
        "/rules – правила клуба",
        "/key &lt;ключ&gt; – верификация",
    ]
    .join("\n")
}

pub async fn handle_command(state: &AppState, cmd: Command) {
    let chat_id = cmd.chat_id;
    let v = visitor(state, chat_id, cmd.user);
    tracing::debug!(chat = chat_id.0, cmd = %cmd.name, "command");

    match command_action(&cmd.name, &cmd.args) {
        CommandAction::Open(route) => {
            let screen = state.storefront.open(&v, route).await;
            show(state, chat_id, None, screen).await;
        }
        CommandAction::Key(key) => submit_key(state, &v, chat_id, &key).await,
        CommandAction::Help => {
            if let Err(e) = state.messenger.send_html(chat_id, &help_text()).await {
                tracing::warn!(chat = chat_id.0, "help not sent: {e}");
            }
        }
    }
}
