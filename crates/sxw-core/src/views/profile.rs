//! The visitor's own page: who they are, favorite wines and tastings.

use chrono::NaiveDate;

use super::{Button, Screen};
use crate::{
    catalog::Catalog,
    date::{format_date_time, is_past},
    domain::TelegramId,
    formatting::escape_html,
    model::{find_person, Event, PersonRecord, Wine},
    route::Route,
};

pub const DEFAULT_NAME: &str = "Участник клуба";
const CLUB_STATUS: &str = "Champagne Lovers Club";

/// Load and render the profile. Any failed read shows as an empty section.
pub async fn render(catalog: &Catalog, who: TelegramId, today: NaiveDate) -> Screen {
    let (persons, wines, events) = tokio::join!(
        catalog.persons(),
        catalog.wines(Some(who)),
        catalog.events(Some(who)),
    );
    let persons = persons.unwrap_or_else(|e| {
        tracing::warn!(id = %who, "profile: person list unavailable: {e}");
        Vec::new()
    });
    let wines = wines.unwrap_or_else(|e| {
        tracing::warn!(id = %who, "profile: favorites unavailable: {e}");
        Vec::new()
    });
    let events = events.unwrap_or_else(|e| {
        tracing::warn!(id = %who, "profile: events unavailable: {e}");
        Vec::new()
    });

    screen(find_person(&persons, who), &wines, &events, today)
}

pub fn screen(
    person: Option<&PersonRecord>,
    favorites: &[Wine],
    events: &[Event],
    today: NaiveDate,
) -> Screen {
    let name = person
        .and_then(PersonRecord::display_name)
        .unwrap_or_else(|| DEFAULT_NAME.to_string());
    let status = match person.and_then(|p| p.grade.as_deref()) {
        Some(grade) => format!("{CLUB_STATUS} • {grade}"),
        None => CLUB_STATUS.to_string(),
    };

    let mut out = vec![
        format!("👤 <b>{}</b>", escape_html(&name)),
        format!("<i>{}</i>", escape_html(&status)),
        String::new(),
        "<b>Избранные вина</b>".to_string(),
    ];
    if favorites.is_empty() {
        out.push("Пока пусто".to_string());
    }
    for w in favorites {
        let sub = [w.region.as_deref(), w.volume.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" • ");
        if sub.is_empty() {
            out.push(format!("• {}", escape_html(&w.name)));
        } else {
            out.push(format!("• {} <i>{}</i>", escape_html(&w.name), escape_html(&sub)));
        }
    }

    out.push(String::new());
    out.push("<b>Мероприятия</b>".to_string());
    if events.is_empty() {
        out.push("Пока пусто".to_string());
    }
    for e in events {
        let tag = if is_past(e.date.as_deref(), today) {
            "Посетил"
        } else {
            "Записан"
        };
        let details = [
            Some(format_date_time(e.date.as_deref(), e.time.as_deref())),
            e.city.clone(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
        if details.is_empty() {
            out.push(format!("• {} · <b>{tag}</b>", escape_html(&e.name)));
        } else {
            out.push(format!(
                "• {} <i>{}</i> · <b>{tag}</b>",
                escape_html(&e.name),
                escape_html(&details)
            ));
        }
    }

    let mut s = Screen::new(out.join("\n"));
    for w in favorites.iter().take(super::MAX_ITEM_BUTTONS) {
        s = s.button(Button::nav(format!("🍾 {}", w.name), Route::Wine(w.id)));
    }
    s.button(Button::nav("⬅️ На главную страницу", Route::Home))
}
