use chrono::NaiveDate;

use super::{Button, Screen, MAX_ITEM_BUTTONS};
use crate::{
    catalog::Catalog,
    date::{format_date_time, is_past, weekday_short},
    formatting::{escape_html, truncate_chars},
    model::{Event, EventWine, Wine},
    route::{Action, InterestTarget, Route},
};

pub const CTA_EVENT: &str = "🥂 Хочу на эту дегустацию";

/// Upcoming means "not strictly in the past"; unparseable dates count as upcoming.
pub fn is_upcoming(e: &Event, today: NaiveDate) -> bool {
    !is_past(e.date.as_deref(), today)
}

/// `13 Марта 2026 19:00 (ПТ)`, or empty when the event has no date.
fn when(e: &Event) -> String {
    let formatted = format_date_time(e.date.as_deref(), e.time.as_deref());
    match e.date.as_deref().and_then(weekday_short) {
        Some(wd) if !formatted.is_empty() => format!("{formatted} ({wd})"),
        _ => formatted,
    }
}

pub fn list(events: &[Event], today: NaiveDate) -> Screen {
    let mut out = vec![
        "🥂 <b>Дегустации</b>".to_string(),
        "в Москве и Санкт-Петербурге".to_string(),
    ];
    if events.is_empty() {
        out.push(String::new());
        out.push("Скоро здесь появятся новые дегустации.".to_string());
    }
    for e in events {
        out.push(String::new());
        out.push(format!("<b>{}</b>", escape_html(&e.name)));
        let place = [e.city.as_deref(), e.place.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        if !place.is_empty() {
            out.push(format!("📍 {}", escape_html(&place)));
        }
        let when = when(e);
        if !when.is_empty() {
            out.push(format!("🗓 {}", escape_html(&when)));
        }
    }

    let mut screen = Screen::new(out.join("\n"));
    for e in events.iter().take(MAX_ITEM_BUTTONS) {
        let mut row = vec![Button::nav(truncate_chars(&e.name, 32), Route::Event(e.id))];
        if is_upcoming(e, today) {
            row.push(Button::new(
                "🥂 Хочу",
                Action::Interest(InterestTarget::Event(e.id)),
            ));
        }
        screen = screen.row(row);
    }
    screen.button(Button::nav("⬅️ На главную страницу", Route::Home))
}

/// Embedded wine records plus ids looked up in the full wine list.
///
/// Ids that do not resolve are dropped. A failed wine read leaves only the
/// embedded records.
pub async fn resolve_wine_set(catalog: &Catalog, e: &Event) -> Vec<Wine> {
    let needs_lookup = e.wine_list.iter().any(|w| matches!(w, EventWine::Id(_)));
    let all = if needs_lookup {
        match catalog.wines(None).await {
            Ok(all) => all,
            Err(err) => {
                tracing::warn!(event = e.id, "wine set lookup failed: {err}");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    e.wine_list
        .iter()
        .filter_map(|item| match item {
            EventWine::Wine(w) => Some(w.clone()),
            EventWine::Id(id) => all.iter().find(|w| w.id == *id).cloned(),
        })
        .collect()
}

pub fn detail(e: &Event, wine_set: &[Wine], today: NaiveDate) -> Screen {
    let mut out = vec![format!("🥂 <b>{}</b>", escape_html(&e.name))];
    if let Some(city) = &e.city {
        out.push(format!("📍 <b>{}</b>", escape_html(city)));
    }
    let venue = [e.place.as_deref(), e.address.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" • ");
    if !venue.is_empty() {
        out.push(escape_html(&venue));
    }
    let when = when(e);
    if !when.is_empty() {
        out.push(format!("🗓 <b>{}</b>", escape_html(&when)));
    }

    if let Some(desc) = &e.description {
        out.push(String::new());
        out.push("<b>Описание</b>".to_string());
        out.extend(desc.lines().map(escape_html));
    }

    if !wine_set.is_empty() {
        out.push(String::new());
        out.push("<b>Винный сет</b>".to_string());
        for w in wine_set {
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
    }

    let mut screen = Screen::new(out.join("\n"));
    if is_upcoming(e, today) {
        screen = screen.button(Button::new(
            CTA_EVENT,
            Action::Interest(InterestTarget::Event(e.id)),
        ));
    }
    for w in wine_set.iter().take(MAX_ITEM_BUTTONS) {
        screen = screen.button(Button::nav(
            format!("🍾 {}", truncate_chars(&w.name, 40)),
            Route::Wine(w.id),
        ));
    }
    screen.row(vec![
        Button::nav("К другим дегустациям", Route::Events),
        Button::nav("⬅️ На главную", Route::Home),
    ])
}
