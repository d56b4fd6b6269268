use super::{Button, Screen, MAX_ITEM_BUTTONS};
use crate::{
    date::plural_ru,
    formatting::{escape_html, stars, truncate_chars},
    model::{Producer, Wine},
    route::{Action, InterestTarget, Route},
};

const BUTTON_LABEL_CHARS: usize = 48;

fn card(n: usize, w: &Wine) -> Vec<String> {
    let mut lines = vec![format!("<b>{n}. {}</b>", escape_html(&w.name))];
    if let Some(r) = w.rating {
        lines.push(stars(r));
    }
    let meta = w.meta_line();
    if !meta.is_empty() {
        lines.push(escape_html(&meta));
    }
    if let Some(region) = &w.region {
        lines.push(format!("<i>{}</i>", escape_html(region)));
    }
    lines
}

fn wine_buttons(wines: &[Wine]) -> Vec<Button> {
    wines
        .iter()
        .take(MAX_ITEM_BUTTONS)
        .map(|w| Button::nav(truncate_chars(&w.name, BUTTON_LABEL_CHARS), Route::Wine(w.id)))
        .collect()
}

fn with_rows(mut screen: Screen, buttons: Vec<Button>) -> Screen {
    for b in buttons {
        screen = screen.button(b);
    }
    screen
}

pub fn list(wines: &[Wine]) -> Screen {
    let n = wines.len();
    let mut out = vec![
        "🍾 <b>Коллекция вин</b>".to_string(),
        format!("{n} {}", plural_ru(n, "позиция", "позиции", "позиций")),
    ];
    for (i, w) in wines.iter().enumerate() {
        out.push(String::new());
        out.extend(card(i + 1, w));
    }

    with_rows(Screen::new(out.join("\n")), wine_buttons(wines))
        .button(Button::nav("⬅️ На главную страницу", Route::Home))
}

/// Spec-sheet rows; blank values are skipped.
fn characteristics(w: &Wine) -> Vec<(&'static str, &str)> {
    [
        ("Страна", w.country.as_deref()),
        ("Регион", w.region_head()),
        ("Виноград", w.grape.as_deref()),
        ("Крепость", w.alcohol.as_deref()),
        ("Цвет", w.color.as_deref()),
        ("Сахар", w.sweetness.as_deref()),
        ("Год урожая", w.year.as_deref()),
        ("Объём", w.volume.as_deref()),
    ]
    .into_iter()
    .filter_map(|(k, v)| v.map(|v| (k, v)))
    .collect()
}

pub fn detail(w: &Wine) -> Screen {
    let mut out = vec![format!("🍾 <b>{}</b>", escape_html(&w.name))];
    let meta = w.meta_line();
    if !meta.is_empty() {
        out.push(format!("<i>{}</i>", escape_html(&meta)));
    }
    if let Some(region) = &w.region {
        out.push(escape_html(region));
    }
    if let Some(r) = w.rating {
        out.push(format!("{} {r:.1}", stars(r)));
    }

    if let Some(desc) = &w.description {
        out.push(String::new());
        out.push("<b>Описание</b>".to_string());
        out.extend(desc.lines().map(escape_html));
    }

    let rows = characteristics(w);
    if !rows.is_empty() {
        out.push(String::new());
        out.push("<b>Характеристики</b>".to_string());
        for (k, v) in rows {
            out.push(format!("{k}: {}", escape_html(v)));
        }
    }

    Screen::new(out.join("\n"))
        .button(Button::new(
            "🥂 Хочу это вино",
            Action::Interest(InterestTarget::Wine(w.id)),
        ))
        .button(Button::nav("🍇 Производитель", Route::Producer(w.id)))
        .row(vec![
            Button::nav("К другим винам", Route::Wines),
            Button::nav("⬅️ На главную", Route::Home),
        ])
}

pub fn producers(producers: &[Producer]) -> Screen {
    let mut out = vec![
        "🍇 <b>Производители вин</b>".to_string(),
        "Производители вин, которые мы собрали в нашей коллекции SX Wine".to_string(),
    ];
    for p in producers {
        let count = format!(
            "{} {}",
            p.wine_count,
            plural_ru(p.wine_count, "вино", "вина", "вин")
        );
        let line = match &p.region {
            Some(r) => format!("• <b>{}</b>, {} ({count})", escape_html(&p.name), escape_html(r)),
            None => format!("• <b>{}</b> ({count})", escape_html(&p.name)),
        };
        out.push(line);
    }

    let buttons = producers
        .iter()
        .take(MAX_ITEM_BUTTONS)
        .map(|p| Button::nav(truncate_chars(&p.name, BUTTON_LABEL_CHARS), Route::Producer(p.id)))
        .collect();
    with_rows(Screen::new(out.join("\n")), buttons)
        .button(Button::nav("⬅️ На главную страницу", Route::Home))
}

pub fn producer(p: &Producer, wines: &[Wine]) -> Screen {
    let mut out = vec![format!("🍇 <b>{}</b>", escape_html(&p.name))];
    if let Some(r) = &p.region {
        out.push(format!("<i>{}</i>", escape_html(r)));
    }
    for (i, w) in wines.iter().enumerate() {
        out.push(String::new());
        out.extend(card(i + 1, w));
    }

    with_rows(Screen::new(out.join("\n")), wine_buttons(wines))
        .row(vec![
            Button::nav("Производители", Route::Producers),
            Button::nav("⬅️ На главную", Route::Home),
        ])
}
