//! Static pages, prompts and fallback screens.

use super::{Button, Screen};
use crate::{
    formatting::escape_html,
    route::{Action, Route},
};

pub const CLUB_CITY: &str = "Санкт-Петербург";
pub const CLUB_PHONE: &str = "8 (800) 555-77-99";
pub const CLUB_INSTAGRAM: &str = "https://www.instagram.com/sx_wine";

pub const MSG_SOMETHING_WRONG: &str = "Что-то пошло не так";
pub const VERIFY_TITLE: &str = "Верификация пользователя";
pub const VERIFY_TEXT: &str =
    "Для доступа к приложению необходимо ввести ключ, предоставленный администратором.";

const IN_DEVELOPMENT: &str = "В разработке";

fn back_home() -> Button {
    Button::nav("⬅️ На главную страницу", Route::Home)
}

pub fn home() -> Screen {
    let html = [
        "🥂 <b>SX Wine</b>".to_string(),
        "<i>Champagne Lovers Club</i>".to_string(),
        format!("📍 {CLUB_CITY}"),
        String::new(),
        "<b>У нас в клубе</b>".to_string(),
        "Дегустации, коллекция вин и любимые производители.".to_string(),
        format!("Мерч, сеты и Школа Шампани: {}.", IN_DEVELOPMENT.to_lowercase()),
        String::new(),
        "<b>Контакты</b>".to_string(),
        format!("☎️ {CLUB_PHONE}"),
        format!("<a href=\"{CLUB_INSTAGRAM}\">Instagram</a>"),
    ]
    .join("\n");

    let soon = |label: &str| Button::nav(format!("{label} · {IN_DEVELOPMENT}"), Route::InProgress);

    Screen::new(html)
        .row(vec![
            Button::nav("🥂 Дегустации", Route::Events),
            Button::nav("🍾 Коллекция вин", Route::Wines),
        ])
        .button(Button::nav("🍇 Любимые производители", Route::Producers))
        .row(vec![soon("Мерч"), soon("Сеты")])
        .button(soon("Школа Шампани"))
        .row(vec![
            Button::nav("Команда", Route::Team),
            Button::nav("О клубе", Route::About),
            Button::nav("Правила клуба", Route::Rules),
        ])
        .button(Button::nav("👤 Профиль", Route::Profile))
}

struct Block {
    title: &'static str,
    lines: &'static [&'static str],
}

const TEAM: &[Block] = &[
    Block {
        title: "Яшкин Данил",
        lines: &["Идейный вдохновитель клуба, лектор с более чем 19-летним опытом в индустрии вина. Работал с ведущими компаниями: Alianta Group, Simple, À La Volée RWC"],
    },
    Block {
        title: "Полина Королёва",
        lines: &["Маркетолог клуба. Действующий маркетолог швейцарского алкогольного дистрибьютора Monafaro (Цюрих), ex: российские винодельни Фанагория, Лефкадия, Николаев и Сыновья"],
    },
];

const ABOUT: &[Block] = &[
    Block {
        title: "Философия клуба",
        lines: &[
            "Редкие вина. Живое общение.",
            "Атмосфера, в которую хочется погружаться снова.",
        ],
    },
    Block {
        title: "Кто мы такие?",
        lines: &[
            "SX Wine — винный клуб для тех, кто ценит вкус, хочет разбираться глубже и находит удовольствие в настоящем диалоге.",
            "Мы создаём пространство, где можно пробовать, обсуждать, делиться и быть в кругу «своих».",
        ],
    },
    Block {
        title: "Что получают участники?",
        lines: &[
            "— доступ к редким винам, которых нет в открытой продаже",
            "— камерные дегустации в Москве и Санкт-Петербурге",
            "— живое общение с единомышленниками",
            "— участие в совершенно новых форматах: мобильный Champagne Bar (Санкт-Петербург), школа Шампани",
            "— возможность присоединиться к коллаборациям с другими клубами: гедонистическими, сигарными и др.",
        ],
    },
    Block {
        title: "Подход",
        lines: &[
            "Мы собираем вокруг себя людей, которые ценят редкие вина, любят узнавать новое и получают удовольствие не только от напитка, но и от контекста.",
            "SX Wine — это не про внешний эффект, а про внутренний интерес и вкус к жизни.",
        ],
    },
];

fn blocks_page(title: &str, blocks: &[Block]) -> Screen {
    let mut out = vec![format!("<b>{}</b>", escape_html(title))];
    for b in blocks {
        out.push(String::new());
        out.push(format!("<b>{}</b>", escape_html(b.title)));
        out.extend(b.lines.iter().map(|l| escape_html(l)));
    }
    Screen::new(out.join("\n")).button(back_home())
}

pub fn team() -> Screen {
    blocks_page("Команда клуба", TEAM)
}

pub fn about() -> Screen {
    blocks_page("О клубе", ABOUT)
}

pub fn rules() -> Screen {
    Screen::new(
        [
            "<b>Правила клуба</b>",
            "",
            "Мы действуем в соответствии с законодательством РФ и не занимаемся онлайн-продажей или рекламой алкоголя.",
            "",
            "Материалы носят сугубо ознакомительный характер.",
        ]
        .join("\n"),
    )
    .button(back_home())
}

pub fn in_progress() -> Screen {
    Screen::new("🛠 <b>Раздел в разработке</b>\nЗагляните сюда чуть позже.").button(back_home())
}

pub fn not_found(path: &str) -> Screen {
    Screen::new(format!(
        "🤷 <b>Страница не найдена</b>\n<code>{}</code>",
        escape_html(path)
    ))
    .button(back_home())
}

pub fn wine_not_found() -> Screen {
    Screen::new("🤷 <b>Вино не найдено</b>")
        .button(Button::nav("Перейти в коллекцию вин", Route::Wines))
}

pub fn event_not_found() -> Screen {
    Screen::new("🤷 <b>Дегустация не найдена</b>")
        .button(Button::nav("К другим дегустациям", Route::Events))
}

pub fn producer_not_found() -> Screen {
    Screen::new("🤷 <b>Производитель не найден</b>")
        .button(Button::nav("Производители", Route::Producers))
}

/// Shown when a listing could not be loaded. `retry` reopens the same route.
pub fn error_screen(retry: &Route) -> Screen {
    Screen::new(format!(
        "⚠️ <b>{MSG_SOMETHING_WRONG}</b>\nНе удалось загрузить данные. Попробуйте ещё раз."
    ))
    .row(vec![
        Button::nav("🔄 Повторить", retry.clone()),
        back_home(),
    ])
}

/// Key prompt for visitors who are not yet bound to a club member.
pub fn verification_prompt() -> Screen {
    Screen::new(format!(
        "🔐 <b>{VERIFY_TITLE}</b>\n{VERIFY_TEXT}\n\nОтправьте ключ сообщением или командой <code>/key ВАШ_КЛЮЧ</code>."
    ))
}

pub fn age_prompt() -> Screen {
    Screen::new(
        "🔞 <b>18+</b>\nДля доступа необходимо подтвердить свое совершеннолетие и согласие на обработку данных.",
    )
    .button(Button::new("Подтверждаю", Action::ConfirmAge))
}
