//! Russian date formatting for event cards.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

// Genitive case, capitalized as the club prints them.
const MONTHS_RU: [&str; 12] = [
    "Января",
    "Февраля",
    "Марта",
    "Апреля",
    "Мая",
    "Июня",
    "Июля",
    "Августа",
    "Сентября",
    "Октября",
    "Ноября",
    "Декабря",
];

pub fn parse_date(date: &str) -> Option<NaiveDate> {
    let d = date.trim();
    // Accept full timestamps too ("2026-03-13T13:00:00Z").
    let head = d.get(..10).unwrap_or(d);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn parse_time(time: &str) -> Option<NaiveTime> {
    let t = time.trim();
    NaiveTime::parse_from_str(t, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
        .ok()
}

/// Format a date and optional time: `"13 Марта 2026 13:00"`.
///
/// A missing time renders as `00:00`. Unparseable input falls back to the raw
/// values (`"date • time"` or just `date`).
pub fn format_date_time(date: Option<&str>, time: Option<&str>) -> String {
    let Some(date) = date.map(str::trim).filter(|d| !d.is_empty()) else {
        return String::new();
    };
    let time = time.map(str::trim).filter(|t| !t.is_empty());

    let parsed_time = match time {
        Some(t) => parse_time(t),
        None => NaiveTime::from_hms_opt(0, 0, 0),
    };

    let Some(dt) = parse_date(date)
        .zip(parsed_time)
        .map(|(d, t)| NaiveDateTime::new(d, t))
    else {
        return match time {
            Some(t) => format!("{date} • {t}"),
            None => date.to_string(),
        };
    };

    format!(
        "{} {} {} {}",
        dt.day(),
        MONTHS_RU[dt.month0() as usize],
        dt.year(),
        dt.format("%H:%M")
    )
}

/// Two-letter weekday, as on the event cards ("ПТ").
pub fn weekday_short(date: &str) -> Option<&'static str> {
    let d = parse_date(date)?;
    Some(match d.weekday() {
        Weekday::Mon => "ПН",
        Weekday::Tue => "ВТ",
        Weekday::Wed => "СР",
        Weekday::Thu => "ЧТ",
        Weekday::Fri => "ПТ",
        Weekday::Sat => "СБ",
        Weekday::Sun => "ВС",
    })
}

/// An event is past when its date is strictly before `today`.
/// Events without a parseable date are never past.
pub fn is_past(date: Option<&str>, today: NaiveDate) -> bool {
    date.and_then(parse_date).map(|d| d < today).unwrap_or(false)
}

/// Russian plural form: `plural_ru(5, "позиция", "позиции", "позиций")`.
pub fn plural_ru<'a>(n: usize, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    let n100 = n % 100;
    let n10 = n % 10;
    if (11..=14).contains(&n100) {
        return many;
    }
    match n10 {
        1 => one,
        2..=4 => few,
        _ => many,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_date_and_time() {
        assert_eq!(
            format_date_time(Some("2026-03-13"), Some("13:00")),
            "13 Марта 2026 13:00"
        );
        assert_eq!(
            format_date_time(Some("2026-01-24"), Some("19:00:00")),
            "24 Января 2026 19:00"
        );
        assert_eq!(format_date_time(Some("2026-12-01"), None), "1 Декабря 2026 00:00");
    }

    #[test]
    fn empty_and_unparseable_inputs() {
        assert_eq!(format_date_time(None, Some("19:00")), "");
        assert_eq!(format_date_time(Some("  "), None), "");
        assert_eq!(
            format_date_time(Some("скоро"), Some("19:00")),
            "скоро • 19:00"
        );
        assert_eq!(format_date_time(Some("скоро"), None), "скоро");
        assert_eq!(
            format_date_time(Some("2026-03-13"), Some("evening")),
            "2026-03-13 • evening"
        );
    }

    #[test]
    fn weekdays() {
        assert_eq!(weekday_short("2025-01-24"), Some("ПТ"));
        assert_eq!(weekday_short("2026-10-19T10:00:00Z"), Some("ПН"));
        assert_eq!(weekday_short("tbd"), None);
    }

    #[test]
    fn past_is_strictly_before_today() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(is_past(Some("2026-10-18"), today));
        assert!(!is_past(Some("2026-10-19"), today));
        assert!(!is_past(Some("2027-01-01"), today));
        assert!(!is_past(Some("tbd"), today));
        assert!(!is_past(None, today));
    }

    #[test]
    fn russian_plurals() {
        let f = |n| plural_ru(n, "позиция", "позиции", "позиций");
        assert_eq!(f(1), "позиция");
        assert_eq!(f(3), "позиции");
        assert_eq!(f(5), "позиций");
        assert_eq!(f(11), "позиций");
        assert_eq!(f(21), "позиция");
        assert_eq!(f(112), "позиций");
        assert_eq!(f(0), "позиций");
    }
}
