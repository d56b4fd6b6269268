use serde::{Deserialize, Serialize};

use super::de;
use crate::domain::{EventId, TelegramId, WineId};

/// A person known to the club backend.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PersonRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub telegram_id: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub firstname: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub nickname: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub grade: Option<String>,
}

impl PersonRecord {
    pub fn is_bound_to(&self, id: TelegramId) -> bool {
        self.telegram_id == Some(id.0)
    }

    /// "Firstname Lastname", else the nickname.
    pub fn display_name(&self) -> Option<String> {
        let full = [self.firstname.as_deref(), self.lastname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return Some(full);
        }
        self.nickname
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Find the person bound to `id`.
pub fn find_person(persons: &[PersonRecord], id: TelegramId) -> Option<&PersonRecord> {
    persons.iter().find(|p| p.is_bound_to(id))
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Wine {
    pub id: WineId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub producer: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub sweetness: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub volume: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub grape: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub alcohol: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "de::opt_f64")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub image: Option<String>,
}

impl Wine {
    /// `color • sweetness • volume`, skipping blanks.
    pub fn meta_line(&self) -> String {
        [&self.color, &self.sweetness, &self.volume]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .collect::<Vec<_>>()
            .join(" • ")
    }

    /// First part of the region ("Champagne, Montagne de Reims" → "Champagne").
    pub fn region_head(&self) -> Option<&str> {
        self.region
            .as_deref()
            .and_then(|r| r.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// An item of an event's wine set: either a bare id or an embedded record.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EventWine {
    Id(WineId),
    Wine(Wine),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub place: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_empty")]
    pub wine_list: Vec<EventWine>,
}

/// Producer view derived from the wine list.
#[derive(Clone, Debug, PartialEq)]
pub struct Producer {
    /// Id of the first wine carrying this producer; producer pages link by it.
    pub id: WineId,
    pub name: String,
    pub region: Option<String>,
    pub wine_count: usize,
}

/// Body of `POST /auth/bind-telegram/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BindingRequest {
    pub telegram_id: TelegramId,
    pub key: String,
}

/// Body of `POST /notifications/wine-interest/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WineInterest {
    pub wine_id: WineId,
    pub telegram_id: TelegramId,
}

/// Body of `POST /notifications/event-interest/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventInterest {
    pub event_id: EventId,
    pub telegram_id: TelegramId,
}

/// Error body returned by the API on rejected writes.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, deserialize_with = "de::opt_text")]
    pub detail: Option<String>,
}
