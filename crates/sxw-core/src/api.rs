use async_trait::async_trait;

use crate::{
    domain::TelegramId,
    model::{BindingRequest, Event, EventInterest, PersonRecord, Wine, WineInterest},
    Result,
};

/// Hexagonal port for the remote club API.
///
/// Implementations map non-2xx responses to `Error::Api` (carrying the server
/// `detail` when present) and transport failures to `Error::Transport`.
#[async_trait]
pub trait ClubApi: Send + Sync {
    /// `GET /persons/`
    async fn list_persons(&self) -> Result<Vec<PersonRecord>>;

    /// `GET /wines/`, or `GET /wines/?interested_telegram_id=<id>` when filtered.
    async fn list_wines(&self, interested: Option<TelegramId>) -> Result<Vec<Wine>>;

    /// `GET /events/`, or `GET /events/?interested_telegram_id=<id>` when filtered.
    async fn list_events(&self, interested: Option<TelegramId>) -> Result<Vec<Event>>;

    /// `POST /auth/bind-telegram/`
    async fn bind_telegram(&self, req: &BindingRequest) -> Result<serde_json::Value>;

    /// `POST /notifications/wine-interest/`
    async fn notify_wine_interest(&self, req: &WineInterest) -> Result<()>;

    /// `POST /notifications/event-interest/`
    async fn notify_event_interest(&self, req: &EventInterest) -> Result<()>;
}
