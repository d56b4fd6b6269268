//! HTTP adapter for the club API (`ClubApi` over reqwest).
//!
//! All endpoints carry a trailing slash; list filters go in the query string.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use sxw_core::{
    api::ClubApi,
    config::Config,
    domain::TelegramId,
    errors::Error,
    model::{ApiErrorBody, BindingRequest, Event, EventInterest, PersonRecord, Wine, WineInterest},
    Result,
};

const INTERESTED_PARAM: &str = "interested_telegram_id";

#[derive(Clone, Debug)]
pub struct HttpClubApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpClubApi {
    /// `timeout: None` leaves requests unbounded.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.api_base_url.clone(), cfg.http_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        interested: Option<TelegramId>,
    ) -> Result<Vec<T>> {
        let mut req = self.http.get(self.url(path));
        if let Some(id) = interested {
            req = req.query(&[(INTERESTED_PARAM, id.0)]);
        }
        let body = send(req).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<String> {
        send(self.http.post(self.url(path)).json(body)).await
    }
}

/// Send and return the body of a 2xx response.
async fn send(req: reqwest::RequestBuilder) -> Result<String> {
    let resp = req.send().await.map_err(transport)?;
    let status = resp.status();
    let url = resp.url().path().to_string();
    let body = resp.text().await.map_err(transport)?;

    if !status.is_success() {
        let err = api_error(status.as_u16(), &body);
        tracing::warn!(%url, status = status.as_u16(), "club api rejected request: {err}");
        return Err(err);
    }
    Ok(body)
}

fn transport(e: reqwest::Error) -> Error {
    tracing::warn!("club api unreachable: {e}");
    Error::Transport(e.to_string())
}

/// Map a non-2xx response to `Error::Api`, keeping the server `detail`.
pub fn api_error(status: u16, body: &str) -> Error {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.detail);
    Error::Api { status, detail }
}

#[async_trait]
impl ClubApi for HttpClubApi {
    async fn list_persons(&self) -> Result<Vec<PersonRecord>> {
        self.get_list("/persons/", None).await
    }

    async fn list_wines(&self, interested: Option<TelegramId>) -> Result<Vec<Wine>> {
        self.get_list("/wines/", interested).await
    }

    async fn list_events(&self, interested: Option<TelegramId>) -> Result<Vec<Event>> {
        self.get_list("/events/", interested).await
    }

    async fn bind_telegram(&self, req: &BindingRequest) -> Result<serde_json::Value> {
        let body = self.post_json("/auth/bind-telegram/", req).await?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn notify_wine_interest(&self, req: &WineInterest) -> Result<()> {
        self.post_json("/notifications/wine-interest/", req).await?;
        Ok(())
    }

    async fn notify_event_interest(&self, req: &EventInterest) -> Result<()> {
        self.post_json("/notifications/event-interest/", req).await?;
        Ok(())
    }
}
