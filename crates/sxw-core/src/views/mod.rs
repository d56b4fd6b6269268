//! Screens: Telegram HTML plus an inline keyboard, one per route.
//!
//! Every tag stays on one line so screens can be split on line boundaries.

pub mod events;
pub mod pages;
pub mod profile;
pub mod wines;

use chrono::NaiveDate;

use crate::{
    catalog::{self, Catalog},
    domain::TelegramId,
    route::{Action, Route},
    Result,
};

/// Upper bound for per-item buttons on listing screens.
pub const MAX_ITEM_BUTTONS: usize = 40;

#[derive(Clone, Debug, PartialEq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }

    pub fn nav(label: impl Into<String>, route: Route) -> Self {
        Self::new(label, Action::Navigate(route))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Screen {
    pub html: String,
    pub keyboard: Vec<Vec<Button>>,
}

impl Screen {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            keyboard: Vec::new(),
        }
    }

    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        if !buttons.is_empty() {
            self.keyboard.push(buttons);
        }
        self
    }

    pub fn button(self, button: Button) -> Self {
        self.row(vec![button])
    }

    /// All actions reachable from this screen, in keyboard order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.keyboard.iter().flatten().map(|b| &b.action)
    }
}

/// Render `route` for the visitor `who`.
///
/// Listing read failures propagate; the caller swaps in the error screen.
/// Missing entities render a not-found screen, not an error.
pub async fn render(
    catalog: &Catalog,
    route: &Route,
    who: TelegramId,
    today: NaiveDate,
) -> Result<Screen> {
    Ok(match route {
        Route::Home => pages::home(),
        Route::Wines => wines::list(&catalog.wines(None).await?),
        Route::Wine(id) => {
            let all = catalog.wines(None).await?;
            match all.iter().find(|w| w.id == *id) {
                Some(w) => wines::detail(w),
                None => pages::wine_not_found(),
            }
        }
        Route::Events => events::list(&catalog.events(None).await?, today),
        Route::Event(id) => {
            let all = catalog.events(None).await?;
            match all.into_iter().find(|e| e.id == *id) {
                Some(e) => {
                    let set = events::resolve_wine_set(catalog, &e).await;
                    events::detail(&e, &set, today)
                }
                None => pages::event_not_found(),
            }
        }
        Route::Producers => wines::producers(&catalog::producers(&catalog.wines(None).await?)),
        Route::Producer(id) => {
            let all = catalog.wines(None).await?;
            match catalog::producer_page(&all, *id) {
                Some((producer, list)) => wines::producer(&producer, &list),
                None => pages::producer_not_found(),
            }
        }
        Route::Profile => profile::render(catalog, who, today).await,
        Route::Team => pages::team(),
        Route::About => pages::about(),
        Route::Rules => pages::rules(),
        Route::InProgress => pages::in_progress(),
        Route::NotFound(path) => pages::not_found(path),
    })
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::api::fake::FakeApi;
    use crate::model::Wine;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn unknown_wine_renders_not_found() {
        let api = Arc::new(FakeApi::default());
        api.wines.lock().unwrap().push(Wine {
            id: 1,
            name: "Résonance".into(),
            ..Default::default()
        });
        let catalog = Catalog::new(api, Duration::from_secs(60));

        let found = render(&catalog, &Route::Wine(1), TelegramId(42), today())
            .await
            .unwrap();
        assert!(found.html.contains("Résonance"));

        let missing = render(&catalog, &Route::Wine(99), TelegramId(42), today())
            .await
            .unwrap();
        assert!(missing.html.contains("Вино не найдено"));
        assert!(missing
            .actions()
            .any(|a| *a == Action::Navigate(Route::Wines)));
    }

    #[tokio::test]
    async fn listing_read_failure_propagates() {
        let api = Arc::new(FakeApi::default());
        *api.fail_reads.lock().unwrap() = true;
        let catalog = Catalog::new(api, Duration::from_secs(60));

        assert!(render(&catalog, &Route::Events, TelegramId(42), today())
            .await
            .is_err());
        // Static pages never touch the network.
        assert!(render(&catalog, &Route::Rules, TelegramId(42), today())
            .await
            .is_ok());
    }
}
