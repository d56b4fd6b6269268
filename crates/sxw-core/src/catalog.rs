//! Typed, cached reads over the club API.

use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::{
    api::ClubApi,
    domain::{TelegramId, WineId},
    model::{Event, PersonRecord, Producer, Wine},
    query::QueryCache,
    Result,
};

/// Read side of the storefront. Cache keys are `(resource, interested identity)`.
pub struct Catalog {
    api: Arc<dyn ClubApi>,
    persons: QueryCache<(), Vec<PersonRecord>>,
    wines: QueryCache<Option<TelegramId>, Vec<Wine>>,
    events: QueryCache<Option<TelegramId>, Vec<Event>>,
}

impl Catalog {
    pub fn new(api: Arc<dyn ClubApi>, stale_after: Duration) -> Self {
        Self {
            api,
            persons: QueryCache::new(stale_after),
            wines: QueryCache::new(stale_after),
            events: QueryCache::new(stale_after),
        }
    }

    pub fn api(&self) -> &Arc<dyn ClubApi> {
        &self.api
    }

    pub async fn persons(&self) -> Result<Vec<PersonRecord>> {
        self.persons
            .get_or_fetch(&(), || self.api.list_persons())
            .await
    }

    /// Bypass freshness and read the person list again.
    pub async fn refetch_persons(&self) -> Result<Vec<PersonRecord>> {
        self.persons.refetch(&(), || self.api.list_persons()).await
    }

    pub async fn invalidate_persons(&self) {
        self.persons.invalidate(&()).await;
    }

    pub async fn wines(&self, interested: Option<TelegramId>) -> Result<Vec<Wine>> {
        self.wines
            .get_or_fetch(&interested, || self.api.list_wines(interested))
            .await
    }

    pub async fn events(&self, interested: Option<TelegramId>) -> Result<Vec<Event>> {
        self.events
            .get_or_fetch(&interested, || self.api.list_events(interested))
            .await
    }

    /// Forget lists nobody has read recently, including per-visitor filters.
    pub async fn prune(&self) -> usize {
        self.persons.prune().await + self.wines.prune().await + self.events.prune().await
    }

    pub async fn invalidate_interested(&self, id: TelegramId) {
        self.wines.invalidate(&Some(id)).await;
        self.events.invalidate(&Some(id)).await;
    }
}

/// Group wines into producers, in first-seen order.
///
/// Wines without a producer name stand for themselves, as the web storefront's
/// producer pages did.
pub fn producers(wines: &[Wine]) -> Vec<Producer> {
    let mut order: Vec<String> = Vec::new();
    let mut by_name: HashMap<String, Producer> = HashMap::new();

    for w in wines {
        let name = producer_name(w);
        match by_name.get_mut(&name) {
            Some(p) => p.wine_count += 1,
            None => {
                order.push(name.clone());
                by_name.insert(
                    name.clone(),
                    Producer {
                        id: w.id,
                        name,
                        region: w.region.clone(),
                        wine_count: 1,
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .filter_map(|name| by_name.remove(&name))
        .collect()
}

fn producer_name(w: &Wine) -> String {
    w.producer
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(w.name.as_str())
        .to_string()
}

/// Producer page data for `/producer/<wine id>`: the producer and its wines.
///
/// When the producer has no other wines in the list, up to four wines of the
/// same color are offered instead.
pub fn producer_page(wines: &[Wine], id: WineId) -> Option<(Producer, Vec<Wine>)> {
    let anchor = wines.iter().find(|w| w.id == id)?;
    let name = producer_name(anchor);

    let own: Vec<Wine> = wines
        .iter()
        .filter(|w| producer_name(w) == name)
        .cloned()
        .collect();

    let producer = Producer {
        id: anchor.id,
        name,
        region: anchor.region.clone(),
        wine_count: own.len(),
    };

    if own.len() > 1 {
        return Some((producer, own));
    }

    let related = wines
        .iter()
        .filter(|w| w.id != anchor.id && w.color.is_some() && w.color == anchor.color)
        .take(4)
        .cloned();
    let list = std::iter::once(anchor.clone()).chain(related).collect();
    Some((producer, list))
}
