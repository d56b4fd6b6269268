//! Keyed query cache with in-flight deduplication.
//!
//! Each key owns an async slot. A reader that finds no fresh value fetches while
//! holding the slot, so concurrent readers of the same key wait for that single
//! request and share its result. Failed fetches leave the slot empty.

use std::{collections::HashMap, hash::Hash, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::Result;

struct Slot<V> {
    value: Option<V>,
    fetched_at: Option<Instant>,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            value: None,
            fetched_at: None,
        }
    }
}

pub struct QueryCache<K, V> {
    stale_after: Duration,
    slots: Mutex<HashMap<K, Arc<Mutex<Slot<V>>>>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after,
            slots: Mutex::new(HashMap::new()),
        }
    }

    async fn slot(&self, key: &K) -> Arc<Mutex<Slot<V>>> {
        let mut map = self.slots.lock().await;
        map.entry(key.clone()).or_default().clone()
    }

    /// Return the cached value for `key` if fresh, otherwise run `fetch`.
    pub async fn get_or_fetch<F, Fut>(&self, key: &K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V>>,
    {
        let slot = self.slot(key).await;
        let mut guard = slot.lock().await;

        if let (Some(v), Some(at)) = (&guard.value, guard.fetched_at) {
            if at.elapsed() < self.stale_after {
                return Ok(v.clone());
            }
        }

        let v = fetch().await?;
        guard.value = Some(v.clone());
        guard.fetched_at = Some(Instant::now());
        Ok(v)
    }

    /// Fetch unconditionally and replace the cached value.
    pub async fn refetch<F, Fut>(&self, key: &K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V>>,
    {
        let slot = self.slot(key).await;
        let mut guard = slot.lock().await;
        let v = fetch().await?;
        guard.value = Some(v.clone());
        guard.fetched_at = Some(Instant::now());
        Ok(v)
    }

    /// Drop the cached value; the next read fetches.
    pub async fn invalidate(&self, key: &K) {
        let slot = {
            let map = self.slots.lock().await;
            map.get(key).cloned()
        };
        if let Some(slot) = slot {
            let mut guard = slot.lock().await;
            guard.value = None;
            guard.fetched_at = None;
        }
    }

    /// Drop slots holding nothing fresh. Slots in use (a fetch in flight or a
    /// reader holding the slot) are kept. Returns how many were dropped.
    pub async fn prune(&self) -> usize {
        let mut map = self.slots.lock().await;
        let before = map.len();
        map.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(guard) => guard
                    .fetched_at
                    .is_some_and(|at| at.elapsed() < self.stale_after),
                Err(_) => true,
            }
        });
        before - map.len()
    }

    pub async fn slot_count(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn cached(&self, key: &K) -> Option<V> {
        let slot = {
            let map = self.slots.lock().await;
            map.get(key).cloned()
        }?;
        let guard = slot.lock().await;
        guard.value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn concurrent_readers_share_one_fetch() {
        let cache: Arc<QueryCache<&'static str, u32>> =
            Arc::new(QueryCache::new(Duration::from_secs(60)));
        let fetches = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let fetches = fetches.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(&"wines", || async {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(7)
                    })
                    .await
            }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap(), 7);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_fetch_independently() {
        let cache: QueryCache<Option<i64>, u32> = QueryCache::new(Duration::from_secs(60));
        let a = cache.get_or_fetch(&None, || async { Ok(1) }).await.unwrap();
        let b = cache.get_or_fetch(&Some(42), || async { Ok(2) }).await.unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(cache.cached(&Some(42)).await, Some(2));
    }

    #[tokio::test]
    async fn failures_are_not_cached_and_invalidate_forces_fetch() {
        let cache: QueryCache<u8, u32> = QueryCache::new(Duration::from_secs(60));
        let err = cache
            .get_or_fetch(&1, || async { Err(Error::Transport("down".into())) })
            .await;
        assert!(err.is_err());
        assert_eq!(cache.cached(&1).await, None);

        assert_eq!(cache.get_or_fetch(&1, || async { Ok(5) }).await.unwrap(), 5);
        // Fresh value wins over a new fetch.
        assert_eq!(cache.get_or_fetch(&1, || async { Ok(6) }).await.unwrap(), 5);

        cache.invalidate(&1).await;
        assert_eq!(cache.get_or_fetch(&1, || async { Ok(6) }).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn stale_values_refetch() {
        let cache: QueryCache<u8, u32> = QueryCache::new(Duration::ZERO);
        assert_eq!(cache.get_or_fetch(&1, || async { Ok(1) }).await.unwrap(), 1);
        assert_eq!(cache.get_or_fetch(&1, || async { Ok(2) }).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn prune_drops_only_stale_slots() {
        let cache: QueryCache<u64, u32> = QueryCache::new(Duration::from_millis(50));
        cache.get_or_fetch(&1, || async { Ok(1) }).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.get_or_fetch(&2, || async { Ok(2) }).await.unwrap();

        assert_eq!(cache.prune().await, 1);
        assert_eq!(cache.slot_count().await, 1);
        assert_eq!(cache.cached(&1).await, None);
        assert_eq!(cache.cached(&2).await, Some(2));
    }
}
