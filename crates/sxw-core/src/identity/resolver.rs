use std::sync::Arc;

use crate::{
    domain::{TelegramId, VisitorScope},
    identity::{launch::LaunchContextSource, store::IdentityStore},
};

/// Where a resolved identity came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentitySource {
    LaunchContext,
    LocalCache,
    ConfiguredDefault,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub id: TelegramId,
    pub source: IdentitySource,
}

impl ResolvedIdentity {
    /// True when no real source knew the visitor and the shared default was used.
    pub fn is_anonymous(&self) -> bool {
        self.source == IdentitySource::ConfiguredDefault
    }
}

/// The single authority on "who is the current visitor".
///
/// Precedence: live launch context (non-zero) → cached id → configured default.
/// Callers resolve once per visitor session and keep the result.
pub struct IdentityResolver {
    store: Arc<dyn IdentityStore>,
    default_id: TelegramId,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn IdentityStore>, default_id: TelegramId) -> Self {
        Self { store, default_id }
    }

    pub fn resolve(
        &self,
        scope: &VisitorScope,
        launch: &dyn LaunchContextSource,
    ) -> ResolvedIdentity {
        if let Some(id) = launch.user_id() {
            // Remember it so a later session without host context still maps here.
            if self.store.telegram_id(scope) != Some(id) {
                self.store.set_telegram_id(scope, id);
            }
            tracing::debug!(scope = scope.as_str(), %id, "identity from launch context");
            return ResolvedIdentity {
                id,
                source: IdentitySource::LaunchContext,
            };
        }

        if let Some(id) = self.store.telegram_id(scope) {
            tracing::debug!(scope = scope.as_str(), %id, "identity from local cache");
            return ResolvedIdentity {
                id,
                source: IdentitySource::LocalCache,
            };
        }

        tracing::warn!(
            scope = scope.as_str(),
            id = %self.default_id,
            "no launch context or cached identity; using shared default identity"
        );
        ResolvedIdentity {
            id: self.default_id,
            source: IdentitySource::ConfiguredDefault,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{launch::HostUser, launch::NoLaunchContext, store::MemoryStore};

    const DEFAULT: TelegramId = TelegramId(1_739_711_844);

    fn scope() -> VisitorScope {
        VisitorScope("chat:1".to_string())
    }

    #[test]
    fn falls_back_to_the_same_default_every_time() {
        let resolver = IdentityResolver::new(Arc::new(MemoryStore::default()), DEFAULT);
        for _ in 0..3 {
            let r = resolver.resolve(&scope(), &NoLaunchContext);
            assert_eq!(r.id, DEFAULT);
            assert!(r.is_anonymous());
        }
    }

    #[test]
    fn launch_context_beats_cache() {
        let store = Arc::new(MemoryStore::default());
        store.set_telegram_id(&scope(), TelegramId(7));
        let resolver = IdentityResolver::new(store.clone(), DEFAULT);

        let r = resolver.resolve(&scope(), &HostUser(Some(42)));
        assert_eq!(r.id, TelegramId(42));
        assert_eq!(r.source, IdentitySource::LaunchContext);
        // Cached for the next session.
        assert_eq!(store.telegram_id(&scope()), Some(TelegramId(42)));
    }

    #[test]
    fn zero_launch_id_uses_cache() {
        let store = Arc::new(MemoryStore::default());
        store.set_telegram_id(&scope(), TelegramId(7));
        let resolver = IdentityResolver::new(store, DEFAULT);

        let r = resolver.resolve(&scope(), &HostUser(Some(0)));
        assert_eq!(r.id, TelegramId(7));
        assert_eq!(r.source, IdentitySource::LocalCache);
    }
}
