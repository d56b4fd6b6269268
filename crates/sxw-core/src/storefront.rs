//! Application service: one entry point per visitor intent.
//!
//! Shells (the Telegram adapter today) translate updates into calls here and
//! present the returned screens and notifications.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use crate::{
    api::ClubApi,
    catalog::Catalog,
    config::Config,
    domain::{TelegramId, VisitorScope},
    errors::Error,
    gate::{BindConfirmPolicy, GateState, SubmitOutcome, VerificationGate},
    identity::{Flag, IdentityResolver, IdentityStore, LaunchContextSource, ResolvedIdentity},
    interest,
    notify::Notification,
    route::{InterestTarget, Route},
    views::{self, pages, Screen},
    Result,
};

#[derive(Clone, Copy, Debug)]
pub struct StorefrontOptions {
    pub default_telegram_id: TelegramId,
    pub query_stale_after: Duration,
    pub bind_confirm: BindConfirmPolicy,
    /// A visitor unseen for this long is forgotten by `sweep`.
    pub visitor_idle: Duration,
    pub gate_all_routes: bool,
    pub require_age_confirmation: bool,
}

impl StorefrontOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            default_telegram_id: cfg.default_telegram_id,
            query_stale_after: cfg.query_stale_after,
            bind_confirm: BindConfirmPolicy {
                attempts: cfg.bind_confirm_attempts,
                delay: cfg.bind_confirm_delay,
            },
            visitor_idle: cfg.visitor_idle,
            gate_all_routes: cfg.gate_all_routes,
            require_age_confirmation: cfg.require_age_confirmation,
        }
    }
}

/// What a visitor action produced.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Screen(Screen),
    Notice(Notification),
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyReply {
    pub outcome: SubmitOutcome,
    /// Route the visitor was stopped at, to reopen after a successful bind.
    pub resume: Option<Route>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Per-visitor session state. The session lasts while the storefront keeps
/// the visitor; `Storefront::sweep` ends idle ones.
pub struct Visitor {
    scope: VisitorScope,
    identity: ResolvedIdentity,
    gate: VerificationGate,
    view: Mutex<CancellationToken>,
    pending: Mutex<Option<Route>>,
    last_seen: Mutex<Instant>,
}

impl Visitor {
    pub fn scope(&self) -> &VisitorScope {
        &self.scope
    }

    pub fn identity(&self) -> ResolvedIdentity {
        self.identity
    }

    pub fn gate(&self) -> &VerificationGate {
        &self.gate
    }

    /// Cancel the live view (if any) and start a new one.
    fn begin_view(&self) -> CancellationToken {
        let mut current = lock(&self.view);
        current.cancel();
        *current = CancellationToken::new();
        current.clone()
    }

    pub fn cancel_view(&self) {
        lock(&self.view).cancel();
    }
}

pub struct Storefront {
    catalog: Arc<Catalog>,
    store: Arc<dyn IdentityStore>,
    resolver: IdentityResolver,
    options: StorefrontOptions,
    today: fn() -> NaiveDate,
    visitors: Mutex<HashMap<VisitorScope, Arc<Visitor>>>,
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl Storefront {
    pub fn new(
        api: Arc<dyn ClubApi>,
        store: Arc<dyn IdentityStore>,
        options: StorefrontOptions,
    ) -> Self {
        Self {
            catalog: Arc::new(Catalog::new(api, options.query_stale_after)),
            resolver: IdentityResolver::new(store.clone(), options.default_telegram_id),
            store,
            options,
            today: local_today,
            visitors: Mutex::new(HashMap::new()),
        }
    }

    /// Override the calendar used for "upcoming" decisions.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The visitor for `scope`. Identity is resolved on first contact and kept.
    pub fn visitor(&self, scope: VisitorScope, launch: &dyn LaunchContextSource) -> Arc<Visitor> {
        let mut visitors = lock(&self.visitors);
        if let Some(v) = visitors.get(&scope) {
            *lock(&v.last_seen) = Instant::now();
            return v.clone();
        }

        let identity = self.resolver.resolve(&scope, launch);
        let gate = VerificationGate::new(
            scope.clone(),
            identity.id,
            self.catalog.clone(),
            self.store.clone(),
            self.options.bind_confirm,
        );
        let v = Arc::new(Visitor {
            scope: scope.clone(),
            identity,
            gate,
            view: Mutex::new(CancellationToken::new()),
            pending: Mutex::new(None),
            last_seen: Mutex::new(Instant::now()),
        });
        visitors.insert(scope, v.clone());
        v
    }

    /// Forget visitors idle longer than `visitor_idle` and drop stale cached
    /// lists. A visitor still held by a running handler is kept. Returns how
    /// many visitors were dropped.
    pub async fn sweep(&self) -> usize {
        let idle = self.options.visitor_idle;
        let dropped = {
            let mut visitors = lock(&self.visitors);
            let before = visitors.len();
            visitors.retain(|_, v| {
                Arc::strong_count(v) > 1 || lock(&v.last_seen).elapsed() < idle
            });
            before - visitors.len()
        };
        let slots = self.catalog.prune().await;
        if dropped > 0 || slots > 0 {
            tracing::debug!(visitors = dropped, cache_slots = slots, "sweep");
        }
        dropped
    }

    pub fn visitor_count(&self) -> usize {
        lock(&self.visitors).len()
    }

    fn is_gated(&self, route: &Route) -> bool {
        self.options.gate_all_routes || route.is_personal()
    }

    /// Open `route`, replacing the visitor's live view.
    ///
    /// Returns `Error::Cancelled` if a newer view started before this one
    /// finished; nothing should be shown in that case.
    pub async fn open(&self, v: &Visitor, route: Route) -> Result<Screen> {
        let token = v.begin_view();
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(scope = v.scope.as_str(), route = %route.path(), "view cancelled");
                Err(Error::Cancelled)
            }
            screen = self.screen_for(v, &route) => {
                if token.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                Ok(screen)
            }
        }
    }

    async fn screen_for(&self, v: &Visitor, route: &Route) -> Screen {
        if self.options.require_age_confirmation
            && *route == Route::Home
            && !self.store.flag(&v.scope, Flag::AgeVerified)
        {
            return pages::age_prompt();
        }

        if self.is_gated(route) && v.gate.check().await != GateState::Verified {
            *lock(&v.pending) = Some(route.clone());
            return pages::verification_prompt();
        }

        match views::render(&self.catalog, route, v.identity.id, (self.today)()).await {
            Ok(screen) => screen,
            Err(e) => {
                tracing::warn!(scope = v.scope.as_str(), route = %route.path(), "render failed: {e}");
                pages::error_screen(route)
            }
        }
    }

    /// "I want this" button. Gated; never changes the current screen when
    /// the visitor is verified.
    pub async fn express_interest(&self, v: &Visitor, target: InterestTarget) -> Reply {
        if v.gate.check().await != GateState::Verified {
            return Reply::Screen(pages::verification_prompt());
        }
        Reply::Notice(interest::express_interest(&self.catalog, target, v.identity.id).await)
    }

    pub async fn submit_key(&self, v: &Visitor, key: &str) -> KeyReply {
        let outcome = v.gate.submit(key).await;
        let resume = if outcome.requested && outcome.state == GateState::Verified {
            lock(&v.pending).take()
        } else {
            None
        };
        KeyReply { outcome, resume }
    }

    /// Record the 18+ confirmation and show the home screen.
    pub async fn confirm_age(&self, v: &Visitor) -> Result<Screen> {
        self.store.set_flag(&v.scope, Flag::AgeVerified);
        tracing::info!(scope = v.scope.as_str(), "age confirmed");
        self.open(v, Route::Home).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeApi;
    use crate::identity::{HostUser, IdentitySource, MemoryStore, NoLaunchContext};
    use crate::model::{PersonRecord, Wine};
    use crate::notify::NotificationKind;

    fn options() -> StorefrontOptions {
        StorefrontOptions {
            default_telegram_id: TelegramId(1_739_711_844),
            query_stale_after: Duration::from_secs(60),
            bind_confirm: BindConfirmPolicy {
                attempts: 2,
                delay: Duration::ZERO,
            },
            visitor_idle: Duration::from_secs(60),
            gate_all_routes: false,
            require_age_confirmation: false,
        }
    }

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn storefront(api: &Arc<FakeApi>, opts: StorefrontOptions) -> (Storefront, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let sf = Storefront::new(api.clone(), store.clone(), opts).with_today(fixed_today);
        (sf, store)
    }

    fn scope() -> VisitorScope {
        VisitorScope("chat:5".to_string())
    }

    #[tokio::test]
    async fn identity_is_resolved_once_per_visitor() {
        let api = Arc::new(FakeApi::default());
        let (sf, _) = storefront(&api, options());

        let first = sf.visitor(scope(), &HostUser(Some(42)));
        let again = sf.visitor(scope(), &HostUser(Some(7)));
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(again.identity().id, TelegramId(42));

        let anon = sf.visitor(VisitorScope("chat:6".into()), &NoLaunchContext);
        assert_eq!(anon.identity().source, IdentitySource::ConfiguredDefault);
    }

    #[tokio::test]
    async fn profile_is_gated_until_key_is_accepted() {
        let api = Arc::new(FakeApi::default());
        let (sf, _) = storefront(&api, options());
        let v = sf.visitor(scope(), &HostUser(Some(42)));

        let s = sf.open(&v, Route::Profile).await.unwrap();
        assert!(s.html.contains(pages::VERIFY_TITLE));

        let reply = sf.submit_key(&v, "  ABC123 ").await;
        assert_eq!(reply.outcome.state, GateState::Verified);
        assert_eq!(reply.resume, Some(Route::Profile));
        assert_eq!(api.binds.lock().unwrap()[0].key, "ABC123");

        let s = sf.open(&v, Route::Profile).await.unwrap();
        assert!(s.html.contains("Избранные вина"));
    }

    #[tokio::test]
    async fn catalog_routes_are_open_unless_everything_is_gated() {
        let api = Arc::new(FakeApi::default());
        let (sf, _) = storefront(&api, options());
        let v = sf.visitor(scope(), &HostUser(Some(42)));
        let s = sf.open(&v, Route::Wines).await.unwrap();
        assert!(s.html.contains("Коллекция вин"));
        assert_eq!(api.count("GET /persons/"), 0);

        let api = Arc::new(FakeApi::default());
        let (sf, _) = storefront(
            &api,
            StorefrontOptions {
                gate_all_routes: true,
                ..options()
            },
        );
        let v = sf.visitor(scope(), &HostUser(Some(42)));
        let s = sf.open(&v, Route::Wines).await.unwrap();
        assert!(s.html.contains(pages::VERIFY_TITLE));
    }

    #[tokio::test]
    async fn new_view_cancels_the_previous_one() {
        let api = Arc::new(FakeApi::default());
        *api.read_delay.lock().unwrap() = Some(Duration::from_millis(200));
        let (sf, _) = storefront(&api, options());
        let sf = Arc::new(sf);
        let v = sf.visitor(scope(), &HostUser(Some(42)));

        let slow = {
            let (sf, v) = (sf.clone(), v.clone());
            tokio::spawn(async move { sf.open(&v, Route::Wines).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let rules = sf.open(&v, Route::Rules).await.unwrap();
        assert!(rules.html.contains("Правила клуба"));
        assert!(matches!(slow.await.unwrap(), Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn listing_failure_shows_error_screen_with_retry() {
        let api = Arc::new(FakeApi::default());
        *api.fail_reads.lock().unwrap() = true;
        let (sf, _) = storefront(&api, options());
        let v = sf.visitor(scope(), &HostUser(Some(42)));

        let s = sf.open(&v, Route::Events).await.unwrap();
        assert!(s.html.contains(pages::MSG_SOMETHING_WRONG));
        assert!(s
            .actions()
            .any(|a| *a == crate::route::Action::Navigate(Route::Events)));
    }

    #[tokio::test]
    async fn age_prompt_precedes_home_until_confirmed() {
        let api = Arc::new(FakeApi::default());
        let (sf, store) = storefront(
            &api,
            StorefrontOptions {
                require_age_confirmation: true,
                ..options()
            },
        );
        let v = sf.visitor(scope(), &HostUser(Some(42)));

        let s = sf.open(&v, Route::Home).await.unwrap();
        assert!(s.html.contains("18+"));

        let s = sf.confirm_age(&v).await.unwrap();
        assert!(s.html.contains("SX Wine"));
        assert!(store.flag(&scope(), Flag::AgeVerified));
    }

    #[tokio::test]
    async fn interest_requires_verification() {
        let api = Arc::new(FakeApi::with_persons(vec![PersonRecord {
            id: 1,
            telegram_id: Some(42),
            ..Default::default()
        }]));
        api.wines.lock().unwrap().push(Wine {
            id: 12,
            name: "Résonance".into(),
            ..Default::default()
        });
        let (sf, _) = storefront(&api, options());

        let member = sf.visitor(scope(), &HostUser(Some(42)));
        match sf.express_interest(&member, InterestTarget::Wine(12)).await {
            Reply::Notice(n) => assert_eq!(n.kind, NotificationKind::Success),
            other => panic!("unexpected {other:?}"),
        }

        let stranger = sf.visitor(VisitorScope("chat:6".into()), &HostUser(Some(7)));
        assert!(matches!(
            sf.express_interest(&stranger, InterestTarget::Wine(12)).await,
            Reply::Screen(_)
        ));
        assert_eq!(api.wine_interests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn group_members_keep_their_own_identity() {
        let api = Arc::new(FakeApi::default());
        let (sf, _) = storefront(&api, options());
        let group = crate::domain::ChatId(-100);

        let alice = sf.visitor(
            VisitorScope::sender(group, Some(TelegramId(111))),
            &HostUser(Some(111)),
        );
        let bob = sf.visitor(
            VisitorScope::sender(group, Some(TelegramId(222))),
            &HostUser(Some(222)),
        );
        assert_eq!(alice.identity().id, TelegramId(111));
        assert_eq!(bob.identity().id, TelegramId(222));

        sf.submit_key(&bob, "BOBKEY").await;
        assert_eq!(api.binds.lock().unwrap()[0].telegram_id, TelegramId(222));
        assert_eq!(alice.gate().state(), GateState::Checking);
    }

    #[tokio::test]
    async fn sweep_forgets_idle_visitors_and_stale_lists() {
        let api = Arc::new(FakeApi::default());
        let store = Arc::new(MemoryStore::default());
        let sf = Storefront::new(
            api.clone(),
            store,
            StorefrontOptions {
                visitor_idle: Duration::from_millis(50),
                query_stale_after: Duration::from_millis(50),
                ..options()
            },
        )
        .with_today(fixed_today);

        let idle = sf.visitor(scope(), &HostUser(Some(42)));
        sf.open(&idle, Route::Wines).await.unwrap();
        let first = Arc::downgrade(&idle);
        drop(idle);

        let busy = sf.visitor(VisitorScope("chat:6".into()), &HostUser(Some(7)));
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(sf.sweep().await, 1);
        assert_eq!(sf.visitor_count(), 1);
        assert_eq!(sf.catalog().prune().await, 0);

        // A returning visitor starts a new session, resolved again.
        let again = sf.visitor(scope(), &HostUser(Some(42)));
        assert!(first.upgrade().is_none());
        assert_eq!(again.identity().id, TelegramId(42));
        drop(busy);
    }
}
