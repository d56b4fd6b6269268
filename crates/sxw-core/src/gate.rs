//! Verification gate: blocks personalized screens until the visitor's identity
//! is bound to a person known to the club.
//!
//! ```text
//! Checking ──match / cached flag──▶ Verified
//!    │
//!    └─no match──▶ Unverified ──submit(key)──▶ Submitting ──ok──▶ Verified
//!                      ▲                            │
//!                      └───────────error────────────┘
//! ```

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use crate::{
    catalog::Catalog,
    domain::{TelegramId, VisitorScope},
    errors::Error,
    identity::{Flag, IdentityStore},
    model::{find_person, BindingRequest},
    notify::Notification,
};

pub const MSG_EMPTY_KEY: &str = "Пожалуйста, введите ключ";
pub const MSG_VERIFIED: &str = "Успешная верификация! Добро пожаловать!";
pub const MSG_BIND_REJECTED: &str = "Ошибка при отправке запроса";
pub const MSG_BIND_FAILED: &str = "Неверный ключ. Пожалуйста, попробуйте снова.";
pub const MSG_IN_FLIGHT: &str = "Ключ уже проверяется, подождите немного.";
pub const MSG_ALREADY_VERIFIED: &str = "Вы уже прошли верификацию.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    Checking,
    Unverified,
    Submitting,
    Verified,
}

/// How hard to look for the freshly bound person after a successful bind.
#[derive(Clone, Copy, Debug)]
pub struct BindConfirmPolicy {
    /// Person list reads after the bind (0 disables the check).
    pub attempts: u32,
    /// Pause between reads.
    pub delay: Duration,
}

impl Default for BindConfirmPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub state: GateState,
    pub notification: Notification,
    /// Whether a bind request reached the network.
    pub requested: bool,
}

pub struct VerificationGate {
    scope: VisitorScope,
    identity: TelegramId,
    catalog: Arc<Catalog>,
    store: Arc<dyn IdentityStore>,
    policy: BindConfirmPolicy,
    state: Mutex<GateState>,
}

fn lock(m: &Mutex<GateState>) -> MutexGuard<'_, GateState> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Puts the gate back to `Unverified` if a submit is abandoned mid-flight.
struct SubmitGuard<'a> {
    state: &'a Mutex<GateState>,
    armed: bool,
}

impl SubmitGuard<'_> {
    fn finish(mut self, next: GateState) {
        *lock(self.state) = next;
        self.armed = false;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut st = lock(self.state);
            if *st == GateState::Submitting {
                *st = GateState::Unverified;
            }
        }
    }
}

impl VerificationGate {
    pub fn new(
        scope: VisitorScope,
        identity: TelegramId,
        catalog: Arc<Catalog>,
        store: Arc<dyn IdentityStore>,
        policy: BindConfirmPolicy,
    ) -> Self {
        Self {
            scope,
            identity,
            catalog,
            store,
            policy,
            state: Mutex::new(GateState::Checking),
        }
    }

    pub fn state(&self) -> GateState {
        *lock(&self.state)
    }

    pub fn identity(&self) -> TelegramId {
        self.identity
    }

    /// Decide whether the visitor may pass.
    ///
    /// The cached verified flag short-circuits the remote lookup. A failed
    /// person read counts as an empty list.
    pub async fn check(&self) -> GateState {
        {
            let mut st = lock(&self.state);
            if matches!(*st, GateState::Verified | GateState::Submitting) {
                return *st;
            }
            if self.store.flag(&self.scope, Flag::TelegramVerified) {
                *st = GateState::Verified;
                return *st;
            }
            *st = GateState::Checking;
        }

        let persons = match self.catalog.persons().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(scope = self.scope.as_str(), "person list unavailable: {e}");
                Vec::new()
            }
        };

        let mut st = lock(&self.state);
        if *st != GateState::Checking {
            // A submit finished while we were reading.
            return *st;
        }
        if find_person(&persons, self.identity).is_some() {
            self.store.set_flag(&self.scope, Flag::TelegramVerified);
            *st = GateState::Verified;
            tracing::info!(scope = self.scope.as_str(), id = %self.identity, "visitor verified by person list");
        } else {
            *st = GateState::Unverified;
            tracing::info!(scope = self.scope.as_str(), id = %self.identity, "visitor not bound; key required");
        }
        *st
    }

    /// Submit a manually issued key to bind the visitor's identity.
    pub async fn submit(&self, key: &str) -> SubmitOutcome {
        let key = key.trim();
        if key.is_empty() {
            return SubmitOutcome {
                state: self.state(),
                notification: Notification::warning(MSG_EMPTY_KEY),
                requested: false,
            };
        }

        let guard = {
            let mut st = lock(&self.state);
            match *st {
                GateState::Submitting => {
                    return SubmitOutcome {
                        state: GateState::Submitting,
                        notification: Notification::info(MSG_IN_FLIGHT),
                        requested: false,
                    };
                }
                GateState::Verified => {
                    return SubmitOutcome {
                        state: GateState::Verified,
                        notification: Notification::info(MSG_ALREADY_VERIFIED),
                        requested: false,
                    };
                }
                GateState::Checking | GateState::Unverified => {
                    *st = GateState::Submitting;
                }
            }
            SubmitGuard {
                state: &self.state,
                armed: true,
            }
        };

        let req = BindingRequest {
            telegram_id: self.identity,
            key: key.to_string(),
        };
        match self.catalog.api().bind_telegram(&req).await {
            Ok(_) => {
                self.store.set_flag(&self.scope, Flag::TelegramVerified);
                guard.finish(GateState::Verified);
                tracing::info!(scope = self.scope.as_str(), id = %self.identity, "identity bound");
                // The next person read goes to the server; the poll runs after we answer.
                self.catalog.invalidate_persons().await;
                tokio::spawn(confirm_binding(
                    self.catalog.clone(),
                    self.identity,
                    self.policy,
                ));
                SubmitOutcome {
                    state: GateState::Verified,
                    notification: Notification::success(MSG_VERIFIED),
                    requested: true,
                }
            }
            Err(e) => {
                guard.finish(GateState::Unverified);
                tracing::warn!(scope = self.scope.as_str(), id = %self.identity, "bind failed: {e}");
                SubmitOutcome {
                    state: GateState::Unverified,
                    notification: Notification::error(bind_error_message(&e)),
                    requested: true,
                }
            }
        }
    }
}

/// Re-read the person list until the bound record shows up.
///
/// Returns whether it was observed. The gate is already `Verified` either
/// way; this only refreshes the shared person cache.
async fn confirm_binding(catalog: Arc<Catalog>, id: TelegramId, policy: BindConfirmPolicy) -> bool {
    for attempt in 1..=policy.attempts {
        if attempt > 1 {
            tokio::time::sleep(policy.delay).await;
        }
        match catalog.refetch_persons().await {
            Ok(persons) if find_person(&persons, id).is_some() => return true,
            Ok(_) => {}
            Err(e) => tracing::warn!(attempt, "person re-read failed: {e}"),
        }
    }
    if policy.attempts > 0 {
        tracing::warn!(%id, "bound person not visible yet");
    }
    false
}

fn bind_error_message(e: &Error) -> String {
    match e {
        Error::Api { .. } => e.api_detail().unwrap_or(MSG_BIND_REJECTED).to_string(),
        _ => MSG_BIND_FAILED.to_string(),
    }
}
