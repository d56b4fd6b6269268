//! Reading the user id the chat shell launched us with.

use crate::domain::TelegramId;

/// A source of the host-provided user id.
///
/// Absence is a normal state (plain page, host without user data) and maps
/// to `None`, never to an error.
pub trait LaunchContextSource: Send + Sync {
    fn user_id(&self) -> Option<TelegramId>;
}

/// Running outside any host.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLaunchContext;

impl LaunchContextSource for NoLaunchContext {
    fn user_id(&self) -> Option<TelegramId> {
        None
    }
}

/// A user id handed over directly by the shell (e.g. the sender of a Telegram update).
#[derive(Clone, Copy, Debug)]
pub struct HostUser(pub Option<i64>);

impl LaunchContextSource for HostUser {
    fn user_id(&self) -> Option<TelegramId> {
        self.0.filter(|id| *id != 0).map(TelegramId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_user_ignores_zero() {
        assert_eq!(HostUser(Some(42)).user_id(), Some(TelegramId(42)));
        assert_eq!(HostUser(Some(0)).user_id(), None);
        assert_eq!(HostUser(None).user_id(), None);
        assert_eq!(NoLaunchContext.user_id(), None);
    }
}
