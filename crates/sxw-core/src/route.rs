//! Client-side routes of the storefront and the actions buttons carry.

use crate::domain::{EventId, WineId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Wines,
    Wine(WineId),
    Events,
    Event(EventId),
    Producers,
    Producer(WineId),
    Profile,
    Team,
    About,
    Rules,
    InProgress,
    NotFound(String),
}

impl Route {
    /// Parse a path such as `/wine/12`. Unknown paths map to `NotFound`.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let clean = trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .trim_matches('/');
        let parts: Vec<&str> = clean.split('/').filter(|s| !s.is_empty()).collect();

        match parts.as_slice() {
            [] => Route::Home,
            ["wines"] => Route::Wines,
            ["events"] => Route::Events,
            ["producers"] => Route::Producers,
            ["profile"] => Route::Profile,
            ["team"] => Route::Team,
            ["about"] => Route::About,
            ["rules"] => Route::Rules,
            ["in_progress"] => Route::InProgress,
            ["wine", id] => id
                .parse()
                .map(Route::Wine)
                .unwrap_or_else(|_| Route::NotFound(trimmed.to_string())),
            ["event", id] => id
                .parse()
                .map(Route::Event)
                .unwrap_or_else(|_| Route::NotFound(trimmed.to_string())),
            ["producer", id] => id
                .parse()
                .map(Route::Producer)
                .unwrap_or_else(|_| Route::NotFound(trimmed.to_string())),
            _ => Route::NotFound(trimmed.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Wines => "/wines".to_string(),
            Route::Wine(id) => format!("/wine/{id}"),
            Route::Events => "/events".to_string(),
            Route::Event(id) => format!("/event/{id}"),
            Route::Producers => "/producers".to_string(),
            Route::Producer(id) => format!("/producer/{id}"),
            Route::Profile => "/profile".to_string(),
            Route::Team => "/team".to_string(),
            Route::About => "/about".to_string(),
            Route::Rules => "/rules".to_string(),
            Route::InProgress => "/in_progress".to_string(),
            Route::NotFound(p) => p.clone(),
        }
    }

    /// Routes that show data tied to the visitor's identity.
    pub fn is_personal(&self) -> bool {
        matches!(self, Route::Profile)
    }
}

/// What an interest action points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterestTarget {
    Wine(WineId),
    Event(EventId),
}

/// Button payloads. Encoded into Telegram callback data (max 64 bytes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Navigate(Route),
    Interest(InterestTarget),
    ConfirmAge,
}

impl Action {
    pub fn encode(&self) -> String {
        match self {
            Action::Navigate(route) => format!("nav:{}", route.path()),
            Action::Interest(InterestTarget::Wine(id)) => format!("want:wine:{id}"),
            Action::Interest(InterestTarget::Event(id)) => format!("want:event:{id}"),
            Action::ConfirmAge => "age:ok".to_string(),
        }
    }

    pub fn decode(data: &str) -> Option<Self> {
        if let Some(path) = data.strip_prefix("nav:") {
            return Some(Action::Navigate(Route::parse(path)));
        }
        if let Some(rest) = data.strip_prefix("want:") {
            let (kind, id) = rest.split_once(':')?;
            let id = id.parse().ok()?;
            return match kind {
                "wine" => Some(Action::Interest(InterestTarget::Wine(id))),
                "event" => Some(Action::Interest(InterestTarget::Event(id))),
                _ => None,
            };
        }
        (data == "age:ok").then_some(Action::ConfirmAge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/wines"), Route::Wines);
        assert_eq!(Route::parse("/wines/?category=white-wine"), Route::Wines);
        assert_eq!(Route::parse("/wine/12"), Route::Wine(12));
        assert_eq!(Route::parse("event/3/"), Route::Event(3));
        assert_eq!(Route::parse("/producer/5"), Route::Producer(5));
        assert_eq!(Route::parse("/profile"), Route::Profile);
        assert_eq!(Route::parse("/in_progress"), Route::InProgress);
    }

    #[test]
    fn unknown_or_malformed_paths_are_not_found() {
        assert_eq!(Route::parse("/cart"), Route::NotFound("/cart".into()));
        assert_eq!(Route::parse("/wine/abc"), Route::NotFound("/wine/abc".into()));
        assert_eq!(Route::parse("/wine/1/2"), Route::NotFound("/wine/1/2".into()));
    }

    #[test]
    fn path_inverts_parse() {
        for r in [
            Route::Home,
            Route::Wines,
            Route::Wine(9),
            Route::Events,
            Route::Event(1),
            Route::Producers,
            Route::Producer(4),
            Route::Profile,
            Route::Team,
            Route::About,
            Route::Rules,
            Route::InProgress,
        ] {
            assert_eq!(Route::parse(&r.path()), r);
        }
    }

    #[test]
    fn actions_encode_and_decode() {
        let nav = Action::Navigate(Route::Wine(12));
        assert_eq!(nav.encode(), "nav:/wine/12");
        assert_eq!(Action::decode("nav:/wine/12"), Some(nav));
        assert_eq!(
            Action::decode("want:event:5"),
            Some(Action::Interest(InterestTarget::Event(5)))
        );
        assert_eq!(Action::decode("age:ok"), Some(Action::ConfirmAge));
        assert_eq!(Action::decode("want:cart:1"), None);
        assert_eq!(Action::decode("want:wine:x"), None);
        assert_eq!(Action::decode("askuser:1:2"), None);
    }
}
