use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::TelegramId, errors::Error, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://vfqc-bc18-fu02.gw-1a.dockhost.net/api";

/// Identity used when neither the host nor the local cache knows the visitor.
/// Kept from the web storefront as a demo fallback; override with
/// `DEFAULT_TELEGRAM_ID`.
pub const DEFAULT_TELEGRAM_ID: i64 = 1_739_711_844;

/// Typed configuration for the storefront.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,
    pub api_base_url: String,

    // Identity
    pub default_telegram_id: TelegramId,
    pub identity_store_path: Option<PathBuf>,

    // Remote API
    pub http_timeout: Option<Duration>,
    pub query_stale_after: Duration,
    pub bind_confirm_attempts: u32,
    pub bind_confirm_delay: Duration,

    // Sessions
    pub visitor_idle: Duration,

    // Behavior flags
    pub gate_all_routes: bool,
    pub require_age_confirmation: bool,

    // Telegram limits
    pub telegram_safe_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (environment, test maps).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_str = |key: &str| lookup(key);
        let env_u64 = |key: &str| env_str(key).and_then(|s| s.trim().parse::<u64>().ok());

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let api_base_url = env_str("API_BASE_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let default_telegram_id = TelegramId(
            env_str("DEFAULT_TELEGRAM_ID")
                .and_then(|s| s.trim().parse::<i64>().ok())
                .filter(|id| *id != 0)
                .unwrap_or(DEFAULT_TELEGRAM_ID),
        );

        // Empty path keeps the identity cache in memory only.
        let identity_store_path = match env_str("IDENTITY_STORE_PATH") {
            Some(p) if p.trim().is_empty() => None,
            Some(p) => Some(PathBuf::from(p.trim())),
            None => Some(PathBuf::from("/tmp/sxw-identity.json")),
        };

        let http_timeout = match env_u64("HTTP_TIMEOUT_MS").unwrap_or(15_000) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        let query_stale_after = Duration::from_millis(env_u64("QUERY_STALE_MS").unwrap_or(30_000));
        let bind_confirm_attempts = env_u64("BIND_CONFIRM_ATTEMPTS")
            .map(|n| n.min(20) as u32)
            .unwrap_or(3);
        let bind_confirm_delay =
            Duration::from_millis(env_u64("BIND_CONFIRM_DELAY_MS").unwrap_or(500));

        // Idle visitors (and stale cached lists) are dropped after this long.
        let visitor_idle = Duration::from_millis(
            env_u64("VISITOR_IDLE_MS")
                .filter(|ms| *ms > 0)
                .unwrap_or(30 * 60 * 1000),
        );

        let gate_all_routes = env_bool(env_str("GATE_ALL_ROUTES")).unwrap_or(false);
        let require_age_confirmation =
            env_bool(env_str("REQUIRE_AGE_CONFIRMATION")).unwrap_or(false);

        let telegram_safe_limit = env_u64("TELEGRAM_SAFE_LIMIT")
            .map(|n| n as usize)
            .unwrap_or(4000)
            .clamp(200, 4096);

        Ok(Self {
            telegram_bot_token,
            api_base_url,
            default_telegram_id,
            identity_store_path,
            http_timeout,
            query_stale_after,
            bind_confirm_attempts,
            bind_confirm_delay,
            visitor_idle,
            gate_all_routes,
            require_age_confirmation,
            telegram_safe_limit,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn env_bool(v: Option<String>) -> Option<bool> {
    v.map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
