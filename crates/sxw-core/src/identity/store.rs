//! Durable per-visitor identity cache.
//!
//! Mirrors what the web storefront kept in browser storage: a fallback user id
//! and a couple of "already confirmed" flags, under fixed key names. Storage
//! problems degrade to "nothing cached"; they never reach the caller.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{TelegramId, VisitorScope};

pub const KEY_TELEGRAM_ID: &str = "telegramId";

/// Boolean markers kept per visitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flag {
    /// The visitor's identity is bound to a known person.
    TelegramVerified,
    /// The visitor confirmed being of legal drinking age.
    AgeVerified,
}

impl Flag {
    pub fn key(self) -> &'static str {
        match self {
            Flag::TelegramVerified => "telegramVerified",
            Flag::AgeVerified => "ageVerified",
        }
    }
}

/// Port for the identity cache. Writes are synchronous.
pub trait IdentityStore: Send + Sync {
    fn telegram_id(&self, scope: &VisitorScope) -> Option<TelegramId>;
    fn set_telegram_id(&self, scope: &VisitorScope, id: TelegramId);
    fn flag(&self, scope: &VisitorScope, flag: Flag) -> bool;
    fn set_flag(&self, scope: &VisitorScope, flag: Flag);
}

type Entries = HashMap<String, BTreeMap<String, Value>>;

fn read_id(entries: &Entries, scope: &VisitorScope) -> Option<TelegramId> {
    let v = entries.get(scope.as_str())?.get(KEY_TELEGRAM_ID)?;
    // Browser storage keeps strings; accept both.
    let id = match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (id != 0).then_some(TelegramId(id))
}

fn read_flag(entries: &Entries, scope: &VisitorScope, flag: Flag) -> bool {
    match entries.get(scope.as_str()).and_then(|e| e.get(flag.key())) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-process store; forgets everything on restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl IdentityStore for MemoryStore {
    fn telegram_id(&self, scope: &VisitorScope) -> Option<TelegramId> {
        read_id(&lock(&self.entries), scope)
    }

    fn set_telegram_id(&self, scope: &VisitorScope, id: TelegramId) {
        lock(&self.entries)
            .entry(scope.0.clone())
            .or_default()
            .insert(KEY_TELEGRAM_ID.to_string(), Value::from(id.0));
    }

    fn flag(&self, scope: &VisitorScope, flag: Flag) -> bool {
        read_flag(&lock(&self.entries), scope, flag)
    }

    fn set_flag(&self, scope: &VisitorScope, flag: Flag) {
        lock(&self.entries)
            .entry(scope.0.clone())
            .or_default()
            .insert(flag.key().to_string(), Value::Bool(true));
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    visitors: Entries,
}

/// JSON-file backed store. The whole document is rewritten on every set.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Option<Entries>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Entries {
        let txt = match fs::read_to_string(path) {
            Ok(txt) => txt,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Entries::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "identity store unreadable: {e}");
                return Entries::new();
            }
        };
        if txt.trim().is_empty() {
            return Entries::new();
        }
        match serde_json::from_str::<StoreFile>(&txt) {
            Ok(f) => f.visitors,
            Err(e) => {
                tracing::warn!(path = %path.display(), "identity store corrupt, starting empty: {e}");
                Entries::new()
            }
        }
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut Entries) -> R) -> R {
        let mut guard = lock(&self.entries);
        let entries = guard.get_or_insert_with(|| Self::load(&self.path));
        f(entries)
    }

    fn persist(&self, entries: &Entries) {
        let doc = StoreFile {
            visitors: entries.clone(),
        };
        let result = serde_json::to_string_pretty(&doc)
            .map_err(crate::Error::from)
            .and_then(|txt| {
                if let Some(dir) = self.path.parent() {
                    fs::create_dir_all(dir)?;
                }
                let tmp = self.path.with_extension("json.tmp");
                fs::write(&tmp, txt)?;
                fs::rename(&tmp, &self.path)?;
                Ok(())
            });
        if let Err(e) = result {
            // Keep serving from memory.
            tracing::warn!(path = %self.path.display(), "identity store write failed: {e}");
        }
    }

    fn set(&self, scope: &VisitorScope, key: &str, value: Value) {
        self.with_entries(|entries| {
            entries
                .entry(scope.0.clone())
                .or_default()
                .insert(key.to_string(), value);
            self.persist(entries);
        });
    }
}

impl IdentityStore for JsonFileStore {
    fn telegram_id(&self, scope: &VisitorScope) -> Option<TelegramId> {
        self.with_entries(|e| read_id(e, scope))
    }

    fn set_telegram_id(&self, scope: &VisitorScope, id: TelegramId) {
        self.set(scope, KEY_TELEGRAM_ID, Value::from(id.0));
    }

    fn flag(&self, scope: &VisitorScope, flag: Flag) -> bool {
        self.with_entries(|e| read_flag(e, scope, flag))
    }

    fn set_flag(&self, scope: &VisitorScope, flag: Flag) {
        self.set(scope, flag.key(), Value::Bool(true));
    }
}
