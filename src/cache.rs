//! TTL cache
//!
//! Every fetcher result lives in one named slot with an optional expiry.
//! Slots are serialized as a `{ value, expiration }` envelope so a stored
//! null, a stale expiry and a corrupt payload all read back the same way:
//! as absence. Raw persistence sits behind [`Store`], with an in-process map
//! and an on-disk directory implementation; TTL logic stays in [`Cache`].

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current wall-clock time in milliseconds since the epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Well-known cache slot names.
///
/// Global slots are shared across accounts; player state is namespaced by
/// account so switching wallets never shows another player's rows.
pub mod keys {
    pub const TEMPLATES: &str = "templates";
    pub const TOOL_CONFIGS: &str = "toolconfigs";
    pub const SHOP_LISTINGS: &str = "shoplistings";

    pub fn tools(account: &str) -> String {
        format!("tools.{account}")
    }

    pub fn assets(account: &str) -> String {
        format!("assets.{account}")
    }

    pub fn minerals(account: &str) -> String {
        format!("minerals.{account}")
    }
}

/// Serialized slot envelope. `expiration` is epoch milliseconds; `None`
/// means the entry never expires.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub expiration: Option<i64>,
}

impl<T> CacheEntry<T> {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        matches!(self.expiration, Some(at) if at < now_ms)
    }
}

/// Raw slot persistence. Implementations move opaque strings only.
pub trait Store: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, raw: &str) -> Result<()>;
    fn wipe(&self);
}

/// Process-local store, used by tests and short-lived runs.
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Store for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn write(&self, key: &str, raw: &str) -> Result<()> {
        self.lock().insert(key.to_string(), raw.to_string());
        Ok(())
    }

    fn wipe(&self) {
        self.lock().clear();
    }
}

/// One JSON file per slot under a cache directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create cache dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl Store for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.slot_path(key)).ok()
    }

    fn write(&self, key: &str, raw: &str) -> Result<()> {
        let path = self.slot_path(key);
        fs::write(&path, raw).with_context(|| format!("failed to write {}", path.display()))
    }

    fn wipe(&self) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let _ = fs::remove_file(path);
            }
        }
    }
}

/// TTL cache handle. Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn Store>,
}

impl Cache {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Store a value with a time-to-live in seconds.
    ///
    /// A ttl of 0 caches forever; a negative ttl writes an entry that is
    /// already expired. Write failures (disk full, unwritable dir) wipe the
    /// whole store and are logged, never surfaced: the cache must always be
    /// safe to drop.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl_secs: i64) {
        self.set_at(key, value, ttl_secs, now_ms());
    }

    /// [`Cache::set`] with an explicit clock, for tests.
    pub fn set_at<T: Serialize>(&self, key: &str, value: &T, ttl_secs: i64, now_ms: i64) {
        #[derive(Serialize)]
        struct EntryRef<'a, T> {
            value: &'a T,
            expiration: Option<i64>,
        }

        let expiration = (ttl_secs != 0).then(|| now_ms + ttl_secs * 1000);
        let raw = match serde_json::to_string(&EntryRef { value, expiration }) {
            Ok(raw) => raw,
            Err(err) => {
                log::warn!("[cache] serializing {key} failed, wiping store: {err}");
                self.store.wipe();
                return;
            }
        };
        if let Err(err) = self.store.write(key, &raw) {
            log::warn!("[cache] writing {key} failed, wiping store: {err:#}");
            self.store.wipe();
        }
    }

    /// Read a slot. Missing, expired, null, corrupt and wrongly-typed
    /// entries are all `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, now_ms())
    }

    /// [`Cache::get`] with an explicit clock, for tests.
    pub fn get_at<T: DeserializeOwned>(&self, key: &str, now_ms: i64) -> Option<T> {
        let raw = self.store.read(key)?;
        let entry: CacheEntry<Value> = serde_json::from_str(&raw).ok()?;
        if entry.is_expired(now_ms) || entry.value.is_null() {
            return None;
        }
        serde_json::from_value(entry.value).ok()
    }

    /// Invalidate one slot by overwriting it with an already-expired null.
    pub fn clear(&self, key: &str) {
        self.set(key, &Value::Null, -1);
    }

    pub fn wipe(&self) {
        self.store.wipe();
    }
}
