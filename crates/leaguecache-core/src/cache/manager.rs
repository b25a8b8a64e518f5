use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use serde::{de::DeserializeOwned, de::IgnoredAny, Deserialize, Serialize};
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::store::KeyValueStore;

/// Prefix on every storage key owned by the cache.
pub const CACHE_KEY_PREFIX: &str = "api_cache_";

/// Entries are valid for 24 hours unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_millis(86_400_000);

const MINUTE_MS: i64 = 60_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    /// Creation time, epoch milliseconds
    pub timestamp: i64,
}

impl<T> CachedData<T> {
    pub fn new(data: T, timestamp: i64) -> Self {
        Self { data, timestamp }
    }

    pub fn age_minutes(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.timestamp) / MINUTE_MS
    }

    pub fn age_display(&self, now_millis: i64) -> String {
        let minutes = self.age_minutes(now_millis);
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    /// An entry whose age cannot be represented is never fresh.
    pub fn is_fresh(&self, now_millis: i64, ttl: Duration) -> bool {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now_millis
            .checked_sub(self.timestamp)
            .is_some_and(|age| age < ttl_millis)
    }
}

/// Summary of what the cache currently holds, for display only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheInfo {
    pub total_items: usize,
    /// Sum of the stored values' UTF-8 lengths
    pub total_bytes: usize,
}

/// TTL cache over a `KeyValueStore`.
///
/// Clone is cheap: the store and clock are shared.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl CacheManager {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), ttl)
    }

    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Storage key for a logical request key such as `/all_leagues.php`.
    pub fn storage_key(logical_key: &str) -> String {
        format!(
            "{}{}",
            CACHE_KEY_PREFIX,
            base64::engine::general_purpose::STANDARD.encode(logical_key)
        )
    }

    /// Fresh payload for `logical_key`, if any.
    ///
    /// An expired entry is deleted. A malformed entry is logged and reported
    /// as a miss.
    pub fn get<T: DeserializeOwned>(&self, logical_key: &str) -> Option<T> {
        let key = Self::storage_key(logical_key);
        let raw = self.store.get(&key)?;

        let cached: CachedData<T> = match serde_json::from_str(&raw) {
            Ok(c) => c,
            Err(e) => {
                warn!(key = logical_key, error = %e, "Failed to parse cache entry");
                return None;
            }
        };

        if cached.is_fresh(self.clock.now_millis(), self.ttl) {
            debug!(key = logical_key, "Cache hit");
            Some(cached.data)
        } else {
            self.store.remove(&key);
            debug!(key = logical_key, "Cache expired");
            None
        }
    }

    /// Store `data` under `logical_key`, stamped with the current time.
    /// Failures are logged; caching never fails the caller.
    pub fn set<T: Serialize + ?Sized>(&self, logical_key: &str, data: &T) {
        let cached = CachedData::new(data, self.clock.now_millis());
        let contents = match serde_json::to_string(&cached) {
            Ok(c) => c,
            Err(e) => {
                warn!(key = logical_key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        match self.store.set(&Self::storage_key(logical_key), &contents) {
            Ok(()) => debug!(key = logical_key, bytes = contents.len(), "Cached data"),
            Err(e) => warn!(key = logical_key, error = %e, "Failed to write cache entry"),
        }
    }

    /// Whether a fresh entry exists. Does not remove stale entries.
    pub fn is_valid(&self, logical_key: &str) -> bool {
        self.load_header(logical_key)
            .map(|c| c.is_fresh(self.clock.now_millis(), self.ttl))
            .unwrap_or(false)
    }

    /// Human-readable age of the entry for `logical_key`, e.g. "3h ago".
    pub fn age(&self, logical_key: &str) -> Option<String> {
        self.load_header(logical_key)
            .map(|c| c.age_display(self.clock.now_millis()))
    }

    /// Read an entry's timestamp without deserializing its payload.
    fn load_header(&self, logical_key: &str) -> Option<CachedData<IgnoredAny>> {
        let raw = self.store.get(&Self::storage_key(logical_key))?;
        match serde_json::from_str(&raw) {
            Ok(c) => Some(c),
            Err(e) => {
                debug!(key = logical_key, error = %e, "Unreadable cache entry");
                None
            }
        }
    }

    fn cache_keys(&self) -> Vec<String> {
        self.store
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(CACHE_KEY_PREFIX))
            .collect()
    }

    /// Remove every cache entry, leaving other store content alone.
    /// Returns how many entries were removed.
    pub fn clear_all(&self) -> usize {
        let count = self
            .store
            .remove_where(&|key: &str| key.starts_with(CACHE_KEY_PREFIX));
        debug!(count = count, "Cleared cached items");
        count
    }

    pub fn inspect(&self) -> CacheInfo {
        let keys = self.cache_keys();
        let total_bytes = keys
            .iter()
            .filter_map(|k| self.store.get(k))
            .map(|v| v.len())
            .sum();

        CacheInfo {
            total_items: keys.len(),
            total_bytes,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
