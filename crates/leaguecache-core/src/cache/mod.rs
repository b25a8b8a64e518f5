//! Local caching module for API responses.
//!
//! `CacheManager` stores timestamped JSON payloads in a `KeyValueStore`
//! under `api_cache_`-prefixed keys. Entries expire after a configurable TTL
//! (24 hours by default) and are removed by the first reader that finds them
//! expired.
//!
//! Backends:
//! - `MemoryStore`: in-process map, used by tests and as a fallback
//! - `FileStore`: the same map persisted to a JSON file in the cache directory

pub mod clock;
pub mod manager;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{CacheInfo, CacheManager, CachedData, CACHE_KEY_PREFIX, DEFAULT_TTL};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, DEFAULT_CAPACITY_BYTES};
