//! Core library for leaguecache.
//!
//! Everything the league browser needs that is not rendering lives here:
//!
//! - `api`: TheSportsDB client with cache-first lookups and retries
//! - `cache`: timestamped key/value cache with TTL expiry
//! - `filter`: pure search and sport filters over league lists
//! - `debounce`: quiet-period primitive for search input
//! - `config`: defaults, config file and environment overrides
//! - `models`: API payload types

pub mod api;
pub mod cache;
pub mod config;
pub mod debounce;
pub mod filter;
pub mod models;

pub use api::{ApiClient, ApiError, BadgeSource, RequestToken, RequestTracker, SeasonBadge};
pub use cache::{CacheInfo, CacheManager, Clock, FileStore, KeyValueStore, MemoryStore, StoreError};
pub use config::Config;
pub use debounce::Debouncer;
pub use models::League;
