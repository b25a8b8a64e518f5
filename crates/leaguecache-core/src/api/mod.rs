//! REST API client module for TheSportsDB.
//!
//! `ApiClient` fetches the league list and per-league season badges. Every
//! lookup goes through the `CacheManager` first; the network is only used on
//! a miss. `RequestTracker` lets callers drop responses that a newer request
//! for the same key has superseded.

pub mod client;
pub mod error;
pub mod tracker;

pub use client::{ApiClient, BadgeSource, SeasonBadge, LEAGUES_PATH, PLACEHOLDER_BADGE_URL};
pub use error::ApiError;
pub use tracker::{RequestToken, RequestTracker};
