//! API client for TheSportsDB.
//!
//! Both endpoints are cache-first. A league-list failure is returned to the
//! caller after the configured retries; a badge failure never is, because a
//! league without a badge is still worth showing.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::cache::CacheManager;
use crate::config::Config;
use crate::models::{League, LeaguesResponse, SeasonsResponse};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Logical key and path of the league list endpoint
pub const LEAGUES_PATH: &str = "/all_leagues.php";

/// Badge shown for leagues without one, and when the badge lookup fails
pub const PLACEHOLDER_BADGE_URL: &str = "https://via.placeholder.com/150x150/333/666?text=League";

const USER_AGENT: &str = concat!("leaguecache/", env!("CARGO_PKG_VERSION"));

/// Logical key and path of the season badge lookup for a league
pub fn badge_path(league_id: &str) -> String {
    format!("/search_all_seasons.php?badge=1&id={}", league_id)
}

/// Where a badge URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeSource {
    /// The API returned a badge for the league's first season
    Fetched,
    /// The request succeeded but no badge was available
    NoBadge,
    /// The request failed; the placeholder stands in
    Fallback,
    /// Served from the local cache
    Cached,
}

impl BadgeSource {
    pub fn label(&self) -> &'static str {
        match self {
            BadgeSource::Fetched => "fetched",
            BadgeSource::NoBadge => "no badge available",
            BadgeSource::Fallback => "lookup failed",
            BadgeSource::Cached => "cached",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonBadge {
    pub url: String,
    pub source: BadgeSource,
}

impl SeasonBadge {
    fn new(url: impl Into<String>, source: BadgeSource) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }

    fn placeholder(source: BadgeSource) -> Self {
        Self::new(PLACEHOLDER_BADGE_URL, source)
    }

    pub fn is_placeholder(&self) -> bool {
        self.url == PLACEHOLDER_BADGE_URL
    }
}

/// API client for TheSportsDB.
/// Clone is cheap - reqwest::Client and the cache share their internals.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    cache: CacheManager,
    list_retries: u32,
    badge_retries: u32,
    retry_backoff: Duration,
}

impl ApiClient {
    /// Create a new API client backed by `cache`
    pub fn new(config: &Config, cache: CacheManager) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            cache,
            list_retries: config.list_retries,
            badge_retries: config.badge_retries,
            retry_backoff: config.retry_backoff(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.client.get(url).send().await?;
        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON from {}: {}", url, e)))
    }

    /// GET `path`, retrying up to `retries` times with exponential backoff.
    async fn get<T: DeserializeOwned>(&self, path: &str, retries: u32) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;
        let mut backoff = self.retry_backoff;

        loop {
            attempt += 1;
            debug!(url = %url, attempt = attempt, "Making request");

            match self.send_get(&url).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt <= retries => {
                    warn!(url = %url, attempt = attempt, backoff_ms = backoff.as_millis() as u64, error = %e, "Request failed, retrying");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => {
                    return Err(ApiError::RetriesExhausted {
                        url,
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
            }
        }
    }

    // ===== Data Fetching Methods =====

    /// Fetch every league, from cache when possible.
    ///
    /// A response without a league list is cached as an empty list.
    /// Failures are not cached.
    pub async fn fetch_league_list(&self) -> Result<Vec<League>, ApiError> {
        if let Some(leagues) = self.cache.get::<Vec<League>>(LEAGUES_PATH) {
            return Ok(leagues);
        }

        let response: LeaguesResponse = match self.get(LEAGUES_PATH, self.list_retries).await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "Error fetching leagues");
                return Err(e);
            }
        };

        let leagues = response.leagues;
        self.cache.set(LEAGUES_PATH, &leagues);
        info!(count = leagues.len(), "Fetched leagues");
        Ok(leagues)
    }

    /// Fetch the badge of a league's first season.
    ///
    /// Never fails: a missing badge or a failed lookup yields the
    /// placeholder, and the result is cached either way so the league is not
    /// queried again until the entry expires.
    pub async fn fetch_season_badge(&self, league_id: &str) -> SeasonBadge {
        let path = badge_path(league_id);
        if let Some(url) = self.cache.get::<String>(&path) {
            return SeasonBadge::new(url, BadgeSource::Cached);
        }

        let badge = match self.get::<SeasonsResponse>(&path, self.badge_retries).await {
            Ok(response) => match response.first_badge() {
                Some(url) => SeasonBadge::new(url, BadgeSource::Fetched),
                None => SeasonBadge::placeholder(BadgeSource::NoBadge),
            },
            Err(e) => {
                warn!(league_id = league_id, error = %e, "Error fetching season badge, using placeholder");
                SeasonBadge::placeholder(BadgeSource::Fallback)
            }
        };

        self.cache.set(&path, &badge.url);
        badge
    }
}
