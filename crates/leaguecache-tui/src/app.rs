//! Application state management for leaguecache.
//!
//! `App` owns the league list, the filter state, lazily loaded badges and
//! the channel that background fetch tasks report back on.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use leaguecache_core::api::LEAGUES_PATH;
use leaguecache_core::filter::{apply_filters, unique_sports};
use leaguecache_core::{
    ApiClient, CacheInfo, CacheManager, Config, Debouncer, FileStore, KeyValueStore, League,
    MemoryStore, RequestToken, RequestTracker, SeasonBadge,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Maximum concurrent badge requests when loading badges for a whole page.
const MAX_CONCURRENT_REQUESTS: usize = 8;

/// Maximum length for search input.
const MAX_SEARCH_LENGTH: usize = 64;

/// How often the cache status line is recomputed.
const CACHE_INFO_REFRESH: Duration = Duration::from_secs(5);

/// File in the cache directory holding the persisted key/value store.
const STORE_FILE: &str = "storage.json";

/// Request-tracker key for the league list.
const LEAGUES_REQUEST_KEY: &str = "leagues";

fn badge_request_key(league_id: &str) -> String {
    format!("badge:{}", league_id)
}

/// Cache directory, or `./cache` when the platform has none
pub fn cache_dir() -> PathBuf {
    Config::cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"))
}

/// Open the persistent cache, falling back to memory if the cache file
/// cannot be used.
pub fn open_cache(config: &Config) -> CacheManager {
    let path = cache_dir().join(STORE_FILE);

    let store: Arc<dyn KeyValueStore> = match FileStore::open(&path, config.cache_capacity_bytes) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to open cache store, caching in memory only");
            Arc::new(MemoryStore::with_capacity(config.cache_capacity_bytes))
        }
    };

    CacheManager::new(store, config.cache_ttl())
}

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// League list loading state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed(String),
}

/// Badge lookup state for one league
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeState {
    Loading,
    Ready(SeasonBadge),
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from background fetch tasks back to the main loop. Each
/// carries the token of the request that produced it.
enum FetchResult {
    /// League list, or the error message to show
    Leagues(RequestToken, Result<Vec<League>, String>),
    /// Badge for a league (token, league_id, badge)
    Badge(RequestToken, String, SeasonBadge),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    pub api: ApiClient,
    requests: RequestTracker,

    // UI state
    pub state: AppState,
    pub load_state: LoadState,
    pub selection: usize,
    pub status_message: Option<String>,

    // Filter state
    pub search_input: String,
    search: Debouncer<String>,
    sport_selection: Option<usize>,

    // Data
    pub leagues: Vec<League>,
    pub sports: Vec<String>,
    pub badges: HashMap<String, BadgeState>,

    // Cache status line
    pub cache_info: CacheInfo,
    pub leagues_age: Option<String>,
    cache_info_checked: Instant,

    result_rx: mpsc::Receiver<FetchResult>,
    result_tx: mpsc::Sender<FetchResult>,
}

impl App {
    /// Create a new application instance using the persistent cache
    pub fn new(config: Config) -> Result<Self> {
        let cache = open_cache(&config);
        let api = ApiClient::new(&config, cache)?;
        Ok(Self::with_client(config, api))
    }

    pub fn with_client(config: Config, api: ApiClient) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let search = Debouncer::new(String::new(), config.search_debounce());

        let mut app = Self {
            config,
            api,
            requests: RequestTracker::new(),

            state: AppState::Normal,
            load_state: LoadState::Loading,
            selection: 0,
            status_message: None,

            search_input: String::new(),
            search,
            sport_selection: None,

            leagues: Vec::new(),
            sports: Vec::new(),
            badges: HashMap::new(),

            cache_info: CacheInfo::default(),
            leagues_age: None,
            cache_info_checked: Instant::now(),

            result_rx: rx,
            result_tx: tx,
        };
        app.refresh_cache_info();
        app
    }

    // =========================================================================
    // Background Fetching
    // =========================================================================

    /// Start loading the league list. A newer load supersedes older ones.
    pub fn load_leagues(&mut self) {
        info!("Loading leagues");
        let token = self.requests.begin(LEAGUES_REQUEST_KEY);
        self.load_state = LoadState::Loading;

        let api = self.api.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_league_list().await.map_err(|e| e.to_string());
            Self::send_result(&tx, FetchResult::Leagues(token, result)).await;
        });
    }

    /// Retry after a failed league-list load
    pub fn retry(&mut self) {
        if matches!(self.load_state, LoadState::Failed(_)) {
            self.status_message = None;
            self.load_leagues();
        }
    }

    /// Request the badge for one league. Each league is looked up at most
    /// once per session unless the cache is cleared.
    pub fn request_badge(&mut self, league_id: &str) {
        if league_id.is_empty() || self.badges.contains_key(league_id) {
            return;
        }
        self.badges.insert(league_id.to_string(), BadgeState::Loading);
        let token = self.requests.begin(&badge_request_key(league_id));

        let api = self.api.clone();
        let tx = self.result_tx.clone();
        let league_id = league_id.to_string();
        tokio::spawn(async move {
            let badge = api.fetch_season_badge(&league_id).await;
            Self::send_result(&tx, FetchResult::Badge(token, league_id, badge)).await;
        });
    }

    /// Request badges for every visible league that has none yet, with
    /// bounded concurrency.
    pub fn request_visible_badges(&mut self) {
        let ids: Vec<String> = self
            .visible_leagues()
            .iter()
            .filter(|l| !l.id.is_empty() && !self.badges.contains_key(&l.id))
            .map(|l| l.id.clone())
            .collect();

        if ids.is_empty() {
            return;
        }
        info!(count = ids.len(), "Loading badges for visible leagues");
        self.status_message = Some(format!("Loading {} badges...", ids.len()));

        let mut jobs = Vec::with_capacity(ids.len());
        for id in ids {
            self.badges.insert(id.clone(), BadgeState::Loading);
            jobs.push((self.requests.begin(&badge_request_key(&id)), id));
        }

        let api = self.api.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            stream::iter(jobs)
                .map(|(token, id)| {
                    let api = api.clone();
                    async move {
                        let badge = api.fetch_season_badge(&id).await;
                        FetchResult::Badge(token, id, badge)
                    }
                })
                .buffer_unordered(MAX_CONCURRENT_REQUESTS)
                .for_each(|result| {
                    let tx = tx.clone();
                    async move { Self::send_result(&tx, result).await }
                })
                .await;
        });
    }

    /// Helper to send fetch results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<FetchResult>, result: FetchResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send fetch result - channel closed");
        }
    }

    /// Apply every result the background tasks have delivered so far
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_result(result);
        }
    }

    fn process_result(&mut self, result: FetchResult) {
        match result {
            FetchResult::Leagues(token, result) => {
                if !self.requests.is_latest(&token) {
                    debug!(generation = token.generation(), "Discarding stale league list");
                    return;
                }
                match result {
                    Ok(leagues) => self.set_leagues(leagues),
                    Err(msg) => {
                        error!(error = %msg, "Failed to load leagues");
                        self.load_state = LoadState::Failed(msg);
                    }
                }
            }
            FetchResult::Badge(token, league_id, badge) => {
                if !self.requests.is_latest(&token) {
                    debug!(league_id = %league_id, "Discarding stale badge");
                    return;
                }
                self.badges.insert(league_id, BadgeState::Ready(badge));

                // Cache status is recomputed once the batch drains
                if self.pending_badges() == 0 {
                    if self.status_message.as_deref().is_some_and(|m| m.ends_with("badges...")) {
                        self.status_message = None;
                    }
                    self.refresh_cache_info();
                }
            }
        }
    }

    /// Badge lookups still in flight
    pub fn pending_badges(&self) -> usize {
        self.badges
            .values()
            .filter(|b| matches!(b, BadgeState::Loading))
            .count()
    }

    pub(crate) fn set_leagues(&mut self, leagues: Vec<League>) {
        info!(count = leagues.len(), "Leagues loaded");
        let previous_sport = self.selected_sport().to_string();

        self.sports = unique_sports(&leagues);
        self.leagues = leagues;
        self.sport_selection = self.sports.iter().position(|s| *s == previous_sport);
        self.load_state = LoadState::Loaded;
        self.clamp_selection();
        self.refresh_cache_info();
    }

    // =========================================================================
    // Cache
    // =========================================================================

    pub fn refresh_cache_info(&mut self) {
        let cache = self.api.cache();
        self.cache_info = cache.inspect();
        self.leagues_age = cache.age(LEAGUES_PATH);
        self.cache_info_checked = Instant::now();
    }

    /// Remove every cached response. Badges are forgotten so they can be
    /// requested again; the loaded league list stays on screen.
    pub fn clear_cache(&mut self) {
        let count = self.api.cache().clear_all();
        self.badges.clear();
        info!(count = count, "Cleared cache");
        self.status_message = Some(format!("Cleared {} cached items", count));
        self.refresh_cache_info();
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Search term currently applied to the list (debounced)
    pub fn search_term(&self) -> &str {
        self.search.value()
    }

    /// True while typed input is waiting out the debounce delay
    pub fn is_search_pending(&self) -> bool {
        self.search.is_pending()
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        if self.search_input.chars().count() >= MAX_SEARCH_LENGTH || c.is_control() {
            return;
        }
        self.search_input.push(c);
        self.search.update(self.search_input.clone(), now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        if self.search_input.pop().is_some() {
            self.search.update(self.search_input.clone(), now);
        }
    }

    /// Clear the search box and apply immediately
    pub fn clear_search(&mut self) {
        self.search_input.clear();
        self.search.set_now(String::new());
        self.selection = 0;
    }

    /// Selected sport, or "" for all sports
    pub fn selected_sport(&self) -> &str {
        self.sport_selection
            .and_then(|i| self.sports.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// 1-based position of the selected sport, for display
    pub fn sport_position(&self) -> Option<usize> {
        self.sport_selection.map(|i| i + 1)
    }

    /// Step through "all sports" followed by each sport in order.
    pub fn cycle_sport(&mut self, forward: bool) {
        let count = self.sports.len();
        if count == 0 {
            self.sport_selection = None;
            return;
        }

        self.sport_selection = match (self.sport_selection, forward) {
            (None, true) => Some(0),
            (None, false) => Some(count - 1),
            (Some(i), true) if i + 1 < count => Some(i + 1),
            (Some(_), true) => None,
            (Some(0), false) => None,
            (Some(i), false) => Some(i - 1),
        };
        self.selection = 0;
    }

    pub fn reset_filters(&mut self) {
        self.clear_search();
        self.sport_selection = None;
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search_term().trim().is_empty() || !self.selected_sport().is_empty()
    }

    /// Leagues passing the current search and sport filters
    pub fn visible_leagues(&self) -> Vec<&League> {
        apply_filters(&self.leagues, self.search_term(), self.selected_sport())
    }

    pub fn selected_league(&self) -> Option<&League> {
        self.visible_leagues().get(self.selection).copied()
    }

    // =========================================================================
    // Timing
    // =========================================================================

    /// Advance timers: emit the debounced search and periodically refresh
    /// the cache status.
    pub fn tick(&mut self, now: Instant) {
        if self.search.poll(now) {
            debug!(term = %self.search.value(), "Search applied");
            self.selection = 0;
        }
        if now.saturating_duration_since(self.cache_info_checked) >= CACHE_INFO_REFRESH {
            self.refresh_cache_info();
        }
    }

    /// How long the event loop may wait before the next `tick` is due
    pub fn poll_timeout(&self, now: Instant, max: Duration) -> Duration {
        self.search
            .time_until_due(now)
            .map(|due| due.min(max))
            .unwrap_or(max)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    fn visible_count(&self) -> usize {
        self.visible_leagues().len()
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_count();
        if self.selection >= count {
            self.selection = count.saturating_sub(1);
        }
    }

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    pub fn page_down(&mut self) {
        self.move_selection(PAGE_SCROLL_SIZE);
    }

    pub fn page_up(&mut self) {
        self.selection = self.selection.saturating_sub(PAGE_SCROLL_SIZE);
    }

    pub fn select_first(&mut self) {
        self.selection = 0;
    }

    pub fn select_last(&mut self) {
        self.selection = self.visible_count().saturating_sub(1);
    }

    fn move_selection(&mut self, by: usize) {
        let last = self.visible_count().saturating_sub(1);
        self.selection = (self.selection + by).min(last);
    }

    /// Request the badge for the highlighted league
    pub fn load_selected_badge(&mut self) {
        if let Some(id) = self.selected_league().map(|l| l.id.clone()) {
            self.request_badge(&id);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use leaguecache_core::BadgeSource;

    fn league(id: &str, name: &str, sport: &str, alt: &str) -> League {
        League {
            id: id.to_string(),
            name: name.to_string(),
            sport: sport.to_string(),
            alternate_name: alt.to_string(),
        }
    }

    fn sample() -> Vec<League> {
        vec![
            league("4328", "English Premier League", "Soccer", "EPL"),
            league("4387", "NBA", "Basketball", ""),
            league("4335", "Spanish La Liga", "Soccer", ""),
            league("4424", "MLB", "Baseball", "Major League Baseball"),
        ]
    }

    fn test_app() -> App {
        let config = Config::default();
        let cache = CacheManager::new(Arc::new(MemoryStore::new()), config.cache_ttl());
        let api = ApiClient::new(&config, cache).expect("client builds");
        App::with_client(config, api)
    }

    fn loaded_app() -> App {
        let mut app = test_app();
        let token = app.requests.begin(LEAGUES_REQUEST_KEY);
        app.process_result(FetchResult::Leagues(token, Ok(sample())));
        app
    }

    fn badge(url: &str) -> SeasonBadge {
        SeasonBadge {
            url: url.to_string(),
            source: BadgeSource::Fetched,
        }
    }

    #[test]
    fn test_leagues_loaded() {
        let app = loaded_app();
        assert_eq!(app.load_state, LoadState::Loaded);
        assert_eq!(app.sports, vec!["Baseball", "Basketball", "Soccer"]);
        assert_eq!(app.visible_leagues().len(), 4);
        assert_eq!(app.selected_league().map(|l| l.id.as_str()), Some("4328"));
    }

    #[test]
    fn test_failed_load() {
        let mut app = test_app();
        let token = app.requests.begin(LEAGUES_REQUEST_KEY);
        app.process_result(FetchResult::Leagues(token, Err("network down".to_string())));
        assert_eq!(app.load_state, LoadState::Failed("network down".to_string()));
    }

    #[test]
    fn test_stale_league_list_is_discarded() {
        let mut app = test_app();
        let old = app.requests.begin(LEAGUES_REQUEST_KEY);
        let new = app.requests.begin(LEAGUES_REQUEST_KEY);

        app.process_result(FetchResult::Leagues(new, Ok(sample())));
        app.process_result(FetchResult::Leagues(old, Err("late failure".to_string())));

        assert_eq!(app.load_state, LoadState::Loaded);
        assert_eq!(app.leagues.len(), 4);
    }

    #[test]
    fn test_stale_badge_is_discarded() {
        let mut app = loaded_app();
        let key = badge_request_key("4328");
        let old = app.requests.begin(&key);
        let new = app.requests.begin(&key);

        app.process_result(FetchResult::Badge(new, "4328".to_string(), badge("new.png")));
        app.process_result(FetchResult::Badge(old, "4328".to_string(), badge("old.png")));

        assert_eq!(app.badges.get("4328"), Some(&BadgeState::Ready(badge("new.png"))));
    }

    #[test]
    fn test_cache_info_refreshed_when_badges_drain() {
        let mut app = loaded_app();
        let mut tokens = Vec::new();
        for id in ["4328", "4387"] {
            app.badges.insert(id.to_string(), BadgeState::Loading);
            tokens.push(app.requests.begin(&badge_request_key(id)));
        }
        app.status_message = Some("Loading 2 badges...".to_string());
        app.api.cache().set("/x", &1);

        let second = tokens.pop().unwrap();
        let first = tokens.pop().unwrap();
        app.process_result(FetchResult::Badge(first, "4328".to_string(), badge("a.png")));
        assert_eq!(app.pending_badges(), 1);
        assert_eq!(app.cache_info.total_items, 0);
        assert!(app.status_message.is_some());

        app.process_result(FetchResult::Badge(second, "4387".to_string(), badge("b.png")));
        assert_eq!(app.pending_badges(), 0);
        assert_eq!(app.cache_info.total_items, 1);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_search_is_debounced() {
        let mut app = loaded_app();
        let t0 = Instant::now();

        for c in "soc".chars() {
            app.push_search_char(c, t0);
        }
        assert_eq!(app.search_input, "soc");
        assert!(app.is_search_pending());
        assert_eq!(app.visible_leagues().len(), 4);

        app.tick(t0 + Duration::from_millis(299));
        assert_eq!(app.visible_leagues().len(), 4);

        app.tick(t0 + app.config.search_debounce());
        assert!(!app.is_search_pending());
        let ids: Vec<&str> = app.visible_leagues().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["4328", "4335"]);
    }

    #[test]
    fn test_poll_timeout_tracks_debounce() {
        let mut app = loaded_app();
        let t0 = Instant::now();
        let max = Duration::from_millis(100);
        assert_eq!(app.poll_timeout(t0, max), max);

        app.push_search_char('n', t0);
        assert_eq!(app.poll_timeout(t0 + Duration::from_millis(250), max), Duration::from_millis(50));
    }

    #[test]
    fn test_backspace_and_clear_search() {
        let mut app = loaded_app();
        let t0 = Instant::now();
        app.push_search_char('x', t0);
        app.pop_search_char(t0);
        app.pop_search_char(t0);
        assert_eq!(app.search_input, "");

        app.push_search_char('n', t0);
        app.clear_search();
        assert!(!app.is_search_pending());
        assert_eq!(app.search_term(), "");
    }

    #[test]
    fn test_cycle_sport() {
        let mut app = loaded_app();
        assert_eq!(app.selected_sport(), "");

        app.cycle_sport(true);
        assert_eq!(app.selected_sport(), "Baseball");
        assert_eq!(app.sport_position(), Some(1));
        app.cycle_sport(true);
        app.cycle_sport(true);
        assert_eq!(app.selected_sport(), "Soccer");
        app.cycle_sport(true);
        assert_eq!(app.selected_sport(), "");

        app.cycle_sport(false);
        assert_eq!(app.selected_sport(), "Soccer");
        assert_eq!(app.visible_leagues().len(), 2);
        assert!(app.has_active_filters());

        app.reset_filters();
        assert!(!app.has_active_filters());
        assert_eq!(app.visible_leagues().len(), 4);
    }

    #[test]
    fn test_selected_sport_survives_reload() {
        let mut app = loaded_app();
        app.cycle_sport(false);
        assert_eq!(app.selected_sport(), "Soccer");

        let mut leagues = sample();
        leagues.push(league("1", "ATP", "Tennis", ""));
        let token = app.requests.begin(LEAGUES_REQUEST_KEY);
        app.process_result(FetchResult::Leagues(token, Ok(leagues)));
        assert_eq!(app.selected_sport(), "Soccer");
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut app = loaded_app();
        app.page_down();
        assert_eq!(app.selection, 3);
        app.select_next();
        assert_eq!(app.selection, 3);
        app.page_up();
        assert_eq!(app.selection, 0);
        app.select_prev();
        assert_eq!(app.selection, 0);
        app.select_last();
        assert_eq!(app.selected_league().map(|l| l.id.as_str()), Some("4424"));
    }

    #[test]
    fn test_retry_ignored_unless_failed() {
        let mut app = loaded_app();
        app.retry();
        assert_eq!(app.load_state, LoadState::Loaded);
    }

    #[test]
    fn test_clear_cache_forgets_badges() {
        let mut app = loaded_app();
        app.api.cache().set("/x", &1);
        app.badges.insert("4328".to_string(), BadgeState::Ready(badge("a.png")));

        app.clear_cache();
        assert!(app.badges.is_empty());
        assert_eq!(app.cache_info.total_items, 0);
        assert_eq!(app.status_message.as_deref(), Some("Cleared 1 cached items"));
    }
}
