use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leaguecache_core::api::client::badge_path;
use leaguecache_core::api::{LEAGUES_PATH, PLACEHOLDER_BADGE_URL};
use leaguecache_core::cache::{ManualClock, MemoryStore};
use leaguecache_core::{ApiClient, ApiError, BadgeSource, CacheManager, Config, KeyValueStore};

const START: i64 = 1_700_000_000_000;

struct Harness {
    server: MockServer,
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
    client: ApiClient,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let config = Config {
        api_base_url: server.uri(),
        retry_backoff_ms: 0,
        ..Config::default()
    };
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(START));
    let cache = CacheManager::with_clock(store.clone(), clock.clone(), config.cache_ttl());
    let client = ApiClient::new(&config, cache).expect("client builds");

    Harness {
        server,
        store,
        clock,
        client,
    }
}

fn leagues_body() -> serde_json::Value {
    json!({
        "leagues": [
            {"idLeague": "4328", "strLeague": "English Premier League", "strSport": "Soccer", "strLeagueAlternate": "Premier League, EPL"},
            {"idLeague": "4387", "strLeague": "NBA", "strSport": "Basketball", "strLeagueAlternate": ""}
        ]
    })
}

#[tokio::test]
async fn test_league_list_fetched_then_served_from_cache() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/all_leagues.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(leagues_body()))
        .expect(1)
        .mount(&h.server)
        .await;

    let first = h.client.fetch_league_list().await.expect("first fetch");
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].name, "English Premier League");

    let second = h.client.fetch_league_list().await.expect("cached fetch");
    assert_eq!(first, second);
    assert!(h.client.cache().is_valid(LEAGUES_PATH));
}

#[tokio::test]
async fn test_league_list_refetched_after_ttl() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/all_leagues.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(leagues_body()))
        .expect(2)
        .mount(&h.server)
        .await;

    h.client.fetch_league_list().await.expect("first fetch");
    h.clock.advance(h.client.cache().ttl());
    h.client.fetch_league_list().await.expect("refetch after expiry");
}

#[tokio::test]
async fn test_league_list_null_is_cached_as_empty() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/all_leagues.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"leagues": null})))
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(h.client.fetch_league_list().await.expect("fetch").is_empty());
    assert!(h.client.fetch_league_list().await.expect("cached").is_empty());
}

#[tokio::test]
async fn test_league_list_failure_retries_twice_and_is_not_cached() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/all_leagues.php"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&h.server)
        .await;

    let err = h.client.fetch_league_list().await.expect_err("should fail");
    match err {
        ApiError::RetriesExhausted { attempts, source, .. } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*source, ApiError::ServerError(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_league_list_recovers_on_retry() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/all_leagues.php"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/all_leagues.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(leagues_body()))
        .expect(1)
        .mount(&h.server)
        .await;

    let leagues = h.client.fetch_league_list().await.expect("second attempt succeeds");
    assert_eq!(leagues.len(), 2);
}

#[tokio::test]
async fn test_malformed_json_is_an_error() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/all_leagues.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .expect(3)
        .mount(&h.server)
        .await;

    let err = h.client.fetch_league_list().await.expect_err("should fail");
    assert!(matches!(
        err,
        ApiError::RetriesExhausted { ref source, .. } if matches!(**source, ApiError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_badge_fetched_then_cached() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/search_all_seasons.php"))
        .and(query_param("badge", "1"))
        .and(query_param("id", "4328"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "seasons": [
                {"strSeason": "2023-2024", "strBadge": "https://example.com/epl-2023.png"},
                {"strSeason": "2022-2023", "strBadge": "https://example.com/epl-2022.png"}
            ]
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let badge = h.client.fetch_season_badge("4328").await;
    assert_eq!(badge.url, "https://example.com/epl-2023.png");
    assert_eq!(badge.source, BadgeSource::Fetched);

    let again = h.client.fetch_season_badge("4328").await;
    assert_eq!(again.url, badge.url);
    assert_eq!(again.source, BadgeSource::Cached);
}

#[tokio::test]
async fn test_badge_missing_uses_placeholder_and_caches_it() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/search_all_seasons.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"seasons": null})))
        .expect(1)
        .mount(&h.server)
        .await;

    let badge = h.client.fetch_season_badge("9999").await;
    assert_eq!(badge.url, PLACEHOLDER_BADGE_URL);
    assert_eq!(badge.source, BadgeSource::NoBadge);

    let again = h.client.fetch_season_badge("9999").await;
    assert!(again.is_placeholder());
    assert_eq!(again.source, BadgeSource::Cached);
}

#[tokio::test]
async fn test_badge_failure_retries_once_then_falls_back() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/search_all_seasons.php"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&h.server)
        .await;

    let badge = h.client.fetch_season_badge("4328").await;
    assert_eq!(badge.url, PLACEHOLDER_BADGE_URL);
    assert_eq!(badge.source, BadgeSource::Fallback);

    // The fallback is cached like any other result
    let key = CacheManager::storage_key(&badge_path("4328"));
    assert!(h.store.get(&key).is_some());
    assert_eq!(h.client.fetch_season_badge("4328").await.source, BadgeSource::Cached);
}

#[tokio::test]
async fn test_badge_and_list_share_the_cache() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/all_leagues.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(leagues_body()))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search_all_seasons.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"seasons": []})))
        .mount(&h.server)
        .await;

    h.client.fetch_league_list().await.expect("fetch");
    h.client.fetch_season_badge("4328").await;
    h.client.fetch_season_badge("4387").await;

    let info = h.client.cache().inspect();
    assert_eq!(info.total_items, 3);
    assert!(info.total_bytes > 0);

    assert_eq!(h.client.cache().clear_all(), 3);
    assert_eq!(h.client.cache().inspect().total_items, 0);
}
