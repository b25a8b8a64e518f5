//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, LoadState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Char('s') => app.cycle_sport(true),
        KeyCode::Char('S') => app.cycle_sport(false),
        KeyCode::Char('x') => app.reset_filters(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Enter => app.load_selected_badge(),
        KeyCode::Char('b') => app.request_visible_badges(),
        KeyCode::Char('r') => {
            if matches!(app.load_state, LoadState::Failed(_)) {
                app.retry();
            } else {
                app.load_leagues();
            }
        }
        KeyCode::Char('c') => app.clear_cache(),
        KeyCode::Esc => {
            app.status_message = None;
        }
        _ => {}
    }

    false
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    let now = Instant::now();
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.clear_search();
        }
        KeyCode::Enter => {
            // Keep search query active
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => app.pop_search_char(now),
        KeyCode::Down => app.select_next(),
        KeyCode::Up => app.select_prev(),
        KeyCode::Char(c) => app.push_search_char(c, now),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use leaguecache_core::{ApiClient, CacheManager, Config, League, MemoryStore};

    use super::*;
    use crate::app::BadgeState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    fn league(id: &str, name: &str, sport: &str) -> League {
        League {
            id: id.to_string(),
            name: name.to_string(),
            sport: sport.to_string(),
            alternate_name: String::new(),
        }
    }

    fn test_app() -> App {
        // Unroutable base URL so any request a test triggers fails fast
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            retry_backoff_ms: 0,
            ..Config::default()
        };
        let cache = CacheManager::new(Arc::new(MemoryStore::new()), config.cache_ttl());
        let api = ApiClient::new(&config, cache).expect("client builds");
        let mut app = App::with_client(config, api);
        app.set_leagues(vec![
            league("4328", "English Premier League", "Soccer"),
            league("4387", "NBA", "Basketball"),
            league("4335", "Spanish La Liga", "Soccer"),
        ]);
        app
    }

    #[test]
    fn test_quit_requires_confirmation() {
        let mut app = test_app();
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))));
        assert_eq!(app.state, AppState::ConfirmingQuit);

        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))));
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q')));
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.state, AppState::ShowingHelp);

        handle_input(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.selection, 0);

        handle_input(&mut app, key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_search_typing_and_escape() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.state, AppState::Searching);

        for c in "nbaz".chars() {
            handle_input(&mut app, key(KeyCode::Char(c)));
        }
        handle_input(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.search_input, "nba");
        // 'q' is text while searching
        handle_input(&mut app, key(KeyCode::Char('q')));
        assert_eq!(app.state, AppState::Searching);
        assert_eq!(app.search_input, "nbaq");

        handle_input(&mut app, key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.search_input, "");
        assert!(!app.is_search_pending());
    }

    #[test]
    fn test_search_enter_keeps_query() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('/')));
        handle_input(&mut app, key(KeyCode::Char('l')));
        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.search_input, "l");
    }

    #[test]
    fn test_sport_keys_and_reset() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.selected_sport(), "Basketball");
        handle_input(&mut app, key(KeyCode::Char('S')));
        handle_input(&mut app, key(KeyCode::Char('S')));
        assert_eq!(app.selected_sport(), "Soccer");
        assert_eq!(app.visible_leagues().len(), 2);

        handle_input(&mut app, key(KeyCode::Char('x')));
        assert_eq!(app.selected_sport(), "");
        assert_eq!(app.visible_leagues().len(), 3);
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('j')));
        handle_input(&mut app, key(KeyCode::Down));
        assert_eq!(app.selection, 2);
        handle_input(&mut app, key(KeyCode::Down));
        assert_eq!(app.selection, 2);
        handle_input(&mut app, key(KeyCode::Home));
        assert_eq!(app.selection, 0);
        handle_input(&mut app, key(KeyCode::End));
        assert_eq!(app.selection, 2);
        handle_input(&mut app, key(KeyCode::PageUp));
        assert_eq!(app.selection, 0);
    }

    #[tokio::test]
    async fn test_enter_requests_badge_for_selection() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Down));
        handle_input(&mut app, key(KeyCode::Enter));
        assert_eq!(app.badges.get("4387"), Some(&BadgeState::Loading));
        assert!(!app.badges.contains_key("4328"));
    }

    #[tokio::test]
    async fn test_b_requests_visible_badges() {
        let mut app = test_app();
        handle_input(&mut app, key(KeyCode::Char('s')));
        handle_input(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.selected_sport(), "Soccer");

        handle_input(&mut app, key(KeyCode::Char('b')));
        assert_eq!(app.badges.len(), 2);
        assert!(app.badges.contains_key("4328"));
        assert!(app.badges.contains_key("4335"));
    }
}
