//! Data models for TheSportsDB entities.
//!
//! - `League`: a competition as listed by `all_leagues.php`
//! - `Season`: a season entry from `search_all_seasons.php`, carrying the badge

pub mod league;

pub use league::{League, LeaguesResponse, Season, SeasonsResponse};
