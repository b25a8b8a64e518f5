//! Non-interactive commands.
//!
//! Every command shares the same cache as the terminal UI, so
//! `leaguecache --list` after a UI session is served without a request.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};

use leaguecache_core::api::LEAGUES_PATH;
use leaguecache_core::filter::{apply_filters, unique_sports};
use leaguecache_core::{ApiClient, Config};

use crate::app::open_cache;
use crate::utils::format_bytes;

const ENV_HELP: &str = "\
Environment:
  LEAGUECACHE_API_BASE_URL       API base URL
  LEAGUECACHE_CACHE_DURATION_MS  Cache entry lifetime
  RUST_LOG                       Log filter (default: info)";

/// Browse sports leagues from TheSportsDB. Starts the terminal UI when no
/// command flag is given.
#[derive(Parser, Debug)]
#[command(name = "leaguecache")]
#[command(version, about, long_about = None, after_help = ENV_HELP)]
#[command(group(
    ArgGroup::new("command")
        .args(["list", "sports", "badge", "cache_info", "clear_cache"])
        .multiple(false)
))]
pub struct Cli {
    /// Print leagues as JSON
    #[arg(long)]
    list: bool,

    /// Keep leagues whose name, alternate name or sport contains TERM
    #[arg(long, value_name = "TERM", requires = "list")]
    search: Option<String>,

    /// Keep leagues of exactly this sport
    #[arg(long, value_name = "SPORT", requires = "list")]
    sport: Option<String>,

    /// Print the distinct sports
    #[arg(long)]
    sports: bool,

    /// Print the season badge of a league
    #[arg(long, value_name = "ID")]
    badge: Option<String>,

    /// Print cache size
    #[arg(long)]
    cache_info: bool,

    /// Remove all cached responses
    #[arg(long)]
    clear_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tui,
    List {
        search: Option<String>,
        sport: Option<String>,
    },
    Sports,
    Badge(String),
    CacheInfo,
    ClearCache,
}

impl Cli {
    pub fn into_command(self) -> Command {
        if self.list {
            Command::List {
                search: self.search,
                sport: self.sport,
            }
        } else if self.sports {
            Command::Sports
        } else if let Some(id) = self.badge {
            Command::Badge(id)
        } else if self.cache_info {
            Command::CacheInfo
        } else if self.clear_cache {
            Command::ClearCache
        } else {
            Command::Tui
        }
    }
}

/// Run a non-interactive command, printing its result to stdout.
pub async fn run(command: Command, config: &Config) -> Result<()> {
    let api = ApiClient::new(config, open_cache(config)).context("Failed to create API client")?;

    match command {
        Command::List { search, sport } => {
            let leagues = api.fetch_league_list().await.context("Failed to load leagues")?;
            let filtered = apply_filters(
                &leagues,
                search.as_deref().unwrap_or(""),
                sport.as_deref().unwrap_or(""),
            );
            println!("{}", serde_json::to_string_pretty(&filtered)?);
        }
        Command::Sports => {
            let leagues = api.fetch_league_list().await.context("Failed to load leagues")?;
            for sport in unique_sports(&leagues) {
                println!("{}", sport);
            }
        }
        Command::Badge(id) => {
            let badge = api.fetch_season_badge(&id).await;
            println!("{} ({})", badge.url, badge.source.label());
        }
        Command::CacheInfo => {
            let cache = api.cache();
            let info = cache.inspect();
            println!("{} items, {}", info.total_items, format_bytes(info.total_bytes));
            if let Some(age) = cache.age(LEAGUES_PATH) {
                println!("League list updated {}", age);
            }
        }
        Command::ClearCache => {
            let count = api.cache().clear_all();
            println!("Cleared {} cached items", count);
        }
        Command::Tui => {}
    }

    Ok(())
}
