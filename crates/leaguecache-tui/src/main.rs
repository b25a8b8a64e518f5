//! leaguecache - a terminal browser for TheSportsDB leagues.
//!
//! Leagues and season badges are cached locally for a day, so repeat
//! sessions start instantly and work without the network.

mod app;
mod cli;
mod ui;
mod utils;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use leaguecache_core::Config;

use app::{App, AppState};
use clap::Parser;
use cli::{Cli, Command};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written while the terminal UI owns the screen
const LOG_FILE: &str = "leaguecache.log";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr for one-shot commands
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a file in the cache directory so output does not corrupt the
/// terminal. The returned guard flushes the writer when dropped.
fn init_tui_tracing() -> WorkerGuard {
    let appender = tracing_appender::rolling::never(app::cache_dir(), LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Exits with usage on bad arguments
    let command = Cli::parse().into_command();

    if command != Command::Tui {
        init_cli_tracing();
        let config = Config::load();
        return cli::run(command, &config).await;
    }

    let _guard = init_tui_tracing();
    info!("leaguecache starting");
    let config = Config::load();

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?;
    app.load_leagues();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("leaguecache shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let max_wait = Duration::from_millis(EVENT_POLL_TIMEOUT_MS);

    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events, waking early when a debounced search is due
        let timeout = app.poll_timeout(Instant::now(), max_wait);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        app.tick(Instant::now());

        // Check for completed background tasks
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
