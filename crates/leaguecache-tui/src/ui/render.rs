use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, LoadState};
use crate::utils::format_bytes;

use super::leagues;
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Filters
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_filter_bar(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  leaguecache - Sports Leagues";
    let help_hint = "[?] Help";
    let title_len = title.len();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title_len as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let searching = matches!(app.state, AppState::Searching);

    let search_span = if app.search_input.is_empty() && !searching {
        Span::styled("Search leagues...", styles::muted_style())
    } else {
        let cursor = if searching { "▌" } else { "" };
        Span::styled(format!("{}{}", app.search_input, cursor), styles::highlight_style())
    };

    let sport_text = match app.sport_position() {
        Some(position) => format!("{} ({}/{})", app.selected_sport(), position, app.sports.len()),
        None => "All Sports".to_string(),
    };

    let mut spans = vec![
        Span::styled(" Search: ", styles::muted_style()),
        search_span,
    ];
    if app.is_search_pending() {
        spans.push(Span::styled(" ...", styles::muted_style()));
    }
    spans.push(Span::styled("   Sport: ", styles::muted_style()));
    spans.push(Span::styled(
        sport_text,
        styles::filter_style(!app.selected_sport().is_empty()),
    ));
    spans.push(Span::styled("  [s/S]", styles::muted_style()));
    if app.has_active_filters() {
        spans.push(Span::styled("   [x] Clear filters", styles::muted_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::border_style(searching));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match &app.load_state {
        LoadState::Loading => render_loading(frame, area),
        LoadState::Failed(message) => render_error(frame, message, area),
        LoadState::Loaded => leagues::render(frame, app, area),
    }
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Loading leagues...", styles::highlight_style())),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(styles::muted_style()));
    frame.render_widget(paragraph, area);
}

fn render_error(frame: &mut Frame, message: &str, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Oops! Something went wrong", styles::error_style())),
        Line::from(""),
        Line::from(Span::styled(
            "We couldn't load the sports leagues. This might be due to a network issue or the API being temporarily unavailable.",
            styles::list_item_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), styles::muted_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", styles::muted_style()),
            Span::styled("[r]", styles::help_key_style()),
            Span::styled(" to try again", styles::muted_style()),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(true)));
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[b]adges | [c]lear cache | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        let updated = app
            .leagues_age
            .as_deref()
            .map(|age| format!(" | leagues updated {}", age))
            .unwrap_or_default();
        format!(
            " Cache: {} items, {}{} ",
            app.cache_info.total_items,
            format_bytes(app.cache_info.total_bytes),
            updated
        )
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width.saturating_sub(left_text.len()).saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 25, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_line = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(key, styles::help_key_style()),
            Span::styled(desc, styles::list_item_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("  leaguecache", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("  ↑/↓ j/k   ", "Navigate list"),
        help_line("  PgUp/PgDn ", "Page through list"),
        help_line("  Home/End  ", "First / last league"),
        Line::from(""),
        Line::from(Span::styled(" Filters", styles::highlight_style())),
        help_line("  /         ", "Search (Enter keeps, Esc clears)"),
        help_line("  s / S     ", "Next / previous sport"),
        help_line("  x         ", "Reset search and sport"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("  Enter     ", "Load badge for selected league"),
        help_line("  b         ", "Load badges for visible leagues"),
        help_line("  r         ", "Retry / reload leagues"),
        help_line("  c         ", "Clear cache"),
        help_line("  q         ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
