use ratatui::style::{Color, Modifier, Style};

use leaguecache_core::BadgeSource;

use crate::app::BadgeState;

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const FRESH: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);
const STATUS_BG: Color = Color::Rgb(32, 32, 40);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

/// Section headings, the search text and notices
pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

/// Filter values: bright when a filter narrows the list
pub fn filter_style(active: bool) -> Style {
    if active {
        highlight_style().add_modifier(Modifier::BOLD)
    } else {
        list_item_style()
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        muted_style()
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(STATUS_BG).fg(Color::White)
}

pub fn help_key_style() -> Style {
    highlight_style().add_modifier(Modifier::BOLD)
}

/// Color of a badge's provenance label. A fallback means the lookup failed.
pub fn badge_source_style(source: BadgeSource) -> Style {
    match source {
        BadgeSource::Fallback => error_style(),
        BadgeSource::NoBadge => muted_style(),
        BadgeSource::Fetched | BadgeSource::Cached => Style::default().fg(FRESH),
    }
}

/// Glyph and style for the badge column of the league table
pub fn badge_marker(state: Option<&BadgeState>) -> (&'static str, Style) {
    match state {
        None => (" ", Style::default()),
        Some(BadgeState::Loading) => ("…", muted_style()),
        Some(BadgeState::Ready(badge)) if badge.source == BadgeSource::Fallback => {
            ("!", error_style())
        }
        Some(BadgeState::Ready(badge)) if badge.is_placeholder() => ("-", muted_style()),
        Some(BadgeState::Ready(_)) => ("●", Style::default().fg(FRESH)),
    }
}
