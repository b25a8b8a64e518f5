use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use leaguecache_core::League;

use crate::app::{App, BadgeState};
use crate::ui::styles;
use crate::utils::truncate_string;

/// Render the league table with the detail panel beside it
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let visible = app.visible_leagues();
    if visible.is_empty() {
        render_empty(frame, app, chunks[0]);
    } else {
        render_table(frame, app, &visible, chunks[0]);
    }
    render_detail(frame, app, visible.get(app.selection).copied(), chunks[1]);
}

fn results_title(app: &App, count: usize) -> String {
    let noun = if count == 1 { "league" } else { "leagues" };
    if app.has_active_filters() {
        format!(" Showing {} {} matching your filters ", count, noun)
    } else {
        format!(" Showing {} {} ", count, noun)
    }
}

fn render_empty(frame: &mut Frame, app: &App, area: Rect) {
    let hint = if app.has_active_filters() {
        "No leagues match your current filters. Try adjusting your search or sport selection."
    } else {
        "Unable to load leagues. Please try again later."
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("No leagues found", styles::highlight_style())),
        Line::from(""),
        Line::from(Span::styled(hint, styles::muted_style())),
    ];

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(results_title(app, 0))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        );
    frame.render_widget(paragraph, area);
}

fn badge_marker(app: &App, league: &League) -> Span<'static> {
    let (glyph, style) = styles::badge_marker(app.badges.get(&league.id));
    Span::styled(glyph, style)
}

fn render_table(frame: &mut Frame, app: &App, leagues: &[&League], area: Rect) {
    let header = Row::new(vec![Cell::from("League"), Cell::from("Sport"), Cell::from("")])
        .style(styles::title_style())
        .height(1);

    let name_width = (area.width as usize * 6 / 10).saturating_sub(2);

    let rows: Vec<Row> = leagues
        .iter()
        .enumerate()
        .map(|(i, league)| {
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(truncate_string(&league.name, name_width)),
                Cell::from(league.sport_display().to_string()),
                Cell::from(badge_marker(app, league)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(60),
        Constraint::Fill(1),
        Constraint::Length(2),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(results_title(app, leagues.len()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail(frame: &mut Frame, app: &App, selected: Option<&League>, area: Rect) {
    let placeholder = "-";

    let content = match selected {
        Some(league) => {
            let mut lines = vec![
                Line::from(Span::styled(league.name.clone(), styles::title_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Sport:      ", styles::muted_style()),
                    Span::raw(league.sport_display().to_string()),
                ]),
                Line::from(vec![
                    Span::styled("Also known: ", styles::muted_style()),
                    Span::raw(league.alternate_display().unwrap_or(placeholder).to_string()),
                ]),
                Line::from(vec![
                    Span::styled("League ID:  ", styles::muted_style()),
                    Span::raw(league.id.clone()),
                ]),
                Line::from(""),
                Line::from(Span::styled("Badge", styles::highlight_style())),
            ];
            lines.extend(badge_lines(app.badges.get(&league.id)));
            lines
        }
        None => vec![Line::from(Span::styled("No league selected", styles::muted_style()))],
    };

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(" Details ")
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        );
    frame.render_widget(paragraph, area);
}

fn badge_lines(state: Option<&BadgeState>) -> Vec<Line<'static>> {
    match state {
        None => vec![Line::from(vec![
            Span::styled("Press ", styles::muted_style()),
            Span::styled("Enter", styles::help_key_style()),
            Span::styled(" to load badge", styles::muted_style()),
        ])],
        Some(BadgeState::Loading) => {
            vec![Line::from(Span::styled("Loading...", styles::muted_style()))]
        }
        Some(BadgeState::Ready(badge)) => {
            vec![
                Line::from(Span::raw(badge.url.clone())),
                Line::from(Span::styled(
                    format!("({})", badge.source.label()),
                    styles::badge_source_style(badge.source),
                )),
            ]
        }
    }
}
