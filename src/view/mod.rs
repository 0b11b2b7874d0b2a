//! Terminal dashboard drawn with ratatui. `draw` is a pure function of
//! application state; owning the terminal is `tui`'s job.

pub mod chart;
pub mod controls;
pub mod order_book;
pub mod spread;

use crate::app::AppState;
use crate::models::{PairSource, Venue};
use chrono::{DateTime, Local, NaiveDateTime};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub const BOOK_DEPTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Profit,
    Loss,
    Neutral,
}

impl Tone {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Tone::Profit
        } else if value < 0.0 {
            Tone::Loss
        } else {
            Tone::Neutral
        }
    }

    pub fn style(self) -> Style {
        match self {
            Tone::Profit => Style::default().fg(Color::Green),
            Tone::Loss => Style::default().fg(Color::Red),
            Tone::Neutral => Style::default().fg(Color::DarkGray),
        }
    }
}

/// Bold block title, padded the way the panels expect.
pub fn title(text: impl Into<String>) -> Span<'static> {
    Span::styled(
        format!(" {} ", text.into()),
        Style::default().add_modifier(Modifier::BOLD),
    )
}

/// Renders a feed timestamp as local HH:MM:SS. Accepts RFC 3339, ISO
/// without offset, and the space-separated form; anything else is shown raw.
pub fn format_feed_time(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%H:%M:%S").to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.format("%H:%M:%S").to_string();
        }
    }
    raw.to_string()
}

/// Local HH:MM:SS for a receipt time in unix ms.
pub fn format_receipt_time(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

fn header_lines(state: &AppState) -> Vec<Line<'static>> {
    let mut first = vec![
        Span::styled("LBMX spread monitor", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   "),
    ];
    first.extend(controls::connection_indicator(state.connection).spans);
    first.push(Span::raw("   "));
    first.extend(controls::pair_source_toggle(state.pair_source).spans);

    let mut lines = vec![
        Line::from(first),
        Line::from(controls::symbol_search(
            &state.available_symbols,
            &state.search_term,
            &state.selection.symbol,
        )),
    ];
    if state.pair_source == PairSource::Custom {
        lines.push(controls::custom_selector(&state.custom));
    }
    lines.push(controls::mode_toggle(state.selection.mode));
    lines
}

fn command_lines(state: &AppState) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled("> ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(state.command_line.clone()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ])];
    if !state.status_message.is_empty() {
        lines.push(Line::styled(
            state.status_message.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }
    lines
}

pub fn draw(frame: &mut Frame, state: &AppState) {
    let mode = state.selection.mode;
    let connected = state.connection.is_connected();
    let header = header_lines(state);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header.len() as u16 + 2),
            Constraint::Min((BOOK_DEPTH * 2 + 6) as u16),
            Constraint::Length(6),
            Constraint::Min(10),
            Constraint::Length(4),
        ])
        .split(frame.area());

    frame.render_widget(
        Paragraph::new(header).block(Block::default().title(title("spreadwatch")).borders(Borders::ALL)),
        rows[0],
    );

    let books = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    for (venue, area) in [(Venue::Mx, books[0]), (Venue::Lbank, books[1])] {
        let book = state.market.book(venue);
        frame.render_widget(order_book::panel(book, venue, mode, connected, BOOK_DEPTH), area);
    }

    frame.render_widget(
        Paragraph::new(spread::spread_lines(
            state.market.spread(),
            state.market.book(Venue::Mx),
            state.market.book(Venue::Lbank),
        ))
        .block(Block::default().title(title("live spread")).borders(Borders::ALL)),
        rows[2],
    );

    chart::render(frame, rows[3], &state.chart, mode);

    frame.render_widget(
        Paragraph::new(command_lines(state))
            .wrap(Wrap { trim: true })
            .block(Block::default().title(title("command (help, quit)")).borders(Borders::ALL)),
        rows[4],
    );
}
