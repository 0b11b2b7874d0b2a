use super::{Tone, format_feed_time, title};
use crate::models::{OrderBook, OrderBookEntry, TradingMode, Venue};
use ratatui::{
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const COLUMN_WIDTH: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSide {
    Bid,
    Ask,
}

/// Which side of a venue's book matters for the current direction: the
/// buying venue's best ask, or the selling venue's best bid.
pub fn highlight_side(venue: Venue, mode: TradingMode) -> BookSide {
    match (venue, mode) {
        (Venue::Mx, TradingMode::MxBuyLbankSell) => BookSide::Ask,
        (Venue::Mx, TradingMode::LbankBuyMxSell) => BookSide::Bid,
        (Venue::Lbank, TradingMode::MxBuyLbankSell) => BookSide::Bid,
        (Venue::Lbank, TradingMode::LbankBuyMxSell) => BookSide::Ask,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookRow {
    pub side: BookSide,
    pub price: String,
    pub quantity: String,
    pub highlighted: bool,
}

/// Asks top-down (worst shown first, best ask just above the separator),
/// then bids best-first.
pub fn book_rows(book: &OrderBook, venue: Venue, mode: TradingMode, depth: usize) -> (Vec<BookRow>, Vec<BookRow>) {
    let highlight = highlight_side(venue, mode);
    let price_dp = book.display_price_precision();
    let qty_dp = book.display_quantity_precision();

    let row = |e: &OrderBookEntry, side: BookSide, highlighted: bool| BookRow {
        side,
        price: format!("{:.*}", price_dp, e.price),
        quantity: format!("{:.*}", qty_dp, e.quantity),
        highlighted,
    };

    let asks = book.top_asks(depth);
    let ask_rows = asks
        .iter()
        .rev()
        .enumerate()
        .map(|(i, e)| row(e, BookSide::Ask, highlight == BookSide::Ask && i + 1 == asks.len()))
        .collect();

    let bid_rows = book
        .top_bids(depth)
        .iter()
        .enumerate()
        .map(|(i, e)| row(e, BookSide::Bid, highlight == BookSide::Bid && i == 0))
        .collect();

    (ask_rows, bid_rows)
}

pub fn book_title(book: Option<&OrderBook>, venue: Venue) -> String {
    match book {
        Some(book) => format!("{} exchange ({} {})", venue.title(), book.exchange, book.symbol),
        None => format!("{} exchange", venue.title()),
    }
}

fn row_line(row: &BookRow) -> Line<'static> {
    let tone = match row.side {
        BookSide::Bid => Tone::Profit,
        BookSide::Ask => Tone::Loss,
    };
    let mut style = tone.style();
    if row.highlighted {
        style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
    }
    Line::from(vec![
        Span::styled(format!("{:>COLUMN_WIDTH$}", row.price), style),
        Span::styled("  ", style),
        Span::styled(format!("{:>COLUMN_WIDTH$}", row.quantity), style),
    ])
}

pub fn book_lines(
    book: Option<&OrderBook>,
    venue: Venue,
    mode: TradingMode,
    connected: bool,
    depth: usize,
) -> Vec<Line<'static>> {
    let Some(book) = book else {
        let placeholder = if connected { "waiting for data..." } else { "connecting..." };
        return vec![Line::styled(placeholder, Tone::Neutral.style())];
    };

    let muted = Tone::Neutral.style();
    let mut lines = vec![Line::styled(
        format!("{:>COLUMN_WIDTH$}  {:>COLUMN_WIDTH$}", "price", "quantity"),
        muted,
    )];

    let (asks, bids) = book_rows(book, venue, mode, depth);
    lines.extend(asks.iter().map(row_line));
    lines.push(Line::styled(symbols::line::HORIZONTAL.repeat(COLUMN_WIDTH * 2 + 2), muted));
    lines.extend(bids.iter().map(row_line));

    if let Some(spread) = book.spread() {
        lines.push(Line::from(format!(
            "book spread {:.*}",
            book.display_price_precision(),
            spread
        )));
    }
    lines.push(Line::styled(format!("updated {}", format_feed_time(&book.timestamp)), muted));
    lines
}

pub fn panel(
    book: Option<&OrderBook>,
    venue: Venue,
    mode: TradingMode,
    connected: bool,
    depth: usize,
) -> Paragraph<'static> {
    Paragraph::new(book_lines(book, venue, mode, connected, depth))
        .block(Block::default().title(title(book_title(book, venue))).borders(Borders::ALL))
}
