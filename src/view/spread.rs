use super::{Tone, format_feed_time};
use crate::models::{OrderBook, SpreadData};
use ratatui::text::{Line, Span};

const FALLBACK_PRICE_PRECISION: usize = 4;

/// Spread precision follows the MX book, then the LBank book.
fn spread_precision(mx: Option<&OrderBook>, lbank: Option<&OrderBook>) -> usize {
    [mx, lbank]
        .into_iter()
        .flatten()
        .find(|b| b.price_precision > 0)
        .map(|b| b.price_precision as usize)
        .unwrap_or(FALLBACK_PRICE_PRECISION)
}

pub fn spread_lines(
    spread: Option<&SpreadData>,
    mx: Option<&OrderBook>,
    lbank: Option<&OrderBook>,
) -> Vec<Line<'static>> {
    let Some(s) = spread else {
        return vec![
            Line::from(vec![Span::raw("live spread  "), Span::styled("--", Tone::Neutral.style())]),
            Line::styled("waiting for data...", Tone::Neutral.style()),
        ];
    };

    let dp = spread_precision(mx, lbank);
    vec![
        Line::from(vec![
            Span::raw("live spread  "),
            Span::styled(format!("{:.*}", dp, s.spread), Tone::of(s.spread).style()),
            Span::raw("  "),
            Span::styled(
                format!("{:.3}%", s.spread_percentage),
                Tone::of(s.spread_percentage).style(),
            ),
        ]),
        Line::from(format!(
            "buy  {:.4} @ {:<8} sell  {:.4} @ {}",
            s.buy_price, s.buy_exchange, s.sell_price, s.sell_exchange
        )),
        Line::from(format!("max quantity  {:.6}", s.max_quantity)),
        Line::styled(format!("updated {}", format_feed_time(&s.timestamp)), Tone::Neutral.style()),
    ]
}
