use crate::models::{MarketUpdate, OrderBook, SpreadData, TradingMode, Venue};

/// Latest-wins market state for the selected pair: one book per venue and
/// the last spread reading for the selected direction. No history is kept.
#[derive(Debug, Clone, Default)]
pub struct MarketStore {
    mx: Option<OrderBook>,
    lbank: Option<OrderBook>,
    spread: Option<SpreadData>,
}

/// What an inbound update changed after gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Different pair; nothing touched.
    Ignored,
    /// Same pair, other direction; books replaced, spread untouched.
    BooksOnly,
    /// Same pair and direction; books and spread replaced.
    BooksAndSpread,
}

impl MarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Books follow the pair alone; the spread also needs the direction to match.
    pub fn apply(&mut self, update: &MarketUpdate, symbol: &str, mode: TradingMode) -> Applied {
        if update.symbol != symbol {
            return Applied::Ignored;
        }

        self.mx = Some(update.mx_orderbook.clone());
        self.lbank = Some(update.lbank_orderbook.clone());

        if update.mode != mode {
            return Applied::BooksOnly;
        }

        self.spread = Some(update.spread_data.clone());
        Applied::BooksAndSpread
    }

    /// Drops the spread reading; it belongs to a direction no longer shown.
    pub fn clear_spread(&mut self) {
        self.spread = None;
    }

    pub fn book(&self, venue: Venue) -> Option<&OrderBook> {
        match venue {
            Venue::Mx => self.mx.as_ref(),
            Venue::Lbank => self.lbank.as_ref(),
        }
    }

    pub fn spread(&self) -> Option<&SpreadData> {
        self.spread.as_ref()
    }
}
