pub mod store;

use crate::models::{OrderBook, OrderBookEntry};
pub use store::MarketStore;

const FALLBACK_PRICE_PRECISION: u32 = 4;
const FALLBACK_QUANTITY_PRECISION: u32 = 6;

impl OrderBook {
    /// Highest bid. The server sends bids best-first.
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.first().map(|e| e.price)
    }

    /// Lowest ask. The server sends asks best-first.
    pub fn best_ask(&self) -> Option<f64> {
        self.asks.first().map(|e| e.price)
    }

    /// Spread between best ask and best bid
    pub fn spread(&self) -> Option<f64> {
        Some(self.best_ask()? - self.best_bid()?)
    }

    pub fn top_bids(&self, depth: usize) -> &[OrderBookEntry] {
        &self.bids[..self.bids.len().min(depth)]
    }

    pub fn top_asks(&self, depth: usize) -> &[OrderBookEntry] {
        &self.asks[..self.asks.len().min(depth)]
    }

    // A zero precision from the server means "unknown", not "integers".
    pub fn display_price_precision(&self) -> usize {
        nonzero_or(self.price_precision, FALLBACK_PRICE_PRECISION)
    }

    pub fn display_quantity_precision(&self) -> usize {
        nonzero_or(self.quantity_precision, FALLBACK_QUANTITY_PRECISION)
    }
}

fn nonzero_or(value: u32, fallback: u32) -> usize {
    if value == 0 { fallback as usize } else { value as usize }
}
