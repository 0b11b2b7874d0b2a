use serde::{Deserialize, Serialize};
use std::fmt;

/// Which exchange is treated as the buy side when the server computes a spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingMode {
    MxBuyLbankSell,
    LbankBuyMxSell,
}

impl TradingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TradingMode::MxBuyLbankSell => "mx_buy_lbank_sell",
            TradingMode::LbankBuyMxSell => "lbank_buy_mx_sell",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TradingMode::MxBuyLbankSell => "MX buy -> LBank sell",
            TradingMode::LbankBuyMxSell => "LBank buy -> MX sell",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            TradingMode::MxBuyLbankSell => TradingMode::LbankBuyMxSell,
            TradingMode::LbankBuyMxSell => TradingMode::MxBuyLbankSell,
        }
    }

    /// Accepts the wire name or the short aliases `mx` / `lbank` (the buy side).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mx_buy_lbank_sell" | "mx" => Some(TradingMode::MxBuyLbankSell),
            "lbank_buy_mx_sell" | "lbank" => Some(TradingMode::LbankBuyMxSell),
            _ => None,
        }
    }
}

impl fmt::Display for TradingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two order book slots carried by every feed envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Venue {
    Mx,
    Lbank,
}

impl Venue {
    pub fn path(self) -> &'static str {
        match self {
            Venue::Mx => "mx",
            Venue::Lbank => "lbank",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Venue::Mx => "Mexc",
            Venue::Lbank => "LBank",
        }
    }
}

/// Where the top-level pair list comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSource {
    /// Pairs listed on both exchanges under the same name.
    Common,
    /// One pair picked per exchange.
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct OrderBookEntry {
    pub price: f64,
    pub quantity: f64,
}

/// One exchange's book as the server last saw it. Bids are sorted by
/// descending price and asks by ascending price before they reach us.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderBook {
    pub exchange: String,
    pub symbol: String,
    pub bids: Vec<OrderBookEntry>,
    pub asks: Vec<OrderBookEntry>,
    pub timestamp: String,
    #[serde(default = "default_price_precision")]
    pub price_precision: u32,
    #[serde(default = "default_quantity_precision")]
    pub quantity_precision: u32,
}

fn default_price_precision() -> u32 {
    4
}

fn default_quantity_precision() -> u32 {
    6
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpreadData {
    pub symbol: String,
    pub mode: TradingMode,
    pub spread: f64,
    pub spread_percentage: f64,
    pub max_quantity: f64,
    pub buy_price: f64,
    pub sell_price: f64,
    pub buy_exchange: String,
    pub sell_exchange: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MarketUpdate {
    pub symbol: String,
    pub mode: TradingMode,
    pub mx_orderbook: OrderBook,
    pub lbank_orderbook: OrderBook,
    pub spread_data: SpreadData,
    pub timestamp: String,
}

/// Every push message is tagged by `type`; anything else fails to decode.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    MarketUpdate(MarketUpdate),
}

impl FeedMessage {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Body shape of `GET /api/symbols` and the per-exchange variants.
#[derive(Debug, Deserialize)]
pub struct SymbolsResponse {
    pub status: String,
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body shape of `POST /api/symbol`.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SymbolRequest<'a> {
    pub symbol: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSymbolRequest {
    pub mx_symbol: String,
    pub lbank_symbol: String,
}

/// One plotted spread sample. `timestamp` is local receipt time in ms.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataPoint {
    pub timestamp: i64,
    pub spread: f64,
    pub spread_percentage: f64,
    pub time: String,
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_market_update_envelope() {
        let raw = serde_json::json!({
            "type": "market_update",
            "symbol": "BTC/USDT",
            "mode": "mx_buy_lbank_sell",
            "mx_orderbook": fixtures::book("MX", "BTC/USDT"),
            "lbank_orderbook": fixtures::book("LBank", "BTC/USDT"),
            "spread_data": {
                "symbol": "BTC/USDT",
                "mode": "mx_buy_lbank_sell",
                "spread": 12.5,
                "spread_percentage": 0.02,
                "max_quantity": 0.3,
                "buy_price": 60000.0,
                "sell_price": 60012.5,
                "buy_exchange": "Mexc",
                "sell_exchange": "LBank",
                "timestamp": "2025-03-01T12:30:45"
            },
            "timestamp": "2025-03-01T12:30:45"
        });

        let FeedMessage::MarketUpdate(update) = FeedMessage::decode(&raw.to_string()).unwrap();
        assert_eq!(update.symbol, "BTC/USDT");
        assert_eq!(update.mode, TradingMode::MxBuyLbankSell);
        assert_eq!(update.spread_data.spread, 12.5);
        assert_eq!(update.mx_orderbook.bids.len(), 2);
    }

    #[test]
    fn rejects_unknown_type_tag() {
        let raw = r#"{"type":"heartbeat","symbol":"BTC/USDT"}"#;
        assert!(FeedMessage::decode(raw).is_err());
    }

    #[test]
    fn rejects_envelope_with_missing_spread() {
        let mut raw = serde_json::to_value(FeedMessage::MarketUpdate(fixtures::update(
            "BTC/USDT",
            TradingMode::MxBuyLbankSell,
            1.0,
        )))
        .unwrap();
        raw.as_object_mut().unwrap().remove("spread_data");
        assert!(FeedMessage::decode(&raw.to_string()).is_err());
    }

    #[test]
    fn rejects_unknown_trading_mode() {
        let mut raw = serde_json::to_value(FeedMessage::MarketUpdate(fixtures::update(
            "BTC/USDT",
            TradingMode::MxBuyLbankSell,
            1.0,
        )))
        .unwrap();
        raw["mode"] = "sideways".into();
        assert!(FeedMessage::decode(&raw.to_string()).is_err());
    }

    #[test]
    fn missing_precision_falls_back_to_defaults() {
        let raw = r#"{"exchange":"MX","symbol":"ETH/USDT","bids":[],"asks":[],"timestamp":"x"}"#;
        let book: OrderBook = serde_json::from_str(raw).unwrap();
        assert_eq!(book.price_precision, 4);
        assert_eq!(book.quantity_precision, 6);
    }

    #[test]
    fn trading_mode_aliases() {
        assert_eq!(TradingMode::parse("mx"), Some(TradingMode::MxBuyLbankSell));
        assert_eq!(TradingMode::parse("LBANK_BUY_MX_SELL"), Some(TradingMode::LbankBuyMxSell));
        assert_eq!(TradingMode::parse("both"), None);
        assert_eq!(TradingMode::MxBuyLbankSell.flipped(), TradingMode::LbankBuyMxSell);
    }
}
