use crate::chart::ChartBuffer;
use crate::config::Config;
use crate::models::{CustomSymbolRequest, PairSource, TradingMode};
use crate::orderbook::MarketStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub symbol: String,
    pub mode: TradingMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No open or close seen yet for the current connection.
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn is_connected(self) -> bool {
        self == ConnectionStatus::Connected
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CustomLists {
    #[default]
    Idle,
    Loading,
    Failed(String),
    Ready { mx: Vec<String>, lbank: Vec<String> },
}

#[derive(Debug, Clone, Default)]
pub struct CustomSelector {
    pub lists: CustomLists,
    pub mx_symbol: Option<String>,
    pub lbank_symbol: Option<String>,
}

impl CustomSelector {
    pub fn request(&self) -> Option<CustomSymbolRequest> {
        Some(CustomSymbolRequest {
            mx_symbol: self.mx_symbol.clone()?,
            lbank_symbol: self.lbank_symbol.clone()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub selection: Selection,
    /// Epoch of the connection whose events we accept.
    pub feed_epoch: u64,
    pub connection: ConnectionStatus,

    pub available_symbols: Vec<String>,
    pub search_term: String,
    /// Latest symbol change sent to the server and not yet answered.
    pub pending_symbol: Option<String>,

    pub pair_source: PairSource,
    pub custom: CustomSelector,

    pub market: MarketStore,
    pub chart: ChartBuffer,

    pub command_line: String,
    pub status_message: String,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            selection: Selection {
                symbol: config.symbol.clone(),
                mode: config.mode,
            },
            feed_epoch: 0,
            connection: ConnectionStatus::Connecting,
            available_symbols: Vec::new(),
            search_term: String::new(),
            pending_symbol: None,
            pair_source: PairSource::Common,
            custom: CustomSelector::default(),
            market: MarketStore::new(),
            chart: ChartBuffer::new(config.chart_capacity, config.coalesce_window_ms),
            command_line: String::new(),
            status_message: String::new(),
        }
    }
}
