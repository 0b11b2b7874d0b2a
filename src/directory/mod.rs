use crate::errors::ClientError;
use crate::models::Venue;
use async_trait::async_trait;

pub mod http;

pub use http::HttpDirectory;

/// Pair listing and pair selection on the spread-monitor server.
#[async_trait]
pub trait SymbolDirectory: Send + Sync {
    /// Pairs listed on both exchanges.
    async fn list_symbols(&self) -> Result<Vec<String>, ClientError>;

    /// Pairs listed on one exchange, for the custom-pair selector.
    async fn list_exchange_symbols(&self, venue: Venue) -> Result<Vec<String>, ClientError>;

    /// Asks the server to start streaming `symbol`.
    async fn set_symbol(&self, symbol: &str) -> Result<(), ClientError>;
}

/// Case-insensitive substring match, keeping list order.
pub fn filter_symbols<'a>(symbols: &'a [String], term: &str) -> Vec<&'a str> {
    let term = term.trim().to_lowercase();
    symbols
        .iter()
        .filter(|s| s.to_lowercase().contains(&term))
        .map(String::as_str)
        .collect()
}
