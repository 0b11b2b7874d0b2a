use crate::errors::ConfigError;
use crate::models::TradingMode;
use std::env;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

const DEV_SERVER_URL: &str = "http://localhost:8001";
const PROD_SERVER_URL: &str = "http://localhost:8000";

const RECONNECT_DELAY_RANGE: RangeInclusive<u64> = 0..=600_000;
const CHART_CAPACITY_RANGE: RangeInclusive<u64> = 1..=100_000;
const CHART_COALESCE_RANGE: RangeInclusive<u64> = 0..=60_000;
const RENDER_INTERVAL_RANGE: RangeInclusive<u64> = 10..=10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub feed_url: String,
    pub symbol: String,
    pub mode: TradingMode,
    pub reconnect_delay: Duration,
    pub chart_capacity: usize,
    pub coalesce_window_ms: i64,
    pub render_interval: Duration,
    pub log_format: LogFormat,
    /// Logs go here instead of stderr while the dashboard owns the terminal.
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests don't touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let development = lookup("SPREADWATCH_ENV")
            .map(|v| v.trim().eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        let server_url = lookup("SERVER_URL")
            .unwrap_or_else(|| {
                if development {
                    DEV_SERVER_URL.to_string()
                } else {
                    PROD_SERVER_URL.to_string()
                }
            })
            .trim_end_matches('/')
            .to_string();

        let feed_url = match lookup("FEED_URL") {
            Some(url) => url,
            None => feed_url_for(&server_url)?,
        };

        let symbol = lookup("SYMBOL")
            .map(|s| s.trim().to_uppercase())
            .unwrap_or_else(|| "BTC/USDT".to_string());

        let mode = match lookup("TRADING_MODE") {
            Some(raw) => TradingMode::parse(&raw).ok_or(ConfigError::Invalid {
                var: "TRADING_MODE",
                expected: "mx_buy_lbank_sell or lbank_buy_mx_sell",
                value: raw,
            })?,
            None => TradingMode::MxBuyLbankSell,
        };

        let reconnect_delay = Duration::from_millis(bounded(
            &lookup,
            "RECONNECT_DELAY_MS",
            3000,
            RECONNECT_DELAY_RANGE,
            "an integer from 0 to 600000",
        )?);
        let chart_capacity = bounded(
            &lookup,
            "CHART_CAPACITY",
            300,
            CHART_CAPACITY_RANGE,
            "an integer from 1 to 100000",
        )? as usize;
        let coalesce_window_ms = bounded(
            &lookup,
            "CHART_COALESCE_MS",
            500,
            CHART_COALESCE_RANGE,
            "an integer from 0 to 60000",
        )? as i64;
        let render_interval = Duration::from_millis(bounded(
            &lookup,
            "RENDER_INTERVAL_MS",
            250,
            RENDER_INTERVAL_RANGE,
            "an integer from 10 to 10000",
        )?);

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let log_file = lookup("LOG_FILE")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            server_url,
            feed_url,
            symbol,
            mode,
            reconnect_delay,
            chart_capacity,
            coalesce_window_ms,
            render_interval,
            log_format,
            log_file,
        })
    }
}

fn bounded(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
    range: RangeInclusive<u64>,
    expected: &'static str,
) -> Result<u64, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if range.contains(&value) => Ok(value),
        _ => Err(ConfigError::Invalid {
            var,
            expected,
            value: raw,
        }),
    }
}

/// http://host:port → ws://host:port/ws, https → wss.
fn feed_url_for(server_url: &str) -> Result<String, ConfigError> {
    if let Some(rest) = server_url.strip_prefix("https://") {
        Ok(format!("wss://{rest}/ws"))
    } else if let Some(rest) = server_url.strip_prefix("http://") {
        Ok(format!("ws://{rest}/ws"))
    } else {
        Err(ConfigError::BadServerUrl(server_url.to_string()))
    }
}
