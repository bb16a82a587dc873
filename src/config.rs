//! Configuration types

use rust_decimal::Decimal;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Price feed and discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Streaming venue WebSocket URL
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// Ranked market-cap listing endpoint
    #[serde(default = "default_market_cap_url")]
    pub market_cap_url: String,

    /// Venue tradable-pairs catalogue endpoint
    #[serde(default = "default_asset_pairs_url")]
    pub asset_pairs_url: String,

    /// How many top market-cap assets to consider
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Reference fiat quote currency for instrument selection
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
}

fn default_ws_url() -> String {
    "wss://ws.kraken.com/v2".to_string()
}
fn default_market_cap_url() -> String {
    "https://api.coingecko.com/api/v3/coins/markets".to_string()
}
fn default_asset_pairs_url() -> String {
    "https://api.kraken.com/0/public/AssetPairs".to_string()
}
fn default_top_n() -> usize {
    20
}
fn default_quote_currency() -> String {
    "USD".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            market_cap_url: default_market_cap_url(),
            asset_pairs_url: default_asset_pairs_url(),
            top_n: default_top_n(),
            quote_currency: default_quote_currency(),
        }
    }
}

/// Ledger configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Cash the account starts with, and returns to on reset
    #[serde(default = "default_starting_balance")]
    pub starting_balance: Decimal,
}

fn default_starting_balance() -> Decimal {
    Decimal::new(10_000, 0)
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            starting_balance: default_starting_balance(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the REST API
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Default log filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus exporter port; metrics are disabled when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
