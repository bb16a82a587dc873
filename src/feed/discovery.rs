//! Startup instrument discovery
//!
//! Selects which instruments to subscribe to by intersecting a ranked
//! market-cap list with the venue's tradable-pairs catalogue. Runs once at
//! startup; any upstream failure degrades to an empty selection so the rest
//! of the process keeps running without live prices.

use crate::config::FeedConfig;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// One entry of the ranked market-cap listing; only the ticker symbol is used
#[derive(Debug, Deserialize)]
struct MarketCapEntry {
    symbol: String,
}

/// Venue pairs catalogue response
#[derive(Debug, Deserialize)]
struct AssetPairsResponse {
    #[serde(default)]
    result: BTreeMap<String, AssetPair>,
}

/// One tradable pair; pairs without a `wsname` are not usable for streaming
#[derive(Debug, Deserialize)]
pub(crate) struct AssetPair {
    pub(crate) wsname: Option<String>,
}

/// Client for the two one-shot discovery fetches
pub struct DiscoveryClient {
    config: FeedConfig,
    http: Client,
}

impl DiscoveryClient {
    /// Create a new discovery client
    pub fn new(config: FeedConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, http }
    }

    /// Select the instruments to subscribe to.
    ///
    /// Never fails: a fetch error or an empty intersection is logged and
    /// yields an empty list, leaving all price queries answering "unknown".
    pub async fn select_instruments(&self) -> Vec<String> {
        match self.try_select().await {
            Ok(instruments) => {
                if instruments.is_empty() {
                    tracing::warn!("No venue pairs matched the top market-cap assets");
                } else {
                    tracing::info!(count = instruments.len(), ?instruments, "Discovered instruments");
                }
                instruments
            }
            Err(e) => {
                tracing::error!(error = %e, "Instrument discovery failed");
                vec![]
            }
        }
    }

    async fn try_select(&self) -> anyhow::Result<Vec<String>> {
        let top = self.fetch_top_assets().await?;
        let pairs = self.fetch_asset_pairs().await?;
        Ok(match_pairs(&top, &pairs, &self.config.quote_currency))
    }

    /// Top-N assets by market cap, upper-cased and remapped to venue naming
    async fn fetch_top_assets(&self) -> anyhow::Result<HashSet<String>> {
        let response = self
            .http
            .get(&self.config.market_cap_url)
            .query(&[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("page", "1"),
            ])
            .query(&[("per_page", self.config.top_n)])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("market-cap source returned {}", response.status());
        }

        let entries: Vec<MarketCapEntry> = response.json().await?;
        Ok(entries
            .into_iter()
            .map(|e| canonical_symbol(&e.symbol.to_uppercase()))
            .collect())
    }

    /// Full tradable-pairs catalogue from the venue
    async fn fetch_asset_pairs(&self) -> anyhow::Result<BTreeMap<String, AssetPair>> {
        let response = self.http.get(&self.config.asset_pairs_url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("pairs catalogue returned {}", response.status());
        }

        let pairs: AssetPairsResponse = response.json().await?;
        Ok(pairs.result)
    }
}

/// Remap a base-asset symbol to the venue's naming.
///
/// Applied once at discovery; everything downstream uses the venue name.
pub(crate) fn canonical_symbol(symbol: &str) -> String {
    match symbol {
        "BTC" => "XBT".to_string(),
        "IOTA" => "MIOTA".to_string(),
        other => other.to_string(),
    }
}

/// Keep pairs quoted in the reference currency whose base is a top asset.
///
/// Order follows the catalogue; duplicates are collapsed.
pub(crate) fn match_pairs(
    top: &HashSet<String>,
    pairs: &BTreeMap<String, AssetPair>,
    quote_currency: &str,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut instruments = Vec::new();

    for pair in pairs.values() {
        let Some(wsname) = &pair.wsname else {
            continue;
        };
        let Some((base, quote)) = wsname.split_once('/') else {
            continue;
        };
        if quote == quote_currency && top.contains(base) && seen.insert(wsname.clone()) {
            instruments.push(wsname.clone());
        }
    }

    instruments
}
