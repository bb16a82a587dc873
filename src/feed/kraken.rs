//! Kraken WebSocket v2 ticker feed

use super::PriceCache;
use crate::config::FeedConfig;
use crate::telemetry::{self, CounterMetric};
use crate::ws::{WsClient, WsConfig, WsEvent};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

/// Subscription request sent once per established connection
#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    method: &'static str,
    params: SubscribeParams<'a>,
}

#[derive(Debug, Serialize)]
struct SubscribeParams<'a> {
    channel: &'static str,
    symbol: &'a [String],
}

/// Why a well-formed frame did not update the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// `channel` missing or not `"ticker"` (heartbeats, method acks, status)
    NotTicker,
    /// `data` missing, not an array, or empty
    EmptyData,
}

/// Classified result of decoding one inbound frame.
///
/// A dropped frame is an observable outcome here, not something inferred
/// from the absence of a cache change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Cache entry overwritten
    Applied { symbol: String, price: Decimal },
    /// Valid JSON that is not a ticker update
    Ignored(IgnoreReason),
    /// Unparseable JSON or a ticker frame with the wrong shape
    Malformed,
}

/// Streams ticker updates for a fixed instrument set into the price cache
pub struct KrakenFeed {
    config: FeedConfig,
    cache: PriceCache,
}

impl KrakenFeed {
    /// Create a new feed writing into the given cache
    pub fn new(config: FeedConfig, cache: PriceCache) -> Self {
        Self { config, cache }
    }

    /// Serialize the ticker subscription for the instrument set
    pub fn subscribe_message(instruments: &[String]) -> String {
        let request = SubscribeRequest {
            method: "subscribe",
            params: SubscribeParams {
                channel: "ticker",
                symbol: instruments,
            },
        };
        serde_json::to_string(&request).expect("subscribe request serializes")
    }

    /// Decode one frame and apply it to the cache if it is a ticker update
    pub fn apply_frame(cache: &PriceCache, raw: &str) -> DecodeOutcome {
        let outcome = decode_frame(raw);
        if let DecodeOutcome::Applied { symbol, price } = &outcome {
            cache.update(symbol.clone(), *price);
        }
        outcome
    }

    /// Run the feed until the connection is gone for good.
    ///
    /// Transport errors are logged and retried by the client; a frame that
    /// fails to decode is dropped and counted, never surfaced to callers.
    pub async fn run(self, instruments: Vec<String>) {
        let ws = WsClient::new(WsConfig::new(self.config.ws_url.clone()));
        let (mut events, out) = ws.connect();

        while let Some(event) = events.recv().await {
            match event {
                WsEvent::Connected => {
                    let msg = Self::subscribe_message(&instruments);
                    match out.send(msg).await {
                        Ok(()) => {
                            tracing::info!(count = instruments.len(), "Subscribed to ticker channel")
                        }
                        Err(e) => tracing::error!(error = %e, "Failed to send ticker subscription"),
                    }
                }
                WsEvent::Frame(text) => match Self::apply_frame(&self.cache, &text) {
                    DecodeOutcome::Applied { symbol, price } => {
                        telemetry::increment(CounterMetric::FramesApplied);
                        tracing::trace!(%symbol, %price, "Ticker update");
                    }
                    DecodeOutcome::Ignored(reason) => {
                        telemetry::increment(CounterMetric::FramesIgnored);
                        tracing::trace!(?reason, "Ignored frame");
                    }
                    DecodeOutcome::Malformed => {
                        telemetry::increment(CounterMetric::FramesMalformed);
                        tracing::debug!(frame = %text, "Dropped malformed frame");
                    }
                },
                WsEvent::Reconnecting { attempt } => {
                    tracing::warn!(attempt, "Ticker feed reconnecting...");
                }
                WsEvent::Disconnected => {
                    tracing::warn!("Ticker feed disconnected");
                    break;
                }
            }
        }
    }
}

/// Classify one inbound text frame.
///
/// A frame counts as a ticker update only if `channel == "ticker"`, `data` is
/// a non-empty array, and its first element carries a string `symbol` and a
/// numeric `last`.
pub fn decode_frame(raw: &str) -> DecodeOutcome {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => return DecodeOutcome::Malformed,
    };

    match value.get("channel").and_then(Value::as_str) {
        Some("ticker") => {}
        _ => return DecodeOutcome::Ignored(IgnoreReason::NotTicker),
    }

    let entries = match value.get("data").and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => entries,
        _ => return DecodeOutcome::Ignored(IgnoreReason::EmptyData),
    };

    let first = &entries[0];
    let symbol = match first.get("symbol").and_then(Value::as_str) {
        Some(s) => s.to_string(),
        None => return DecodeOutcome::Malformed,
    };
    let price = match first.get("last") {
        Some(Value::Number(n)) => match decimal_from_number(n) {
            Some(p) => p,
            None => return DecodeOutcome::Malformed,
        },
        _ => return DecodeOutcome::Malformed,
    };

    DecodeOutcome::Applied { symbol, price }
}

/// Exact decimal from a JSON number literal.
///
/// Goes through the source text, not `f64`, so `3500.15` stays `3500.15`.
fn decimal_from_number(n: &serde_json::Number) -> Option<Decimal> {
    let raw = n.to_string();
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}
