//! Shared last-price cache

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe map of `instrument -> last traded price`.
///
/// Written by the single stream-decoding task, read by any number of callers.
/// A missing key means no price has been observed yet, which is not the same
/// thing as a zero price. Reads and writes are plain lock operations and
/// never touch the network.
#[derive(Debug, Clone, Default)]
pub struct PriceCache {
    inner: Arc<RwLock<HashMap<String, Decimal>>>,
}

impl PriceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest price for the instrument, if one has been observed
    pub fn price(&self, symbol: &str) -> Option<Decimal> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .copied()
    }

    /// Overwrite the entry for the instrument. Last writer wins.
    pub fn update(&self, symbol: impl Into<String>, price: Decimal) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.into(), price);
    }

    /// Independent copy of all known prices.
    ///
    /// Later cache updates do not affect a snapshot already handed out.
    pub fn snapshot(&self) -> HashMap<String, Decimal> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of instruments with a known price
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if no price has been observed yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
