//! Ledger records, views, and errors

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use super::store::StoreError;

/// Handle to an account row.
///
/// There is only ever one account in this system, but every operation names
/// it explicitly so the single-row invariant is checked rather than assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AccountId(pub u64);

/// The one account this system trades
pub const PRIMARY_ACCOUNT: AccountId = AccountId(1);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cash account
#[derive(Debug, Clone)]
pub struct Account {
    /// Account identity
    pub id: AccountId,
    /// Available cash in the quote currency
    pub balance: Decimal,
}

/// Direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Immutable record of one executed trade.
///
/// Appended once, never edited. `profit_loss` is present only on sells, where
/// it holds the realized result against the historical average buy price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: u64,
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    pub profit_loss: Option<Decimal>,
}

/// One holding annotated with the latest cache price, if any
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingView {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    pub current_price: Option<Decimal>,
}

/// Balance plus all holdings, as returned by every operation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub balance: Decimal,
    pub holdings: Vec<HoldingView>,
}

/// Why a ledger operation was rejected. No mutation happened in any case.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("symbol is required")]
    MissingSymbol,
    #[error("quantity must be a positive number")]
    InvalidQuantity(Decimal),
    #[error("price unavailable for {0}")]
    PriceUnavailable(String),
    #[error("insufficient balance: cost {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },
    #[error("not enough holdings of {symbol}: requested {requested}, held {held}")]
    InsufficientHoldings {
        symbol: String,
        requested: Decimal,
        held: Decimal,
    },
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}
