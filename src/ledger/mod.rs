//! Trading ledger
//!
//! Account, holdings, transaction log, and the engine that mutates them
//! atomically against live cache prices.

mod engine;
mod store;
mod types;

pub use engine::Ledger;
pub use store::StoreError;
pub use types::{
    Account, AccountId, AccountView, HoldingView, LedgerError, TradeSide, Transaction,
    PRIMARY_ACCOUNT,
};
