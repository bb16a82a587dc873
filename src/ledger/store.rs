//! In-memory ledger storage
//!
//! One mutex over the whole ledger state. Holding the guard across a
//! read-validate-write sequence is the transactional boundary: two mutations
//! can never interleave, and a reader can never observe a half-applied one.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

use super::types::{Account, AccountId, Transaction};

/// Storage-level failures, surfaced to callers as a distinct error kind
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown account {0}")]
    UnknownAccount(AccountId),
    #[error("ledger state lock poisoned")]
    Poisoned,
}

/// Everything the ledger owns: balance, holdings, transaction log
#[derive(Debug)]
pub struct LedgerState {
    pub account: Account,
    /// `symbol -> quantity`; entries exist only while quantity > 0
    pub holdings: BTreeMap<String, Decimal>,
    /// Append-only, in creation order
    pub transactions: Vec<Transaction>,
    next_transaction_id: u64,
}

impl LedgerState {
    /// Fail unless the id names the stored account row
    pub fn ensure_account(&self, id: AccountId) -> Result<(), StoreError> {
        if self.account.id == id {
            Ok(())
        } else {
            Err(StoreError::UnknownAccount(id))
        }
    }

    /// Next value of the monotonic transaction id sequence
    pub fn next_transaction_id(&mut self) -> u64 {
        self.next_transaction_id += 1;
        self.next_transaction_id
    }
}

/// Mutex-protected store holding the single account row
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<LedgerState>,
}

impl MemoryStore {
    /// Create a store seeded with the given account and no trading history
    pub fn new(account: Account) -> Self {
        Self {
            state: Mutex::new(LedgerState {
                account,
                holdings: BTreeMap::new(),
                transactions: Vec::new(),
                next_transaction_id: 0,
            }),
        }
    }

    /// Take the state guard. Everything done while it is held is atomic
    /// with respect to every other ledger operation.
    pub fn lock(&self) -> Result<MutexGuard<'_, LedgerState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }
}
