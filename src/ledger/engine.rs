//! Trading ledger engine
//!
//! Enforces buy/sell/reset semantics against the account, holdings, and
//! transaction log, consulting the price cache for execution prices. Each
//! operation validates first, then applies all of its effects under a single
//! store guard, so either everything happens or nothing does.

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};

use super::store::{LedgerState, MemoryStore};
use super::types::{
    Account, AccountId, AccountView, HoldingView, LedgerError, TradeSide, Transaction,
};
use crate::feed::PriceCache;

/// Decimal places kept when dividing out the average buy price
const BASIS_SCALE: u32 = 8;

/// The trading ledger for the single simulated account
pub struct Ledger {
    store: MemoryStore,
    cache: PriceCache,
    starting_balance: Decimal,
}

impl Ledger {
    /// Create a ledger with a freshly funded account
    pub fn new(account: AccountId, cache: PriceCache, starting_balance: Decimal) -> Self {
        Self {
            store: MemoryStore::new(Account {
                id: account,
                balance: starting_balance,
            }),
            cache,
            starting_balance,
        }
    }

    /// Current balance and holdings, each holding annotated with the latest
    /// cache price (absent when no price has been observed yet)
    pub fn account(&self, account: AccountId) -> Result<AccountView, LedgerError> {
        let state = self.store.lock()?;
        state.ensure_account(account)?;
        Ok(self.view(&state))
    }

    /// Full transaction log, most recent first
    pub fn transactions(&self, account: AccountId) -> Result<Vec<Transaction>, LedgerError> {
        let state = self.store.lock()?;
        state.ensure_account(account)?;
        Ok(state.transactions.iter().rev().cloned().collect())
    }

    /// Buy `quantity` of `symbol` at the current cache price.
    ///
    /// Fails without mutating anything if the price is unknown or the
    /// balance cannot cover the cost.
    pub fn buy(
        &self,
        account: AccountId,
        symbol: &str,
        quantity: Decimal,
    ) -> Result<AccountView, LedgerError> {
        validate_order(symbol, quantity)?;
        let price = self.required_price(symbol)?;
        let cost = price * quantity;

        let mut state = self.store.lock()?;
        state.ensure_account(account)?;

        if state.account.balance < cost {
            return Err(LedgerError::InsufficientBalance {
                required: cost,
                available: state.account.balance,
            });
        }

        state.account.balance -= cost;
        *state
            .holdings
            .entry(symbol.to_string())
            .or_insert(Decimal::ZERO) += quantity;

        let id = state.next_transaction_id();
        state.transactions.push(Transaction {
            id,
            symbol: symbol.to_string(),
            quantity,
            price,
            side: TradeSide::Buy,
            timestamp: Utc::now(),
            profit_loss: None,
        });

        tracing::info!(%symbol, %quantity, %price, "Executed buy");
        Ok(self.view(&state))
    }

    /// Sell `quantity` of `symbol` at the current cache price.
    ///
    /// Realized profit/loss is settled against the quantity-weighted average
    /// of all prior buy prices for the symbol and recorded on the
    /// transaction. A holding driven to exactly zero is removed.
    pub fn sell(
        &self,
        account: AccountId,
        symbol: &str,
        quantity: Decimal,
    ) -> Result<AccountView, LedgerError> {
        validate_order(symbol, quantity)?;
        let price = self.required_price(symbol)?;

        let mut state = self.store.lock()?;
        state.ensure_account(account)?;

        let held = state
            .holdings
            .get(symbol)
            .copied()
            .unwrap_or(Decimal::ZERO);
        if held < quantity {
            return Err(LedgerError::InsufficientHoldings {
                symbol: symbol.to_string(),
                requested: quantity,
                held,
            });
        }

        let basis = average_buy_price(&state.transactions, symbol);
        let profit_loss = (price - basis) * quantity;

        let remaining = held - quantity;
        if remaining.is_zero() {
            state.holdings.remove(symbol);
        } else {
            state.holdings.insert(symbol.to_string(), remaining);
        }
        state.account.balance += price * quantity;

        let id = state.next_transaction_id();
        state.transactions.push(Transaction {
            id,
            symbol: symbol.to_string(),
            quantity,
            price,
            side: TradeSide::Sell,
            timestamp: Utc::now(),
            profit_loss: Some(profit_loss),
        });

        tracing::info!(%symbol, %quantity, %price, %profit_loss, "Executed sell");
        Ok(self.view(&state))
    }

    /// Restore the starting balance and clear all holdings and transactions
    pub fn reset(&self, account: AccountId) -> Result<AccountView, LedgerError> {
        let mut state = self.store.lock()?;
        state.ensure_account(account)?;

        state.account.balance = self.starting_balance;
        state.holdings.clear();
        state.transactions.clear();

        tracing::info!(balance = %self.starting_balance, "Account reset");
        Ok(self.view(&state))
    }

    fn required_price(&self, symbol: &str) -> Result<Decimal, LedgerError> {
        self.cache
            .price(symbol)
            .ok_or_else(|| LedgerError::PriceUnavailable(symbol.to_string()))
    }

    /// Build the account view under the caller's guard, so it reflects one
    /// consistent state
    fn view(&self, state: &LedgerState) -> AccountView {
        let holdings = state
            .holdings
            .iter()
            .map(|(symbol, quantity)| HoldingView {
                symbol: symbol.clone(),
                quantity: *quantity,
                current_price: self.cache.price(symbol),
            })
            .collect();

        AccountView {
            balance: state.account.balance,
            holdings,
        }
    }
}

fn validate_order(symbol: &str, quantity: Decimal) -> Result<(), LedgerError> {
    if symbol.trim().is_empty() {
        return Err(LedgerError::MissingSymbol);
    }
    if quantity <= Decimal::ZERO {
        return Err(LedgerError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Quantity-weighted mean of all prior buy prices for the symbol.
///
/// Zero when there is no buy history; a sell with no matching buys settles
/// against a zero cost basis rather than failing.
fn average_buy_price(transactions: &[Transaction], symbol: &str) -> Decimal {
    let mut total_quantity = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;

    for tx in transactions
        .iter()
        .filter(|tx| tx.side == TradeSide::Buy && tx.symbol == symbol)
    {
        total_quantity += tx.quantity;
        total_cost += tx.quantity * tx.price;
    }

    if total_quantity.is_zero() {
        Decimal::ZERO
    } else {
        (total_cost / total_quantity)
            .round_dp_with_strategy(BASIS_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::PRIMARY_ACCOUNT;
    use rust_decimal_macros::dec;

    fn ledger_with_prices(prices: &[(&str, Decimal)]) -> Ledger {
        let cache = PriceCache::new();
        for (symbol, price) in prices {
            cache.update(*symbol, *price);
        }
        Ledger::new(PRIMARY_ACCOUNT, cache, dec!(10000))
    }

    #[test]
    fn test_buy_success() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(2000))]);

        let view = ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(1.5)).unwrap();

        assert_eq!(view.balance, dec!(7000));
        assert_eq!(view.holdings.len(), 1);
        assert_eq!(view.holdings[0].symbol, "ETH/USD");
        assert_eq!(view.holdings[0].quantity, dec!(1.5));
        assert_eq!(view.holdings[0].current_price, Some(dec!(2000)));

        let txs = ledger.transactions(PRIMARY_ACCOUNT).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].side, TradeSide::Buy);
        assert_eq!(txs[0].price, dec!(2000));
        assert!(txs[0].profit_loss.is_none());
    }

    #[test]
    fn test_buy_accumulates_holding() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100))]);

        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();
        let view = ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(2)).unwrap();

        assert_eq!(view.holdings.len(), 1);
        assert_eq!(view.holdings[0].quantity, dec!(3));
    }

    #[test]
    fn test_buy_insufficient_balance_no_mutation() {
        let ledger = ledger_with_prices(&[("XBT/USD", dec!(90000))]);

        let err = ledger.buy(PRIMARY_ACCOUNT, "XBT/USD", dec!(1)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));

        let view = ledger.account(PRIMARY_ACCOUNT).unwrap();
        assert_eq!(view.balance, dec!(10000));
        assert!(view.holdings.is_empty());
        assert!(ledger.transactions(PRIMARY_ACCOUNT).unwrap().is_empty());
    }

    #[test]
    fn test_buy_unknown_price_no_mutation() {
        let ledger = ledger_with_prices(&[]);

        let err = ledger.buy(PRIMARY_ACCOUNT, "ZZZ/USD", dec!(1)).unwrap_err();
        assert!(matches!(err, LedgerError::PriceUnavailable(_)));

        let view = ledger.account(PRIMARY_ACCOUNT).unwrap();
        assert_eq!(view.balance, dec!(10000));
        assert!(ledger.transactions(PRIMARY_ACCOUNT).unwrap().is_empty());
    }

    #[test]
    fn test_buy_rejects_invalid_input() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100))]);

        assert!(matches!(
            ledger.buy(PRIMARY_ACCOUNT, "", dec!(1)),
            Err(LedgerError::MissingSymbol)
        ));
        assert!(matches!(
            ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(0)),
            Err(LedgerError::InvalidQuantity(_))
        ));
        assert!(matches!(
            ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(-2)),
            Err(LedgerError::InvalidQuantity(_))
        ));
        assert!(ledger.transactions(PRIMARY_ACCOUNT).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_account_rejected() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100))]);

        let err = ledger.buy(AccountId(42), "ETH/USD", dec!(1)).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
    }

    #[test]
    fn test_sell_realizes_profit_against_average_basis() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100))]);

        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();
        ledger.cache.update("ETH/USD", dec!(200));
        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();

        // basis = (1*100 + 1*200) / 2 = 150
        ledger.cache.update("ETH/USD", dec!(300));
        ledger.sell(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();

        let txs = ledger.transactions(PRIMARY_ACCOUNT).unwrap();
        assert_eq!(txs[0].side, TradeSide::Sell);
        assert_eq!(txs[0].profit_loss, Some(dec!(150)));
    }

    #[test]
    fn test_sell_removes_zero_holding() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100))]);

        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(2)).unwrap();
        let view = ledger.sell(PRIMARY_ACCOUNT, "ETH/USD", dec!(2)).unwrap();

        assert!(view.holdings.is_empty());
        assert_eq!(view.balance, dec!(10000));
    }

    #[test]
    fn test_buy_then_sell_round_trip_restores_balance() {
        let ledger = ledger_with_prices(&[("SOL/USD", dec!(150))]);

        ledger.buy(PRIMARY_ACCOUNT, "SOL/USD", dec!(4)).unwrap();
        let view = ledger.sell(PRIMARY_ACCOUNT, "SOL/USD", dec!(4)).unwrap();

        assert_eq!(view.balance, dec!(10000));
        assert!(view.holdings.is_empty());

        let txs = ledger.transactions(PRIMARY_ACCOUNT).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].profit_loss, Some(dec!(0)));
    }

    #[test]
    fn test_sell_partial_keeps_remainder() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100))]);

        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(5)).unwrap();
        let view = ledger.sell(PRIMARY_ACCOUNT, "ETH/USD", dec!(2)).unwrap();

        assert_eq!(view.holdings[0].quantity, dec!(3));
    }

    #[test]
    fn test_sell_insufficient_holdings_no_mutation() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100))]);
        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();

        let err = ledger
            .sell(PRIMARY_ACCOUNT, "ETH/USD", dec!(3))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientHoldings { .. }));

        let view = ledger.account(PRIMARY_ACCOUNT).unwrap();
        assert_eq!(view.balance, dec!(9900));
        assert_eq!(view.holdings[0].quantity, dec!(1));
        assert_eq!(ledger.transactions(PRIMARY_ACCOUNT).unwrap().len(), 1);
    }

    #[test]
    fn test_sell_never_held_fails() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100))]);

        let err = ledger
            .sell(PRIMARY_ACCOUNT, "ETH/USD", dec!(1))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientHoldings { held, .. } if held == dec!(0)
        ));
    }

    #[test]
    fn test_average_buy_price_rounds_to_basis_scale() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100))]);

        // 3 buys of 1 at 100 total 300; selling against basis 100
        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(3)).unwrap();
        ledger.cache.update("ETH/USD", dec!(10));
        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(0.5)).unwrap();

        // basis = (3*100 + 0.5*10) / 3.5 = 305 / 3.5 = 87.14285714...
        ledger.cache.update("ETH/USD", dec!(100));
        ledger.sell(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();

        let txs = ledger.transactions(PRIMARY_ACCOUNT).unwrap();
        let pnl = txs[0].profit_loss.unwrap();
        assert_eq!(pnl, dec!(100) - dec!(87.14285714));
    }

    #[test]
    fn test_reset_restores_pristine_state() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100))]);

        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(3)).unwrap();
        ledger.sell(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();

        let view = ledger.reset(PRIMARY_ACCOUNT).unwrap();
        assert_eq!(view.balance, dec!(10000));
        assert!(view.holdings.is_empty());
        assert!(ledger.transactions(PRIMARY_ACCOUNT).unwrap().is_empty());
    }

    #[test]
    fn test_transaction_ids_survive_reset() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100))]);

        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();
        ledger.reset(PRIMARY_ACCOUNT).unwrap();
        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();

        let txs = ledger.transactions(PRIMARY_ACCOUNT).unwrap();
        assert_eq!(txs[0].id, 2);
    }

    #[test]
    fn test_transactions_most_recent_first() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100)), ("SOL/USD", dec!(10))]);

        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();
        ledger.buy(PRIMARY_ACCOUNT, "SOL/USD", dec!(1)).unwrap();
        ledger.sell(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();

        let txs = ledger.transactions(PRIMARY_ACCOUNT).unwrap();
        let ids: Vec<u64> = txs.iter().map(|tx| tx.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_holding_view_price_absent_when_cache_forgets_nothing() {
        // A holding bought at a known price keeps showing the live price;
        // an instrument the cache never saw reports none
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100))]);
        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();

        let view = ledger.account(PRIMARY_ACCOUNT).unwrap();
        assert_eq!(view.holdings[0].current_price, Some(dec!(100)));
    }

    #[test]
    fn test_average_buy_price_ignores_other_symbols_and_sells() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(100)), ("SOL/USD", dec!(999))]);

        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();
        ledger.buy(PRIMARY_ACCOUNT, "SOL/USD", dec!(1)).unwrap();
        ledger.sell(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();

        // Second ETH buy at a new price; basis must ignore the SOL buy and
        // the earlier ETH sell
        ledger.cache.update("ETH/USD", dec!(300));
        ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();
        ledger.sell(PRIMARY_ACCOUNT, "ETH/USD", dec!(1)).unwrap();

        let txs = ledger.transactions(PRIMARY_ACCOUNT).unwrap();
        // basis = (1*100 + 1*300) / 2 = 200, sold at 300
        assert_eq!(txs[0].profit_loss, Some(dec!(100)));
    }

    #[test]
    fn test_average_buy_price_zero_without_history() {
        // A sell with no matching buys settles against a zero basis
        assert_eq!(average_buy_price(&[], "ETH/USD"), dec!(0));

        let unrelated = Transaction {
            id: 1,
            symbol: "SOL/USD".to_string(),
            quantity: dec!(1),
            price: dec!(50),
            side: TradeSide::Buy,
            timestamp: Utc::now(),
            profit_loss: None,
        };
        assert_eq!(average_buy_price(&[unrelated], "ETH/USD"), dec!(0));
    }

    #[test]
    fn test_balance_never_negative_exact_spend() {
        let ledger = ledger_with_prices(&[("ETH/USD", dec!(2500))]);

        // Spend the entire balance
        let view = ledger.buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(4)).unwrap();
        assert_eq!(view.balance, dec!(0));

        // One satoshi more than affordable must fail
        let err = ledger
            .buy(PRIMARY_ACCOUNT, "ETH/USD", dec!(0.00000001))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    }
}
