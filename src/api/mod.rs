//! REST API
//!
//! Thin transport layer over the price cache and the ledger engine: routing,
//! boundary validation, and error-to-status mapping. All trading semantics
//! live in the engine.

mod types;

pub use types::{ApiError, ErrorBody, TradeRequest, MIN_QUANTITY};

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::feed::PriceCache;
use crate::ledger::{AccountView, Ledger, LedgerError, Transaction, PRIMARY_ACCOUNT};
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use types::JsonDecimal;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub cache: PriceCache,
    pub ledger: Arc<Ledger>,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/prices", get(prices))
        .route("/api/account", get(account))
        .route("/api/transactions", get(transactions))
        .route("/api/buy", post(buy))
        .route("/api/sell", post(sell))
        .route("/api/reset", post(reset))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `GET /api/prices` — every known instrument with its latest price
async fn prices(State(state): State<AppState>) -> Json<BTreeMap<String, JsonDecimal>> {
    let snapshot = state
        .cache
        .snapshot()
        .into_iter()
        .map(|(symbol, price)| (symbol, JsonDecimal(price)))
        .collect();
    Json(snapshot)
}

/// `GET /api/account` — balance and holdings
async fn account(State(state): State<AppState>) -> Result<Json<AccountView>, ApiError> {
    Ok(Json(state.ledger.account(PRIMARY_ACCOUNT)?))
}

/// `GET /api/transactions` — full log, most recent first
async fn transactions(State(state): State<AppState>) -> Result<Json<Vec<Transaction>>, ApiError> {
    Ok(Json(state.ledger.transactions(PRIMARY_ACCOUNT)?))
}

/// `POST /api/buy`
async fn buy(
    State(state): State<AppState>,
    Json(request): Json<TradeRequest>,
) -> Result<Json<AccountView>, ApiError> {
    request.validate()?;
    settle(
        state
            .ledger
            .buy(PRIMARY_ACCOUNT, &request.symbol, request.quantity),
    )
}

/// `POST /api/sell`
async fn sell(
    State(state): State<AppState>,
    Json(request): Json<TradeRequest>,
) -> Result<Json<AccountView>, ApiError> {
    request.validate()?;
    settle(
        state
            .ledger
            .sell(PRIMARY_ACCOUNT, &request.symbol, request.quantity),
    )
}

/// `POST /api/reset`
async fn reset(State(state): State<AppState>) -> Result<Json<AccountView>, ApiError> {
    let view = state.ledger.reset(PRIMARY_ACCOUNT)?;
    record_balance(&view);
    Ok(Json(view))
}

fn settle(result: Result<AccountView, LedgerError>) -> Result<Json<AccountView>, ApiError> {
    match result {
        Ok(view) => {
            telemetry::increment(CounterMetric::TradesExecuted);
            record_balance(&view);
            Ok(Json(view))
        }
        Err(err) => {
            telemetry::increment(CounterMetric::TradesRejected);
            Err(err.into())
        }
    }
}

fn record_balance(view: &AccountView) {
    if let Some(balance) = view.balance.to_f64() {
        telemetry::set_gauge(GaugeMetric::AccountBalance, balance);
    }
}
