//! kraken-sim: spot crypto trading simulator with live Kraken prices
//!
//! This library provides the core components for:
//! - Startup instrument discovery (market-cap ranking x venue pairs)
//! - Real-time ticker ingest over WebSocket into a shared price cache
//! - A trading ledger with balance, holdings, and an append-only
//!   transaction log, mutated atomically per operation
//! - A REST API over both
//! - Logging and metrics

pub mod api;
pub mod cli;
pub mod config;
pub mod feed;
pub mod ledger;
pub mod telemetry;
pub mod ws;
