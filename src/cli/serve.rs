//! `serve` subcommand: discovery, feed, ledger, HTTP server

use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::api::{self, AppState};
use crate::config::Config;
use crate::feed::{DiscoveryClient, KrakenFeed, PriceCache};
use crate::ledger::{Ledger, PRIMARY_ACCOUNT};

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<String>,
}

impl ServeArgs {
    /// Wire everything together and serve until shutdown
    pub async fn execute(self, config: Config) -> anyhow::Result<()> {
        let cache = PriceCache::new();

        let discovery = DiscoveryClient::new(config.feed.clone());
        let instruments = discovery.select_instruments().await;

        if instruments.is_empty() {
            tracing::warn!(
                "No instruments discovered; running without live prices, all trades will fail price lookup"
            );
        } else {
            let feed = KrakenFeed::new(config.feed.clone(), cache.clone());
            tokio::spawn(feed.run(instruments));
        }

        let ledger = Arc::new(Ledger::new(
            PRIMARY_ACCOUNT,
            cache.clone(),
            config.ledger.starting_balance,
        ));
        let state = AppState { cache, ledger };

        let bind = self.bind.unwrap_or(config.server.bind);
        let listener = TcpListener::bind(&bind).await?;
        tracing::info!(%bind, "REST API listening");

        axum::serve(listener, api::router(state)).await?;
        Ok(())
    }
}
