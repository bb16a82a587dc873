//! `discover` subcommand: run instrument discovery and print the result

use clap::Args;

use crate::config::Config;
use crate::feed::DiscoveryClient;

/// Arguments for the discover command
#[derive(Args, Debug)]
pub struct DiscoverArgs {}

impl DiscoverArgs {
    /// Run the one-shot discovery step and print the selected instruments
    pub async fn execute(self, config: Config) -> anyhow::Result<()> {
        let discovery = DiscoveryClient::new(config.feed);
        let instruments = discovery.select_instruments().await;

        if instruments.is_empty() {
            println!("No instruments selected");
        } else {
            for instrument in instruments {
                println!("{}", instrument);
            }
        }

        Ok(())
    }
}
