//! CLI interface
//!
//! Provides subcommands for:
//! - `serve`: run the trading simulator and its REST API
//! - `discover`: print the instruments discovery would subscribe to

mod discover;
mod serve;

pub use discover::DiscoverArgs;
pub use serve::ServeArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kraken-sim")]
#[command(about = "Spot crypto trading simulator with live Kraken prices")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the simulator and its REST API
    Serve(ServeArgs),
    /// Print the discovered instrument set
    Discover(DiscoverArgs),
}
