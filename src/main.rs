use clap::Parser;
use kraken_sim::cli::{Cli, Commands};
use kraken_sim::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    kraken_sim::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Serve(args) => {
            tracing::info!("Starting trading simulator");
            args.execute(config).await?;
        }
        Commands::Discover(args) => {
            args.execute(config).await?;
        }
    }

    Ok(())
}
