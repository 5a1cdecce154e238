//! Countries Ingest - load REST Countries data into PostgreSQL

use anyhow::Result;
use clap::Parser;
use countries_common::logging::{init_logging, LogConfig, LogLevel};
use countries_ingest::{config::Config, pipeline::CountriesPipeline};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "countries-ingest")]
#[command(author, version, about = "Fetch country reference data and load it into PostgreSQL")]
struct Cli {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over the flag
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("countries-ingest")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    let config = Config::load()?;
    info!(
        api = %config.api.base_url,
        strategy = %config.api.merge_strategy,
        "Starting country ingestion"
    );

    let result = CountriesPipeline::new(config).run().await?;

    info!(
        fetched = result.fetched,
        inserted = result.load.inserted,
        "Inserted {} countries",
        result.load.submitted
    );
    info!("All done!");

    Ok(())
}
