//! Trading engine binary.
//!
//! Loads configuration, starts the engine and runs until SIGINT or SIGTERM.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trading_engine::application::services::{Engine, shutdown_signal};
use trading_engine::config::EngineConfig;
use trading_engine::infrastructure::market_data::HttpPriceSource;
use trading_engine::infrastructure::persistence::redis::RedisTradeRepository;
use trading_engine::infrastructure::persistence::{RetryPolicy, RetryingTradeRepository};

#[derive(Debug, Parser)]
#[command(name = "trading-engine", version, about = "Runs the trading engine loops")]
struct Cli {
    /// Environment file to load before reading settings. Without it `.env`
    /// is searched for in the working directory and its parents.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = match &cli.env_file {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };

    let repository = Arc::new(RetryingTradeRepository::new(
        RedisTradeRepository::new(config.redis_url()),
        RetryPolicy::store(),
    ));
    let source = Arc::new(
        HttpPriceSource::new(config.http_timeout()).context("failed to build HTTP client")?,
    );

    info!("Press Ctrl+C to stop");
    let report = Engine::new(config, repository, source)
        .run_until(shutdown_signal())
        .await;

    info!(clean = report.is_clean(), "trading engine stopped");
    Ok(())
}
