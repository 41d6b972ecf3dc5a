mod cache;
mod config;
mod error;
mod insights;
mod limiter;
mod models;
mod providers;
mod query;
mod server;
mod service;

use clap::Parser;
use config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    info!("🏠 PropIndex - sold property search API");
    info!(
        rate_limit = config.rate_limit,
        rate_window_secs = config.rate_window_secs,
        cache_ttl_secs = config.cache_ttl_secs,
        live = config.api_key().is_some(),
        strict_upstream = config.strict_upstream,
        "Starting"
    );

    server::run_server(&config).await
}
