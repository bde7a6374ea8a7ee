use market_relay::config::RelayConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RelayConfig::from_env();
    tracing::info!(?config, "Starting market relay");

    market_relay::server::run(config).await
}
