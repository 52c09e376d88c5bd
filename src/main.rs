use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wine_concierge::concierge::Concierge;
use wine_concierge::config::ConciergeConfig;
use wine_concierge::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ConciergeConfig::from_env().context("invalid configuration")?;
    let concierge =
        Arc::new(Concierge::from_config(&config).context("failed to initialize concierge")?);

    let bind_address = config.server.bind_address();
    info!(knowledge_path = %config.tools.knowledge_path.display(), "Knowledge document loaded");

    server::serve(&bind_address, concierge)
        .await
        .with_context(|| format!("server on {} failed", bind_address))?;

    Ok(())
}
