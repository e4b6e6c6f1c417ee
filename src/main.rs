//! Binary entry point: parse runtime options and start the HTTP service.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use mcp_settings::api;
use mcp_settings::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        "Starting MCP settings service on http://{}:{}",
        config.host,
        config.port
    );

    api::serve(config).await
}
