//! OpenDesk API - Main Entry Point

use std::sync::Arc;

use anyhow::Context;
use desk_scheduler::{DeskConfig, DeskService, HttpAgentDirectory, HttpRequestStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("OpenDesk API v{}", env!("CARGO_PKG_VERSION"));

    // Load config
    let config_path = std::env::var("DESK_CONFIG")
        .unwrap_or_else(|_| "/etc/opendesk/desk.json".into());

    let config = DeskConfig::load(&config_path)
        .unwrap_or_else(|e| {
            tracing::warn!(path = %config_path, error = %e, "Config not loaded, using defaults");
            DeskConfig::default()
        })
        .with_env_overrides();
    config.validate().context("invalid configuration")?;

    let directory = HttpAgentDirectory::new(&config.directory).context("directory client")?;
    let store = HttpRequestStore::new(&config.store).context("store client")?;
    let desk = DeskService::new(Arc::new(directory), Arc::new(store), config.scheduler);

    let app = desk_api::build_router(Arc::new(desk));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
