use std::path::PathBuf;

use anyhow::{Context, Result};
use patient_records_server::{open_store, router, AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Optional first argument: path to a TOML config file
    let config_file = std::env::args().nth(1).map(PathBuf::from);
    let config = ServerConfig::load(config_file.as_deref()).context("Failed to load configuration")?;

    let store = open_store(&config).with_context(|| {
        format!("Failed to open record store at {}", config.data_path.display())
    })?;
    let app = router(AppState::new(store));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, backend = ?config.backend, data_path = %config.data_path.display(), "patient records server listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
