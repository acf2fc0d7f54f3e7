use anyhow::Context;
use tracing_subscriber::EnvFilter;

use vidly_api::config::AppConfig;
use vidly_api::database::DatabaseManager;
use vidly_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, VIDLY_JWT_PRIVATE_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vidly_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate().context("FATAL ERROR: invalid configuration")?;
    tracing::info!("Starting Vidly API in {:?} mode", config.environment);

    let store = DatabaseManager::connect(&config.database)
        .await
        .context("failed to initialize storage")?;

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Vidly API listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(config, store))).await?;
    Ok(())
}
