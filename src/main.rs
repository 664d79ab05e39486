use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use jobly_api::config::{self, Environment};
use jobly_api::database::DatabaseManager;
use jobly_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    jobly_api::init_tracing();

    let config = config::config();
    info!("Starting Jobly API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("SECRET_KEY must be set in {:?} mode", config.environment);
    }
    if config.environment == Environment::Production && config.security.cors_origins.is_empty() {
        warn!("No SECURITY_CORS_ORIGINS configured; allowing any origin");
    }

    let pool = DatabaseManager::connect(config)
        .await
        .context("failed to connect to database")?;
    let state = AppState::new(pool, config.security.bcrypt_cost);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Jobly API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Jobly API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
