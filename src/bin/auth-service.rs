use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tradefolio::auth::TokenIssuer;
use tradefolio::config::AppConfig;
use tradefolio::database::{DatabaseManager, MemoryRepository, PgRepository, Schema, UserRepository};
use tradefolio::routes::auth_router;
use tradefolio::state::AuthState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    let config = AppConfig::from_env();
    info!("Starting auth service in {:?} mode", config.environment);

    // Fresh key per process: restarting invalidates every outstanding token
    let issuer = TokenIssuer::generate(config.security.jwt_expiry_minutes);

    let state = if config.database.url.is_some() {
        let db = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        db.ensure_schema(Schema::Auth).await.context("failed to prepare schema")?;
        let users: Arc<dyn UserRepository> = Arc::new(PgRepository::new(db.pool().clone()));
        AuthState::new(issuer, users).with_database(db)
    } else {
        info!("DATABASE_URL not set, using in-memory user store");
        let users: Arc<dyn UserRepository> = Arc::new(MemoryRepository::new());
        AuthState::new(issuer, users)
    };
    let database = state.database.clone();

    let app = auth_router(state, &config.security);

    let bind_addr = config.auth_bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Auth service listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(db) = database {
        db.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
