use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tradefolio::clients::{AlphaVantageClient, HttpTokenValidator, MarketDataSource, TokenValidator};
use tradefolio::config::AppConfig;
use tradefolio::database::{DatabaseManager, MemoryRepository, PgRepository, Schema};
use tradefolio::routes::market_router;
use tradefolio::services::{MarketDataService, PortfolioService};
use tradefolio::state::MarketState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    let config = AppConfig::from_env();
    info!("Starting market-data service in {:?} mode", config.environment);
    if config.market.api_key.is_empty() {
        warn!("ALPHA_VANTAGE_API_KEY is empty; upstream calls will be rejected");
    }

    let source: Arc<dyn MarketDataSource> = Arc::new(
        AlphaVantageClient::new(&config.market).context("failed to build market data client")?,
    );
    let market = Arc::new(MarketDataService::new(
        source,
        Duration::from_secs(config.market.cache_ttl_secs),
        config.market.cache_max_entries,
    ));

    let validator: Arc<dyn TokenValidator> = Arc::new(
        HttpTokenValidator::new(&config.auth_client).context("failed to build auth client")?,
    );
    info!("Validating tokens against {}", config.auth_client.base_url);

    let (portfolios, database) = if config.database.url.is_some() {
        let db = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        db.ensure_schema(Schema::Market).await.context("failed to prepare schema")?;
        let repo = Arc::new(PgRepository::new(db.pool().clone()));
        let service = PortfolioService::new(repo.clone(), repo.clone(), repo, market.clone());
        (service, Some(db))
    } else {
        info!("DATABASE_URL not set, using in-memory portfolio store");
        let repo = Arc::new(MemoryRepository::new());
        let service = PortfolioService::new(repo.clone(), repo.clone(), repo, market.clone());
        (service, None)
    };

    let mut state = MarketState::new(validator, market, Arc::new(portfolios))
        .separate_unavailable(config.auth_client.separate_unavailable);
    if let Some(db) = database.clone() {
        state = state.with_database(db);
    }

    let app = market_router(state, &config.security);

    let bind_addr = config.market_bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Market-data service listening on http://{}", bind_addr);

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
