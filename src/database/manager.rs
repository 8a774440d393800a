use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Map a Postgres unique-violation (SQLSTATE 23505) to `Conflict`, pass everything else through.
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                return DatabaseError::Conflict(format!("{} already exists", what));
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Which tables a service needs at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Auth,
    Market,
}

const AUTH_SCHEMA: &[&str] = &[r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        full_name TEXT,
        phone_number TEXT,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'USER',
        date_of_birth DATE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#];

const MARKET_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS portfolios (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS investments (
        id BIGSERIAL PRIMARY KEY,
        portfolio_id BIGINT NOT NULL REFERENCES portfolios(id) ON DELETE CASCADE,
        asset_symbol TEXT NOT NULL,
        quantity NUMERIC NOT NULL,
        buy_price NUMERIC NOT NULL,
        investment_date DATE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS assets (
        id BIGSERIAL PRIMARY KEY,
        symbol TEXT NOT NULL,
        name TEXT NOT NULL,
        asset_type TEXT NOT NULL
    )
    "#,
];

/// Owns the Postgres connection pool for one service process
#[derive(Clone)]
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Connect using the configured URL
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        Self::validate_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool ({} max connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables a service owns if they do not exist yet
    pub async fn ensure_schema(&self, schema: Schema) -> Result<(), DatabaseError> {
        let statements = match schema {
            Schema::Auth => AUTH_SCHEMA,
            Schema::Market => MARKET_SCHEMA,
        };
        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Schema {:?} is ready", schema);
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    fn validate_url(url: &str) -> Result<(), DatabaseError> {
        let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match parsed.scheme() {
            "postgres" | "postgresql" => Ok(()),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }
}
