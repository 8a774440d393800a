use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{Asset, Investment, NewAsset, NewInvestment, NewUser, Portfolio, User};
use crate::database::repository::{AssetRepository, InvestmentRepository, PortfolioRepository, UserRepository};

const USER_COLUMNS: &str = "id, username, email, full_name, phone_number, password_hash, role, \
                            date_of_birth, created_at, updated_at";

/// Repository implementations backed by a Postgres pool
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        let query = format!(
            "INSERT INTO users (username, email, full_name, phone_number, password_hash, role, date_of_birth)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(&user.phone_number)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.date_of_birth)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "User"))
    }

    async fn update(&self, user: &User) -> Result<User, DatabaseError> {
        let query = format!(
            "UPDATE users
             SET email = $2, full_name = $3, phone_number = $4, password_hash = $5,
                 role = $6, date_of_birth = $7, updated_at = $8
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(&user.phone_number)
            .bind(&user.password_hash)
            .bind(&user.role)
            .bind(user.date_of_birth)
            .bind(user.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "Email"))?
            .ok_or_else(|| DatabaseError::NotFound(format!("User with id {} not found", user.id)))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PortfolioRepository for PgRepository {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Portfolio>, DatabaseError> {
        let portfolio = sqlx::query_as::<_, Portfolio>("SELECT id, user_id FROM portfolios WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(portfolio)
    }

    async fn insert(&self, user_id: i64) -> Result<Portfolio, DatabaseError> {
        sqlx::query_as::<_, Portfolio>("INSERT INTO portfolios (user_id) VALUES ($1) RETURNING id, user_id")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "Portfolio"))
    }
}

#[async_trait]
impl InvestmentRepository for PgRepository {
    async fn list_by_portfolio(&self, portfolio_id: i64) -> Result<Vec<Investment>, DatabaseError> {
        let investments = sqlx::query_as::<_, Investment>(
            "SELECT id, portfolio_id, asset_symbol, quantity, buy_price, investment_date
             FROM investments
             WHERE portfolio_id = $1
             ORDER BY id",
        )
        .bind(portfolio_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(investments)
    }

    async fn insert(&self, investment: NewInvestment) -> Result<Investment, DatabaseError> {
        let saved = sqlx::query_as::<_, Investment>(
            "INSERT INTO investments (portfolio_id, asset_symbol, quantity, buy_price, investment_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, portfolio_id, asset_symbol, quantity, buy_price, investment_date",
        )
        .bind(investment.portfolio_id)
        .bind(&investment.asset_symbol)
        .bind(investment.quantity)
        .bind(investment.buy_price)
        .bind(investment.investment_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn delete_owned(&self, investment_id: i64, portfolio_id: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM investments WHERE id = $1 AND portfolio_id = $2")
            .bind(investment_id)
            .bind(portfolio_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl AssetRepository for PgRepository {
    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Asset>, DatabaseError> {
        let asset = sqlx::query_as::<_, Asset>(
            "SELECT id, symbol, name, asset_type FROM assets WHERE upper(symbol) = upper($1) LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;
        Ok(asset)
    }

    async fn insert(&self, asset: NewAsset) -> Result<Asset, DatabaseError> {
        let saved = sqlx::query_as::<_, Asset>(
            "INSERT INTO assets (symbol, name, asset_type) VALUES ($1, $2, $3)
             RETURNING id, symbol, name, asset_type",
        )
        .bind(&asset.symbol)
        .bind(&asset.name)
        .bind(&asset.asset_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }
}
