use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Asset, Investment, NewAsset, NewInvestment, NewUser, Portfolio, User};

/// Stored credentials and profiles (auth service)
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn list(&self) -> Result<Vec<User>, DatabaseError>;
    /// Fails with `Conflict` when username or email is taken
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError>;
    /// Persist every mutable column of `user`, matched by id
    async fn update(&self, user: &User) -> Result<User, DatabaseError>;
    /// Returns false when no user had that id
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Portfolio>, DatabaseError>;
    async fn insert(&self, user_id: i64) -> Result<Portfolio, DatabaseError>;
}

#[async_trait]
pub trait InvestmentRepository: Send + Sync {
    async fn list_by_portfolio(&self, portfolio_id: i64) -> Result<Vec<Investment>, DatabaseError>;
    async fn insert(&self, investment: NewInvestment) -> Result<Investment, DatabaseError>;
    /// Delete only when the investment belongs to `portfolio_id`; returns rows removed
    async fn delete_owned(&self, investment_id: i64, portfolio_id: i64) -> Result<u64, DatabaseError>;
}

#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Case-insensitive exact symbol match
    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Asset>, DatabaseError>;
    async fn insert(&self, asset: NewAsset) -> Result<Asset, DatabaseError>;
}
