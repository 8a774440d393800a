use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Asset, Investment, NewAsset, NewInvestment, NewUser, Portfolio, User};
use crate::database::repository::{AssetRepository, InvestmentRepository, PortfolioRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    portfolios: BTreeMap<i64, Portfolio>,
    investments: BTreeMap<i64, Investment>,
    assets: BTreeMap<i64, Asset>,
}

/// Process-local store used when no `DATABASE_URL` is configured, and by tests.
///
/// Ids are allocated from one shared sequence, so an id is unique across tables.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<RwLock<Tables>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(DatabaseError::Conflict("User already exists".to_string()));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict("Email already exists".to_string()));
        }

        let now = Utc::now();
        let saved = User {
            id: self.allocate_id(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            phone_number: user.phone_number,
            password_hash: user.password_hash,
            role: user.role.as_str().to_string(),
            date_of_birth: user.date_of_birth,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, user: &User) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.id != user.id && u.email == user.email) {
            return Err(DatabaseError::Conflict("Email already exists".to_string()));
        }
        match tables.users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(stored.clone())
            }
            None => Err(DatabaseError::NotFound(format!("User with id {} not found", user.id))),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.users.remove(&id).is_some())
    }
}

#[async_trait]
impl PortfolioRepository for MemoryRepository {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Portfolio>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.portfolios.values().find(|p| p.user_id == user_id).cloned())
    }

    async fn insert(&self, user_id: i64) -> Result<Portfolio, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.portfolios.values().any(|p| p.user_id == user_id) {
            return Err(DatabaseError::Conflict("Portfolio already exists".to_string()));
        }
        let portfolio = Portfolio {
            id: self.allocate_id(),
            user_id,
        };
        tables.portfolios.insert(portfolio.id, portfolio.clone());
        Ok(portfolio)
    }
}

#[async_trait]
impl InvestmentRepository for MemoryRepository {
    async fn list_by_portfolio(&self, portfolio_id: i64) -> Result<Vec<Investment>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .investments
            .values()
            .filter(|i| i.portfolio_id == portfolio_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, investment: NewInvestment) -> Result<Investment, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.portfolios.contains_key(&investment.portfolio_id) {
            return Err(DatabaseError::NotFound(format!(
                "Portfolio with id {} not found",
                investment.portfolio_id
            )));
        }
        let saved = Investment {
            id: self.allocate_id(),
            portfolio_id: investment.portfolio_id,
            asset_symbol: investment.asset_symbol,
            quantity: investment.quantity,
            buy_price: investment.buy_price,
            investment_date: investment.investment_date,
        };
        tables.investments.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn delete_owned(&self, investment_id: i64, portfolio_id: i64) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        let owned = matches!(
            tables.investments.get(&investment_id),
            Some(inv) if inv.portfolio_id == portfolio_id
        );
        if !owned {
            return Ok(0);
        }
        tables.investments.remove(&investment_id);
        Ok(1)
    }
}

#[async_trait]
impl AssetRepository for MemoryRepository {
    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Asset>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .assets
            .values()
            .find(|a| a.symbol.eq_ignore_ascii_case(symbol))
            .cloned())
    }

    async fn insert(&self, asset: NewAsset) -> Result<Asset, DatabaseError> {
        let mut tables = self.tables.write().await;
        let saved = Asset {
            id: self.allocate_id(),
            symbol: asset.symbol,
            name: asset.name,
            asset_type: asset.asset_type,
        };
        tables.assets.insert(saved.id, saved.clone());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Role;
    use rust_decimal::Decimal;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            full_name: None,
            phone_number: None,
            password_hash: "hash".to_string(),
            role: Role::User,
            date_of_birth: None,
        }
    }

    #[tokio::test]
    async fn user_uniqueness_is_enforced() {
        let repo = MemoryRepository::new();
        UserRepository::insert(&repo, new_user("alice", "alice@example.com")).await.unwrap();

        let dup_name = UserRepository::insert(&repo, new_user("alice", "other@example.com")).await;
        assert!(matches!(dup_name, Err(DatabaseError::Conflict(_))));

        let dup_email = UserRepository::insert(&repo, new_user("alice2", "alice@example.com")).await;
        assert!(matches!(dup_email, Err(DatabaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn delete_owned_only_touches_own_portfolio() {
        let repo = MemoryRepository::new();
        let mine = PortfolioRepository::insert(&repo, 1).await.unwrap();
        let theirs = PortfolioRepository::insert(&repo, 2).await.unwrap();

        let inv = InvestmentRepository::insert(
            &repo,
            NewInvestment {
                portfolio_id: theirs.id,
                asset_symbol: "AAPL".to_string(),
                quantity: Decimal::from(1),
                buy_price: Decimal::from(100),
                investment_date: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(repo.delete_owned(inv.id, mine.id).await.unwrap(), 0);
        assert_eq!(repo.list_by_portfolio(theirs.id).await.unwrap().len(), 1);
        assert_eq!(repo.delete_owned(inv.id, theirs.id).await.unwrap(), 1);
        assert!(repo.list_by_portfolio(theirs.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn investment_requires_existing_portfolio() {
        let repo = MemoryRepository::new();
        let result = InvestmentRepository::insert(
            &repo,
            NewInvestment {
                portfolio_id: 999,
                asset_symbol: "AAPL".to_string(),
                quantity: Decimal::from(1),
                buy_price: Decimal::from(1),
                investment_date: None,
            },
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn asset_lookup_ignores_case() {
        let repo = MemoryRepository::new();
        AssetRepository::insert(&repo, NewAsset::unknown("MSFT")).await.unwrap();
        assert!(repo.find_by_symbol("msft").await.unwrap().is_some());
        assert!(repo.find_by_symbol("MS").await.unwrap().is_none());
    }
}
