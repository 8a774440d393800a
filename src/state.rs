use std::sync::Arc;

use crate::auth::{CredentialVerifier, TokenIssuer};
use crate::clients::TokenValidator;
use crate::database::{DatabaseManager, UserRepository};
use crate::services::{MarketDataService, PortfolioService, UserService};

/// Shared handles for the auth service router
#[derive(Clone)]
pub struct AuthState {
    pub issuer: Arc<TokenIssuer>,
    pub credentials: CredentialVerifier,
    pub users: UserService,
    pub database: Option<DatabaseManager>,
}

impl AuthState {
    pub fn new(issuer: TokenIssuer, users: Arc<dyn UserRepository>) -> Self {
        Self {
            issuer: Arc::new(issuer),
            credentials: CredentialVerifier::new(users.clone()),
            users: UserService::new(users),
            database: None,
        }
    }

    pub fn with_database(mut self, database: DatabaseManager) -> Self {
        self.database = Some(database);
        self
    }
}

/// Shared handles for the market-data service router
#[derive(Clone)]
pub struct MarketState {
    pub validator: Arc<dyn TokenValidator>,
    pub market: Arc<MarketDataService>,
    pub portfolios: Arc<PortfolioService>,
    /// Surface an unreachable auth service as 503 instead of 401
    pub separate_unavailable: bool,
    pub database: Option<DatabaseManager>,
}

impl MarketState {
    pub fn new(
        validator: Arc<dyn TokenValidator>,
        market: Arc<MarketDataService>,
        portfolios: Arc<PortfolioService>,
    ) -> Self {
        Self {
            validator,
            market,
            portfolios,
            separate_unavailable: false,
            database: None,
        }
    }

    pub fn separate_unavailable(mut self, enabled: bool) -> Self {
        self.separate_unavailable = enabled;
        self
    }

    pub fn with_database(mut self, database: DatabaseManager) -> Self {
        self.database = Some(database);
        self
    }
}
