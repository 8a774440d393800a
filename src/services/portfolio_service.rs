use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::models::{Investment, NewAsset, NewInvestment, Portfolio};
use crate::database::repository::{AssetRepository, InvestmentRepository, PortfolioRepository};
use crate::services::market_data_service::{parse_date, MarketDataError, MarketDataService};

#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error("{0}")]
    Validation(String),
    #[error("Portfolio not found")]
    PortfolioNotFound,
    #[error("Investment {0} not found or not owned by user")]
    InvestmentNotFound(i64),
    #[error("No price for {symbol} on {date}")]
    NoPriceOnDate { symbol: String, date: String },
    #[error(transparent)]
    MarketData(#[from] MarketDataError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddInvestmentRequest {
    pub asset_symbol: String,
    pub quantity: Decimal,
    pub buy_price: Option<Decimal>,
    /// `YYYY-MM-DD`; used to look up the buy price when none is given
    pub investment_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentDto {
    pub id: i64,
    pub asset_symbol: String,
    pub quantity: Decimal,
    pub buy_price: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub gain_loss: Decimal,
    pub investment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub portfolio_id: i64,
    pub total_invested: Decimal,
    pub current_value: Decimal,
    pub gain_loss: Decimal,
    pub investments: Vec<InvestmentDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAnalytics {
    pub total_invested: Decimal,
    pub current_value: Decimal,
    pub gain_loss: Decimal,
    pub gain_loss_percent: Decimal,
}

impl PortfolioAnalytics {
    pub fn from_summary(summary: &PortfolioSummary) -> Self {
        let gain_loss_percent = if summary.total_invested.is_zero() {
            Decimal::ZERO
        } else {
            (summary.gain_loss * Decimal::ONE_HUNDRED / summary.total_invested).round_dp(2)
        };

        Self {
            total_invested: summary.total_invested,
            current_value: summary.current_value,
            gain_loss: summary.gain_loss,
            gain_loss_percent,
        }
    }
}

/// Portfolio bookkeeping and valuation against current market closes.
pub struct PortfolioService {
    portfolios: Arc<dyn PortfolioRepository>,
    investments: Arc<dyn InvestmentRepository>,
    assets: Arc<dyn AssetRepository>,
    market: Arc<MarketDataService>,
}

impl PortfolioService {
    pub fn new(
        portfolios: Arc<dyn PortfolioRepository>,
        investments: Arc<dyn InvestmentRepository>,
        assets: Arc<dyn AssetRepository>,
        market: Arc<MarketDataService>,
    ) -> Self {
        Self {
            portfolios,
            investments,
            assets,
            market,
        }
    }

    /// Returns the caller's portfolio, creating it on first use.
    pub async fn create(&self, user_id: i64) -> Result<Portfolio, PortfolioError> {
        if let Some(existing) = self.portfolios.find_by_user(user_id).await? {
            return Ok(existing);
        }

        match self.portfolios.insert(user_id).await {
            Ok(portfolio) => {
                info!("Created portfolio {} for user {}", portfolio.id, user_id);
                Ok(portfolio)
            }
            // Lost a race with a concurrent create for the same user
            Err(DatabaseError::Conflict(_)) => self
                .portfolios
                .find_by_user(user_id)
                .await?
                .ok_or(PortfolioError::PortfolioNotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn portfolio_of(&self, user_id: i64) -> Result<Portfolio, PortfolioError> {
        self.portfolios
            .find_by_user(user_id)
            .await?
            .ok_or(PortfolioError::PortfolioNotFound)
    }

    pub async fn add_investment(&self, user_id: i64, request: AddInvestmentRequest) -> Result<Investment, PortfolioError> {
        let symbol = request.asset_symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(PortfolioError::Validation("assetSymbol is required".to_string()));
        }
        if request.quantity <= Decimal::ZERO {
            return Err(PortfolioError::Validation("quantity must be greater than zero".to_string()));
        }
        if matches!(request.buy_price, Some(price) if price <= Decimal::ZERO) {
            return Err(PortfolioError::Validation("buyPrice must be greater than zero".to_string()));
        }
        let investment_date = match request.investment_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let date = parse_date(raw).map_err(|e| PortfolioError::Validation(e.to_string()))?;
                if date > Utc::now().date_naive() {
                    return Err(PortfolioError::Validation("investmentDate cannot be in the future".to_string()));
                }
                Some(date)
            }
        };

        let portfolio = self.portfolio_of(user_id).await?;

        let buy_price = match (request.buy_price, investment_date) {
            (Some(price), _) => price,
            (None, Some(date)) => self
                .market
                .close_on(&symbol, date)
                .await?
                .ok_or_else(|| PortfolioError::NoPriceOnDate {
                    symbol: symbol.clone(),
                    date: date.format("%Y-%m-%d").to_string(),
                })?,
            (None, None) => self.market.latest_close(&symbol).await?,
        };

        // Only symbols that actually end up invested in get an asset record
        if self.assets.find_by_symbol(&symbol).await?.is_none() {
            self.assets.insert(NewAsset::unknown(&symbol)).await?;
        }

        let saved = self
            .investments
            .insert(NewInvestment {
                portfolio_id: portfolio.id,
                asset_symbol: symbol,
                quantity: request.quantity,
                buy_price,
                investment_date,
            })
            .await?;

        info!(
            "Added investment {} ({} x {} @ {}) to portfolio {}",
            saved.id, saved.quantity, saved.asset_symbol, saved.buy_price, portfolio.id
        );
        Ok(saved)
    }

    pub async fn delete_investment(&self, user_id: i64, investment_id: i64) -> Result<(), PortfolioError> {
        let portfolio = self.portfolio_of(user_id).await?;

        let deleted = self.investments.delete_owned(investment_id, portfolio.id).await?;
        if deleted == 0 {
            return Err(PortfolioError::InvestmentNotFound(investment_id));
        }
        Ok(())
    }

    pub async fn summary(&self, user_id: i64) -> Result<PortfolioSummary, PortfolioError> {
        let portfolio = self.portfolio_of(user_id).await?;
        let investments = self.investments.list_by_portfolio(portfolio.id).await?;

        // One latest-close lookup per distinct symbol, run concurrently
        let symbols: BTreeSet<&str> = investments.iter().map(|i| i.asset_symbol.as_str()).collect();
        let closes = try_join_all(symbols.iter().map(|symbol| async move {
            let close = self.market.latest_close(symbol).await?;
            Ok::<_, MarketDataError>((symbol.to_string(), close))
        }))
        .await?;
        let prices: HashMap<String, Decimal> = closes.into_iter().collect();

        let mut total_invested = Decimal::ZERO;
        let mut current_value = Decimal::ZERO;
        let mut rows = Vec::with_capacity(investments.len());

        for inv in investments {
            let current_price = prices.get(&inv.asset_symbol).copied().unwrap_or_default();
            let value = current_price * inv.quantity;
            let invested = inv.invested();

            total_invested += invested;
            current_value += value;
            rows.push(InvestmentDto {
                id: inv.id,
                asset_symbol: inv.asset_symbol,
                quantity: inv.quantity,
                buy_price: inv.buy_price,
                current_price,
                current_value: value,
                gain_loss: value - invested,
                investment_date: inv.investment_date,
            });
        }

        Ok(PortfolioSummary {
            portfolio_id: portfolio.id,
            total_invested,
            current_value,
            gain_loss: current_value - total_invested,
            investments: rows,
        })
    }

    pub async fn analytics(&self, user_id: i64) -> Result<PortfolioAnalytics, PortfolioError> {
        let summary = self.summary(user_id).await?;
        Ok(PortfolioAnalytics::from_summary(&summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MarketDataSource, UpstreamError};
    use crate::database::MemoryRepository;

    #[test]
    fn analytics_percent_is_zero_without_investment() {
        let summary = PortfolioSummary {
            portfolio_id: 1,
            total_invested: Decimal::ZERO,
            current_value: Decimal::ZERO,
            gain_loss: Decimal::ZERO,
            investments: Vec::new(),
        };
        assert_eq!(PortfolioAnalytics::from_summary(&summary).gain_loss_percent, Decimal::ZERO);
    }

    #[test]
    fn analytics_percent_of_invested() {
        let summary = PortfolioSummary {
            portfolio_id: 1,
            total_invested: Decimal::new(150000, 2),
            current_value: Decimal::new(165000, 2),
            gain_loss: Decimal::new(15000, 2),
            investments: Vec::new(),
        };
        assert_eq!(
            PortfolioAnalytics::from_summary(&summary).gain_loss_percent,
            Decimal::new(1000, 2)
        );
    }

    #[test]
    fn request_accepts_numbers_or_strings() {
        let req: AddInvestmentRequest =
            serde_json::from_str(r#"{"assetSymbol": "aapl", "quantity": 10, "buyPrice": "150.00"}"#).unwrap();
        assert_eq!(req.quantity, Decimal::from(10));
        assert_eq!(req.buy_price, Some(Decimal::new(15000, 2)));
        assert!(req.investment_date.is_none());
    }

    struct OneDaySource;

    #[async_trait::async_trait]
    impl MarketDataSource for OneDaySource {
        async fn fetch_time_series(&self, _function: &str, _symbol: &str) -> Result<String, UpstreamError> {
            Ok(r#"{"Time Series (Daily)": {
                "2024-01-05": {"1. open": "10", "2. high": "10", "3. low": "10", "4. close": "10", "5. volume": "1"}
            }}"#
            .to_string())
        }

        async fn search_symbol(&self, _keyword: &str) -> Result<String, UpstreamError> {
            Ok("{}".to_string())
        }
    }

    async fn service_with_portfolio() -> (PortfolioService, Arc<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::new());
        let market = Arc::new(MarketDataService::new(
            Arc::new(OneDaySource),
            std::time::Duration::from_secs(600),
            100,
        ));
        let service = PortfolioService::new(repo.clone(), repo.clone(), repo.clone(), market);
        service.create(1).await.unwrap();
        (service, repo)
    }

    fn request(symbol: &str, date: Option<&str>) -> AddInvestmentRequest {
        AddInvestmentRequest {
            asset_symbol: symbol.to_string(),
            quantity: Decimal::ONE,
            buy_price: None,
            investment_date: date.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn rejected_investment_creates_no_asset() {
        let (service, repo) = service_with_portfolio().await;

        let err = service.add_investment(1, request("zzz", Some("2024-01-06"))).await.unwrap_err();
        assert!(matches!(err, PortfolioError::NoPriceOnDate { .. }));
        assert!(repo.find_by_symbol("ZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn accepted_investment_creates_unknown_asset() {
        let (service, repo) = service_with_portfolio().await;

        let saved = service.add_investment(1, request("zzz", Some("2024-01-05"))).await.unwrap();
        assert_eq!(saved.buy_price, Decimal::from(10));
        let asset = repo.find_by_symbol("zzz").await.unwrap().unwrap();
        assert_eq!(asset.symbol, "ZZZ");
    }
}
