use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::Identity;
use crate::services::{AddInvestmentRequest, PortfolioAnalytics, PortfolioSummary};
use crate::state::MarketState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioCreated {
    pub portfolio_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentCreated {
    pub investment_id: i64,
}

/// GET /api/v1/portfolio/secure - Echo the identity the filter resolved
pub async fn secure(Extension(identity): Extension<Identity>) -> String {
    format!("Hello user {} !", identity.user_id)
}

/// POST /api/v1/portfolio/create - Create the caller's portfolio (idempotent)
pub async fn create(
    State(state): State<MarketState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<PortfolioCreated>, ApiError> {
    let portfolio = state.portfolios.create(identity.user_id).await?;
    Ok(Json(PortfolioCreated {
        portfolio_id: portfolio.id,
    }))
}

/// GET /api/v1/portfolio/summary - Per-investment valuation against latest closes
pub async fn summary(
    State(state): State<MarketState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<PortfolioSummary>, ApiError> {
    Ok(Json(state.portfolios.summary(identity.user_id).await?))
}

/// GET /api/v1/portfolio/analytics - Totals plus gain/loss percentage
pub async fn analytics(
    State(state): State<MarketState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<PortfolioAnalytics>, ApiError> {
    Ok(Json(state.portfolios.analytics(identity.user_id).await?))
}

/// POST /api/v1/portfolio/investment - Record a purchase
///
/// Expected Input:
/// ```json
/// {
///   "assetSymbol": "AAPL",
///   "quantity": 10,
///   "buyPrice": "150.00",          // optional
///   "investmentDate": "2024-01-05" // optional, used when buyPrice is absent
/// }
/// ```
///
/// Without `buyPrice` the close on `investmentDate` is used, or the latest
/// close when no date is given either.
pub async fn add_investment(
    State(state): State<MarketState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<AddInvestmentRequest>,
) -> Result<Json<InvestmentCreated>, ApiError> {
    let investment = state.portfolios.add_investment(identity.user_id, payload).await?;
    Ok(Json(InvestmentCreated {
        investment_id: investment.id,
    }))
}

/// DELETE /api/v1/portfolio/investment/:id - Remove one of the caller's investments
pub async fn delete_investment(
    State(state): State<MarketState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.portfolios.delete_investment(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
