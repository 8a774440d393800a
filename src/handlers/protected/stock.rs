use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::services::{PercentageChange, StockData};
use crate::state::MarketState;

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
pub struct ByDateQuery {
    pub symbol: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeQuery {
    pub symbol: String,
    pub from_date: String,
    pub to_date: String,
}

/// Upstream JSON is forwarded byte for byte
fn raw_json(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

/// GET /api/v1/stock/daily?symbol=AAPL
pub async fn daily(
    State(state): State<MarketState>,
    Query(query): Query<SymbolQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(raw_json(state.market.daily(&query.symbol).await?))
}

/// GET /api/v1/stock/weekly?symbol=AAPL
pub async fn weekly(
    State(state): State<MarketState>,
    Query(query): Query<SymbolQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(raw_json(state.market.weekly(&query.symbol).await?))
}

/// GET /api/v1/stock/monthly?symbol=AAPL
pub async fn monthly(
    State(state): State<MarketState>,
    Query(query): Query<SymbolQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(raw_json(state.market.monthly(&query.symbol).await?))
}

/// GET /api/v1/stock/search?keyword=apple
pub async fn search(
    State(state): State<MarketState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(raw_json(state.market.search(&query.keyword).await?))
}

/// GET /api/v1/stock/daily/by-date?symbol=AAPL&date=2024-01-05
///
/// 404 when the provider has no bar for that day (weekends, holidays).
pub async fn daily_by_date(
    State(state): State<MarketState>,
    Query(query): Query<ByDateQuery>,
) -> Result<Json<StockData>, ApiError> {
    Ok(Json(state.market.daily_by_date(&query.symbol, &query.date).await?))
}

/// GET /api/v1/stock/percentage-change?symbol=AAPL&fromDate=2024-01-04&toDate=2024-01-08
///
/// Expected Output (Success):
/// ```json
/// { "symbol": "AAPL", "percentageChange": "10.00%" }
/// ```
pub async fn percentage_change(
    State(state): State<MarketState>,
    Query(query): Query<ChangeQuery>,
) -> Result<Json<PercentageChange>, ApiError> {
    let change = state
        .market
        .percentage_change(&query.symbol, &query.from_date, &query.to_date)
        .await?;
    Ok(Json(change))
}
