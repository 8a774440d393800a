mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use axum::Router;

use common::{market_app, market_state, send, FixedValidator, StubMarketSource};

fn source() -> StubMarketSource {
    StubMarketSource::new().with_closes(
        "AAPL",
        &[("2024-01-04", "150.00"), ("2024-01-05", "151.00"), ("2024-01-08", "165.00")],
    )
}

fn app() -> Router {
    market_app(market_state(Arc::new(FixedValidator), source()))
}

#[tokio::test]
async fn test_daily_series_is_passed_through() -> Result<()> {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/stock/daily?symbol=AAPL", Some("user-1"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Meta Data"]["2. Symbol"], "AAPL");
    assert_eq!(body["Time Series (Daily)"]["2024-01-08"]["4. close"], "165.00");

    Ok(())
}

#[tokio::test]
async fn test_stock_routes_require_token() -> Result<()> {
    let app = app();

    let (status, _) = send(&app, Method::GET, "/api/v1/stock/daily?symbol=AAPL", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, Method::GET, "/api/v1/stock/daily?symbol=AAPL", Some("bogus"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_repeated_lookups_hit_the_cache() -> Result<()> {
    let source = Arc::new(source());
    let market = Arc::new(tradefolio::services::MarketDataService::new(
        source.clone(),
        std::time::Duration::from_secs(600),
        100,
    ));

    market.daily("AAPL").await?;
    market.daily("aapl").await?;
    market.latest_close("AAPL").await?;
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    // Error bodies are never cached
    assert!(market.daily("NOPE").await.is_ok());
    assert!(market.daily("NOPE").await.is_ok());
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);

    Ok(())
}

#[tokio::test]
async fn test_daily_by_date() -> Result<()> {
    let app = app();

    let (status, bar) = send(
        &app,
        Method::GET,
        "/api/v1/stock/daily/by-date?symbol=aapl&date=2024-01-05",
        Some("user-1"),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bar["symbol"], "AAPL");
    assert_eq!(bar["date"], "2024-01-05");
    assert_eq!(bar["volume"], 1000);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/stock/daily/by-date?symbol=AAPL&date=2024-01-06",
        Some("user-1"),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/v1/stock/daily/by-date?symbol=AAPL&date=January",
        Some("user-1"),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_percentage_change() -> Result<()> {
    let app = app();

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/stock/percentage-change?symbol=AAPL&fromDate=2024-01-04&toDate=2024-01-08",
        Some("user-1"),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "AAPL");
    assert_eq!(body["percentageChange"], "10.00%");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/stock/percentage-change?symbol=AAPL&fromDate=2024-01-04&toDate=2024-01-06",
        Some("user-1"),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Could not calculate percentage change. Check symbol or date range."
    );

    Ok(())
}

#[tokio::test]
async fn test_search_forwards_keyword() -> Result<()> {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/stock/search?keyword=tesla", Some("user-1"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bestMatches"][0]["1. symbol"], "TESLA");

    Ok(())
}
