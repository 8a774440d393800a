mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::{Method, StatusCode};

use tradefolio::clients::{HttpTokenValidator, RemoteAuthError, TokenValidator};
use tradefolio::config::AuthClientConfig;

use common::{
    auth_app, auth_state, market_app, market_state, register_and_login, send, spawn_auth_service, StubMarketSource,
};

fn client_config(base_url: String, separate_unavailable: bool) -> AuthClientConfig {
    AuthClientConfig {
        base_url,
        timeout_secs: 2,
        separate_unavailable,
    }
}

fn unreachable_auth_url() -> Result<String> {
    let port = portpicker::pick_unused_port().ok_or_else(|| anyhow::anyhow!("no free port"))?;
    Ok(format!("http://127.0.0.1:{}", port))
}

#[tokio::test]
async fn test_validator_resolves_user_from_auth_service() -> Result<()> {
    let state = auth_state();
    let base_url = spawn_auth_service(state.clone()).await?;
    let token = register_and_login(&auth_app(state.clone()), "ivan1").await?;
    let user = state.users.find_by_username("ivan1").await?;

    let validator = HttpTokenValidator::new(&client_config(base_url, false))?;
    let check = validator.validate(&token).await?;
    assert_eq!(check.user_id, user.id);

    match validator.validate("garbage").await {
        Err(RemoteAuthError::Rejected(status)) => assert_eq!(status.as_u16(), 401),
        other => panic!("expected rejection, got {:?}", other.map(|c| c.user_id)),
    }

    Ok(())
}

#[tokio::test]
async fn test_market_service_accepts_tokens_from_auth_service() -> Result<()> {
    let state = auth_state();
    let base_url = spawn_auth_service(state.clone()).await?;
    let token = register_and_login(&auth_app(state.clone()), "judy1").await?;
    let user = state.users.find_by_username("judy1").await?;

    let validator = Arc::new(HttpTokenValidator::new(&client_config(base_url, false))?);
    let market = market_app(market_state(validator, StubMarketSource::new()));

    let (status, body) = send(&market, Method::GET, "/api/v1/portfolio/secure", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!("Hello user {} !", user.id));

    let (status, body) = send(&market, Method::GET, "/api/v1/portfolio/secure", Some("forged"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let (status, body) = send(&market, Method::GET, "/api/v1/portfolio/secure", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing Bearer token");

    Ok(())
}

#[tokio::test]
async fn test_unreachable_auth_service_is_unauthorized_by_default() -> Result<()> {
    let validator = Arc::new(HttpTokenValidator::new(&client_config(unreachable_auth_url()?, false))?);
    let market = market_app(market_state(validator, StubMarketSource::new()));

    let (status, body) = send(&market, Method::GET, "/api/v1/portfolio/secure", Some("any-token"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    Ok(())
}

#[tokio::test]
async fn test_unreachable_auth_service_can_report_unavailable() -> Result<()> {
    let validator = Arc::new(HttpTokenValidator::new(&client_config(unreachable_auth_url()?, true))?);
    let state = market_state(validator, StubMarketSource::new()).separate_unavailable(true);
    let market = market_app(state);

    let (status, body) = send(&market, Method::GET, "/api/v1/portfolio/secure", Some("any-token"), None).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Authentication service unavailable");

    Ok(())
}

#[tokio::test]
async fn test_market_health_needs_no_token() -> Result<()> {
    let validator = Arc::new(HttpTokenValidator::new(&client_config(unreachable_auth_url()?, false))?);
    let market = market_app(market_state(validator, StubMarketSource::new()));

    let (status, body) = send(&market, Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    Ok(())
}
