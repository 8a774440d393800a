#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tradefolio::auth::TokenIssuer;
use tradefolio::clients::{MarketDataSource, RemoteAuthError, TokenCheck, TokenValidator, UpstreamError};
use tradefolio::config::SecurityConfig;
use tradefolio::database::MemoryRepository;
use tradefolio::routes::{auth_router, market_router};
use tradefolio::services::{MarketDataService, PortfolioService};
use tradefolio::state::{AuthState, MarketState};

pub fn security() -> SecurityConfig {
    SecurityConfig {
        enable_cors: false,
        cors_origins: Vec::new(),
        jwt_expiry_minutes: 60,
    }
}

/// Auth service state on an in-memory user store
pub fn auth_state() -> AuthState {
    AuthState::new(TokenIssuer::generate(60), Arc::new(MemoryRepository::new()))
}

pub fn auth_app(state: AuthState) -> Router {
    auth_router(state, &security())
}

/// Serve the auth router on a free local port; returns its base URL
pub async fn spawn_auth_service(state: AuthState) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let app = auth_app(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

/// Daily series keyed by symbol, built from `(date, close)` pairs
#[derive(Default)]
pub struct StubMarketSource {
    series: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl StubMarketSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_closes(mut self, symbol: &str, closes: &[(&str, &str)]) -> Self {
        let bars: serde_json::Map<String, Value> = closes
            .iter()
            .map(|(date, close)| {
                (
                    date.to_string(),
                    json!({
                        "1. open": close,
                        "2. high": close,
                        "3. low": close,
                        "4. close": close,
                        "5. volume": "1000"
                    }),
                )
            })
            .collect();
        let body = json!({
            "Meta Data": { "2. Symbol": symbol },
            "Time Series (Daily)": bars
        });
        self.series.insert(symbol.to_uppercase(), body.to_string());
        self
    }
}

#[async_trait]
impl MarketDataSource for StubMarketSource {
    async fn fetch_time_series(&self, _function: &str, symbol: &str) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .series
            .get(&symbol.to_uppercase())
            .cloned()
            .unwrap_or_else(|| r#"{"Error Message": "Invalid API call"}"#.to_string()))
    }

    async fn search_symbol(&self, keyword: &str) -> Result<String, UpstreamError> {
        Ok(json!({ "bestMatches": [{ "1. symbol": keyword.to_uppercase() }] }).to_string())
    }
}

/// Accepts tokens of the form `user-<id>`, rejects everything else
pub struct FixedValidator;

#[async_trait]
impl TokenValidator for FixedValidator {
    async fn validate(&self, token: &str) -> Result<TokenCheck, RemoteAuthError> {
        token
            .strip_prefix("user-")
            .and_then(|id| id.parse().ok())
            .map(|user_id| TokenCheck { user_id })
            .ok_or(RemoteAuthError::Rejected(reqwest::StatusCode::UNAUTHORIZED))
    }
}

pub fn market_state(validator: Arc<dyn TokenValidator>, source: StubMarketSource) -> MarketState {
    let market = Arc::new(MarketDataService::new(Arc::new(source), Duration::from_secs(600), 100));
    let repo = Arc::new(MemoryRepository::new());
    let portfolios = PortfolioService::new(repo.clone(), repo.clone(), repo, market.clone());
    MarketState::new(validator, market, Arc::new(portfolios))
}

pub fn market_app(state: MarketState) -> Router {
    market_router(state, &security())
}

/// Run one request through a router in-process
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    Ok((status, value))
}

pub fn register_body(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{}@example.com", username),
        "password": "password123"
    })
}

/// Register then log in; returns the bearer token
pub async fn register_and_login(app: &Router, username: &str) -> Result<String> {
    let (status, _) = send(app, Method::POST, "/users/v1/register", None, Some(register_body(username))).await?;
    anyhow::ensure!(status == StatusCode::OK, "register failed with {}", status);

    let (status, body) = send(
        app,
        Method::POST,
        "/auth/v1/login",
        None,
        Some(json!({ "username": username, "password": "password123" })),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::OK, "login failed with {}", status);
    body["token"]
        .as_str()
        .map(str::to_string)
        .context("login response has no token")
}
