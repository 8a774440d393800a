use axum::{
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, remote_identity_middleware, require_admin_middleware};
use crate::state::{AuthState, MarketState};

/// Router for the auth service
pub fn auth_router(state: AuthState, security: &SecurityConfig) -> Router {
    let admin = Router::new()
        .route("/users/v1/list", get(elevated::users::list))
        .route("/users/admin/users", get(elevated::users::list))
        .route("/users/admin/users/:id/role", put(elevated::users::update_role))
        .route("/users/admin/users/:id", delete(elevated::users::delete))
        .route_layer(from_fn(require_admin_middleware));

    let authenticated = Router::new()
        .route("/auth/v1/check-token", post(protected::auth::check_token))
        .route("/users/me", get(protected::users::me_get).put(protected::users::me_put))
        .merge(admin)
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        // Public
        .route("/health", get(public::auth_health))
        .route("/auth/v1/login", post(public::login))
        .route("/users/v1/register", post(public::register))
        // Bearer token required
        .merge(authenticated)
        // Global middleware
        .layer(cors_layer(security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router for the market-data service
pub fn market_router(state: MarketState, security: &SecurityConfig) -> Router {
    Router::new()
        .merge(stock_routes())
        .merge(portfolio_routes())
        .route_layer(from_fn_with_state(state.clone(), remote_identity_middleware))
        // Public, registered after the identity layer so it stays open
        .route("/health", get(public::market_health))
        // Global middleware
        .layer(cors_layer(security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn stock_routes() -> Router<MarketState> {
    use protected::stock;

    Router::new()
        .route("/api/v1/stock/daily", get(stock::daily))
        .route("/api/v1/stock/weekly", get(stock::weekly))
        .route("/api/v1/stock/monthly", get(stock::monthly))
        .route("/api/v1/stock/search", get(stock::search))
        .route("/api/v1/stock/daily/by-date", get(stock::daily_by_date))
        .route("/api/v1/stock/percentage-change", get(stock::percentage_change))
}

fn portfolio_routes() -> Router<MarketState> {
    use protected::portfolio;

    Router::new()
        .route("/api/v1/portfolio/secure", get(portfolio::secure))
        .route("/api/v1/portfolio/create", post(portfolio::create))
        .route("/api/v1/portfolio/summary", get(portfolio::summary))
        .route("/api/v1/portfolio/analytics", get(portfolio::analytics))
        .route("/api/v1/portfolio/investment", post(portfolio::add_investment))
        .route("/api/v1/portfolio/investment/:id", delete(portfolio::delete_investment))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
