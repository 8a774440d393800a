use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::database::DatabaseManager;
use crate::state::{AuthState, MarketState};

/// GET /health - auth service liveness, plus database reachability when one is configured
pub async fn auth_health(State(state): State<AuthState>) -> impl IntoResponse {
    health(state.database.as_ref()).await
}

/// GET /health - market-data service liveness
pub async fn market_health(State(state): State<MarketState>) -> impl IntoResponse {
    health(state.database.as_ref()).await
}

async fn health(database: Option<&DatabaseManager>) -> (StatusCode, Json<serde_json::Value>) {
    let now = chrono::Utc::now();

    let Some(db) = database else {
        return (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "database": "memory" })),
        );
    };

    match db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now, "database": "ok" })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "timestamp": now, "database": "unavailable" })),
            )
        }
    }
}
