use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::state::AuthState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /auth/v1/login - Authenticate and receive a bearer token
///
/// Expected Input:
/// ```json
/// { "username": "alice", "password": "wonderland1" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "token": "eyJhbGciOiJIUzI1NiI..." }
/// ```
///
/// Unknown users and wrong passwords both answer 401.
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.credentials.authenticate(&payload.username, &payload.password).await?;
    let token = state.issuer.issue(&user.username)?;

    info!("User {} logged in", user.username);
    Ok(Json(LoginResponse { token }))
}
