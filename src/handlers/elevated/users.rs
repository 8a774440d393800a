use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::UserResponse;
use crate::state::AuthState;

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: String,
}

/// GET /users/v1/list and GET /users/admin/users - Every registered user
pub async fn list(State(state): State<AuthState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    Ok(Json(state.users.list().await?))
}

/// PUT /users/admin/users/:id/role?role=ADMIN - Change a user's role (USER or ADMIN)
pub async fn update_role(
    State(state): State<AuthState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<i64>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state.users.update_role(id, &query.role).await?;
    info!("Admin {} set role of user {} to {}", admin.username, id, updated.role);
    Ok(Json(updated))
}

/// DELETE /users/admin/users/:id - Remove a user
pub async fn delete(
    State(state): State<AuthState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.users.delete(id).await?;
    info!("Admin {} deleted user {}", admin.username, id);
    Ok(StatusCode::NO_CONTENT)
}
