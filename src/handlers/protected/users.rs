use axum::{extract::State, Extension, Json};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::{UpdateProfileRequest, UserResponse};
use crate::state::AuthState;

/// GET /users/me - Profile of the authenticated user
pub async fn me_get(
    State(state): State<AuthState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(state.users.me(auth_user.user_id).await?))
}

/// PUT /users/me - Update email, phone number and date of birth
///
/// Expected Input:
/// ```json
/// { "email": "new@example.com", "phoneNumber": null, "dateOfBirth": "1990-05-17" }
/// ```
///
/// An omitted `dateOfBirth` keeps the stored one.
pub async fn me_put(
    State(state): State<AuthState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(state.users.update_me(auth_user.user_id, payload).await?))
}
