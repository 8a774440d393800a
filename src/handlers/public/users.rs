use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::services::{RegisterRequest, UserResponse};
use crate::state::AuthState;

/// POST /users/v1/register - Create a new account with role USER
///
/// Expected Input:
/// ```json
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "password": "wonderland1",
///   "fullName": "Alice Liddell",     // optional
///   "phoneNumber": "+4712345678",    // optional
///   "dateOfBirth": "1990-05-17"      // optional, YYYY-MM-DD
/// }
/// ```
///
/// Validation failures, including a taken username or email, answer 400.
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.register(payload).await?;
    Ok(Json(user))
}
