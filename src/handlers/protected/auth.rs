use axum::{Extension, Json};

use crate::clients::TokenCheck;
use crate::middleware::AuthUser;

/// POST /auth/v1/check-token - Resolve the caller's bearer token to a user id
///
/// This is the endpoint the market-data service calls for every request it
/// receives. The token is verified by `jwt_auth_middleware`; an invalid,
/// expired or foreign token never reaches this handler.
///
/// Expected Output (Success):
/// ```json
/// { "userId": 42 }
/// ```
pub async fn check_token(Extension(auth_user): Extension<AuthUser>) -> Json<TokenCheck> {
    Json(TokenCheck {
        user_id: auth_user.user_id,
    })
}
