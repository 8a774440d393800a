use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::ApiError;
use crate::services::UserError;
use crate::state::AuthState;

/// Authenticated user context resolved from a locally issued token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "ADMIN"
    }
}

/// JWT authentication middleware for the auth service's own protected routes
pub async fn jwt_auth_middleware(
    State(state): State<AuthState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Missing Bearer token"))?;

    let username = state.issuer.verify(token).map_err(|e| {
        debug!("Token rejected: {}", e);
        ApiError::unauthorized("Invalid token")
    })?;

    // A valid signature is not enough: the user may have been deleted since issue
    let user = state
        .users
        .find_by_username(&username)
        .await
        .map_err(|e| match e {
            UserError::NotFound(_) => ApiError::unauthorized("Invalid token"),
            other => other.into(),
        })?;

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        username: user.username,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Runs after `jwt_auth_middleware`; only lets ADMIN users through
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before role check"))?;

    if !auth_user.is_admin() {
        return Err(ApiError::forbidden("Admin role required"));
    }

    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer <token>` header; `None` when absent, malformed or empty
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer_token(&headers("Bearer ")), None);
        assert_eq!(extract_bearer_token(&headers("bearer abc")), None);
    }
}
