use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::auth::extract_bearer_token;
use crate::clients::RemoteAuthError;
use crate::error::ApiError;
use crate::state::MarketState;

/// Caller identity established for one request by the auth service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: String,
}

impl Identity {
    pub const DEFAULT_ROLE: &'static str = "USER";
}

/// Validates the bearer token against the auth service on every request.
///
/// Nothing is cached: each request costs one round trip to `check-token`.
pub async fn remote_identity_middleware(
    State(state): State<MarketState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Missing Bearer token"))?;

    let check = state.validator.validate(token).await.map_err(|e| {
        match &e {
            RemoteAuthError::Rejected(_) => debug!("Token validation failed ({}): {}", e.kind(), e),
            _ => warn!("Token validation failed ({}): {}", e.kind(), e),
        }
        match e {
            RemoteAuthError::Unavailable(_) if state.separate_unavailable => {
                ApiError::service_unavailable("Authentication service unavailable")
            }
            _ => ApiError::unauthorized("Invalid token"),
        }
    })?;

    request.extensions_mut().insert(Identity {
        user_id: check.user_id,
        role: Identity::DEFAULT_ROLE.to_string(),
    });

    Ok(next.run(request).await)
}
