pub mod auth;
pub mod remote_identity;

pub use auth::{extract_bearer_token, jwt_auth_middleware, require_admin_middleware, AuthUser};
pub use remote_identity::{remote_identity_middleware, Identity};
