// Endpoints that do not require authentication
pub mod auth;
pub mod health;
pub mod users;

pub use auth::login;
pub use health::{auth_health, market_health};
pub use users::register;
