// Endpoints behind a bearer token: locally verified on the auth service,
// remotely verified on the market-data service
pub mod auth;
pub mod portfolio;
pub mod stock;
pub mod users;
