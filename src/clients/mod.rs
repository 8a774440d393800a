pub mod alpha_vantage;
pub mod auth_service;

pub use alpha_vantage::{AlphaVantageClient, MarketDataSource, UpstreamError};
pub use auth_service::{HttpTokenValidator, RemoteAuthError, TokenCheck, TokenValidator};
