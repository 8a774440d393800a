use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::MarketConfig;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("request to market data provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("market data provider returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Raw time series and symbol search from an external provider.
///
/// Bodies are returned untouched so the HTTP layer can pass them straight through.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_time_series(&self, function: &str, symbol: &str) -> Result<String, UpstreamError>;
    async fn search_symbol(&self, keyword: &str) -> Result<String, UpstreamError>;
}

/// Alpha Vantage `query` endpoint client.
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(config: &MarketConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<String, UpstreamError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok("{}".to_string());
        }
        Ok(body)
    }
}

#[async_trait]
impl MarketDataSource for AlphaVantageClient {
    async fn fetch_time_series(&self, function: &str, symbol: &str) -> Result<String, UpstreamError> {
        self.get(&[("function", function), ("symbol", symbol), ("outputsize", "full")])
            .await
    }

    async fn search_symbol(&self, keyword: &str) -> Result<String, UpstreamError> {
        self.get(&[("function", "SYMBOL_SEARCH"), ("keywords", keyword)]).await
    }
}
