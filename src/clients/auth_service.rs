use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::AuthClientConfig;

/// Body of a successful `check-token` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCheck {
    pub user_id: i64,
}

/// Why a remote validation failed. Callers usually collapse all of these into a 401.
#[derive(Debug, thiserror::Error)]
pub enum RemoteAuthError {
    #[error("auth service rejected token with status {0}")]
    Rejected(StatusCode),
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
    #[error("auth service returned malformed response: {0}")]
    MalformedResponse(String),
}

impl RemoteAuthError {
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteAuthError::Rejected(_) => "rejected",
            RemoteAuthError::Unavailable(_) => "unavailable",
            RemoteAuthError::MalformedResponse(_) => "malformed_response",
        }
    }
}

#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<TokenCheck, RemoteAuthError>;
}

/// Asks the auth service whether a bearer token is valid.
#[derive(Clone)]
pub struct HttpTokenValidator {
    client: Client,
    check_url: String,
}

impl HttpTokenValidator {
    pub fn new(config: &AuthClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            check_url: format!("{}/auth/v1/check-token", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn check_url(&self) -> &str {
        &self.check_url
    }
}

#[async_trait]
impl TokenValidator for HttpTokenValidator {
    async fn validate(&self, token: &str) -> Result<TokenCheck, RemoteAuthError> {
        let response = self
            .client
            .post(&self.check_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RemoteAuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        debug!("Token check response: {}", status);
        if !status.is_success() {
            return Err(RemoteAuthError::Rejected(status));
        }

        response
            .json::<TokenCheck>()
            .await
            .map_err(|e| RemoteAuthError::MalformedResponse(e.to_string()))
    }
}
