use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::config::SessionConfig;

/// Thin HTTP wrapper that turns error bodies into `anyhow` errors
pub struct ApiClient {
    http: Client,
    session: SessionConfig,
}

impl ApiClient {
    pub fn new(session: SessionConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, session })
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}{}", self.session.auth_url.trim_end_matches('/'), path)
    }

    fn market_url(&self, path: &str) -> String {
        format!("{}{}", self.session.market_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, method: Method, url: String) -> anyhow::Result<RequestBuilder> {
        let token = self.session.require_token()?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    /// POST to the auth service without credentials
    pub async fn auth_post_public<B: Serialize>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        let response = self.http.post(self.auth_url(path)).json(body).send().await?;
        read_json(response).await
    }

    pub async fn auth_request(&self, method: Method, path: &str) -> anyhow::Result<Value> {
        let response = self.authorized(method, self.auth_url(path))?.send().await?;
        read_json(response).await
    }

    pub async fn market_get(&self, path: &str, query: &[(&str, &str)]) -> anyhow::Result<Value> {
        let response = self
            .authorized(Method::GET, self.market_url(path))?
            .query(query)
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn market_post<B: Serialize>(&self, path: &str, body: Option<&B>) -> anyhow::Result<Value> {
        let mut request = self.authorized(Method::POST, self.market_url(path))?;
        if let Some(body) = body {
            request = request.json(body);
        }
        read_json(request.send().await?).await
    }

    pub async fn market_delete(&self, path: &str) -> anyhow::Result<()> {
        let response = self.authorized(Method::DELETE, self.market_url(path))?.send().await?;
        read_json(response).await.map(|_| ())
    }
}

async fn read_json(response: Response) -> anyhow::Result<Value> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| if text.is_empty() { status.to_string() } else { text.clone() });
        anyhow::bail!("{} ({})", message, status.as_u16());
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    // Some endpoints answer plain text
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}
