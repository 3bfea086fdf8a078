use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::api::traits::ApiTransport;
use crate::auth::AuthTokens;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};

/// HTTP transport over the Homify REST API
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    tokens: Arc<RwLock<AuthTokens>>,
}

impl HttpTransport {
    /// Create a transport from configuration
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("homify-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens: Arc::new(RwLock::new(AuthTokens::default())),
        })
    }

    /// Handle to the token state shared with the session
    pub fn auth_handle(&self) -> Arc<RwLock<AuthTokens>> {
        Arc::clone(&self.tokens)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Bearer header value, when an access token is held
    fn auth_header(&self) -> Option<String> {
        let tokens = self.tokens.read().ok()?;
        tokens.access.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_header() {
            Some(auth) => request.header(reqwest::header::AUTHORIZATION, auth),
            None => request,
        }
    }

    /// Map the response to JSON, turning non-2xx statuses and unparseable
    /// bodies into typed errors
    async fn handle_json(response: reqwest::Response) -> ApiResult<serde_json::Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, body));
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ApiResult<serde_json::Value> {
        let url = self.url(path);
        debug!("GET {} ({} query params)", url, query.len());
        let request = self.authorize(self.client.get(&url).query(query));
        let response = request.send().await?;
        Self::handle_json(response).await
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> ApiResult<serde_json::Value> {
        let url = self.url(path);
        debug!("POST {}", url);
        let request = self.authorize(self.client.post(&url).json(&body));
        let response = request.send().await?;
        Self::handle_json(response).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let url = self.url(path);
        debug!("DELETE {}", url);
        let request = self.authorize(self.client.delete(&url));
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, body));
        }
        Ok(())
    }
}
