//! REST client for the shuttle backend.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use orecart_api_types::LoginResponse;

use crate::config::ClientConfig;

pub mod resources;
pub mod token;

pub use crate::error::ApiError;
pub use resources::{AdaFilter, AlertFilter};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Self {
        Self::with_base_url(config.api_url.clone(), tokens)
    }

    pub fn with_base_url(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Exchange credentials for a session token and store it.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let request = self
            .request(Method::POST, "/auth/login")
            .await?
            .form(&[("username", username), ("password", password)]);
        let response: LoginResponse = self.fetch_json(request).await?;

        self.tokens.save(&response.access_token).await?;
        info!(%username, "logged in");

        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.tokens.clear().await?;
        Ok(())
    }

    /// Whether the stored token is still accepted. A rejected token is not cleared.
    pub async fn check_auth(&self) -> Result<bool> {
        if self.tokens.load().await?.is_none() {
            return Ok(false);
        }

        let request = self.request(Method::POST, "/auth/check").await?;
        match self.send(request).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_unauthorized() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Start a request against `path`, attaching the stored bearer token if there is one.
    pub(crate) async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %url, "api request");

        let mut request = self.http.request(method, url);
        if let Some(token) = self.tokens.load().await? {
            request = request.bearer_auth(token);
        }

        Ok(request)
    }

    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        Ok(response)
    }

    pub(crate) async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let text = self.send(request).await?.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// For endpoints whose response body carries nothing but an acknowledgement.
    pub(crate) async fn fetch_unit(&self, request: RequestBuilder) -> Result<()> {
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use std::net::SocketAddr;

    use axum::Router;
    use tokio::net::TcpListener;

    pub async fn serve(app: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        addr
    }
}
