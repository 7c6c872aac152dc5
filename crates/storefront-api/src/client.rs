//! # REST Client
//!
//! Thin wrapper over `reqwest` that knows the base URL, the timeout and
//! where the bearer token lives. Endpoint methods live in
//! [`crate::endpoints`] as further `impl ApiClient` blocks.
//!
//! ## Request Lifecycle
//! ```text
//! client.cart().await
//!      │
//!      ├── bearer()      TokenStore::load → drop if JWT expired
//!      ├── send          GET {base}/api/cart  Authorization: Bearer ...
//!      ├── 2xx           decode JSON body → Cart
//!      └── 4xx/5xx       ApiError::from_response(status, body)
//! ```
//!
//! No retries and no backoff: a failed request is reported as-is.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::token::{is_expired, TokenStore};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

// =============================================================================
// Configuration
// =============================================================================

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Backend origin, e.g. `https://shop.example`. Paths start with `/api`.
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Client
// =============================================================================

/// Backend client.
///
/// ## Usage
/// ```rust,ignore
/// let tokens = Arc::new(MemoryTokenStore::new());
/// let client = ApiClient::new(ApiConfig::new("http://localhost:8080"), tokens)?;
///
/// client.login("asha@example.in", "secret1").await?;
/// let cart = client.cart().await?;
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(ApiClient {
            http,
            base_url: config.base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// The usable bearer token. An expired JWT counts as no token.
    pub async fn bearer(&self) -> ApiResult<Option<String>> {
        match self.tokens.load().await? {
            Some(token) if is_expired(&token) => {
                warn!("Stored token has expired, continuing as guest");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Whether requests will carry a valid bearer token.
    pub async fn is_authenticated(&self) -> ApiResult<bool> {
        Ok(self.bearer().await?.is_some())
    }

    // =========================================================================
    // Request helpers
    // =========================================================================

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Starts a request with the bearer header attached when available.
    pub(crate) async fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        debug!(method = %method, path = %path, "API request");

        let builder = self.http.request(method, self.url(path));
        Ok(match self.bearer().await? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let builder = self.request(Method::GET, path).await?;
        self.send_json(builder).await
    }

    pub(crate) async fn get_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).await?.query(query);
        self.send_json(builder).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path).await?.json(body);
        self.send_json(builder).await
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path).await?.json(body);
        self.send_json(builder).await
    }

    /// Sends a request whose response body is ignored.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> ApiResult<()> {
        let response = builder.send().await?;
        check_status(response).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, path: &str) -> ApiResult<()> {
        let builder = self.request(Method::DELETE, path).await?;
        self.send_empty(builder).await
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = builder.send().await?;
        let response = check_status(response).await?;

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ApiError::from)
    }
}

/// Turns a non-success response into an `ApiError`.
async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = ApiError::from_response(status, &body);
    warn!(status = status.as_u16(), error = %err, "API request failed");
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBackend;
    use crate::token::{make_jwt, MemoryTokenStore};
    use chrono::Utc;

    #[test]
    fn test_base_url_is_trimmed() {
        let config = ApiConfig::new("http://localhost:8080/");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_expired_token_is_treated_as_guest() {
        let expired = make_jwt("asha@example.in", Utc::now().timestamp() - 60);
        let store = Arc::new(MemoryTokenStore::with_token(expired));
        let client = ApiClient::new(ApiConfig::new("http://127.0.0.1:9"), store).unwrap();

        assert!(!client.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let store = Arc::new(MemoryTokenStore::new());
        let config = ApiConfig::new("http://127.0.0.1:9").timeout(Duration::from_secs(2));
        let client = ApiClient::new(config, store).unwrap();

        let err = client.categories().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn test_bearer_header_is_sent() {
        let backend = MockBackend::start().await;

        let guest = backend.client(None);
        assert!(guest.me().await.unwrap_err().is_auth());

        let signed_in = backend.client(Some("tok-user"));
        assert_eq!(signed_in.me().await.unwrap().email, "asha@example.in");
    }
}
