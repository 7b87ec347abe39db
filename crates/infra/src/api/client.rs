//! API client with bearer auth and refresh-on-401
//!
//! Every outbound call goes through [`ApiClient::execute`], which attaches the
//! current access token, normalizes failures into [`ApiError`], and resolves
//! a single layer of 401 by refreshing the token pair and re-sending once.

use std::sync::Arc;
use std::time::Duration;

use productwhisper_domain::constants::{
    DEFAULT_API_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_REFRESH_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};
use productwhisper_domain::{ApiSettings, WhisperError};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::errors::{ApiError, ApiErrorCode};
use super::refresh::{HttpTokenRefresher, RefreshCoordinator, RefreshPhase, TokenRefresher};
use super::request::OutboundRequest;
use crate::credentials::{CredentialStore, MemoryCredentialStore};
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for API (e.g., "http://localhost:3000/api")
    pub base_url: String,
    /// Timeout for a single HTTP exchange
    pub timeout: Duration,
    /// Upper bound on one token refresh
    pub refresh_timeout: Duration,
    /// Transport attempts per request (5xx and connection failures only)
    pub max_attempts: usize,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            refresh_timeout: Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl From<&ApiSettings> for ApiClientConfig {
    fn from(settings: &ApiSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            timeout: settings.timeout(),
            refresh_timeout: settings.refresh_timeout(),
            max_attempts: settings.max_attempts,
        }
    }
}

/// Authenticated API client
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    coordinator: RefreshCoordinator,
}

impl ApiClient {
    /// Create a new API client backed by `store`.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be created
    pub fn new(
        config: ApiClientConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        Self::builder().config(config).credentials(store).build()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Shared credential store.
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn refresh_phase(&self) -> RefreshPhase {
        self.coordinator.phase()
    }

    /// Send `request` and decode the JSON response.
    ///
    /// A 401 on a request that is neither the refresh call nor already a
    /// retry triggers one coordinated refresh. On success the request is sent
    /// again with the new token; a failed refresh surfaces the original 401.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`ApiError`] of the last attempt
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        mut request: OutboundRequest,
    ) -> Result<T, ApiError> {
        loop {
            let token = self.store.access_token();

            match self.send_once(&request, token.as_deref()).await {
                Ok(value) => {
                    debug!(retried = request.is_retried(), "request succeeded");
                    return Ok(value);
                }
                Err(err) if err.status() == Some(401) && request.may_refresh() => {
                    debug!("access token rejected; refreshing");
                    if let Err(refresh_err) = self.coordinator.refresh(token.as_deref()).await {
                        warn!(error = %refresh_err, "refresh failed; giving up on request");
                        return Err(err);
                    }
                    request.mark_retried();
                }
                Err(err) => {
                    warn!(code = %err.code(), status = ?err.status(), error = %err, "request failed");
                    return Err(err);
                }
            }
        }
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute)
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(OutboundRequest::get(path)).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute)
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(OutboundRequest::post(path).json(body)?).await
    }

    /// Execute a PUT request with a JSON body
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute)
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(OutboundRequest::put(path).json(body)?).await
    }

    /// Execute a DELETE request
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute)
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(OutboundRequest::delete(path)).await
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        request: &OutboundRequest,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, request.path());

        let mut builder = self
            .http
            .request(request.method().clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = self.http.send(builder).await.map_err(ApiError::from_transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            let infra: InfraError = e.into();
            ApiError::from_transport(WhisperError::from(infra))
        })?;

        if !status.is_success() {
            return Err(ApiError::from_response(status, &String::from_utf8_lossy(&body)));
        }

        // 204/205 carry no body by definition; an empty 200 is treated the same
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT || body.is_empty()
        {
            return serde_json::from_value(Value::Null).map_err(|e| ApiError::invalid_body(status, e));
        }

        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_body(status, e))
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    store: Option<Arc<dyn CredentialStore>>,
    refresher: Option<Arc<dyn TokenRefresher>>,
}

impl ApiClientBuilder {
    /// Set configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the credential store (defaults to an empty in-memory store)
    pub fn credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the HTTP refresh call
    pub fn refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .build()
            .map_err(|e| {
                ApiError::new(ApiErrorCode::Unknown, format!("Failed to build HttpClient: {e}"))
                    .with_cause(e)
            })?;

        let store = self.store.unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));
        let refresher = self
            .refresher
            .unwrap_or_else(|| Arc::new(HttpTokenRefresher::new(http.clone(), &base_url)));
        let coordinator =
            RefreshCoordinator::new(Arc::clone(&store), refresher, config.refresh_timeout);

        Ok(ApiClient { http, base_url, store, coordinator })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::credentials::Credential;

    #[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
    struct TestResponse {
        message: String,
    }

    fn client_for(server: &MockServer, credential: Option<Credential>) -> ApiClient {
        let store = Arc::new(match credential {
            Some(credential) => MemoryCredentialStore::with_credential(credential),
            None => MemoryCredentialStore::new(),
        });
        let config = ApiClientConfig { base_url: server.uri(), ..Default::default() };
        ApiClient::new(config, store).unwrap()
    }

    #[tokio::test]
    async fn test_get_attaches_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products/7"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, Some(Credential::new("access-1", "refresh-1")));
        let result: TestResponse = client.get("/products/7").await.unwrap();

        assert_eq!(result, TestResponse { message: "ok".into() });
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_auth_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/popular"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["speakers"])))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, None);
        let result: Vec<String> = client.get("/search/popular").await.unwrap();
        assert_eq!(result, vec!["speakers".to_string()]);

        let requests = mock_server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_post_sends_json_body_and_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .and(query_param("page", "2"))
            .and(body_json(json!({ "query": "earbuds" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "created" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, None);
        let request =
            OutboundRequest::post("/search").json(&json!({ "query": "earbuds" })).unwrap().query("page", 2);
        let result: TestResponse = client.execute(request).await.unwrap();

        assert_eq!(result.message, "created");
    }

    #[tokio::test]
    async fn test_no_content_decodes_unit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/notifications/3"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, None);
        let result: Option<TestResponse> = client.delete("/notifications/3").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_not_found_is_normalized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "message": "Product not found" })),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, None);
        let err = client.get::<TestResponse>("/products/999").await.unwrap_err();

        assert_eq!(err.code(), ApiErrorCode::NotFound);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), "Product not found");
    }

    #[tokio::test]
    async fn test_slow_response_is_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/recommendations/trending"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = ApiClientConfig {
            base_url: mock_server.uri(),
            timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let client = ApiClient::new(config, Arc::new(MemoryCredentialStore::new())).unwrap();
        let err = client.get::<Vec<TestResponse>>("/recommendations/trending").await.unwrap_err();

        assert_eq!(err.code(), ApiErrorCode::Timeout);
        assert!(err.status().is_none());
        assert!(err.cause().is_some());
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_unknown() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, None);
        let err = client.get::<TestResponse>("/auth/me").await.unwrap_err();

        assert_eq!(err.code(), ApiErrorCode::Unknown);
        assert!(err.cause().is_some());
    }

    #[tokio::test]
    async fn test_unauthorized_refreshes_and_retries_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(json!({ "refreshToken": "refresh-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tokens": { "access": "fresh", "refresh": "refresh-2" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "me" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, Some(Credential::new("stale", "refresh-1")));
        let result: TestResponse = client.get("/auth/me").await.unwrap();

        assert_eq!(result.message, "me");
        assert_eq!(client.credentials().get(), Some(Credential::new("fresh", "refresh-2")));
        assert_eq!(client.refresh_phase(), RefreshPhase::Idle);
    }

    #[tokio::test]
    async fn test_refresh_endpoint_never_triggers_refresh() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, Some(Credential::new("a", "r")));
        let err = client
            .post::<_, Value>("/auth/refresh", &json!({ "refreshToken": "r" }))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ApiErrorCode::Unauthorized);
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
        // Credentials untouched: no refresh ran.
        assert_eq!(client.credentials().get(), Some(Credential::new("a", "r")));
    }

    #[tokio::test]
    async fn test_second_unauthorized_is_terminal() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/favorites"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tokens": { "access": "fresh", "refresh": "r2" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, Some(Credential::new("stale", "r1")));
        let err = client.get::<Value>("/favorites").await.unwrap_err();

        assert_eq!(err.code(), ApiErrorCode::Unauthorized);
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_credentials() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/notifications"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "message": "Invalid or expired refresh token" })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, Some(Credential::new("stale", "expired")));
        let err = client.get::<Value>("/notifications").await.unwrap_err();

        assert_eq!(err.code(), ApiErrorCode::Unauthorized);
        assert!(client.credentials().get().is_none());
    }

    #[tokio::test]
    async fn test_unauthenticated_401_without_refresh_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, None);
        let err = client.get::<Value>("/auth/me").await.unwrap_err();

        assert_eq!(err.code(), ApiErrorCode::Unauthorized);
        assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_builder_defaults_to_memory_store() {
        let client = ApiClient::builder().build().unwrap();

        assert!(client.credentials().get().is_none());
        assert_eq!(client.base_url(), DEFAULT_API_URL);
    }
}
