//! Typed ProductWhisper endpoints
//!
//! [`ProductWhisperClient`] maps each domain operation onto the request
//! pipeline. Read-style calls honor the injected [`FallbackMode`]; auth and
//! notification mutations always surface their errors.

use std::sync::Arc;

use chrono::Utc;
use productwhisper_domain::constants::{
    AUTH_LOGIN_PATH, AUTH_LOGOUT_PATH, AUTH_ME_PATH, AUTH_PASSWORD_PATH, AUTH_PROFILE_PATH,
    AUTH_REGISTER_PATH, NOTIFICATIONS_MARK_ALL_READ_PATH, NOTIFICATIONS_PATH,
    NOTIFICATIONS_UNREAD_COUNT_PATH, PRODUCTS_PATH, SEARCH_FAVORITES_PATH, SEARCH_PATH,
    SEARCH_POPULAR_PATH, SEARCH_RECENT_PATH, TRENDING_PATH, TRENDS_ALL_PATH,
};
use productwhisper_domain::{
    AuthResponse, ClientConfig, CountResponse, FallbackMode, LoginRequest, MessageResponse,
    Notification, NotificationEnvelope, NotificationList, NotificationQuery, PasswordChange,
    Product, ProfileUpdate, RegisterRequest, SearchFilters, SearchRequest, SearchResult,
    StorageBackend, SuccessResponse, TrendAnalysis, TrendPeriod, User,
};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::client::{ApiClient, ApiClientConfig};
use super::errors::ApiError;
use super::mock_data;
use super::request::OutboundRequest;
use crate::credentials::{Credential, CredentialStore, KeyringCredentialStore, MemoryCredentialStore};

/// High-level ProductWhisper client
pub struct ProductWhisperClient {
    api: ApiClient,
    fallback: FallbackMode,
}

impl ProductWhisperClient {
    pub fn new(api: ApiClient, fallback: FallbackMode) -> Self {
        Self { api, fallback }
    }

    /// Build a client from loaded configuration.
    ///
    /// Picks the credential store from `config.storage` and the fallback
    /// policy from [`ClientConfig::fallback_mode`].
    ///
    /// # Errors
    /// Returns an [`ApiError`] if the HTTP client cannot be created.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let store: Arc<dyn CredentialStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryCredentialStore::new()),
            StorageBackend::Keyring => {
                Arc::new(KeyringCredentialStore::open(config.storage.service_name.clone()))
            }
        };

        let api = ApiClient::new(ApiClientConfig::from(&config.api), store)?;
        let fallback = config.fallback_mode();
        debug!(?fallback, base_url = api.base_url(), "ProductWhisper client ready");

        Ok(Self::new(api, fallback))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn fallback_mode(&self) -> FallbackMode {
        self.fallback
    }

    /// Whether a token pair is currently stored.
    pub fn is_authenticated(&self) -> bool {
        self.api.credentials().get().is_some()
    }

    fn with_fallback<T>(
        &self,
        operation: &'static str,
        result: Result<T, ApiError>,
        mock: impl FnOnce() -> T,
    ) -> Result<T, ApiError> {
        match (result, self.fallback) {
            (Ok(value), _) => Ok(value),
            (Err(err), FallbackMode::MockData) => {
                warn!(operation, code = %err.code(), error = %err, "using mock data after API error");
                Ok(mock())
            }
            (Err(err), FallbackMode::Propagate) => Err(err),
        }
    }

    fn store_tokens(&self, response: AuthResponse) -> User {
        self.api.credentials().set(Credential::from(response.tokens));
        response.user
    }

    // Auth

    /// Create an account and store the issued tokens.
    ///
    /// # Errors
    /// Returns the API error; registration never falls back.
    #[instrument(skip(self, email, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let body = RegisterRequest { username, email, password };
        let response: AuthResponse = self.api.post(AUTH_REGISTER_PATH, &body).await?;
        info!(user_id = response.user.id, "registered");
        Ok(self.store_tokens(response))
    }

    /// Sign in and store the issued tokens.
    ///
    /// # Errors
    /// Returns the API error; login never falls back.
    #[instrument(skip(self, email, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let response: AuthResponse =
            self.api.post(AUTH_LOGIN_PATH, &LoginRequest { email, password }).await?;
        info!(user_id = response.user.id, "logged in");
        Ok(self.store_tokens(response))
    }

    /// Best-effort server logout. Local credentials are cleared regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(err) = self.api.execute::<Value>(OutboundRequest::post(AUTH_LOGOUT_PATH)).await {
            debug!(error = %err, "logout endpoint failed; clearing credentials anyway");
        }
        self.api.credentials().clear();
        info!("logged out");
    }

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let result = self.api.get(AUTH_ME_PATH).await;
        self.with_fallback("current_user", result, || mock_data::user(Utc::now()))
    }

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let result = self.api.put(AUTH_PROFILE_PATH, update).await;
        self.with_fallback("update_profile", result, || {
            mock_data::updated_user(update, Utc::now())
        })
    }

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    #[instrument(skip_all)]
    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<SuccessResponse, ApiError> {
        let body = PasswordChange { current_password, new_password };
        let result = self.api.put(AUTH_PASSWORD_PATH, &body).await;
        self.with_fallback("update_password", result, || SuccessResponse::OK)
    }

    // Search

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    #[instrument(skip(self, filters))]
    pub async fn search_products(
        &self,
        query: &str,
        filters: Option<&SearchFilters>,
    ) -> Result<SearchResult, ApiError> {
        let result = self.api.post(SEARCH_PATH, &SearchRequest { query, filters }).await;
        self.with_fallback("search_products", result, || mock_data::search_results(query))
    }

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    pub async fn recent_searches(&self) -> Result<Vec<String>, ApiError> {
        let result = self.api.get(SEARCH_RECENT_PATH).await;
        self.with_fallback("recent_searches", result, mock_data::recent_searches)
    }

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    pub async fn popular_searches(&self) -> Result<Vec<String>, ApiError> {
        let result = self.api.get(SEARCH_POPULAR_PATH).await;
        self.with_fallback("popular_searches", result, mock_data::popular_searches)
    }

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    pub async fn favorites(&self) -> Result<Vec<Product>, ApiError> {
        let result = self.api.get(SEARCH_FAVORITES_PATH).await;
        self.with_fallback("favorites", result, mock_data::favorites)
    }

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    #[instrument(skip(self))]
    pub async fn add_favorite(&self, product_id: i64) -> Result<SuccessResponse, ApiError> {
        let path = format!("{SEARCH_FAVORITES_PATH}/{product_id}");
        let result = self.api.execute(OutboundRequest::post(path)).await;
        self.with_fallback("add_favorite", result, || SuccessResponse::OK)
    }

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    #[instrument(skip(self))]
    pub async fn remove_favorite(&self, product_id: i64) -> Result<SuccessResponse, ApiError> {
        let path = format!("{SEARCH_FAVORITES_PATH}/{product_id}");
        let result = self.api.delete(&path).await;
        self.with_fallback("remove_favorite", result, || SuccessResponse::OK)
    }

    // Catalog

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    #[instrument(skip(self))]
    pub async fn product_details(&self, product_id: i64) -> Result<Product, ApiError> {
        let result = self.api.get(&format!("{PRODUCTS_PATH}/{product_id}")).await;
        self.with_fallback("product_details", result, || mock_data::product(product_id))
    }

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    #[instrument(skip(self))]
    pub async fn trending_products(&self, limit: u32) -> Result<Vec<Product>, ApiError> {
        let request = OutboundRequest::get(TRENDING_PATH).query("limit", limit);
        let result = self.api.execute(request).await;
        self.with_fallback("trending_products", result, || mock_data::trending_products(limit))
    }

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    #[instrument(skip(self))]
    pub async fn trend_analysis(
        &self,
        product_id: i64,
        period: TrendPeriod,
    ) -> Result<TrendAnalysis, ApiError> {
        let request = OutboundRequest::get(format!("{TRENDS_ALL_PATH}/{product_id}"))
            .query("period", period);
        let result = self.api.execute(request).await;
        self.with_fallback("trend_analysis", result, || {
            mock_data::trend_analysis(product_id, period, Utc::now().date_naive())
        })
    }

    // Notifications

    /// # Errors
    /// Returns the API error unless mock fallback is enabled.
    #[instrument(skip(self))]
    pub async fn notifications(
        &self,
        query: &NotificationQuery,
    ) -> Result<Vec<Notification>, ApiError> {
        let request = query
            .to_query()
            .into_iter()
            .fold(OutboundRequest::get(NOTIFICATIONS_PATH), |request, (key, value)| {
                request.query(key, value)
            });
        let result = self
            .api
            .execute::<NotificationList>(request)
            .await
            .map(|list| list.notifications);
        self.with_fallback("notifications", result, || mock_data::notifications(Utc::now()))
    }

    /// # Errors
    /// Returns the API error.
    pub async fn unread_notification_count(&self) -> Result<u64, ApiError> {
        let response: CountResponse = self.api.get(NOTIFICATIONS_UNREAD_COUNT_PATH).await?;
        Ok(response.count)
    }

    /// # Errors
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn mark_notification_read(
        &self,
        notification_id: i64,
    ) -> Result<Notification, ApiError> {
        let path = format!("{NOTIFICATIONS_PATH}/{notification_id}/read");
        let response: NotificationEnvelope =
            self.api.execute(OutboundRequest::put(path)).await?;
        Ok(response.notification)
    }

    /// # Errors
    /// Returns the API error.
    pub async fn mark_all_notifications_read(&self) -> Result<MessageResponse, ApiError> {
        self.api.execute(OutboundRequest::put(NOTIFICATIONS_MARK_ALL_READ_PATH)).await
    }

    /// # Errors
    /// Returns the API error.
    #[instrument(skip(self))]
    pub async fn delete_notification(
        &self,
        notification_id: i64,
    ) -> Result<MessageResponse, ApiError> {
        self.api.delete(&format!("{NOTIFICATIONS_PATH}/{notification_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::errors::ApiErrorCode;

    fn client(server: &MockServer, fallback: FallbackMode) -> ProductWhisperClient {
        let config = ApiClientConfig { base_url: server.uri(), ..Default::default() };
        let api = ApiClient::new(config, Arc::new(MemoryCredentialStore::new())).unwrap();
        ProductWhisperClient::new(api, fallback)
    }

    fn auth_body() -> Value {
        json!({
            "message": "Login successful",
            "user": { "id": 5, "username": "ana", "email": "ana@example.com" },
            "tokens": { "access": "a1", "refresh": "r1" }
        })
    }

    #[tokio::test]
    async fn login_stores_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "email": "ana@example.com", "password": "hunter2" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, FallbackMode::Propagate);
        assert!(!client.is_authenticated());

        let user = client.login("ana@example.com", "hunter2").await.unwrap();

        assert_eq!(user.name, "ana");
        assert!(client.is_authenticated());
        assert_eq!(client.api().credentials().get(), Some(Credential::new("a1", "r1")));
    }

    #[tokio::test]
    async fn login_failure_never_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
            )
            .mount(&server)
            .await;

        let client = client(&server, FallbackMode::MockData);
        let err = client.login("ana@example.com", "wrong").await.unwrap_err();

        assert_eq!(err.code(), ApiErrorCode::Unauthorized);
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn logout_clears_even_when_server_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client(&server, FallbackMode::Propagate);
        client.api().credentials().set(Credential::new("a", "r"));

        client.logout().await;

        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn mock_fallback_substitutes_product() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/9"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let product = client(&server, FallbackMode::MockData).product_details(9).await.unwrap();
        assert_eq!(product, mock_data::product(9));

        let err = client(&server, FallbackMode::Propagate).product_details(9).await.unwrap_err();
        assert_eq!(err.code(), ApiErrorCode::Server);
    }

    #[tokio::test]
    async fn notification_mutations_never_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client(&server, FallbackMode::MockData);
        assert!(client.unread_notification_count().await.is_err());

        // Read path still falls back.
        let listed = client.notifications(&NotificationQuery::default()).await.unwrap();
        assert_eq!(listed.len(), 3);
    }

    #[tokio::test]
    async fn trending_sends_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recommendations/trending"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "name": "A", "brand": "B", "category": "C", "price": 1.0 },
                { "id": 2, "name": "D", "brand": "E", "category": "F", "price": 2.0 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let products = client(&server, FallbackMode::Propagate).trending_products(2).await.unwrap();
        assert_eq!(products.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn notifications_send_paging_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notifications"))
            .and(query_param("limit", "5"))
            .and(query_param("offset", "10"))
            .and(query_param("unread_only", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "notifications": [{
                    "id": 4,
                    "title": "Price Drop",
                    "message": "20% off",
                    "type": "success",
                    "is_read": false,
                    "created_at": "2024-03-01T12:00:00Z"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = NotificationQuery { limit: 5, offset: 10, unread_only: true };
        let items = client(&server, FallbackMode::Propagate).notifications(&query).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 4);
        assert!(!items[0].read);
    }
}
