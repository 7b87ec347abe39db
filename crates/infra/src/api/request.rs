//! Outbound request description

use productwhisper_domain::constants::AUTH_REFRESH_PATH;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::errors::{ApiError, ApiErrorCode};

/// One logical API call.
///
/// The `retried` flag is set at most once, when the pipeline re-sends the
/// request after a token refresh. A retried request is never refreshed again.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    query: Vec<(String, String)>,
    retried: bool,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, query: Vec::new(), retried: false }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    /// Returns an `Unknown` [`ApiError`] if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| {
            ApiError::new(ApiErrorCode::Unknown, format!("Failed to serialize request body: {e}"))
                .with_cause(e)
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Append a query-string pair.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Whether this request targets the token refresh endpoint.
    pub fn is_refresh(&self) -> bool {
        self.path.trim_end_matches('/').ends_with(AUTH_REFRESH_PATH)
    }

    /// Whether a 401 on this request may trigger a refresh-and-retry.
    pub fn may_refresh(&self) -> bool {
        !self.retried && !self.is_refresh()
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}
