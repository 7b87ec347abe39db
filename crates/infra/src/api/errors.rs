//! API error taxonomy
//!
//! Every failure surfaced by the client is an [`ApiError`] with one of a
//! closed set of [`ApiErrorCode`]s. The HTTP status → code mapping is fixed:
//!
//! | status / failure            | code           |
//! |-----------------------------|----------------|
//! | 408, transport timeout      | `Timeout`      |
//! | no response received        | `Network`      |
//! | 401                         | `Unauthorized` |
//! | 403                         | `Forbidden`    |
//! | 404                         | `NotFound`     |
//! | 422                         | `Validation`   |
//! | 500, 502, 503, 504          | `Server`       |
//! | anything else               | `Unknown`      |

use std::fmt;
use std::sync::Arc;

use productwhisper_domain::WhisperError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Shared, cloneable underlying error.
pub type ErrorCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Closed set of API failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiErrorCode {
    #[serde(rename = "network_error")]
    Network,
    #[serde(rename = "timeout")]
    Timeout,
    #[serde(rename = "server_error")]
    Server,
    #[serde(rename = "unauthorized")]
    Unauthorized,
    #[serde(rename = "forbidden")]
    Forbidden,
    #[serde(rename = "not_found")]
    NotFound,
    #[serde(rename = "validation_error")]
    Validation,
    #[serde(rename = "unknown_error")]
    Unknown,
}

impl ApiErrorCode {
    /// Map an HTTP status to its error code.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            408 => Self::Timeout,
            422 => Self::Validation,
            500 | 502 | 503 | 504 => Self::Server,
            _ => Self::Unknown,
        }
    }

    /// Stable wire label (e.g. `"not_found"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network_error",
            Self::Timeout => "timeout",
            Self::Server => "server_error",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Validation => "validation_error",
            Self::Unknown => "unknown_error",
        }
    }

    fn default_message(self) -> &'static str {
        match self {
            Self::Network => "Network error. Please check your connection and try again.",
            Self::Timeout => "Request timed out. Please try again.",
            _ => "An error occurred",
        }
    }

    fn user_message(self) -> &'static str {
        match self {
            Self::Network => {
                "Unable to connect to the server. Please check your internet connection and try again."
            }
            Self::Timeout => "The request took too long to complete. Please try again.",
            Self::Unauthorized => "You need to log in to access this feature.",
            Self::Forbidden => "You don't have permission to access this resource.",
            Self::NotFound => "The requested resource was not found.",
            Self::Validation => {
                "The submitted data is invalid. Please check your inputs and try again."
            }
            Self::Server => "The server encountered an error. Please try again later.",
            Self::Unknown => "An unexpected error occurred. Please try again.",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized API failure
///
/// Immutable once built. Clones share the underlying cause, so one refresh
/// outcome can be handed to every waiting request.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    user_message: String,
    code: ApiErrorCode,
    status: Option<u16>,
    payload: Option<Value>,
    #[source]
    cause: Option<ErrorCause>,
}

impl ApiError {
    /// Build an error with an explicit message and code.
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self::assemble(code, message.into(), None, None, None)
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Normalize a non-success HTTP response.
    ///
    /// `body` is the raw response body. A JSON object body is kept as the
    /// diagnostic payload and its `message` (or `error`) field, when present,
    /// becomes the error message.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let code = ApiErrorCode::from_status(status);
        let payload = serde_json::from_str::<Value>(body).ok().filter(Value::is_object);

        let message = payload
            .as_ref()
            .and_then(|data| {
                ["message", "error"]
                    .iter()
                    .find_map(|field| data.get(*field).and_then(Value::as_str))
            })
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!("Request failed with status code {}", status.as_u16())
            });

        Self::assemble(code, message, Some(status.as_u16()), payload, None)
    }

    /// Normalize a transport failure (no HTTP response was received).
    pub fn from_transport(err: WhisperError) -> Self {
        let code = match &err {
            WhisperError::Timeout(_) => ApiErrorCode::Timeout,
            WhisperError::Network(_) => ApiErrorCode::Network,
            _ => ApiErrorCode::Unknown,
        };
        let message = match code {
            ApiErrorCode::Unknown => err.to_string(),
            _ => code.default_message().to_string(),
        };

        Self::assemble(code, message, None, None, Some(Arc::new(err)))
    }

    /// A successful response whose body did not match the expected shape.
    pub fn invalid_body(status: StatusCode, err: serde_json::Error) -> Self {
        let message = format!("Failed to parse response body: {err}");
        Self::assemble(ApiErrorCode::Unknown, message, Some(status.as_u16()), None, Some(Arc::new(err)))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Unauthorized, message)
    }

    fn assemble(
        code: ApiErrorCode,
        message: String,
        status: Option<u16>,
        payload: Option<Value>,
        cause: Option<ErrorCause>,
    ) -> Self {
        let user_message = user_message_for(code, &message, payload.as_ref());
        Self { message, user_message, code, status, payload, cause }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Precomputed, display-ready message for end users.
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn code(&self) -> ApiErrorCode {
        self.code
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Structured server payload, when the body was a JSON object.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn cause(&self) -> Option<&ErrorCause> {
        self.cause.as_ref()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code == ApiErrorCode::Unauthorized
    }
}

impl From<WhisperError> for ApiError {
    fn from(err: WhisperError) -> Self {
        Self::from_transport(err)
    }
}

fn user_message_for(code: ApiErrorCode, message: &str, payload: Option<&Value>) -> String {
    match code {
        ApiErrorCode::Validation => match payload.and_then(|data| data.get("errors")) {
            Some(errors) => {
                let details = validation_details(errors);
                if details.is_empty() {
                    code.user_message().to_string()
                } else {
                    format!("Please correct the following errors: {}", details.join(", "))
                }
            }
            None => code.user_message().to_string(),
        },
        ApiErrorCode::Unknown if !message.is_empty() => message.to_string(),
        _ => code.user_message().to_string(),
    }
}

/// Flatten a validation `errors` value (object of field → message, or an
/// express-validator style array of `{ msg }` objects) into messages.
fn validation_details(errors: &Value) -> Vec<String> {
    let describe = |value: &Value| match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => ["msg", "message"]
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str))
            .map(str::to_string),
        Value::Null => None,
        other => Some(other.to_string()),
    };

    match errors {
        Value::Object(map) => map.values().filter_map(describe).collect(),
        Value::Array(items) => items.iter().filter_map(describe).collect(),
        other => describe(other).into_iter().collect(),
    }
}
