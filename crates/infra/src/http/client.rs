use std::time::Duration;

use productwhisper_domain::WhisperError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

const USER_AGENT: &str = concat!("productwhisper/", env!("CARGO_PKG_VERSION"));
const MAX_BACKOFF_DOUBLINGS: u32 = 6;

/// Reqwest transport shared by the request pipeline and the token refresher.
///
/// Only connection-level failures and 5xx responses are re-sent, and only
/// when more than one attempt is configured. Every other status, 401
/// included, goes back to the caller untouched.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

/// What to do with the outcome of one attempt.
enum Attempt {
    Done(Result<Response, WhisperError>),
    Retry,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client with a single attempt per request.
    pub fn new() -> Result<Self, WhisperError> {
        Self::builder().build()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Send `builder`, re-sending on transient failures up to the configured
    /// attempt count.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, WhisperError> {
        let mut attempt = 1;
        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| WhisperError::Internal("streaming request body cannot be re-sent".into()))?
                .build()
                .map_err(to_whisper)?;

            debug!(attempt, method = %request.method(), url = %request.url(), "sending HTTP request");
            let last = attempt >= self.max_attempts;

            match classify(self.client.execute(request).await, last) {
                Attempt::Done(result) => return result,
                Attempt::Retry => {
                    tokio::time::sleep(self.backoff(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let doublings = u32::try_from(attempt.saturating_sub(1))
            .unwrap_or(MAX_BACKOFF_DOUBLINGS)
            .min(MAX_BACKOFF_DOUBLINGS);
        self.base_backoff.saturating_mul(1 << doublings)
    }
}

fn classify(outcome: Result<Response, reqwest::Error>, last: bool) -> Attempt {
    match outcome {
        Ok(response) if response.status().is_server_error() && !last => {
            debug!(status = %response.status(), "server error; retrying");
            Attempt::Retry
        }
        Ok(response) => Attempt::Done(Ok(response)),
        Err(err) if !last && is_transient(&err) => {
            debug!(error = %err, "transport failure; retrying");
            Attempt::Retry
        }
        Err(err) => Attempt::Done(Err(to_whisper(err))),
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn to_whisper(err: reqwest::Error) -> WhisperError {
    InfraError::from(err).into()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), max_attempts: 1, base_backoff: Duration::from_millis(200) }
    }
}

impl HttpClientBuilder {
    /// Per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts per request, initial send included.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn build(self) -> Result<HttpClient, WhisperError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .no_proxy()
            .build()
            .map_err(to_whisper)?;

        Ok(HttpClient { client, max_attempts: self.max_attempts, base_backoff: self.base_backoff })
    }
}
