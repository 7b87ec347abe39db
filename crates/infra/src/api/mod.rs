//! ProductWhisper API client
//!
//! This module provides the authenticated request pipeline and the typed
//! endpoint methods built on top of it.
//!
//! # Architecture
//!
//! - `client`: bearer auth, response decoding, refresh-and-retry on 401
//! - `refresh`: single-flight token refresh shared by concurrent requests
//! - `errors`: normalization of every failure into [`ApiError`]
//! - `endpoints`: one method per server operation, with optional mock fallback
//! - `mock_data`: deterministic fallback values

pub mod client;
pub mod endpoints;
pub mod errors;
pub mod mock_data;
pub mod refresh;
pub mod request;

pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use endpoints::ProductWhisperClient;
pub use errors::{ApiError, ApiErrorCode};
pub use refresh::{
    HttpTokenRefresher, PendingRefresh, RefreshCoordinator, RefreshPhase, TokenRefresher,
};
pub use request::OutboundRequest;
