//! # ProductWhisper Infrastructure
//!
//! I/O side of the ProductWhisper API client.
//!
//! This crate contains:
//! - The authenticated request pipeline and refresh coordinator
//! - Typed endpoint methods with development mock fallback
//! - Credential stores (in-memory and platform keychain)
//! - HTTP transport with retry support
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Depends on `productwhisper-domain` for wire types and configuration
//! - Contains all "impure" code (network, keychain, filesystem)

pub mod api;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::{ApiClient, ApiError, ApiErrorCode, ProductWhisperClient};
pub use credentials::{Credential, CredentialStore, KeyringCredentialStore, MemoryCredentialStore};
pub use http::HttpClient;
