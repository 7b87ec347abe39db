//! # ProductWhisper Domain
//!
//! Wire types and domain models for the ProductWhisper API client.
//!
//! This crate contains:
//! - Request/response types for every API endpoint (products, search,
//!   trends, users, notifications)
//! - The domain error type and `Result` alias
//! - Client configuration structures
//! - Endpoint paths and storage key constants
//!
//! ## Architecture
//! - No dependencies on other ProductWhisper crates
//! - No I/O: everything here is plain data

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
