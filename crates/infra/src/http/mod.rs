//! HTTP transport shared by the API pipeline and the token refresher.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
