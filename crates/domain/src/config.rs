//! Configuration management

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_KEYRING_SERVICE, DEFAULT_MAX_ATTEMPTS, DEFAULT_REFRESH_TIMEOUT_SECS,
    DEFAULT_TIMEOUT_SECS,
};
use crate::errors::WhisperError;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiSettings,
    pub environment: Environment,
    /// Serve mock data when a call fails. Ignored in production.
    pub mock_fallback: bool,
    pub storage: StorageSettings,
}

/// HTTP API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub refresh_timeout_secs: u64,
    /// Total transport attempts per request (initial try + retries).
    pub max_attempts: usize,
}

/// Credential storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub service_name: String,
}

/// Deployment environment the client runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Where credentials are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory only; credentials are lost on exit.
    #[default]
    Memory,
    /// Platform keychain.
    Keyring,
}

/// What typed endpoint methods do when a call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackMode {
    /// Surface the error to the caller.
    #[default]
    Propagate,
    /// Return deterministic mock data instead of the error.
    MockData,
}

impl ClientConfig {
    /// Fallback policy derived from the environment and the mock flag.
    ///
    /// Production never falls back, whatever `mock_fallback` says.
    #[must_use]
    pub fn fallback_mode(&self) -> FallbackMode {
        match (self.environment, self.mock_fallback) {
            (Environment::Development, true) => FallbackMode::MockData,
            _ => FallbackMode::Propagate,
        }
    }
}

impl ApiSettings {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            refresh_timeout_secs: DEFAULT_REFRESH_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { backend: StorageBackend::default(), service_name: DEFAULT_KEYRING_SERVICE.to_string() }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            environment: Environment::default(),
            mock_fallback: false,
            storage: StorageSettings::default(),
        }
    }
}

impl FromStr for Environment {
    type Err = WhisperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(WhisperError::Config(format!("Unknown environment: {other}"))),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = WhisperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "keyring" | "keychain" => Ok(Self::Keyring),
            other => Err(WhisperError::Config(format!("Unknown storage backend: {other}"))),
        }
    }
}
