//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `PRODUCTWHISPER_API_URL` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. With no environment and no file, uses built-in defaults
//!
//! ## Environment Variables
//! - `PRODUCTWHISPER_API_URL`: API base URL (required for env loading)
//! - `PRODUCTWHISPER_TIMEOUT_SECS`: Request timeout in seconds
//! - `PRODUCTWHISPER_REFRESH_TIMEOUT_SECS`: Token refresh timeout in seconds
//! - `PRODUCTWHISPER_MAX_ATTEMPTS`: Transport attempts per request
//! - `PRODUCTWHISPER_ENV`: `development` or `production`
//! - `PRODUCTWHISPER_MOCK_FALLBACK`: Serve mock data on failure (true/false)
//! - `PRODUCTWHISPER_STORAGE`: `memory` or `keyring`
//! - `PRODUCTWHISPER_KEYRING_SERVICE`: Keychain service name
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./productwhisper.json` or `./productwhisper.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use productwhisper_domain::constants::{
    ENV_API_URL, ENV_ENVIRONMENT, ENV_KEYRING_SERVICE, ENV_MAX_ATTEMPTS, ENV_MOCK_FALLBACK,
    ENV_REFRESH_TIMEOUT_SECS, ENV_STORAGE_BACKEND, ENV_TIMEOUT_SECS,
};
use productwhisper_domain::{ClientConfig, Result, WhisperError};
use url::Url;

const CONFIG_FILE_NAMES: [&str; 4] =
    ["productwhisper.json", "productwhisper.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the API URL is not
/// set there, falls back to a config file, and finally to defaults when no
/// file exists either.
///
/// # Errors
/// Returns `WhisperError::Config` if a present source is invalid. Once
/// `PRODUCTWHISPER_API_URL` is set, an invalid environment variable is an
/// error rather than a reason to read the file.
pub fn load() -> Result<ClientConfig> {
    if std::env::var_os(ENV_API_URL).is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    tracing::debug!("{ENV_API_URL} not set, trying file");

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::info!("No configuration found; using defaults");
            Ok(ClientConfig::default())
        }
    }
}

/// Load configuration from environment variables
///
/// `PRODUCTWHISPER_API_URL` is required; every other variable falls back to
/// its default.
///
/// # Errors
/// Returns `WhisperError::Config` if the URL is missing or any variable has
/// an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::default();

    config.api.base_url = env_var(ENV_API_URL)?;
    if let Some(secs) = env_parse::<u64>(ENV_TIMEOUT_SECS)? {
        config.api.timeout_secs = secs;
    }
    if let Some(secs) = env_parse::<u64>(ENV_REFRESH_TIMEOUT_SECS)? {
        config.api.refresh_timeout_secs = secs;
    }
    if let Some(attempts) = env_parse::<usize>(ENV_MAX_ATTEMPTS)? {
        config.api.max_attempts = attempts;
    }
    if let Some(environment) = env_parse(ENV_ENVIRONMENT)? {
        config.environment = environment;
    }
    config.mock_fallback = env_bool(ENV_MOCK_FALLBACK, false);
    if let Some(backend) = env_parse(ENV_STORAGE_BACKEND)? {
        config.storage.backend = backend;
    }
    if let Ok(service) = std::env::var(ENV_KEYRING_SERVICE) {
        config.storage.service_name = service;
    }

    validate(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Missing keys take their defaults.
///
/// # Errors
/// Returns `WhisperError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(WhisperError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            WhisperError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| WhisperError::Config(format!("Failed to read config file: {e}")))?;

    validate(parse_config(&contents, &config_path)?)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| WhisperError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| WhisperError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(WhisperError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Reject configurations the client cannot run with.
fn validate(config: ClientConfig) -> Result<ClientConfig> {
    let url = Url::parse(&config.api.base_url).map_err(|e| {
        WhisperError::Config(format!("Invalid API base URL '{}': {e}", config.api.base_url))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(WhisperError::Config(format!(
            "API base URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if config.api.timeout_secs == 0 || config.api.refresh_timeout_secs == 0 {
        return Err(WhisperError::Config("Timeouts must be at least one second".to_string()));
    }
    if config.api.max_attempts == 0 {
        return Err(WhisperError::Config("max_attempts must be at least 1".to_string()));
    }

    Ok(config)
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, then the executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `WhisperError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        WhisperError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable.
///
/// # Errors
/// Returns `WhisperError::Config` if the variable is set but unparsable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| WhisperError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
