//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from the
//! environment and from files, and of building a client from the result.

use std::io::Write;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use productwhisper_domain::constants::{
    ENV_API_URL, ENV_ENVIRONMENT, ENV_MOCK_FALLBACK, ENV_TIMEOUT_SECS,
};
use productwhisper_domain::{
    Environment, FallbackMode, StorageBackend, TrendPeriod, WhisperError,
};
use productwhisper_infra::config;
use productwhisper_infra::ProductWhisperClient;
use tempfile::{NamedTempFile, TempDir};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn clear_env() {
    for key in [ENV_API_URL, ENV_ENVIRONMENT, ENV_MOCK_FALLBACK, ENV_TIMEOUT_SECS] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "api": {
            "base_url": "https://api.productwhisper.test/api",
            "timeout_secs": 12,
            "refresh_timeout_secs": 4,
            "max_attempts": 2
        },
        "environment": "production",
        "mock_fallback": true,
        "storage": {
            "backend": "keyring",
            "service_name": "ProductWhisper.integration"
        }
    }"#;

    let mut temp_file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.api.base_url, "https://api.productwhisper.test/api");
    assert_eq!(config.api.timeout_secs, 12);
    assert_eq!(config.api.refresh_timeout_secs, 4);
    assert_eq!(config.api.max_attempts, 2);
    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.storage.backend, StorageBackend::Keyring);
    assert_eq!(config.storage.service_name, "ProductWhisper.integration");

    // Production ignores the mock flag
    assert_eq!(config.fallback_mode(), FallbackMode::Propagate);
}

#[test]
fn test_load_config_with_minimal_fields() {
    let mut temp_file =
        tempfile::Builder::new().suffix(".toml").tempfile().expect("Failed to create temp file");
    temp_file.write_all(b"mock_fallback = true\n").expect("Failed to write to temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Minimal config should load");

    assert_eq!(config.api.base_url, "http://localhost:3000/api");
    assert_eq!(config.api.refresh_timeout_secs, 15);
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.fallback_mode(), FallbackMode::MockData);
}

#[test]
fn test_load_config_with_invalid_url() {
    let mut temp_file =
        tempfile::Builder::new().suffix(".toml").tempfile().expect("Failed to create temp file");
    temp_file
        .write_all(b"[api]\nbase_url = \"not a url\"\n")
        .expect("Failed to write to temp file");

    let result = config::load_from_file(Some(temp_file.path().to_path_buf()));
    assert!(result.is_err(), "Should reject an unparsable base URL");
}

#[test]
fn test_load_config_with_invalid_format() {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(b"[api\nbase_url =").expect("Failed to write to temp file");
    let path = temp_file.path().with_extension("toml");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let result = config::load_from_file(Some(path.clone()));
    assert!(result.is_err(), "Should fail with invalid TOML");

    std::fs::remove_file(path).ok();
}

#[test]
fn test_environment_takes_precedence_over_file() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_env();

    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("productwhisper.toml"),
        "[api]\nbase_url = \"http://file.example.com/api\"\n",
    )
    .expect("Failed to write config file");

    let original_dir = std::env::current_dir().expect("cwd");
    std::env::set_current_dir(dir.path()).expect("chdir");

    let from_file = config::load();
    std::env::set_var(ENV_API_URL, "http://env.example.com/api");
    let from_env = config::load();

    std::env::set_current_dir(original_dir).expect("restore cwd");
    clear_env();

    assert_eq!(from_file.expect("file config").api.base_url, "http://file.example.com/api");
    assert_eq!(from_env.expect("env config").api.base_url, "http://env.example.com/api");
}

#[test]
fn test_invalid_environment_value_does_not_fall_back_to_file() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    clear_env();

    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("config.toml"),
        "environment = \"development\"\nmock_fallback = true\n",
    )
    .expect("Failed to write config file");

    let original_dir = std::env::current_dir().expect("cwd");
    std::env::set_current_dir(dir.path()).expect("chdir");

    std::env::set_var(ENV_API_URL, "https://api.example.com/api");
    std::env::set_var(ENV_ENVIRONMENT, "production");
    std::env::set_var(ENV_TIMEOUT_SECS, "abc");
    let result = config::load();

    std::env::set_current_dir(original_dir).expect("restore cwd");
    clear_env();

    match result {
        Err(WhisperError::Config(msg)) => assert!(msg.contains(ENV_TIMEOUT_SECS), "got {msg}"),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_from_config_uses_mock_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(503)).mount(&server).await;

    let mut temp_file =
        tempfile::Builder::new().suffix(".toml").tempfile().expect("Failed to create temp file");
    write!(temp_file, "mock_fallback = true\n\n[api]\nbase_url = \"{}\"\n", server.uri())
        .expect("Failed to write to temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf())).expect("config");
    let client = ProductWhisperClient::from_config(&config).expect("client");

    assert_eq!(client.fallback_mode(), FallbackMode::MockData);

    let trends = client.trend_analysis(8, TrendPeriod::Day).await.expect("mock trends");
    assert_eq!(trends.product_id, 8);
    assert_eq!(trends.sentiment.data_points.len(), 2);

    let trending = client.trending_products(4).await.expect("mock trending");
    assert_eq!(trending.len(), 4);
}
