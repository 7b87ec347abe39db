use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use parking_lot::Mutex as SecretLock;
use productwhisper_domain::{FallbackMode, WhisperError};
use productwhisper_infra::api::{ApiClient, ApiClientConfig, ProductWhisperClient};
use productwhisper_infra::credentials::{
    Credential, CredentialStore, MemoryCredentialStore, SecretBackend,
};
use serde_json::{json, Value};
use tracing::subscriber::DefaultGuard;
use wiremock::MockServer;

/// Client wired to `server` with an in-memory store, optionally pre-seeded.
pub fn client_for(
    server: &MockServer,
    credential: Option<Credential>,
    fallback: FallbackMode,
) -> (ProductWhisperClient, Arc<MemoryCredentialStore>) {
    let store = Arc::new(match credential {
        Some(credential) => MemoryCredentialStore::with_credential(credential),
        None => MemoryCredentialStore::new(),
    });
    let client = client_with_store(server, Arc::clone(&store) as Arc<dyn CredentialStore>, fallback);
    (client, store)
}

/// Client wired to `server` over an arbitrary credential store.
pub fn client_with_store(
    server: &MockServer,
    store: Arc<dyn CredentialStore>,
    fallback: FallbackMode,
) -> ProductWhisperClient {
    let config = ApiClientConfig { base_url: server.uri(), ..Default::default() };
    let api = ApiClient::new(config, store).expect("api client should build");
    ProductWhisperClient::new(api, fallback)
}

/// Minimal product payload as the server sends it.
pub fn product_body(id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Product {id}"),
        "brand": "AudioPro",
        "category": "Electronics",
        "price": 99.5,
        "rating": 4.4,
        "reviewCount": 12,
        "sentimentScore": 0.8,
        "features": {}
    })
}

/// `POST /auth/refresh` success payload.
pub fn tokens_body(access: &str, refresh: &str) -> Value {
    json!({ "tokens": { "access": access, "refresh": refresh } })
}

/// [`SecretBackend`] held in process memory.
#[derive(Default)]
pub struct InMemorySecrets {
    secrets: SecretLock<HashMap<String, String>>,
}

impl InMemorySecrets {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        let backend = Self::default();
        for (key, value) in pairs {
            backend.secrets.lock().insert((*key).to_string(), (*value).to_string());
        }
        backend
    }

    pub fn secret(&self, key: &str) -> Option<String> {
        self.secrets.lock().get(key).cloned()
    }
}

impl SecretBackend for InMemorySecrets {
    fn get_secret(&self, key: &str) -> Result<Option<String>, WhisperError> {
        Ok(self.secret(key))
    }

    fn set_secret(&self, key: &str, value: &str) -> Result<(), WhisperError> {
        self.secrets.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_secret(&self, key: &str) -> Result<(), WhisperError> {
        self.secrets.lock().remove(key);
        Ok(())
    }
}

/// Handle for inspecting captured log output during tests.
pub struct LogHandle {
    buffer: Arc<Mutex<Vec<u8>>>,
    _guard: DefaultGuard,
}

impl LogHandle {
    /// Everything logged so far, as plain text.
    pub fn contents(&self) -> String {
        let guard = self.buffer.lock().expect("log mutex poisoned");
        String::from_utf8_lossy(&guard).into_owned()
    }

    /// Check whether a log line containing `needle` exists.
    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }
}

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log mutex poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Capture `tracing` output on the current thread until the handle drops.
pub fn capture_logs() -> LogHandle {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = Arc::clone(&buffer);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || BufferWriter(Arc::clone(&writer)))
        .finish();

    LogHandle { buffer, _guard: tracing::subscriber::set_default(subscriber) }
}
