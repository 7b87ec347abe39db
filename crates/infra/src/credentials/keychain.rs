//! Platform keychain credential store.
//!
//! Tokens are persisted under two fixed keys ([`ACCESS_TOKEN_KEY`] and
//! [`REFRESH_TOKEN_KEY`]) within a configurable keychain service. An in-memory
//! copy is the read authority: the keychain cannot write two entries
//! atomically, so readers never go to it directly once the store is loaded.

use keyring::Entry;
use parking_lot::{Mutex, RwLock};
use productwhisper_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use productwhisper_domain::WhisperError;
use tracing::{debug, warn};

use super::{Credential, CredentialStore};
use crate::errors::InfraError;

/// Minimal secret storage used by [`KeyringCredentialStore`].
pub trait SecretBackend: Send + Sync {
    /// Read a secret; `Ok(None)` when the key does not exist.
    fn get_secret(&self, key: &str) -> Result<Option<String>, WhisperError>;

    fn set_secret(&self, key: &str, value: &str) -> Result<(), WhisperError>;

    /// Delete a secret. Deleting a missing key succeeds.
    fn delete_secret(&self, key: &str) -> Result<(), WhisperError>;
}

/// [`SecretBackend`] over the OS keychain via the `keyring` crate.
#[derive(Debug, Clone)]
pub struct KeyringBackend {
    service_name: String,
}

impl KeyringBackend {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    fn entry(&self, key: &str) -> Result<Entry, WhisperError> {
        Entry::new(&self.service_name, key).map_err(|e| InfraError::from(e).into())
    }
}

impl SecretBackend for KeyringBackend {
    fn get_secret(&self, key: &str) -> Result<Option<String>, WhisperError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }

    fn set_secret(&self, key: &str, value: &str) -> Result<(), WhisperError> {
        debug!(service = %self.service_name, key, "storing secret in keychain");
        self.entry(key)?.set_password(value).map_err(|e| InfraError::from(e).into())
    }

    fn delete_secret(&self, key: &str) -> Result<(), WhisperError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }
}

/// Credential store persisted through a [`SecretBackend`].
pub struct KeyringCredentialStore<B: SecretBackend = KeyringBackend> {
    backend: B,
    cache: RwLock<Option<Credential>>,
    // Serializes backend writes so the persisted pair follows cache order.
    persist: Mutex<()>,
}

impl KeyringCredentialStore<KeyringBackend> {
    /// Open the store for a keychain service, loading any saved pair.
    pub fn open(service_name: impl Into<String>) -> Self {
        Self::load(KeyringBackend::new(service_name))
    }
}

impl<B: SecretBackend> KeyringCredentialStore<B> {
    /// Build a store over `backend`, loading the persisted pair if both halves
    /// exist. A read failure is logged and leaves the store empty.
    pub fn load(backend: B) -> Self {
        let loaded = match Self::read_pair(&backend) {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "failed to load credentials from keychain");
                None
            }
        };

        debug!(authenticated = loaded.is_some(), "keychain credential store loaded");

        Self { backend, cache: RwLock::new(loaded), persist: Mutex::new(()) }
    }

    fn read_pair(backend: &B) -> Result<Option<Credential>, WhisperError> {
        let access = backend.get_secret(ACCESS_TOKEN_KEY)?;
        let refresh = backend.get_secret(REFRESH_TOKEN_KEY)?;

        match (access, refresh) {
            (Some(access), Some(refresh)) => Ok(Some(Credential::new(access, refresh))),
            (None, None) => Ok(None),
            _ => {
                warn!("keychain holds only half of the token pair; treating as logged out");
                Ok(None)
            }
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: SecretBackend> CredentialStore for KeyringCredentialStore<B> {
    fn get(&self) -> Option<Credential> {
        self.cache.read().clone()
    }

    fn set(&self, credential: Credential) {
        let _guard = self.persist.lock();
        *self.cache.write() = Some(credential.clone());

        let persisted = self
            .backend
            .set_secret(ACCESS_TOKEN_KEY, &credential.access_token)
            .and_then(|()| self.backend.set_secret(REFRESH_TOKEN_KEY, &credential.refresh_token));

        if let Err(e) = persisted {
            warn!(error = %e, "failed to persist credentials; keeping them in memory");
        }
    }

    fn clear(&self) {
        let _guard = self.persist.lock();
        *self.cache.write() = None;

        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.backend.delete_secret(key) {
                warn!(error = %e, key, "failed to delete credential from keychain");
            }
        }
    }
}
