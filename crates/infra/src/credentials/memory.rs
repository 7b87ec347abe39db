//! In-process credential store

use parking_lot::RwLock;
use tracing::debug;

use super::{Credential, CredentialStore};

/// Credential store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    current: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token pair.
    pub fn with_credential(credential: Credential) -> Self {
        Self { current: RwLock::new(Some(credential)) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.current.read().clone()
    }

    fn set(&self, credential: Credential) {
        *self.current.write() = Some(credential);
        debug!("credentials replaced");
    }

    fn clear(&self) {
        *self.current.write() = None;
        debug!("credentials cleared");
    }
}
