//! Credential storage
//!
//! The [`CredentialStore`] trait is the single source of truth for the current
//! access/refresh token pair. Both tokens are always replaced together so a
//! reader can never pair a new access token with a stale refresh token.

pub mod keychain;
pub mod memory;

use std::fmt;

use productwhisper_domain::AuthTokens;

pub use self::keychain::{KeyringBackend, KeyringCredentialStore, SecretBackend};
pub use self::memory::MemoryCredentialStore;

/// Access/refresh token pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

impl From<AuthTokens> for Credential {
    fn from(tokens: AuthTokens) -> Self {
        Self { access_token: tokens.access, refresh_token: tokens.refresh }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Storage for the current token pair
///
/// Implementations must make [`set`](CredentialStore::set) atomic with respect
/// to [`get`](CredentialStore::get): readers see either the old pair or the new
/// pair, never a mix.
pub trait CredentialStore: Send + Sync {
    /// Current token pair, if authenticated.
    fn get(&self) -> Option<Credential>;

    /// Replace both tokens.
    fn set(&self, credential: Credential);

    /// Forget both tokens (logout).
    fn clear(&self);

    /// Current access token, if any.
    fn access_token(&self) -> Option<String> {
        self.get().map(|credential| credential.access_token)
    }
}
