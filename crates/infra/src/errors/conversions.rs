//! Conversions from external infrastructure errors into domain errors.

use keyring::Error as KeyringError;
use productwhisper_domain::WhisperError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub WhisperError);

impl From<InfraError> for WhisperError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<WhisperError> for InfraError {
    fn from(value: WhisperError) -> Self {
        InfraError(value)
    }
}

trait IntoWhisperError {
    fn into_whisper(self) -> WhisperError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → WhisperError */
/* -------------------------------------------------------------------------- */

impl IntoWhisperError for KeyringError {
    fn into_whisper(self) -> WhisperError {
        use KeyringError::{
            Ambiguous, BadEncoding, Invalid, NoEntry, NoStorageAccess, PlatformFailure, TooLong,
        };

        let description = self.to_string();

        match self {
            NoEntry => WhisperError::Storage("keychain entry not found".into()),
            BadEncoding(_) => {
                WhisperError::Storage("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => WhisperError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                WhisperError::Storage(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            Ambiguous(entries) => WhisperError::Storage(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => WhisperError::Storage(format!("keychain platform error: {err}")),
            NoStorageAccess(err) => {
                WhisperError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => WhisperError::Storage(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_whisper())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → WhisperError */
/* -------------------------------------------------------------------------- */

impl IntoWhisperError for HttpError {
    fn into_whisper(self) -> WhisperError {
        if self.is_timeout() {
            return WhisperError::Timeout("HTTP request timed out".into());
        }

        if self.is_connect() {
            return WhisperError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return WhisperError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() || self.is_body() {
            return WhisperError::Serialization(format!("invalid HTTP response body: {self}"));
        }

        WhisperError::Network(format!("HTTP request failed: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_whisper())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
