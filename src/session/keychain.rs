//! OS keychain storage for the session.
//!
//! Uses the `keyring` crate (apple-native on macOS, Secret Service / Credential
//! Manager elsewhere). Each session field is its own keychain entry, so the
//! private token is never written to disk in clear.

use keyring::Entry;

use super::storage::{KeyValueStore, StorageError};

/// Keychain service name for all AnonBox entries.
pub const SERVICE_NAME: &str = "com.anonbox.client";

impl From<keyring::Error> for StorageError {
    fn from(err: keyring::Error) -> Self {
        StorageError::OperationFailed(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct KeychainStorage {
    service: String,
}

impl KeychainStorage {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a different service name (separate profiles, integration tests).
    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }
}

impl Default for KeychainStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for KeychainStorage {
    /// Returns `None` if no entry exists (never stored, or cleared).
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entry = Entry::new(&self.service, key)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let entry = Entry::new(&self.service, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    /// Idempotent: ignores `NoEntry`.
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let entry = Entry::new(&self.service, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::from(e)),
        }
    }
}
