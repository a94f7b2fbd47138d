use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use keyring::Entry;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::TokenPair;

/// Key of the short-lived bearer token
pub const ACCESS_TOKEN_KEY: &str = "access-token";

/// Key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh-token";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to create keyring entry for {key}: {source}")]
    Entry {
        key: String,
        #[source]
        source: keyring::Error,
    },

    #[error("Failed to store {key} in keychain: {source}")]
    Store {
        key: String,
        #[source]
        source: keyring::Error,
    },

    #[error("Failed to retrieve {key} from keychain: {source}")]
    Read {
        key: String,
        #[source]
        source: keyring::Error,
    },

    #[error("Failed to delete {key} from keychain: {source}")]
    Delete {
        key: String,
        #[source]
        source: keyring::Error,
    },
}

/// Namespaced secret storage.
///
/// A missing entry is not an error: `read` returns `Ok(None)` and `delete`
/// is a no-op.
pub trait CredentialStore: Send + Sync {
    /// Overwrite any existing value for `(namespace, key)`
    fn save(&self, value: &str, namespace: &str, key: &str) -> Result<(), CredentialError>;

    fn read(&self, namespace: &str, key: &str) -> Result<Option<String>, CredentialError>;

    fn delete(&self, namespace: &str, key: &str) -> Result<(), CredentialError>;
}

/// OS keychain backed store (Keychain, Credential Manager, kernel keyutils).
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStore;

impl KeyringStore {
    fn entry(namespace: &str, key: &str) -> Result<Entry, CredentialError> {
        Entry::new(namespace, key).map_err(|source| CredentialError::Entry {
            key: key.to_string(),
            source,
        })
    }
}

impl CredentialStore for KeyringStore {
    fn save(&self, value: &str, namespace: &str, key: &str) -> Result<(), CredentialError> {
        // Some backends refuse to add a duplicate item, so drop the old one first
        self.delete(namespace, key)?;
        Self::entry(namespace, key)?
            .set_password(value)
            .map_err(|source| CredentialError::Store {
                key: key.to_string(),
                source,
            })
    }

    fn read(&self, namespace: &str, key: &str) -> Result<Option<String>, CredentialError> {
        match Self::entry(namespace, key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(source) => Err(CredentialError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), CredentialError> {
        match Self::entry(namespace, key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(source) => Err(CredentialError::Delete {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Process-local store. Used in tests and for throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryStore {
    fn save(&self, value: &str, namespace: &str, key: &str) -> Result<(), CredentialError> {
        self.entries()
            .insert((namespace.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    fn read(&self, namespace: &str, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self
            .entries()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), CredentialError> {
        self.entries()
            .remove(&(namespace.to_string(), key.to_string()));
        Ok(())
    }
}

/// The access/refresh token pair, bound to one store and namespace.
/// Clone is cheap and every clone sees the same entries.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn CredentialStore>,
    namespace: String,
}

impl TokenStore {
    pub fn new(store: Arc<dyn CredentialStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Store both tokens. If either write fails both entries are removed,
    /// so a lone access token never survives a failed save.
    pub fn save(&self, tokens: &TokenPair) -> Result<(), CredentialError> {
        let saved = self
            .store
            .save(&tokens.access, &self.namespace, ACCESS_TOKEN_KEY)
            .and_then(|()| {
                self.store
                    .save(&tokens.refresh, &self.namespace, REFRESH_TOKEN_KEY)
            });
        if let Err(e) = saved {
            self.clear();
            return Err(e);
        }
        debug!(namespace = %self.namespace, "Tokens stored");
        Ok(())
    }

    pub fn access_token(&self) -> Result<Option<String>, CredentialError> {
        self.store.read(&self.namespace, ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, CredentialError> {
        self.store.read(&self.namespace, REFRESH_TOKEN_KEY)
    }

    /// Remove both tokens. Failures are logged, never returned.
    pub fn clear(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.store.delete(&self.namespace, key) {
                warn!(error = %e, key, "Failed to delete token");
            }
        }
    }
}
