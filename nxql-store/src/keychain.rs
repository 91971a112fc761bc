//! Portal password storage.
//!
//! Passwords are read from the `NXQL_PASSWORD` environment variable first,
//! then from the system keychain:
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! Keychain entries use service `nxql` with the portal username as account.

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Keychain service name.
pub const SERVICE: &str = "nxql";

/// Environment variable that overrides the keychain.
pub const PASSWORD_ENV: &str = "NXQL_PASSWORD";

// ============================================================================
// Secret Store Trait
// ============================================================================

/// Storage for per-account passwords.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the password for `account`, if one is stored.
    async fn get(&self, account: &str) -> Result<Option<String>, StoreError>;

    /// Stores the password for `account`.
    async fn set(&self, account: &str, secret: &str) -> Result<(), StoreError>;

    /// Deletes the password for `account`; deleting a missing entry succeeds.
    async fn delete(&self, account: &str) -> Result<(), StoreError>;
}

// ============================================================================
// System Keychain
// ============================================================================

/// [`SecretStore`] backed by the system keychain.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemKeychain;

impl SystemKeychain {
    /// Creates a new system keychain instance.
    pub fn new() -> Self {
        Self
    }

    fn entry(account: &str) -> Result<Entry, StoreError> {
        Entry::new(SERVICE, account).map_err(|e| StoreError::Keychain(e.to_string()))
    }
}

#[async_trait]
impl SecretStore for SystemKeychain {
    async fn get(&self, account: &str) -> Result<Option<String>, StoreError> {
        match Self::entry(account)?.get_password() {
            Ok(secret) if !secret.is_empty() => {
                debug!(account = %account, "Password found in keychain");
                Ok(Some(secret))
            }
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => {
                warn!(account = %account, error = %e, "Failed to read keychain");
                Err(StoreError::Keychain(e.to_string()))
            }
        }
    }

    async fn set(&self, account: &str, secret: &str) -> Result<(), StoreError> {
        Self::entry(account)?
            .set_password(secret)
            .map_err(|e| StoreError::Keychain(e.to_string()))?;
        debug!(account = %account, "Password stored in keychain");
        Ok(())
    }

    async fn delete(&self, account: &str) -> Result<(), StoreError> {
        match Self::entry(account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                debug!(account = %account, "Password deleted from keychain");
                Ok(())
            }
            Err(e) => Err(StoreError::Keychain(e.to_string())),
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolves the password for `account` from `NXQL_PASSWORD` or `store`.
///
/// # Errors
///
/// Returns [`StoreError::MissingSecret`] if neither source has one.
pub async fn resolve_secret(store: &dyn SecretStore, account: &str) -> Result<String, StoreError> {
    resolve_secret_with(std::env::var(PASSWORD_ENV).ok(), store, account).await
}

/// Like [`resolve_secret`], with the environment value passed in.
///
/// # Errors
///
/// Returns [`StoreError::MissingSecret`] if neither source has one.
pub async fn resolve_secret_with(
    env_value: Option<String>,
    store: &dyn SecretStore,
    account: &str,
) -> Result<String, StoreError> {
    if let Some(secret) = env_value.filter(|s| !s.is_empty()) {
        debug!(account = %account, "Using password from {PASSWORD_ENV}");
        return Ok(secret);
    }

    store
        .get(account)
        .await?
        .ok_or_else(|| StoreError::MissingSecret(account.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// [`SecretStore`] that lives only as long as the test.
    #[derive(Debug, Default)]
    struct MemorySecretStore {
        secrets: Mutex<HashMap<String, String>>,
    }

    impl MemorySecretStore {
        fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl SecretStore for MemorySecretStore {
        async fn get(&self, account: &str) -> Result<Option<String>, StoreError> {
            Ok(self.secrets.lock().unwrap().get(account).cloned())
        }

        async fn set(&self, account: &str, secret: &str) -> Result<(), StoreError> {
            self.secrets
                .lock()
                .unwrap()
                .insert(account.to_string(), secret.to_string());
            Ok(())
        }

        async fn delete(&self, account: &str) -> Result<(), StoreError> {
            self.secrets.lock().unwrap().remove(account);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemorySecretStore::new();
        assert_eq!(store.get("alice").await.unwrap(), None);

        store.set("alice", "s3cret").await.unwrap();
        assert_eq!(store.get("alice").await.unwrap().as_deref(), Some("s3cret"));

        store.delete("alice").await.unwrap();
        store.delete("alice").await.unwrap();
        assert_eq!(store.get("alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_env_value_wins() {
        let store = MemorySecretStore::new();
        store.set("alice", "from-keychain").await.unwrap();

        let secret = resolve_secret_with(Some("from-env".to_string()), &store, "alice")
            .await
            .unwrap();
        assert_eq!(secret, "from-env");
    }

    #[tokio::test]
    async fn test_empty_env_value_falls_back_to_store() {
        let store = MemorySecretStore::new();
        store.set("alice", "from-keychain").await.unwrap();

        let secret = resolve_secret_with(Some(String::new()), &store, "alice").await.unwrap();
        assert_eq!(secret, "from-keychain");
    }

    #[tokio::test]
    async fn test_missing_secret() {
        let store = MemorySecretStore::new();
        let err = resolve_secret_with(None, &store, "bob").await.unwrap_err();
        assert!(matches!(err, StoreError::MissingSecret(ref a) if a == "bob"));
        assert!(err.is_user_error());
    }
}
