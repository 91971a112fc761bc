//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unknown settings key.
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    /// Value could not be parsed for a settings key.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Settings key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// System keychain failure.
    #[error("Keychain error: {0}")]
    Keychain(String),

    /// No secret configured for the account.
    #[error("No password for {0}: set NXQL_PASSWORD or run `nxql secret set`")]
    MissingSecret(String),
}

impl StoreError {
    /// Returns true if the error is caused by user input rather than the
    /// environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            StoreError::UnknownKey(_) | StoreError::InvalidValue { .. } | StoreError::MissingSecret(_)
        )
    }
}
