//! Core error types for the NXQL client.

use thiserror::Error;

/// Core error type for model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Platform name not recognized.
    #[error("Unknown platform: {0} (expected windows, mac_os or mobile)")]
    InvalidPlatform(String),

    /// Invalid data from a backend response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
